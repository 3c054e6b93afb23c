//! Identity resolution services
//!
//! The pipeline, leaf-first: CandidateFinder (ranked lookups) →
//! MatchResolver (best-match decision) → BatchMatcher (amortized import
//! resolution), plus the two write-side services IdentityAssigner
//! (assignment + cascade) and CustomerMerger (duplicate consolidation).

pub mod batch_matcher;
pub mod candidate_finder;
pub mod customer_merger;
pub mod identity_assigner;
pub mod match_resolver;

pub use batch_matcher::{BatchMatcher, RowMatch, RowSignals};
pub use candidate_finder::{CandidateFinder, DEFAULT_CANDIDATE_LIMIT};
pub use customer_merger::{CustomerMerger, MergeOutcome};
pub use identity_assigner::{
    AssignmentItem, AssignmentOutcome, BatchAssignmentOutcome, IdentityAssigner,
};
pub use match_resolver::MatchResolver;
