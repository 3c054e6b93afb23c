//! Database access for the identity engine
//!
//! Query modules over the shared SBO schema. Pure reads take the pool;
//! writes that participate in a transactional flow take any executor so
//! the services can route them through one transaction.

pub mod customers;
pub mod records;
