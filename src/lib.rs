//! A bank of N account-nodes that transfer money to one another while
//! coordinating access to a shared transaction log via distributed mutual
//! exclusion (Ricart-Agrawala, or Roucairol-Carvalho over a static quorum).
//!
//! `driver::run` is the entry point used by the `mutex-bank-sim` binary.

pub mod driver;
pub mod error;
pub mod fabric;
pub mod input;
pub mod ledger;
pub mod metrics;
pub mod mutex_engine;
pub mod node;
pub mod types;
pub mod worker;
