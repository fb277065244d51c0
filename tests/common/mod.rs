//! Shared scaffolding for the integration test binaries under `tests/`.
//!
//! Wires the fabric, ledger, and nodes directly (the same steps `driver::run`
//! performs) so a test can seed the ledger with a "genesis" credit before any
//! worker starts, bypassing `driver::run`'s forced `reset`.

use std::sync::Arc;

use mutex_bank_sim::fabric::Fabric;
use mutex_bank_sim::ledger::Ledger;
use mutex_bank_sim::metrics::Metrics;
use mutex_bank_sim::node;
use mutex_bank_sim::types::{Transaction, Variant};

/// Comfortably larger than any amount used in these scenarios, so a seeded
/// sender never hits the funds-sufficiency wait (that path has its own dedicated
/// test in `tests/scenarios.rs`).
pub const SEED_BALANCE: i64 = 1_000;

pub fn full_quorums(n: usize) -> Vec<Vec<usize>> {
    (0..n).map(|_| (0..n).collect()).collect()
}

/// Runs `transactions` to completion across `account_count` nodes and returns
/// the final per-account balances alongside the message-count metrics.
///
/// `quorums[i]` is node `i`'s quorum (ignored for `Variant::R1`, which always
/// broadcasts to every peer). `seed` credits each listed account from an
/// out-of-range ghost id (`account_count`), invisible to the final balance
/// read-out, which only iterates `0..account_count`.
pub fn run_scenario(
    variant: Variant,
    account_count: usize,
    quorums: Vec<Vec<usize>>,
    seed: &[usize],
    transactions: Vec<Transaction>,
) -> (Vec<i64>, Arc<Metrics>) {
    let work_dir = tempfile::tempdir().unwrap();
    let ledger = Arc::new(Ledger::new(work_dir.path().join("logs.txt")));
    ledger.reset().unwrap();

    let ghost = account_count;
    for &id in seed {
        ledger
            .append(&Transaction { from: ghost, to: id, amount: SEED_BALANCE, post_delay_ms: 0 })
            .unwrap();
    }

    let metrics = Arc::new(Metrics::new());
    let (fabric, inboxes) = Fabric::new(account_count, metrics.clone());
    let transactions = Arc::new(transactions);

    let mut handles = Vec::with_capacity(account_count);
    for (id, (req_in, app_in)) in inboxes.into_iter().enumerate() {
        let quorum = match variant {
            Variant::R1 => (0..account_count).collect(),
            Variant::R2 => quorums[id].clone(),
        };
        handles.push(node::spawn(
            id,
            variant,
            quorum,
            account_count,
            fabric.clone(),
            req_in,
            app_in,
            transactions.clone(),
            ledger.clone(),
        ));
    }

    for handle in handles {
        handle.worker.join().expect("worker thread panicked");
    }

    let balances = (0..account_count).map(|id| ledger.read_balance(id)).collect();
    (balances, metrics)
}
