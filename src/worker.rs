//! The per-node transaction worker loop.

use std::sync::Arc;
use std::time::Duration;

use log::info;

use crate::ledger::Ledger;
use crate::mutex_engine::MutexEngine;
use crate::types::{NodeId, Transaction};

/// How long to sleep between balance probes while waiting for funds to arrive.
/// Both variants use this single bounded sleep.
const WAIT_FOR_FUNDS_POLL: Duration = Duration::from_millis(10);

/// Runs every transaction whose `from` equals `id`, in input order, to completion.
///
/// The full transaction list is scanned from index 0 by every node.
pub fn run(id: NodeId, transactions: &[Transaction], engine: &Arc<MutexEngine>, ledger: &Arc<Ledger>) {
    info!("node {id}: worker started");

    for (index, tx) in transactions.iter().enumerate().filter(|(_, tx)| tx.from == id) {
        run_one(id, index, tx, engine, ledger);
    }

    info!("node {id}: worker finished");
}

fn run_one(id: NodeId, index: usize, tx: &Transaction, engine: &Arc<MutexEngine>, ledger: &Arc<Ledger>) {
    engine.acquire();
    info!("node {id}: acquired CS for tx #{index}");

    let mut balance = ledger.read_balance(id);
    if balance < tx.amount {
        engine.release();
        info!("node {id}: released CS to wait for funds (have {balance}, need {})", tx.amount);
        while balance < tx.amount {
            std::thread::sleep(WAIT_FOR_FUNDS_POLL);
            balance = ledger.read_balance(id);
        }
        engine.acquire();
        info!("node {id}: re-acquired CS for tx #{index} after funds arrived");
    }

    if let Err(e) = ledger.append(tx) {
        log::warn!("node {id}: failed to append tx #{index}: {e}");
    }

    engine.release();
    info!("node {id}: released CS");

    if tx.post_delay_ms > 0 {
        std::thread::sleep(Duration::from_millis(tx.post_delay_ms));
    }
}
