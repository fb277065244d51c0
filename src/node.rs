//! Wires one account-node's receive loop and worker together: one receive
//! loop per node and one worker per node, sharing the per-node state.

use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread::JoinHandle;

use log::debug;

use crate::fabric::Fabric;
use crate::ledger::Ledger;
use crate::mutex_engine::MutexEngine;
use crate::types::{NodeId, Request, Transaction, Variant};
use crate::worker;

pub struct NodeHandles {
    pub receive_loop: JoinHandle<()>,
    pub worker: JoinHandle<()>,
}

/// Spawns node `id`'s receive-loop and worker threads.
///
/// `req_in` / `app_in` are the inbox ends the fabric allocated for this node;
/// `transactions` and `ledger` are shared read-only/log-synchronized across all nodes.
#[allow(clippy::too_many_arguments)]
pub fn spawn(
    id: NodeId,
    variant: Variant,
    quorum: Vec<NodeId>,
    node_count: usize,
    fabric: Arc<Fabric>,
    req_in: Receiver<Request>,
    app_in: Receiver<crate::types::Approval>,
    transactions: Arc<Vec<Transaction>>,
    ledger: Arc<Ledger>,
) -> NodeHandles {
    let engine = Arc::new(MutexEngine::new(id, variant, quorum, node_count, fabric, app_in));

    let receive_loop = {
        let engine = engine.clone();
        std::thread::Builder::new()
            .name(format!("node-{id}-recv"))
            .spawn(move || receive_loop(id, req_in, &engine))
            .expect("failed to spawn receive-loop thread")
    };

    let worker = {
        let engine = engine.clone();
        std::thread::Builder::new()
            .name(format!("node-{id}-worker"))
            .spawn(move || worker::run(id, &transactions, &engine, &ledger))
            .expect("failed to spawn worker thread")
    };

    NodeHandles { receive_loop, worker }
}

/// Consumes incoming `Request`s from peers for the lifetime of the process.
/// Exits when `req_in` disconnects, which happens once every `SyncSender` handed
/// out by the fabric for this node has been dropped.
fn receive_loop(id: NodeId, req_in: Receiver<Request>, engine: &MutexEngine) {
    while let Ok(req) = req_in.recv() {
        debug!("node {id}: received Request(ts={}, origin={})", req.timestamp, req.origin);
        engine.on_incoming_request(req);
    }
}
