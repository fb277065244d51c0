//! The distributed mutual-exclusion engine — the hardest part of the system.
//! One `MutexEngine` per node, shared between that node's receive-loop thread
//! (`on_incoming_request`) and its worker thread (`acquire`/`release`).

use std::collections::VecDeque;
use std::sync::mpsc::Receiver;
use std::sync::Mutex;

use crate::fabric::Fabric;
use crate::types::{Approval, NodeId, Request, Timestamp, Variant};

/// The fields shared between a node's receive loop and its worker, guarded by a
/// single lock. The deferred queue is guarded separately.
struct ProtocolState {
    /// Timestamp of this node's current (or most recently issued) own request.
    /// Only meaningful while `in_cs_or_requesting` is true.
    my_turn: Timestamp,
    highest_seen: Timestamp,
    in_cs_or_requesting: bool,
    /// R2 only: `permits_held[p]` is true iff an unrevoked permit from `p` is held.
    /// A dense `Vec<bool>` indexed by `NodeId`.
    permits_held: Vec<bool>,
}

pub struct MutexEngine {
    id: NodeId,
    variant: Variant,
    /// The peer set this node must coordinate with, including itself.
    /// The full node set for R1; the static quorum for R2.
    quorum: Vec<NodeId>,
    fabric: std::sync::Arc<Fabric>,
    state: Mutex<ProtocolState>,
    deferred: Mutex<VecDeque<Request>>,
    /// Owned by this node's worker thread alone: the approval inbox consumed
    /// directly inside `acquire`. Wrapped in a `Mutex` only so `MutexEngine`
    /// can be `Sync` and shared via `Arc`.
    app_in: Mutex<Receiver<Approval>>,
}

impl MutexEngine {
    pub fn new(
        id: NodeId,
        variant: Variant,
        quorum: Vec<NodeId>,
        node_count: usize,
        fabric: std::sync::Arc<Fabric>,
        app_in: Receiver<Approval>,
    ) -> Self {
        Self {
            id,
            variant,
            quorum,
            fabric,
            state: Mutex::new(ProtocolState {
                my_turn: 0,
                highest_seen: 0,
                in_cs_or_requesting: false,
                permits_held: vec![false; node_count],
            }),
            deferred: Mutex::new(VecDeque::new()),
            app_in: Mutex::new(app_in),
        }
    }

    /// Blocks until this node holds all required approvals.
    pub fn acquire(&self) {
        let (my_turn, send_set) = {
            let mut state = self.state.lock().unwrap();
            state.my_turn = state.highest_seen + 1;
            state.in_cs_or_requesting = true;

            let send_set: Vec<NodeId> = self
                .quorum
                .iter()
                .copied()
                .filter(|&peer| {
                    peer != self.id
                        && (self.variant == Variant::R1 || !state.permits_held[peer])
                })
                .collect();
            (state.my_turn, send_set)
        };

        for &peer in &send_set {
            self.fabric.send_request(peer, Request::new(my_turn, self.id));
        }

        let app_in = self.app_in.lock().unwrap();
        for _ in 0..send_set.len() {
            let approval = app_in.recv().expect("approval channel closed unexpectedly");
            if self.variant == Variant::R2 {
                let mut state = self.state.lock().unwrap();
                state.permits_held[approval.from] = true;
            }
        }
    }

    /// Leaves the CS and replies to every deferred requester, in FIFO order.
    pub fn release(&self) {
        {
            let mut state = self.state.lock().unwrap();
            state.in_cs_or_requesting = false;
        }

        let drained: Vec<Request> = {
            let mut deferred = self.deferred.lock().unwrap();
            deferred.drain(..).collect()
        };

        if self.variant == Variant::R2 && !drained.is_empty() {
            let mut state = self.state.lock().unwrap();
            for req in &drained {
                state.permits_held[req.origin] = false;
            }
        }

        for req in drained {
            self.fabric.send_approval(req.origin, Approval { from: self.id });
        }
    }

    /// Invoked by this node's receive loop for each arriving peer `Request`.
    /// Replies immediately or enqueues on the deferred queue.
    pub fn on_incoming_request(&self, req: Request) {
        let mut state = self.state.lock().unwrap();
        state.highest_seen = state.highest_seen.max(req.timestamp);

        let higher_priority =
            req.timestamp < state.my_turn || (req.timestamp == state.my_turn && req.origin < self.id);
        let approve_now = !state.in_cs_or_requesting || higher_priority;

        if approve_now {
            if self.variant == Variant::R2 {
                state.permits_held[req.origin] = false;
            }
            drop(state);
            self.fabric.send_approval(req.origin, Approval { from: self.id });
        } else {
            drop(state);
            self.deferred.lock().unwrap().push_back(req);
        }
    }

    /// Exposed for tests: whether `acquire` has returned and `release` has not
    /// yet been called.
    #[cfg(test)]
    pub fn is_in_cs_or_requesting(&self) -> bool {
        self.state.lock().unwrap().in_cs_or_requesting
    }

    #[cfg(test)]
    pub fn clock(&self) -> Timestamp {
        self.state.lock().unwrap().my_turn
    }

    #[cfg(test)]
    pub fn permit_held(&self, peer: NodeId) -> bool {
        self.state.lock().unwrap().permits_held[peer]
    }
}
