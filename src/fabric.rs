//! Point-to-point message fabric connecting node threads.
//!
//! Each node gets one `Request` channel and one `Approval` channel. Both are
//! zero-capacity `sync_channel`s: `send` blocks until the peer's receive loop
//! accepts, giving rendezvous semantics and per-pair FIFO delivery for free.

use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::sync::Arc;

use crate::metrics::Metrics;
use crate::types::{Approval, NodeId, Request};

pub struct Fabric {
    req_out: Vec<SyncSender<Request>>,
    app_out: Vec<SyncSender<Approval>>,
    metrics: Arc<Metrics>,
}

impl Fabric {
    /// Builds the fabric for `n` nodes, returning it alongside the receive ends
    /// each node's receive loop owns: `(req_in[i], app_in[i])` for node `i`.
    pub fn new(n: usize, metrics: Arc<Metrics>) -> (Arc<Fabric>, Vec<(Receiver<Request>, Receiver<Approval>)>) {
        let mut req_out = Vec::with_capacity(n);
        let mut app_out = Vec::with_capacity(n);
        let mut inboxes = Vec::with_capacity(n);

        for _ in 0..n {
            let (req_tx, req_rx) = sync_channel(0);
            let (app_tx, app_rx) = sync_channel(0);
            req_out.push(req_tx);
            app_out.push(app_tx);
            inboxes.push((req_rx, app_rx));
        }

        (Arc::new(Fabric { req_out, app_out, metrics }), inboxes)
    }

    /// Sends a `Request` to `to`, blocking until its receive loop accepts it,
    /// and counts it toward the process-wide requests-sent total.
    pub fn send_request(&self, to: NodeId, req: Request) {
        // A disconnected receiver means that node's thread has already exited;
        // in a fault-free run (the only model this simulator supports) that
        // cannot happen before every worker has finished, so a send error here
        // would indicate a logic bug rather than a condition to recover from.
        self.req_out[to].send(req).expect("peer request channel closed unexpectedly");
        self.metrics.requests_sent.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    }

    /// Sends an `Approval` to `to`, blocking until its receive loop accepts it,
    /// and counts it toward the process-wide approvals-sent total.
    pub fn send_approval(&self, to: NodeId, approval: Approval) {
        self.app_out[to].send(approval).expect("peer approval channel closed unexpectedly");
        self.metrics.approvals_sent.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn request_is_delivered_to_the_right_inbox() {
        let metrics = Arc::new(Metrics::new());
        let (fabric, mut inboxes) = Fabric::new(2, metrics.clone());
        let (req_rx, _app_rx) = inboxes.remove(1);

        let f = fabric.clone();
        let sender = thread::spawn(move || f.send_request(1, Request::new(5, 0)));

        let received = req_rx.recv().unwrap();
        sender.join().unwrap();

        assert_eq!(received, Request::new(5, 0));
        assert_eq!(metrics.requests_sent.load(std::sync::atomic::Ordering::Relaxed), 1);
    }

    #[test]
    fn approval_counter_increments_once_per_send() {
        let metrics = Arc::new(Metrics::new());
        let (fabric, mut inboxes) = Fabric::new(2, metrics.clone());
        let (_req_rx, app_rx) = inboxes.remove(0);

        let f = fabric.clone();
        let sender = thread::spawn(move || f.send_approval(0, Approval { from: 1 }));

        let received = app_rx.recv().unwrap();
        sender.join().unwrap();

        assert_eq!(received.from, 1);
        assert_eq!(metrics.approvals_sent.load(std::sync::atomic::Ordering::Relaxed), 1);
    }
}
