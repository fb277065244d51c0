//! Shared value types for the mutual-exclusion bank simulator.

use std::fmt;

/// Stable identity of an account-node, also the tie-breaker for equal request timestamps.
pub type NodeId = usize;

/// Logical-clock timestamp. Not globally unique; ties broken by [`NodeId`].
pub type Timestamp = u64;

/// Which distributed mutual-exclusion protocol a node runs.
///
/// `R1` broadcasts to every peer and releases permission on exit (Ricart-Agrawala).
/// `R2` restricts peers to a static quorum and retains granted permits across CS
/// entries until revoked by a conflicting incoming request (Roucairol-Carvalho).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    R1,
    R2,
}

impl Variant {
    /// Resolves the protocol variant from the free-form CLI algorithm label.
    ///
    /// A label containing the case-insensitive substring `"optim"` selects `R2`;
    /// anything else selects `R1`.
    pub fn from_label(label: &str) -> Self {
        if label.to_lowercase().contains("optim") {
            Variant::R2
        } else {
            Variant::R1
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::R1 => write!(f, "R1 (Ricart-Agrawala)"),
            Variant::R2 => write!(f, "R2 (Roucairol-Carvalho)"),
        }
    }
}

/// A request for the critical section: `(timestamp, origin)`.
///
/// Ordered lexicographically by `(timestamp, origin)`; smaller is higher priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Request {
    pub timestamp: Timestamp,
    pub origin: NodeId,
}

impl Request {
    pub fn new(timestamp: Timestamp, origin: NodeId) -> Self {
        Self { timestamp, origin }
    }
}

/// An approval carries only the approving peer's id; a node has at most one
/// outstanding request at a time, so no further correlation is needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Approval {
    pub from: NodeId,
}

/// An immutable transfer instruction parsed from the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transaction {
    pub from: NodeId,
    pub to: NodeId,
    pub amount: i64,
    pub post_delay_ms: u64,
}
