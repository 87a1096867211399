//! The abstract message-passing interface the balance driver and ghost
//! exchange are written against: point-to-point `exchange` plus the two
//! collectives the core needs (§5 of the design — only collectives and the
//! ghost exchange suspend; everything else on a committed forest is
//! per-rank and non-blocking).

use crate::errors::MpiError;

/// One process's handle into a bulk-synchronous-parallel process group.
pub trait ProcessGroup {
    fn rank(&self) -> i32;
    fn size(&self) -> i32;

    /// Blocks until every rank in the group has called `barrier`.
    fn barrier(&self);

    /// Logical-AND reduction across every rank, used by the balance driver
    /// to detect a globally quiescent round.
    fn all_reduce_and(&self, local: bool) -> bool;

    /// Sum reduction across every rank, used for global element counts.
    fn all_reduce_sum_usize(&self, local: usize) -> usize;

    /// Collective point-to-point exchange: `sends` is this rank's outgoing
    /// `(destination_rank, payload)` pairs for this round; the return value
    /// is every `(source_rank, payload)` addressed to this rank by any
    /// participant, including itself, in arrival order. Every rank in the
    /// group must call `exchange` once per round. Carrying the source rank
    /// lets request/reply protocols (like the ghost-data exchange) route a
    /// reply back without a side channel.
    ///
    /// Fails with `MpiError::PeerUnreachable` if a destination rank's side
    /// of the transport is gone (e.g. its receiver was dropped).
    fn exchange(&self, sends: &[(i32, Vec<u8>)]) -> Result<Vec<(i32, Vec<u8>)>, MpiError>;
}
