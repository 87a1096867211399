//! The ghost layer and ghost-data exchange: per-process lists of remote
//! elements that share a face with a local element, and the typed
//! scatter/gather of a user buffer laid out `[local ‖ ghost]`.

use t8_eclass::EClass;
use t8_mpi::ProcessGroup;

use crate::errors::ForestError;

/// One rank's ghost list: for each local ghost index, which rank owns it,
/// its element class, the global coarse tree it belongs to, and the index
/// into the owner's own local element array it mirrors.
#[derive(Default)]
pub struct GhostLayer {
    owner: Vec<i32>,
    class: Vec<EClass>,
    global_tree: Vec<u32>,
    owner_local_index: Vec<u32>,
}

impl GhostLayer {
    pub fn new() -> GhostLayer {
        GhostLayer::default()
    }

    /// Registers a remote element as a ghost, returning its local-ghost id.
    pub fn add_ghost(&mut self, owner: i32, class: EClass, global_tree: u32, owner_local_index: u32) -> u32 {
        self.owner.push(owner);
        self.class.push(class);
        self.global_tree.push(global_tree);
        self.owner_local_index.push(owner_local_index);
        (self.owner.len() - 1) as u32
    }

    pub fn num_ghosts(&self) -> u32 {
        self.owner.len() as u32
    }

    pub fn owner(&self, ghost: u32) -> i32 {
        self.owner[ghost as usize]
    }

    pub fn class(&self, ghost: u32) -> EClass {
        self.class[ghost as usize]
    }

    pub fn global_tree(&self, ghost: u32) -> u32 {
        self.global_tree[ghost as usize]
    }
}

/// `ghost_exchange`: fills `buf`'s ghost region (bytes
/// `[num_local*elem_size .. (num_local+num_ghost)*elem_size)`) with values
/// copied from the ranks that own each ghost. `buf`'s local region is only
/// read, never written. Collective: every rank in `pg` must call this with
/// the same `elem_size`.
///
/// Two exchange rounds: requests tagged with the requester's local ghost
/// id, then replies echoing that tag so responses can be placed correctly
/// regardless of arrival order.
pub fn ghost_exchange(pg: &dyn ProcessGroup, ghost: &GhostLayer, num_local: usize, elem_size: usize, buf: &mut [u8]) -> Result<(), ForestError> {
    let expected_len = (num_local + ghost.num_ghosts() as usize) * elem_size;
    if buf.len() != expected_len {
        return Err(ForestError::ContractViolation("ghost exchange buffer length does not match num_local+num_ghost"));
    }

    let mut requests: Vec<(i32, Vec<u8>)> = Vec::with_capacity(ghost.num_ghosts() as usize);
    for g in 0..ghost.num_ghosts() {
        let mut payload = Vec::with_capacity(8);
        payload.extend_from_slice(&g.to_le_bytes());
        payload.extend_from_slice(&ghost.owner_local_index[g as usize].to_le_bytes());
        requests.push((ghost.owner(g), payload));
    }

    let received_requests = pg.exchange(&requests)?;

    let mut replies: Vec<(i32, Vec<u8>)> = Vec::with_capacity(received_requests.len());
    for (src_rank, payload) in received_requests {
        let tag = u32::from_le_bytes(payload[0..4].try_into().unwrap());
        let local_index = u32::from_le_bytes(payload[4..8].try_into().unwrap()) as usize;
        let start = local_index * elem_size;
        let mut reply = Vec::with_capacity(4 + elem_size);
        reply.extend_from_slice(&tag.to_le_bytes());
        reply.extend_from_slice(&buf[start..start + elem_size]);
        replies.push((src_rank, reply));
    }

    let received_replies = pg.exchange(&replies)?;

    for (_owner_rank, payload) in received_replies {
        let tag = u32::from_le_bytes(payload[0..4].try_into().unwrap()) as usize;
        let data = &payload[4..4 + elem_size];
        let dst = (num_local + tag) * elem_size;
        buf[dst..dst + elem_size].copy_from_slice(data);
    }

    Ok(())
}
