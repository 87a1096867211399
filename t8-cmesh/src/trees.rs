//! The packed-storage engine: a per-owner byte-packed arena holding tree
//! records, ghost records, face-neighbor arrays and per-tree attribute
//! blocks, with offsets recomputed from scratch by `finish` so that two
//! parts built from identical inputs are byte-identical.

use hashbrown::HashMap;

use t8_eclass::EClass;

use crate::errors::CmeshError;
use crate::layout::*;

/// A tree record's face-neighbor entry: the neighboring local-tree index
/// (or `self` for a boundary face) and its *ttf* byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TreeFace {
    pub neighbor: u32,
    pub ttf: u8,
}

/// A ghost record's face-neighbor entry: the neighboring **global**-tree
/// index and its *ttf* byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GhostFace {
    pub neighbor_global: u32,
    pub ttf: u8,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TreeView {
    pub class: EClass,
    pub num_attributes: u16,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GhostView {
    pub class: EClass,
    pub global_tree: u32,
}

/// One owning-process rank's slice of the coarse mesh: its trees, its
/// ghosts, and the packed byte buffer backing both.
pub struct Part {
    pub proc: i32,
    pub first_tree: u32,
    pub num_trees: u32,
    pub first_ghost: u32,
    pub num_ghosts: u32,

    buffer: Vec<u8>,
    tree_populated: Vec<bool>,
    ghost_populated: Vec<bool>,

    attr_counts: Vec<u16>,
    attr_total_bytes: Vec<u32>,
    attr_next_index: Vec<u16>,
    attr_blob_cursor: Vec<u32>,
    attr_last_key: Vec<Option<(u32, u32)>>,

    faces_base: usize,
    attrs_base: usize,
    finished: bool,
}

fn records_base() -> usize {
    0
}

impl Part {
    /// `start_part`: records counts and allocates the zero-initialized
    /// tree/ghost record area.
    pub fn start(proc: i32, first_tree: u32, num_trees: u32, first_ghost: u32, num_ghosts: u32) -> Part {
        let nt = num_trees as usize;
        let ng = num_ghosts as usize;
        let record_bytes = nt * TREE_RECORD_SIZE + ng * GHOST_RECORD_SIZE;
        Part {
            proc,
            first_tree,
            num_trees,
            first_ghost,
            num_ghosts,
            buffer: vec![0u8; record_bytes],
            tree_populated: vec![false; nt],
            ghost_populated: vec![false; ng],
            attr_counts: vec![0u16; nt],
            attr_total_bytes: vec![0u32; nt],
            attr_next_index: vec![0u16; nt],
            attr_blob_cursor: vec![0u32; nt],
            attr_last_key: vec![None; nt],
            faces_base: record_bytes,
            attrs_base: record_bytes,
            finished: false,
        }
    }

    fn tree_record_pos(&self, local: u32) -> usize {
        records_base() + local as usize * TREE_RECORD_SIZE
    }

    fn ghost_record_pos(&self, local_ghost: u32) -> usize {
        records_base() + self.num_trees as usize * TREE_RECORD_SIZE + local_ghost as usize * GHOST_RECORD_SIZE
    }

    fn check_tree_index(&self, local: u32) -> Result<(), CmeshError> {
        if local >= self.num_trees {
            return Err(CmeshError::IndexOutOfRange { what: "local tree", index: local, bound: self.num_trees });
        }
        Ok(())
    }

    fn check_ghost_index(&self, local_ghost: u32) -> Result<(), CmeshError> {
        if local_ghost >= self.num_ghosts {
            return Err(CmeshError::IndexOutOfRange { what: "local ghost", index: local_ghost, bound: self.num_ghosts });
        }
        Ok(())
    }

    /// `add_tree`: fills class into the preallocated slot; the slot must
    /// not already be populated.
    pub fn add_tree(&mut self, local: u32, class: EClass) -> Result<(), CmeshError> {
        self.check_tree_index(local)?;
        let idx = local as usize;
        if self.tree_populated[idx] {
            return Err(CmeshError::SlotAlreadyPopulated { local, is_ghost: false });
        }
        let pos = self.tree_record_pos(local);
        write_u8(&mut self.buffer, pos, class.index() as u8);
        self.tree_populated[idx] = true;
        Ok(())
    }

    /// `add_ghost`: fills class and global-tree id into the preallocated
    /// slot.
    pub fn add_ghost(&mut self, local_ghost: u32, global_tree: u32, class: EClass) -> Result<(), CmeshError> {
        self.check_ghost_index(local_ghost)?;
        let idx = local_ghost as usize;
        if self.ghost_populated[idx] {
            return Err(CmeshError::SlotAlreadyPopulated { local: local_ghost, is_ghost: true });
        }
        let pos = self.ghost_record_pos(local_ghost);
        write_u8(&mut self.buffer, pos, class.index() as u8);
        write_u32(&mut self.buffer, pos + 4, global_tree);
        self.ghost_populated[idx] = true;
        Ok(())
    }

    /// `init_attributes`: stashes the attribute count and total byte size
    /// for a tree, consumed by `finish`.
    pub fn init_attributes(&mut self, local: u32, count: u16, total_bytes: u32) -> Result<(), CmeshError> {
        self.check_tree_index(local)?;
        self.attr_counts[local as usize] = count;
        self.attr_total_bytes[local as usize] = total_bytes;
        Ok(())
    }

    fn tree_class(&self, local: u32) -> EClass {
        let pos = self.tree_record_pos(local);
        EClass::from_index(read_u8(&self.buffer, pos) as usize).expect("tree record holds a valid class byte")
    }

    fn ghost_class(&self, local_ghost: u32) -> EClass {
        let pos = self.ghost_record_pos(local_ghost);
        EClass::from_index(read_u8(&self.buffer, pos) as usize).expect("ghost record holds a valid class byte")
    }

    /// `finish_part`: the two-pass layout. Pass A sizes and places the
    /// face-neighbor area (ghosts, then trees); pass B sizes and places the
    /// attribute-info area and the attribute blob area.
    pub fn finish(&mut self) -> Result<(), CmeshError> {
        if self.finished {
            return Err(CmeshError::PartAlreadyFinished);
        }

        let faces_base = self.buffer.len();
        let mut running = 0usize;
        let mut ghost_face_offset = vec![0i32; self.num_ghosts as usize];
        for g in 0..self.num_ghosts {
            let pos = self.ghost_record_pos(g);
            let offset = faces_base + running;
            ghost_face_offset[g as usize] = offset as i32 - pos as i32;
            let n_faces = self.ghost_class(g).num_faces() as usize;
            running += align_up(n_faces * FACE_SLOT_SIZE);
        }
        let mut tree_face_offset = vec![0i32; self.num_trees as usize];
        for t in 0..self.num_trees {
            let pos = self.tree_record_pos(t);
            let offset = faces_base + running;
            tree_face_offset[t as usize] = offset as i32 - pos as i32;
            let n_faces = self.tree_class(t).num_faces() as usize;
            running += align_up(n_faces * FACE_SLOT_SIZE);
        }
        let faces_total = running;
        let attrs_base = faces_base + faces_total;

        let total_attr_infos: u32 = self.attr_counts.iter().map(|&c| c as u32).sum();
        let blob_base = attrs_base + total_attr_infos as usize * ATTR_INFO_SIZE;

        let mut tree_attr_offset = vec![0i32; self.num_trees as usize];
        let mut running_num_attr: u32 = 0;
        let mut blob_cursor_for_tree = vec![0u32; self.num_trees as usize];
        let mut running_blob = blob_base as u32;
        for t in 0..self.num_trees {
            let idx = t as usize;
            let pos = self.tree_record_pos(t);
            let info_pos = attrs_base + running_num_attr as usize * ATTR_INFO_SIZE;
            tree_attr_offset[idx] = info_pos as i32 - pos as i32;
            running_num_attr += self.attr_counts[idx] as u32;
            blob_cursor_for_tree[idx] = running_blob;
            running_blob += self.attr_total_bytes[idx];
        }
        let total_size = running_blob as usize;

        self.buffer.resize(total_size, 0u8);

        for g in 0..self.num_ghosts as usize {
            let pos = self.ghost_record_pos(g as u32);
            write_i32(&mut self.buffer, pos + 8, ghost_face_offset[g]);
            // default every face to a self-loop boundary, matching
            // `set_all_boundary`; callers overwrite real connectivity later.
            let abs = (pos as i32 + ghost_face_offset[g]) as usize;
            for f in 0..self.ghost_class(g as u32).num_faces() {
                let slot = abs + f as usize * FACE_SLOT_SIZE;
                write_u32(&mut self.buffer, slot, g as u32);
                write_u8(&mut self.buffer, slot + 4, 0);
            }
        }
        for t in 0..self.num_trees as usize {
            let pos = self.tree_record_pos(t as u32);
            write_i32(&mut self.buffer, pos + 4, tree_face_offset[t]);
            write_i32(&mut self.buffer, pos + 8, tree_attr_offset[t]);
            write_u16(&mut self.buffer, pos + 2, self.attr_counts[t]);
            let abs = (pos as i32 + tree_face_offset[t]) as usize;
            for f in 0..self.tree_class(t as u32).num_faces() {
                let slot = abs + f as usize * FACE_SLOT_SIZE;
                write_u32(&mut self.buffer, slot, t as u32);
                write_u8(&mut self.buffer, slot + 4, 0);
            }
        }

        self.attr_next_index = vec![0u16; self.num_trees as usize];
        self.attr_blob_cursor = blob_cursor_for_tree;
        self.attr_last_key = vec![None; self.num_trees as usize];
        self.faces_base = faces_base;
        self.attrs_base = attrs_base;
        self.finished = true;
        Ok(())
    }

    /// `add_attribute`: writes the `i`-th attribute's bytes into the blob
    /// area and records its `(package_id, key, size)` in the tree's
    /// attribute-info array. Attributes for one tree must be added in
    /// ascending `(package_id, key)` order so `get_attribute` can
    /// binary-search.
    pub fn add_attribute(&mut self, local: u32, i: u16, package_id: u32, key: u32, bytes: &[u8]) -> Result<(), CmeshError> {
        if !self.finished {
            return Err(CmeshError::PartNotFinished);
        }
        self.check_tree_index(local)?;
        let idx = local as usize;
        let count = self.attr_counts[idx];
        if i != self.attr_next_index[idx] || i >= count {
            return Err(CmeshError::AttributeIndexOutOfRange { local, index: i, count });
        }
        if let Some(last) = self.attr_last_key[idx] {
            if (package_id, key) <= last {
                return Err(CmeshError::AttributesNotSorted { local });
            }
        }

        let pos = self.tree_record_pos(local);
        let info_base = (pos as i32 + read_i32(&self.buffer, pos + 8)) as usize;
        let info_pos = info_base + i as usize * ATTR_INFO_SIZE;

        let blob_pos = self.attr_blob_cursor[idx] as usize;
        self.buffer[blob_pos..blob_pos + bytes.len()].copy_from_slice(bytes);

        write_u32(&mut self.buffer, info_pos, package_id);
        write_u32(&mut self.buffer, info_pos + 4, key);
        write_u32(&mut self.buffer, info_pos + 8, bytes.len() as u32);
        write_i32(&mut self.buffer, info_pos + 12, blob_pos as i32 - pos as i32);

        self.attr_blob_cursor[idx] += bytes.len() as u32;
        self.attr_next_index[idx] += 1;
        self.attr_last_key[idx] = Some((package_id, key));
        Ok(())
    }

    pub fn get_tree(&self, local: u32) -> Result<TreeView, CmeshError> {
        self.check_tree_index(local)?;
        let pos = self.tree_record_pos(local);
        Ok(TreeView {
            class: self.tree_class(local),
            num_attributes: read_u16(&self.buffer, pos + 2),
        })
    }

    pub fn get_tree_faces(&self, local: u32) -> Result<Vec<TreeFace>, CmeshError> {
        if !self.finished {
            return Err(CmeshError::PartNotFinished);
        }
        self.check_tree_index(local)?;
        let pos = self.tree_record_pos(local);
        let abs = (pos as i32 + read_i32(&self.buffer, pos + 4)) as usize;
        let n = self.tree_class(local).num_faces();
        Ok((0..n)
            .map(|f| {
                let slot = abs + f as usize * FACE_SLOT_SIZE;
                TreeFace { neighbor: read_u32(&self.buffer, slot), ttf: read_u8(&self.buffer, slot + 4) }
            })
            .collect())
    }

    pub fn set_tree_face(&mut self, local: u32, face: u8, neighbor: u32, ttf: u8) -> Result<(), CmeshError> {
        if !self.finished {
            return Err(CmeshError::PartNotFinished);
        }
        self.check_tree_index(local)?;
        let n = self.tree_class(local).num_faces();
        if face >= n {
            return Err(CmeshError::IndexOutOfRange { what: "face", index: face as u32, bound: n as u32 });
        }
        let pos = self.tree_record_pos(local);
        let abs = (pos as i32 + read_i32(&self.buffer, pos + 4)) as usize;
        let slot = abs + face as usize * FACE_SLOT_SIZE;
        write_u32(&mut self.buffer, slot, neighbor);
        write_u8(&mut self.buffer, slot + 4, ttf);
        Ok(())
    }

    pub fn get_ghost(&self, local_ghost: u32) -> Result<GhostView, CmeshError> {
        self.check_ghost_index(local_ghost)?;
        let pos = self.ghost_record_pos(local_ghost);
        Ok(GhostView { class: self.ghost_class(local_ghost), global_tree: read_u32(&self.buffer, pos + 4) })
    }

    pub fn get_ghost_faces(&self, local_ghost: u32) -> Result<Vec<GhostFace>, CmeshError> {
        if !self.finished {
            return Err(CmeshError::PartNotFinished);
        }
        self.check_ghost_index(local_ghost)?;
        let pos = self.ghost_record_pos(local_ghost);
        let abs = (pos as i32 + read_i32(&self.buffer, pos + 8)) as usize;
        let n = self.ghost_class(local_ghost).num_faces();
        Ok((0..n)
            .map(|f| {
                let slot = abs + f as usize * FACE_SLOT_SIZE;
                GhostFace { neighbor_global: read_u32(&self.buffer, slot), ttf: read_u8(&self.buffer, slot + 4) }
            })
            .collect())
    }

    pub fn set_ghost_face(&mut self, local_ghost: u32, face: u8, neighbor_global: u32, ttf: u8) -> Result<(), CmeshError> {
        if !self.finished {
            return Err(CmeshError::PartNotFinished);
        }
        self.check_ghost_index(local_ghost)?;
        let n = self.ghost_class(local_ghost).num_faces();
        if face >= n {
            return Err(CmeshError::IndexOutOfRange { what: "face", index: face as u32, bound: n as u32 });
        }
        let pos = self.ghost_record_pos(local_ghost);
        let abs = (pos as i32 + read_i32(&self.buffer, pos + 8)) as usize;
        let slot = abs + face as usize * FACE_SLOT_SIZE;
        write_u32(&mut self.buffer, slot, neighbor_global);
        write_u8(&mut self.buffer, slot + 4, ttf);
        Ok(())
    }

    /// Binary-searches the tree's attribute-info array by `(package_id, key)`.
    pub fn get_attribute(&self, local: u32, package_id: u32, key: u32) -> Result<Option<&[u8]>, CmeshError> {
        if !self.finished {
            return Err(CmeshError::PartNotFinished);
        }
        self.check_tree_index(local)?;
        let idx = local as usize;
        let count = self.attr_counts[idx] as usize;
        let pos = self.tree_record_pos(local);
        let info_base = (pos as i32 + read_i32(&self.buffer, pos + 8)) as usize;

        let found = (0..count).collect::<Vec<_>>().binary_search_by(|&i| {
            let info_pos = info_base + i * ATTR_INFO_SIZE;
            let pid = read_u32(&self.buffer, info_pos);
            let k = read_u32(&self.buffer, info_pos + 4);
            (pid, k).cmp(&(package_id, key))
        });
        match found {
            Ok(i) => {
                let info_pos = info_base + i * ATTR_INFO_SIZE;
                let size = read_u32(&self.buffer, info_pos + 8) as usize;
                let rel = read_i32(&self.buffer, info_pos + 12);
                let abs = (pos as i32 + rel) as usize;
                Ok(Some(&self.buffer[abs..abs + size]))
            }
            Err(_) => Ok(None),
        }
    }

    /// Total byte size of this part's buffer, the per-part contribution to
    /// `trees_size`.
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl PartialEq for Part {
    fn eq(&self, other: &Self) -> bool {
        self.proc == other.proc
            && self.first_tree == other.first_tree
            && self.num_trees == other.num_trees
            && self.first_ghost == other.first_ghost
            && self.num_ghosts == other.num_ghosts
            && self.buffer == other.buffer
    }
}

/// Duplicates a finished part's byte buffer, used by `partition`/`copy` to
/// produce an identical part under a new owner.
pub fn copy_part(part: &Part) -> Part {
    Part {
        proc: part.proc,
        first_tree: part.first_tree,
        num_trees: part.num_trees,
        first_ghost: part.first_ghost,
        num_ghosts: part.num_ghosts,
        buffer: part.buffer.clone(),
        tree_populated: part.tree_populated.clone(),
        ghost_populated: part.ghost_populated.clone(),
        attr_counts: part.attr_counts.clone(),
        attr_total_bytes: part.attr_total_bytes.clone(),
        attr_next_index: part.attr_next_index.clone(),
        attr_blob_cursor: part.attr_blob_cursor.clone(),
        attr_last_key: part.attr_last_key.clone(),
        faces_base: part.faces_base,
        attrs_base: part.attrs_base,
        finished: part.finished,
    }
}

/// The distributed coarse-mesh storage: every part plus the two dense
/// ownership tables mapping a local-tree/ghost index to its owning rank.
pub struct Trees {
    pub parts: Vec<Part>,
    pub tree_to_proc: Vec<u32>,
    pub ghost_to_proc: Vec<u32>,
    /// Caches which `parts` entry owns a given local tree/ghost index, so
    /// lookups on a coarse mesh with many parts don't rescan the part list.
    tree_part_index: HashMap<u32, usize>,
    ghost_part_index: HashMap<u32, usize>,
}

impl Trees {
    /// `init`: creates the parts vector and the zero-initialized ownership
    /// tables.
    pub fn init(num_procs: u32, num_trees: u32, num_ghosts: u32) -> Trees {
        Trees {
            parts: Vec::with_capacity(num_procs as usize),
            tree_to_proc: vec![0u32; num_trees as usize],
            ghost_to_proc: vec![0u32; num_ghosts as usize],
            tree_part_index: HashMap::new(),
            ghost_part_index: HashMap::new(),
        }
    }

    pub fn start_part(&mut self, proc: i32, first_tree: u32, n_trees: u32, first_ghost: u32, n_ghosts: u32) -> usize {
        for l in first_tree..first_tree + n_trees {
            self.tree_to_proc[l as usize] = proc as u32;
        }
        for g in first_ghost..first_ghost + n_ghosts {
            self.ghost_to_proc[g as usize] = proc as u32;
        }
        let part_index = self.parts.len();
        for l in first_tree..first_tree + n_trees {
            self.tree_part_index.insert(l, part_index);
        }
        for g in first_ghost..first_ghost + n_ghosts {
            self.ghost_part_index.insert(g, part_index);
        }
        self.parts.push(Part::start(proc, first_tree, n_trees, first_ghost, n_ghosts));
        part_index
    }

    fn part_for_tree(&self, global_local: u32) -> Result<&Part, CmeshError> {
        self.tree_part_index
            .get(&global_local)
            .map(|&idx| &self.parts[idx])
            .ok_or(CmeshError::IndexOutOfRange { what: "local tree", index: global_local, bound: self.tree_to_proc.len() as u32 })
    }

    fn part_for_ghost(&self, global_local_ghost: u32) -> Result<&Part, CmeshError> {
        self.ghost_part_index.get(&global_local_ghost).map(|&idx| &self.parts[idx]).ok_or(
            CmeshError::IndexOutOfRange {
                what: "local ghost",
                index: global_local_ghost,
                bound: self.ghost_to_proc.len() as u32,
            },
        )
    }

    /// `get_tree`: looks up a tree record by its index within the rank that
    /// owns it.
    pub fn get_tree(&self, local: u32) -> Result<TreeView, CmeshError> {
        let part = self.part_for_tree(local)?;
        part.get_tree(local - part.first_tree)
    }

    pub fn get_tree_ext(&self, local: u32) -> Result<(TreeView, Vec<TreeFace>), CmeshError> {
        let part = self.part_for_tree(local)?;
        let rel = local - part.first_tree;
        Ok((part.get_tree(rel)?, part.get_tree_faces(rel)?))
    }

    pub fn get_ghost(&self, local_ghost: u32) -> Result<GhostView, CmeshError> {
        let part = self.part_for_ghost(local_ghost)?;
        part.get_ghost(local_ghost - part.first_ghost)
    }

    pub fn get_ghost_ext(&self, local_ghost: u32) -> Result<(GhostView, Vec<GhostFace>), CmeshError> {
        let part = self.part_for_ghost(local_ghost)?;
        let rel = local_ghost - part.first_ghost;
        Ok((part.get_ghost(rel)?, part.get_ghost_faces(rel)?))
    }

    pub fn get_attribute(&self, local: u32, package_id: u32, key: u32) -> Result<Option<&[u8]>, CmeshError> {
        let part = self.part_for_tree(local)?;
        part.get_attribute(local - part.first_tree, package_id, key)
    }

    /// `trees_size`: the total byte size of every part's buffer.
    pub fn trees_size(&self) -> usize {
        self.parts.iter().map(Part::size).sum()
    }
}

impl PartialEq for Trees {
    fn eq(&self, other: &Self) -> bool {
        self.tree_to_proc == other.tree_to_proc && self.ghost_to_proc == other.ghost_to_proc && self.parts == other.parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use t8_eclass::EClass;

    fn two_quads() -> Part {
        let mut part = Part::start(0, 0, 2, 0, 0);
        part.add_tree(0, EClass::Quad).unwrap();
        part.add_tree(1, EClass::Quad).unwrap();
        part.finish().unwrap();
        part
    }

    #[test]
    fn duplicate_population_is_rejected() {
        let mut part = Part::start(0, 0, 1, 0, 0);
        part.add_tree(0, EClass::Quad).unwrap();
        assert!(matches!(part.add_tree(0, EClass::Quad), Err(CmeshError::SlotAlreadyPopulated { .. })));
    }

    #[test]
    fn identical_construction_is_byte_identical() {
        let a = two_quads();
        let b = two_quads();
        assert_eq!(a, b);
    }

    #[test]
    fn face_defaults_are_self_loop_boundary() {
        let part = two_quads();
        let faces = part.get_tree_faces(0).unwrap();
        assert_eq!(faces.len(), 4);
        for f in faces {
            assert_eq!(f.neighbor, 0);
            assert_eq!(f.ttf, 0);
        }
    }

    #[test]
    fn attribute_round_trip() {
        let mut part = Part::start(0, 0, 1, 0, 0);
        part.add_tree(0, EClass::Triangle).unwrap();
        part.init_attributes(0, 3, 3 + 2 + 1).unwrap();
        part.finish().unwrap();

        // must be added in sorted (package_id, key) order
        part.add_attribute(0, 0, 2, 99, b"X").unwrap();
        part.add_attribute(0, 1, 17, 1, b"de").unwrap();
        part.add_attribute(0, 2, 17, 3, b"abc").unwrap();

        assert_eq!(part.get_attribute(0, 17, 3).unwrap(), Some(&b"abc"[..]));
        assert_eq!(part.get_attribute(0, 17, 1).unwrap(), Some(&b"de"[..]));
        assert_eq!(part.get_attribute(0, 2, 99).unwrap(), Some(&b"X"[..]));
        assert_eq!(part.get_attribute(0, 1, 1).unwrap(), None);
    }

    #[test]
    fn attributes_out_of_order_are_rejected() {
        let mut part = Part::start(0, 0, 1, 0, 0);
        part.add_tree(0, EClass::Triangle).unwrap();
        part.init_attributes(0, 2, 4).unwrap();
        part.finish().unwrap();
        part.add_attribute(0, 0, 17, 3, b"abc").unwrap();
        assert!(matches!(
            part.add_attribute(0, 1, 17, 1, b"de"),
            Err(CmeshError::AttributesNotSorted { .. })
        ));
    }

    #[test]
    fn copy_part_is_byte_equal() {
        let part = two_quads();
        let copy = copy_part(&part);
        assert_eq!(part, copy);
    }

    #[test]
    fn trees_size_sums_parts() {
        let mut trees = Trees::init(1, 2, 0);
        trees.start_part(0, 0, 2, 0, 0);
        let part = &mut trees.parts[0];
        part.add_tree(0, EClass::Quad).unwrap();
        part.add_tree(1, EClass::Quad).unwrap();
        part.finish().unwrap();
        assert_eq!(trees.trees_size(), part.size());
    }

    #[test]
    fn trees_lookup_resolves_owning_part() {
        let mut trees = Trees::init(1, 2, 1);
        trees.start_part(0, 0, 2, 0, 1);
        {
            let part = &mut trees.parts[0];
            part.add_tree(0, EClass::Quad).unwrap();
            part.add_tree(1, EClass::Quad).unwrap();
            part.add_ghost(0, 7, EClass::Quad).unwrap();
            part.finish().unwrap();
        }
        assert_eq!(trees.get_tree(1).unwrap().class, EClass::Quad);
        assert_eq!(trees.get_ghost(0).unwrap().global_tree, 7);
    }
}
