//! Fixed-size record shapes for the per-part packed byte buffer, and the
//! little-endian encode/decode helpers the rest of the crate builds on.
//!
//! Record layout (all offsets little-endian, 4-byte aligned):
//! - **Tree record** (12 bytes): `class: u8`, pad `u8`, `num_attributes: u16`,
//!   `face_neighbor_offset: i32`, `attribute_offset: i32`.
//! - **Ghost record** (12 bytes): `class: u8`, pad `u8`×3, `global_tree: u32`,
//!   `face_neighbor_offset: i32`.
//! - **Face-neighbor slot** (5 bytes): `neighbor: u32`, `ttf: u8`.
//! - **Attribute-info entry** (16 bytes): `package_id: u32`, `key: u32`,
//!   `size: u32`, `attribute_offset: i32`.

pub const TREE_RECORD_SIZE: usize = 12;
pub const GHOST_RECORD_SIZE: usize = 12;
pub const FACE_SLOT_SIZE: usize = 5;
pub const ATTR_INFO_SIZE: usize = 16;
pub const ALIGN: usize = 4;

pub fn align_up(n: usize) -> usize {
    (n + ALIGN - 1) / ALIGN * ALIGN
}

pub fn write_u8(buf: &mut [u8], at: usize, v: u8) {
    buf[at] = v;
}
pub fn read_u8(buf: &[u8], at: usize) -> u8 {
    buf[at]
}

pub fn write_u16(buf: &mut [u8], at: usize, v: u16) {
    buf[at..at + 2].copy_from_slice(&v.to_le_bytes());
}
pub fn read_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes(buf[at..at + 2].try_into().unwrap())
}

pub fn write_u32(buf: &mut [u8], at: usize, v: u32) {
    buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
}
pub fn read_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(buf[at..at + 4].try_into().unwrap())
}

pub fn write_i32(buf: &mut [u8], at: usize, v: i32) {
    buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
}
pub fn read_i32(buf: &[u8], at: usize) -> i32 {
    i32::from_le_bytes(buf[at..at + 4].try_into().unwrap())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_four() {
        assert_eq!(align_up(0), 0);
        assert_eq!(align_up(1), 4);
        assert_eq!(align_up(4), 4);
        assert_eq!(align_up(5), 8);
    }

    #[test]
    fn u32_round_trips() {
        let mut buf = [0u8; 8];
        write_u32(&mut buf, 2, 0xdead_beef);
        assert_eq!(read_u32(&buf, 2), 0xdead_beef);
    }

    #[test]
    fn i32_round_trips_negative() {
        let mut buf = [0u8; 8];
        write_i32(&mut buf, 0, -42);
        assert_eq!(read_i32(&buf, 0), -42);
    }
}
