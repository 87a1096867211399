//! Tree-to-face encoding: a single byte packing a neighbor's face index and
//! the relative orientation of the shared facet, `ttf = orient * F + face`.

/// A decoded tree-to-face byte.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Ttf {
    pub face: u8,
    pub orient: u8,
}

impl Ttf {
    /// Packs `face`/`orient` given `f_max`, the max faces per dimension
    /// (`registry::max_faces_per_dimension`) of the classes sharing this
    /// connection. `face` must be `< f_max`.
    pub fn encode(face: u8, orient: u8, f_max: u8) -> u8 {
        debug_assert!(face < f_max, "face index {face} out of range for f_max {f_max}");
        orient * f_max + face
    }

    /// Unpacks a raw ttf byte given the same `f_max` used to encode it.
    pub fn decode(raw: u8, f_max: u8) -> Ttf {
        Ttf {
            face: raw % f_max,
            orient: raw / f_max,
        }
    }

    pub fn as_byte(self, f_max: u8) -> u8 {
        Ttf::encode(self.face, self.orient, f_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_face_orient_pair() {
        for f_max in [1u8, 2, 4, 6] {
            for face in 0..f_max {
                for orient in 0..f_max.max(1) {
                    let raw = Ttf::encode(face, orient, f_max);
                    let decoded = Ttf::decode(raw, f_max);
                    assert_eq!(decoded, Ttf { face, orient }, "f_max={f_max} face={face} orient={orient}");
                }
            }
        }
    }

    #[test]
    fn zero_orient_is_identity_on_face() {
        for f_max in [2u8, 4, 6] {
            for face in 0..f_max {
                assert_eq!(Ttf::decode(face, f_max), Ttf { face, orient: 0 });
            }
        }
    }

    #[test]
    fn distinct_pairs_give_distinct_bytes() {
        let f_max = 4u8;
        let mut seen = std::collections::HashSet::new();
        for orient in 0..f_max {
            for face in 0..f_max {
                let raw = Ttf::encode(face, orient, f_max);
                assert!(seen.insert(raw), "duplicate byte {raw} for face={face} orient={orient}");
            }
        }
    }
}
