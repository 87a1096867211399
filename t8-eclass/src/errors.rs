//! Error type for per-class refinement operations.

use std::error::Error;
use std::fmt;

use crate::registry::EClass;

/// Failure modes of a [`crate::scheme::Scheme`] implementation.
#[derive(Debug)]
pub enum SchemeError {
    /// Requested a child of a class that has none (`Vertex`).
    NoChildren(EClass),
    /// A child id was out of range for the class's `num_children()`.
    InvalidChildId { class: EClass, child_id: u8, num_children: u8 },
    /// A face index was out of range for the class's `num_faces()`.
    InvalidFace { class: EClass, face: u8, num_faces: u8 },
    /// Asked to refine past the scheme's configured `max_level`.
    MaxLevelExceeded { max_level: u8 },
    /// `is_family` was called on a slice whose length didn't match
    /// `num_children()` for the class.
    WrongFamilySize { class: EClass, expected: u8, found: usize },
}

impl fmt::Display for SchemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemeError::NoChildren(class) => write!(f, "class {class} has no children"),
            SchemeError::InvalidChildId { class, child_id, num_children } => write!(
                f,
                "child id {child_id} out of range for class {class} ({num_children} children)"
            ),
            SchemeError::InvalidFace { class, face, num_faces } => write!(
                f,
                "face {face} out of range for class {class} ({num_faces} faces)"
            ),
            SchemeError::MaxLevelExceeded { max_level } => {
                write!(f, "refinement would exceed max level {max_level}")
            }
            SchemeError::WrongFamilySize { class, expected, found } => write!(
                f,
                "family of class {class} must have {expected} members, found {found}"
            ),
        }
    }
}

impl Error for SchemeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_mention_the_class() {
        let e = SchemeError::NoChildren(EClass::Vertex);
        assert!(e.to_string().contains("vertex"));
    }
}
