//! Error type for the packed-storage and face-connectivity engines.

use std::error::Error;
use std::fmt;

use t8_eclass::SchemeError;

#[derive(Debug)]
pub enum CmeshError {
    /// A tree or ghost slot was populated twice.
    SlotAlreadyPopulated { local: u32, is_ghost: bool },
    /// A local-tree, local-ghost or face index fell outside its part's range.
    IndexOutOfRange { what: &'static str, index: u32, bound: u32 },
    /// `add_attribute` called before `init_attributes`, or with an index
    /// past the count passed to it.
    AttributeIndexOutOfRange { local: u32, index: u16, count: u16 },
    /// Attributes for a tree must be added in ascending `(package_id, key)`
    /// order so lookup can binary-search; a caller broke that order.
    AttributesNotSorted { local: u32 },
    /// `finish_part` was called twice, or a mutator was called after it.
    PartAlreadyFinished,
    /// A lookup or mutation was attempted before `finish_part`.
    PartNotFinished,
    /// `commit` was called without a required setter (cmesh/scheme), or a
    /// setter was called after commit.
    ContractViolation(&'static str),
    Scheme(SchemeError),
}

impl fmt::Display for CmeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CmeshError::SlotAlreadyPopulated { local, is_ghost } => {
                let kind = if *is_ghost { "ghost" } else { "tree" };
                write!(f, "{kind} slot {local} was already populated")
            }
            CmeshError::IndexOutOfRange { what, index, bound } => {
                write!(f, "{what} index {index} out of range (bound {bound})")
            }
            CmeshError::AttributeIndexOutOfRange { local, index, count } => write!(
                f,
                "attribute index {index} out of range for tree {local} ({count} attributes declared)"
            ),
            CmeshError::AttributesNotSorted { local } => {
                write!(f, "attributes for tree {local} must be added in sorted (package_id, key) order")
            }
            CmeshError::PartAlreadyFinished => write!(f, "part was already finished"),
            CmeshError::PartNotFinished => write!(f, "part has not been finished yet"),
            CmeshError::ContractViolation(msg) => write!(f, "contract violation: {msg}"),
            CmeshError::Scheme(e) => write!(f, "scheme error: {e}"),
        }
    }
}

impl Error for CmeshError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CmeshError::Scheme(e) => Some(e),
            _ => None,
        }
    }
}

impl From<SchemeError> for CmeshError {
    fn from(e: SchemeError) -> Self {
        CmeshError::Scheme(e)
    }
}
