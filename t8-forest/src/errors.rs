//! Error type for the forest lifecycle, adaptation engine, balance driver
//! and ghost exchange.

use std::error::Error;
use std::fmt;

use t8_cmesh::CmeshError;
use t8_eclass::SchemeError;
use t8_mpi::MpiError;

#[derive(Debug)]
pub enum ForestError {
    /// `commit` was called without a required base setter, or more than one
    /// of `{copy, adapt, partition, load}` was set.
    ContractViolation(&'static str),
    /// A setter was called on a forest after it was committed.
    AlreadyCommitted,
    /// `set_load` was composed; reading a persisted forest is a file-I/O
    /// concern this crate doesn't implement.
    LoadNotSupported,
    Cmesh(CmeshError),
    Scheme(SchemeError),
    Mpi(MpiError),
}

impl fmt::Display for ForestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForestError::ContractViolation(msg) => write!(f, "contract violation: {msg}"),
            ForestError::AlreadyCommitted => write!(f, "forest is already committed"),
            ForestError::LoadNotSupported => write!(f, "loading a persisted forest is not implemented"),
            ForestError::Cmesh(e) => write!(f, "cmesh error: {e}"),
            ForestError::Scheme(e) => write!(f, "scheme error: {e}"),
            ForestError::Mpi(e) => write!(f, "process group error: {e}"),
        }
    }
}

impl Error for ForestError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ForestError::Cmesh(e) => Some(e),
            ForestError::Scheme(e) => Some(e),
            ForestError::Mpi(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CmeshError> for ForestError {
    fn from(e: CmeshError) -> Self {
        ForestError::Cmesh(e)
    }
}

impl From<SchemeError> for ForestError {
    fn from(e: SchemeError) -> Self {
        ForestError::Scheme(e)
    }
}

impl From<MpiError> for ForestError {
    fn from(e: MpiError) -> Self {
        ForestError::Mpi(e)
    }
}
