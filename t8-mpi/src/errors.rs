//! Error type for process-group operations.

use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum MpiError {
    RankOutOfRange { rank: i32, size: i32 },
    PeerUnreachable { rank: i32 },
}

impl fmt::Display for MpiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MpiError::RankOutOfRange { rank, size } => write!(f, "rank {rank} out of range for group of size {size}"),
            MpiError::PeerUnreachable { rank } => write!(f, "peer rank {rank} is unreachable"),
        }
    }
}

impl Error for MpiError {}
