pub mod adapt;
pub mod balance;
pub mod errors;
pub mod forest;
pub mod ghost;

pub use adapt::{AdaptPass, Predicate, Replace};
pub use balance::{balance_trees, is_balanced, NeighborProbe};
pub use errors::ForestError;
pub use forest::{Forest, ForestBuilder, ForestFrom};
pub use ghost::{ghost_exchange, GhostLayer};
