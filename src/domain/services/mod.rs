pub mod capacity;

pub use capacity::{ensure_capacity, CapacityError};
