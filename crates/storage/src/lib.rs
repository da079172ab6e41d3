#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod memory;
pub mod snapshot;

pub use memory::MemoryStore;
pub use snapshot::{Snapshot, SnapshotError};
