//! Background tasks

mod poller;

pub use poller::{ReservePoller, ReserveUpdate, SnapshotOrigin};
