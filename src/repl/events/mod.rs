//! # Events Module
//!
//! Region identifiers and the update queue that carries work from
//! background tasks back onto the event loop.

pub mod types;
pub mod update_queue;

pub use types::{RegionFlags, RegionId};
pub use update_queue::{Update, UpdateQueue, UpdateSender};
