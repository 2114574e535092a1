//! RAID-6 stripe engine: Galois-field parity, rotating placement, and
//! the named-file/free-list bookkeeping built on top of it.

pub mod engine;
pub mod error;
pub mod gf;
pub mod hostfs;
pub mod metrics;
pub mod parity;
pub mod retention;

pub use engine::Engine;
pub use error::{RaidError, RaidResult};
