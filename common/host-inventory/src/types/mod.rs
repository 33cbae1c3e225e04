//! Snapshot types returned by the facade
//!
//! Every type here is an immutable value captured at query time. None of
//! them keeps an OS handle alive after the call that produced it.

mod disk;
mod listing;
mod log;
mod network;
mod ping;
mod process;
mod service;
mod system;

pub use disk::*;
pub use listing::*;
pub use log::*;
pub use network::*;
pub use ping::*;
pub use process::*;
pub use service::*;
pub use system::*;
