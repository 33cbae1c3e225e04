//! Host Inventory - snapshots and control of the local machine
//!
//! This crate provides one facade, [`HostInventory`], over the OS surfaces a
//! system administrator looks at:
//!
//! - **Processes**: list, search, rank by memory, terminate
//! - **Services**: list, search, start/stop/restart with a bounded wait
//! - **Volumes** and **network interfaces**: enumerate
//! - **Event log**: the most recent entries, filtered by date and severity
//! - **Ping**: independent, individually bounded echo probes
//! - **Dashboard**: one refresh cycle of usage gauges that tolerates failures
//!
//! Every call returns a fresh snapshot; nothing is cached between calls.
//! Each OS surface sits behind a trait in [`backend`] so the facade can be
//! driven by in-memory fakes (feature `fake`).
//!
//! # Example
//!
//! ```rust,ignore
//! use host_inventory::{HostInventory, InventoryConfig, ServiceAction};
//! use std::time::Duration;
//!
//! let inventory = HostInventory::native(InventoryConfig::load(None));
//! let top = inventory.top_memory_consumers(5)?;
//! inventory
//!     .control_service("nginx", ServiceAction::Restart, Duration::from_secs(10))
//!     .await?;
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod format;
pub mod host;
pub mod sampler;
pub mod types;
pub mod wait;

mod facade;

pub use config::InventoryConfig;
pub use error::{ErrorKind, InventoryError, InventoryResult, ELEVATION_HINT};
pub use facade::HostInventory;
pub use format::{format_bytes, format_uptime, summarize, usage_percent};
pub use sampler::ResourceSampler;
pub use types::*;
pub use wait::WaitOutcome;

// Callers cancel service waits with this token
pub use tokio_util::sync::CancellationToken;
