//! Shared types for the roster service
//!
//! Sync protocol types, stored row models, the unified error system
//! and small time utilities used by roster-server.

pub mod error;
pub mod roster;
pub mod util;

pub use roster::{AssignmentType, ContactMergePolicy, RosterSnapshot, SyncRequest, SyncResponse};
