//! Business operations that span several store calls

pub mod roster_sync;

pub use roster_sync::sync_roster;
