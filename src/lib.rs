//! Client-side synchronization layer for files tracked by a local
//! version-history service reachable over loopback HTTP.

pub mod clock;
pub mod error;
pub mod history;
pub mod host;
pub mod identity;
pub mod model;
pub mod remote;
pub mod restore;
pub mod roots;
pub mod session;
pub mod status;

#[cfg(test)]
pub(crate) mod testing;

pub use self::error::SyncError;
