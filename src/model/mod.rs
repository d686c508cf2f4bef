mod config;
mod status;
mod version;

pub use self::config::{ClientConfig, TimeoutConfig};
pub use self::status::{AuthStatus, StatusSnapshot};
pub use self::version::{CommitReceipt, VersionRecord};
