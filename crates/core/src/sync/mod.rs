//! Sync orchestration: ports, batch uploads and connector runs

pub mod linear;
pub mod ports;
pub mod uploader;

pub use linear::{run_linear_sync, LinearSyncOptions, LinearSyncPlan, SyncMode};
pub use ports::{EventSender, ExternalSyncRunner};
pub use uploader::{UploadCoordinator, CANCELLED_BEFORE_DISPATCH};
