// campus-core: Device-state synchronization and console services between
// campus-api and consumers (CLI).

pub mod aggregate;
pub mod command;
pub mod config;
pub mod console;
pub mod convert;
pub mod error;
pub mod model;
pub mod registry;
mod store;
pub mod stream;
pub mod synchronizer;

// ── Primary re-exports ──────────────────────────────────────────────
pub use campus_api::ReconnectConfig;
pub use command::{Command, CommandResult};
pub use config::{
    ConsoleConfig, DEFAULT_WRITE_TIMEOUT, MediaConfig, RealtimeConfig, ReconnectPolicy,
    SyncConfig,
};
pub use console::Console;
pub use error::CoreError;
pub use registry::{DeviceRegistry, GroupDefinition};
pub use stream::ProjectionStream;
pub use synchronizer::Synchronizer;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Devices
    ConnectionState, DeviceKey, DeviceToggle, GroupStatus, GroupSummary, ProjectionSnapshot,
    SubscriptionState, SyncEvent, ToggleFailure, ToggleResult,
    // Documents
    AcademicYear, Activity, ActivityQuery, Attachment, ClassSection, GalleryImage,
    NewActivity, NewNotification, Notification, YearGroup,
};
