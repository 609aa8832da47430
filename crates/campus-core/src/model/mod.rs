// ── Domain model ──
//
// Canonical representations of console entities. Device state types are
// owned by the synchronizer; document types mirror the backend after
// normalization (see `convert`).

pub mod activity;
pub mod device;
pub mod gallery;
pub mod notification;
pub mod sync;

// ── Re-exports ──────────────────────────────────────────────────────

// Devices and projection
pub use device::{DeviceKey, GroupStatus, GroupSummary, ProjectionSnapshot};

// Synchronizer state
pub use sync::{
    ConnectionState, DeviceToggle, SubscriptionState, SyncEvent, ToggleFailure, ToggleResult,
};

// Documents
pub use activity::{AcademicYear, Activity, ActivityQuery, NewActivity, YearGroup};
pub use gallery::GalleryImage;
pub use notification::{Attachment, ClassSection, NewNotification, Notification};
