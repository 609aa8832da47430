// campus-api: Async clients for the campus console backends
// (realtime device store, REST document backend, media host).

pub mod backend;
pub mod error;
pub mod media;
pub mod realtime;
pub mod transport;

pub use backend::BackendClient;
pub use error::Error;
pub use media::{MediaKind, MediaUploader, UploadedAsset};
pub use realtime::{
    DeviceRecord, GroupSnapshot, PowerStatus, RealtimeStore, ReconnectConfig, Subscription,
    SubscriptionEvent, backoff_delay, parse_group_snapshot,
};
pub use realtime::firebase::FirebaseClient;
pub use realtime::memory::MemoryStore;
pub use transport::TransportConfig;
