pub mod client;
pub mod operation;
pub mod sink;
pub mod store;
pub mod workflow;

pub use client::{ClientFactory, Page, RemoteJobClient};
pub use operation::{LifecycleOperation, Resolution, Resolved};
pub use sink::NotificationSink;
pub use store::BlobStore;
pub use workflow::RegionWorkflow;
