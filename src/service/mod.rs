//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services are built per request from the shared database and storage.

mod account;
mod relation;
mod status;
mod timeline;

pub use account::{AccountCounts, AccountService};
pub use relation::RelationService;
pub use status::{MAX_IMAGE_BYTES, MAX_VIDEO_BYTES, MediaKind, StatusService};
pub use timeline::{TimelineItem, TimelineService};
