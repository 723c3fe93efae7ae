//! Database repositories
//!
//! Repository pattern implementations for database access.
//! Each repository handles CRUD operations for a specific entity.

pub mod call_event;
pub mod checkpoint;
pub mod enquiry;
pub mod gallery;
pub mod post;
pub mod settings;
pub mod vitals;

pub use call_event::{CallEventRepository, SqlxCallEventRepository};
pub use checkpoint::{CheckpointRepository, SqlxCheckpointRepository};
pub use enquiry::{EnquiryRepository, SqlxEnquiryRepository};
pub use gallery::{GalleryRepository, SqlxGalleryRepository};
pub use post::{PostRepository, SqlxPostRepository};
pub use settings::{Setting, SettingsRepository, SqlxSettingsRepository};
pub use vitals::{SqlxVitalsRepository, VitalsRepository};
