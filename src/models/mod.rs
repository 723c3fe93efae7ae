//! Data models
//!
//! Entity types shared between the repository, service, and API layers.

pub mod call_event;
pub mod checkpoint;
pub mod enquiry;
pub mod gallery;
pub mod location;
pub mod post;
pub mod vitals;

pub use call_event::{CallEvent, LocationCallStats, RecordCallInput};
pub use checkpoint::Checkpoint;
pub use enquiry::{Enquiry, NewEnquiry};
pub use gallery::{GalleryProject, NewGalleryProject};
pub use location::{Faq, LocationProfile, Testimonial};
pub use post::{CreatePostInput, Page, Post, PostStatus, UpdatePostInput};
pub use vitals::{VitalsReport, VitalsSummary};
