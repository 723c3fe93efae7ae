//! Service layer
//!
//! Business logic between the HTTP handlers and the repositories.

pub mod blog;
pub mod call_tracking;
pub mod consent;
pub mod email;
pub mod enquiry;
pub mod imaging;
pub mod markdown;
pub mod upload_flow;
pub mod version_history;
pub mod vitals;

pub use blog::BlogService;
pub use call_tracking::CallTrackingService;
pub use consent::{ConsentState, ConsentStore};
pub use email::EnquiryMailer;
pub use enquiry::EnquiryService;
pub use imaging::{ImageVariantGenerator, VariantConfig, VariantSet};
pub use markdown::MarkdownRenderer;
pub use upload_flow::{UploadFlow, UploadPhase};
pub use version_history::VersionHistoryService;
pub use vitals::VitalsService;
