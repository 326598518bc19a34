//! Request and response models.

pub mod session;
pub mod view;

pub use session::{CurrentUser, keys as session_keys};
pub use view::{AccountView, Notification, PendingImageSummary};
