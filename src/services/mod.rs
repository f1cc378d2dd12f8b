pub mod messaging;
pub mod session;

pub use messaging::{MessagingService, PostedMessage, UploadedFile};
pub use session::{SessionProvider, UserIdentity};
