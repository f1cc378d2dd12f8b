pub mod prompt;
pub mod session;
pub mod visibility;

pub use session::{FormSession, SubmitBlocked};
