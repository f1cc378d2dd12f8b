pub mod session;
pub mod slack;
