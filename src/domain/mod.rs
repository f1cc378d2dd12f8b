pub mod message;
pub mod permalink;
pub mod schema;
pub mod ticket;
