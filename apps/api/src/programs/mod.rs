pub mod compatibility;
pub mod handlers;
pub mod statistics;
pub mod store;
