pub mod careers;
pub mod handlers;
pub mod pdf;
pub mod scoring;
pub mod store;
