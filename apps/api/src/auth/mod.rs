pub mod extractor;
pub mod handlers;
pub mod password;
pub mod store;
pub mod tokens;
