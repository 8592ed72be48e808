pub mod completion;
pub mod handlers;
pub mod store;
pub mod validation;
