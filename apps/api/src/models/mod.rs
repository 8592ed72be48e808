pub mod program;
pub mod recommendation;
pub mod riasec;
pub mod student;
pub mod user;
