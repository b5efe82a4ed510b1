pub mod queries;
pub mod types;
