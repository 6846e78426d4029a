pub mod assemble;
pub mod cache;
pub mod interactions;
pub mod posts;
