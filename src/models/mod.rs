pub mod exercise;
pub mod meal;
pub mod summary;
pub mod user;
