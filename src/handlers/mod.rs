pub mod auth;
pub mod exercise;
pub mod meal;
pub mod profile;
pub mod summary;
