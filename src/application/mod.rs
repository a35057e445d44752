//! Application services layer.

pub mod admin;
pub mod articles;
pub mod error;
pub mod pagination;
pub mod repos;
