//! Gazette: article publishing core with moderation, cached read paths and
//! an admin user lookup.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
