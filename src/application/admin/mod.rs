//! Application services for the administrative surface.

pub mod users;

pub use users::{AdminUserError, AdminUserService};
