pub mod authz;
pub mod config;
pub mod db;
pub mod errors;
pub mod logging;
pub mod models;
pub mod rbac;

pub use errors::{AppError, AppResult};
pub use rbac::sync_roles_and_permissions;
