pub mod rbac;

pub use rbac::{PermissionRecord, RoleRecord};
