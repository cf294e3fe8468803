pub mod permission;
pub mod role;
pub mod role_permission;
pub mod user_role;

pub use permission::Permission;
pub use role::Role;
pub use role_permission::RolePermission;
pub use user_role::UserRole;
