pub mod access_log;
pub mod operation_log;

pub use access_log::AccessLog;
pub use operation_log::OperationLog;
