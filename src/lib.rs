pub mod core;
pub mod models;
pub mod services;

pub use crate::core::errors::{Error, Result};
pub use crate::models::operation::{OpKind, Operation};
pub use crate::services::fs::ops::{DiskFileOps, FileOps};
pub use crate::services::history::OperationLog;
