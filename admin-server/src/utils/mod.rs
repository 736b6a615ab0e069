//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型
//! - [`AppResponse`] - API 响应结构
//! - 日志、时间戳、ID 生成等工具

pub mod error;
pub mod id;
pub mod logger;
pub mod time;

pub use error::{AppError, AppResponse};
pub use error::{ok, ok_with_message};

/// Application-level Result type
///
/// Used in HTTP handlers and application logic
pub type AppResult<T> = Result<T, AppError>;
