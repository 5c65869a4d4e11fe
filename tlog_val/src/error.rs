//! 错误定义 Error definitions

use thiserror::Error;

/// 结果类型 Result type
pub type R<T> = Result<T, E>;

/// 错误类型 Error type
#[derive(Error, Debug, PartialEq, Eq)]
pub enum E {
  #[error("invalid data type {0}")]
  BadDataType(u64),

  #[error("invalid link type {0}")]
  BadLinkType(u64),
}
