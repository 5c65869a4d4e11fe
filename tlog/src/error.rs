//! 错误定义 Error definitions
//!
//! 所有解码错误均不可恢复，解析立即中止
//! Every decode error is fatal, parsing aborts immediately

use thiserror::Error;

use crate::op::Op;

/// 结果类型 Result type
pub type R<T> = Result<T, E>;

/// 错误类型 Error type
#[derive(Error, Debug, PartialEq, Eq)]
pub enum E {
  #[error("varint: {0}")]
  Varint(#[from] tlog_varint::E),

  #[error("value: {0}")]
  Val(#[from] tlog_val::E),

  #[error("invalid opcode {0}")]
  BadOp(u8),

  #[error("data type {0} not allowed as mixed payload")]
  BadMixedTag(u64),

  #[error("string payload is not utf-8")]
  Utf8,

  #[error("path depth {0} exceeds limit")]
  DepthExceeded(u64),

  #[error("log truncated mid instruction")]
  Truncated,

  #[error("handler rejected {0:?}")]
  Rejected(Op),
}
