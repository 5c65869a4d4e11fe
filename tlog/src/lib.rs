#![cfg_attr(docsrs, feature(doc_cfg))]

//! 可重放事务日志编解码器 Replayable transaction log codec
//!
//! 日志流是指令序列，无头尾帧：每条指令为 1 字节操作码加固定形状的
//! 操作数（变长整数 / 定宽小端浮点 / 长度前缀字节串 / 带标签 Mixed）。
//! 行、描述符、链接列表指令由先行的 select 指令确定作用目标。
//!
//! The log stream is a sequence of instructions with no framing: each
//! instruction is one opcode byte plus a fixed operand shape (varint /
//! fixed-width little-endian float / length-prefixed bytes / tagged
//! mixed). Row, descriptor and link-list instructions are scoped by a
//! preceding select instruction.
//!
//! 编码侧 [`LogWriter`] 自动维护选择状态，解码侧 [`Parser`] 将指令
//! 分发给 [`Handler`]。
//! [`LogWriter`] tracks selection on the encode side, [`Parser`]
//! dispatches to a [`Handler`] on the decode side.

mod encode;
mod error;
mod handler;
mod op;
mod parse;
mod select;
mod sink;
mod source;

pub use encode::Encoder;
pub use error::{E, R};
pub use handler::Handler;
pub use op::Op;
pub use parse::{MAX_PATH_DEPTH, Parser};
pub use select::{DescRef, Key, ListRef, LogWriter, TableRef};
pub use sink::{Buf, Sink};
pub use source::{ChunkSource, SliceSource, Source};
pub use tlog_val::{DataType, LinkType, Mixed};
