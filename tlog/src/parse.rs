//! 指令流解析器 Instruction stream parser
//!
//! 逐条读取操作码，解出该操作码的固定操作数形状，回调处理器。
//! 任何语法错误（非法操作码、变长整数溢出、UTF-8 损坏、深度越界、
//! 指令中途截断）都立即中止，不做重同步。
//! Reads one opcode at a time, decodes its fixed operand shape and
//! dispatches to the handler. Any syntax error (bad opcode, varint
//! overflow, broken UTF-8, depth over limit, truncation mid
//! instruction) aborts immediately, no resynchronization.
//!
//! 载荷完整落在当前块内时零拷贝，跨块才拷入暂存缓冲。
//! Payloads fully inside the current block are zero-copy; only
//! block-spanning payloads are copied into the scratch buffer.

use log::warn;
use tlog_val::{DataType, Mixed};
use tlog_varint::{MAX_BYTES_64, Varint};

use crate::{
  error::{E, R},
  handler::Handler,
  op::Op,
  source::Source,
};

/// 嵌套子表路径深度上限，防资源耗尽
/// Nested subtable path depth limit, resource-exhaustion guard
pub const MAX_PATH_DEPTH: u64 = 1024;

/// 指令流解析器 Instruction stream parser
pub struct Parser<'a, S: Source<'a>> {
  src: S,
  chunk: &'a [u8],
  pos: usize,
  /// 跨块载荷的暂存 Scratch for block-spanning payloads
  scratch: Vec<u8>,
  // 按指令复用的路径与目标缓冲 Path and target buffers reused per instruction
  pairs: Vec<(u64, u64)>,
  cols: Vec<u64>,
  targets: Vec<u64>,
}

impl<'a, S: Source<'a>> Parser<'a, S> {
  pub fn new(src: S) -> Self {
    Self {
      src,
      chunk: &[],
      pos: 0,
      scratch: Vec::new(),
      pairs: Vec::new(),
      cols: Vec::new(),
      targets: Vec::new(),
    }
  }

  /// 下一条指令的操作码；干净的流结尾返回 None
  /// Next opcode; None at a clean end of stream
  fn next_op(&mut self) -> R<Option<Op>> {
    while self.pos >= self.chunk.len() {
      self.chunk = self.src.next_block()?;
      self.pos = 0;
      if self.chunk.is_empty() {
        return Ok(None);
      }
    }
    let b = self.chunk[self.pos];
    self.pos += 1;
    Ok(Some(Op::try_from(b)?))
  }

  /// 指令内读一字节，流尽即截断错误
  /// Read one byte mid instruction, end of input is Truncated
  fn read_byte(&mut self) -> R<u8> {
    while self.pos >= self.chunk.len() {
      self.chunk = self.src.next_block()?;
      self.pos = 0;
      if self.chunk.is_empty() {
        return Err(E::Truncated);
      }
    }
    let b = self.chunk[self.pos];
    self.pos += 1;
    Ok(b)
  }

  fn read_varint<T: Varint>(&mut self) -> R<T> {
    let rest = &self.chunk[self.pos..];
    if rest.len() >= T::MAX_BYTES {
      // 块内必然完整 Complete within the block
      let (v, n) = tlog_varint::decode(rest)?;
      self.pos += n;
      return Ok(v);
    }
    // 可能跨块，逐字节收集到终止字节
    // May span blocks, collect byte by byte up to the terminal byte
    let mut tmp = [0u8; MAX_BYTES_64];
    let mut n = 0;
    loop {
      if n >= T::MAX_BYTES {
        return Err(tlog_varint::E::Overflow.into());
      }
      let b = self.read_byte()?;
      tmp[n] = b;
      n += 1;
      if b & 0x80 == 0 {
        break;
      }
    }
    Ok(tlog_varint::decode::<T>(&tmp[..n])?.0)
  }

  #[inline]
  fn read_u64(&mut self) -> R<u64> {
    self.read_varint()
  }

  #[inline]
  fn read_i64(&mut self) -> R<i64> {
    self.read_varint()
  }

  /// 布尔按 1 位整数解码，超出 0/1 视为溢出
  /// Bool decodes as a 1-bit integer, above 1 is overflow
  fn read_bool(&mut self) -> R<bool> {
    match self.read_u64()? {
      0 => Ok(false),
      1 => Ok(true),
      _ => Err(tlog_varint::E::Overflow.into()),
    }
  }

  fn read_array<const N: usize>(&mut self) -> R<[u8; N]> {
    let mut out = [0u8; N];
    let rest = &self.chunk[self.pos..];
    if rest.len() >= N {
      out.copy_from_slice(&rest[..N]);
      self.pos += N;
    } else {
      for b in &mut out {
        *b = self.read_byte()?;
      }
    }
    Ok(out)
  }

  #[inline]
  fn read_f32(&mut self) -> R<f32> {
    Ok(f32::from_le_bytes(self.read_array()?))
  }

  #[inline]
  fn read_f64(&mut self) -> R<f64> {
    Ok(f64::from_le_bytes(self.read_array()?))
  }

  /// 定长载荷；在当前块内零拷贝，跨块落入暂存
  /// Fixed-length payload; zero-copy within the block, scratch across blocks
  fn read_bytes(&mut self, len: usize) -> R<&[u8]> {
    if self.chunk.len() - self.pos >= len {
      let s = &self.chunk[self.pos..self.pos + len];
      self.pos += len;
      return Ok(s);
    }
    self.scratch.clear();
    loop {
      let take = (len - self.scratch.len()).min(self.chunk.len() - self.pos);
      self
        .scratch
        .extend_from_slice(&self.chunk[self.pos..self.pos + take]);
      self.pos += take;
      if self.scratch.len() == len {
        return Ok(&self.scratch);
      }
      self.chunk = self.src.next_block()?;
      self.pos = 0;
      if self.chunk.is_empty() {
        return Err(E::Truncated);
      }
    }
  }

  fn read_bin(&mut self) -> R<&[u8]> {
    let len = self.read_u64()?;
    let len = usize::try_from(len).map_err(|_| E::Truncated)?;
    self.read_bytes(len)
  }

  fn read_str(&mut self) -> R<&str> {
    let b = self.read_bin()?;
    core::str::from_utf8(b).map_err(|_| E::Utf8)
  }

  /// 链接目标 1 起始，0 表示空 Link target is 1-based, 0 means null
  fn read_link(&mut self) -> R<Option<u64>> {
    Ok(match self.read_u64()? {
      0 => None,
      v => Some(v - 1),
    })
  }

  fn read_mixed(&mut self) -> R<Mixed> {
    let tag = self.read_u64()?;
    Ok(match DataType::try_from(tag)? {
      DataType::Int => Mixed::Int(self.read_i64()?),
      DataType::Bool => Mixed::Bool(self.read_bool()?),
      DataType::Float => self.read_f32()?.into(),
      DataType::Double => self.read_f64()?.into(),
      DataType::DateTime => Mixed::DateTime(self.read_i64()?),
      DataType::String => Mixed::Str(self.read_str()?.into()),
      DataType::Binary => Mixed::Bin(self.read_bin()?.into()),
      DataType::Table => Mixed::Table,
      // Mixed 套 Mixed 与链接载荷非法 Nested mixed and link payloads are invalid
      DataType::Mixed | DataType::Link | DataType::LinkList => {
        return Err(E::BadMixedTag(tag));
      }
    })
  }

  /// (列,行) 对路径，先读深度并设限 Pair path, depth read first and capped
  fn read_pair_path(&mut self) -> R<()> {
    let levels = self.read_u64()?;
    if levels > MAX_PATH_DEPTH {
      return Err(E::DepthExceeded(levels));
    }
    self.pairs.clear();
    for _ in 0..levels {
      let col = self.read_u64()?;
      let row = self.read_u64()?;
      self.pairs.push((col, row));
    }
    Ok(())
  }

  /// 列索引路径 Column index path
  fn read_col_path(&mut self) -> R<()> {
    let levels = self.read_u64()?;
    if levels > MAX_PATH_DEPTH {
      return Err(E::DepthExceeded(levels));
    }
    self.cols.clear();
    for _ in 0..levels {
      let col = self.read_u64()?;
      self.cols.push(col);
    }
    Ok(())
  }

  /// 解析一条指令并分发；干净的流结尾返回 Ok(false)
  /// Decode and dispatch one instruction; Ok(false) at a clean end
  pub fn parse_one<H: Handler>(&mut self, hd: &mut H) -> R<bool> {
    let Some(op) = self.next_op()? else {
      return Ok(false);
    };
    let ok = match op {
      Op::InsertGroupLevelTable => {
        let table_ndx = self.read_u64()?;
        let num_tables = self.read_u64()?;
        let name = self.read_str()?;
        hd.insert_group_level_table(table_ndx, num_tables, name)
      }
      Op::EraseGroupLevelTable => {
        let table_ndx = self.read_u64()?;
        let num_tables = self.read_u64()?;
        hd.erase_group_level_table(table_ndx, num_tables)
      }
      Op::RenameGroupLevelTable => {
        let table_ndx = self.read_u64()?;
        let name = self.read_str()?;
        hd.rename_group_level_table(table_ndx, name)
      }
      Op::SelectTable => {
        let group_ndx = self.read_u64()?;
        self.read_pair_path()?;
        hd.select_table(group_ndx, &self.pairs)
      }
      Op::SetInt => {
        let col = self.read_u64()?;
        let row = self.read_u64()?;
        let v = self.read_i64()?;
        hd.set_int(col, row, v)
      }
      Op::SetBool => {
        let col = self.read_u64()?;
        let row = self.read_u64()?;
        let v = self.read_bool()?;
        hd.set_bool(col, row, v)
      }
      Op::SetFloat => {
        let col = self.read_u64()?;
        let row = self.read_u64()?;
        let v = self.read_f32()?;
        hd.set_float(col, row, v)
      }
      Op::SetDouble => {
        let col = self.read_u64()?;
        let row = self.read_u64()?;
        let v = self.read_f64()?;
        hd.set_double(col, row, v)
      }
      Op::SetString => {
        let col = self.read_u64()?;
        let row = self.read_u64()?;
        let v = self.read_str()?;
        hd.set_string(col, row, v)
      }
      Op::SetBinary => {
        let col = self.read_u64()?;
        let row = self.read_u64()?;
        let v = self.read_bin()?;
        hd.set_binary(col, row, v)
      }
      Op::SetDateTime => {
        let col = self.read_u64()?;
        let row = self.read_u64()?;
        let v = self.read_i64()?;
        hd.set_date_time(col, row, v)
      }
      Op::SetTable => {
        let col = self.read_u64()?;
        let row = self.read_u64()?;
        hd.set_table(col, row)
      }
      Op::SetMixed => {
        let col = self.read_u64()?;
        let row = self.read_u64()?;
        let v = self.read_mixed()?;
        hd.set_mixed(col, row, v)
      }
      Op::SetLink => {
        let col = self.read_u64()?;
        let row = self.read_u64()?;
        let v = self.read_link()?;
        hd.set_link(col, row, v)
      }
      Op::InsertInt => {
        let col = self.read_u64()?;
        let row = self.read_u64()?;
        let prior = self.read_u64()?;
        let v = self.read_i64()?;
        hd.insert_int(col, row, prior, v)
      }
      Op::InsertBool => {
        let col = self.read_u64()?;
        let row = self.read_u64()?;
        let prior = self.read_u64()?;
        let v = self.read_bool()?;
        hd.insert_bool(col, row, prior, v)
      }
      Op::InsertFloat => {
        let col = self.read_u64()?;
        let row = self.read_u64()?;
        let prior = self.read_u64()?;
        let v = self.read_f32()?;
        hd.insert_float(col, row, prior, v)
      }
      Op::InsertDouble => {
        let col = self.read_u64()?;
        let row = self.read_u64()?;
        let prior = self.read_u64()?;
        let v = self.read_f64()?;
        hd.insert_double(col, row, prior, v)
      }
      Op::InsertString => {
        let col = self.read_u64()?;
        let row = self.read_u64()?;
        let prior = self.read_u64()?;
        let v = self.read_str()?;
        hd.insert_string(col, row, prior, v)
      }
      Op::InsertBinary => {
        let col = self.read_u64()?;
        let row = self.read_u64()?;
        let prior = self.read_u64()?;
        let v = self.read_bin()?;
        hd.insert_binary(col, row, prior, v)
      }
      Op::InsertDateTime => {
        let col = self.read_u64()?;
        let row = self.read_u64()?;
        let prior = self.read_u64()?;
        let v = self.read_i64()?;
        hd.insert_date_time(col, row, prior, v)
      }
      Op::InsertTable => {
        let col = self.read_u64()?;
        let row = self.read_u64()?;
        let prior = self.read_u64()?;
        hd.insert_table(col, row, prior)
      }
      Op::InsertMixed => {
        let col = self.read_u64()?;
        let row = self.read_u64()?;
        let prior = self.read_u64()?;
        let v = self.read_mixed()?;
        hd.insert_mixed(col, row, prior, v)
      }
      Op::InsertLink => {
        let col = self.read_u64()?;
        let row = self.read_u64()?;
        let prior = self.read_u64()?;
        let v = self.read_link()?;
        hd.insert_link(col, row, prior, v)
      }
      Op::InsertLinkList => {
        let col = self.read_u64()?;
        let row = self.read_u64()?;
        let prior = self.read_u64()?;
        hd.insert_link_list(col, row, prior)
      }
      Op::RowInsertComplete => hd.row_insert_complete(),
      Op::InsertEmptyRows => {
        let row = self.read_u64()?;
        let count = self.read_u64()?;
        let prior = self.read_u64()?;
        let unordered = self.read_bool()?;
        hd.insert_empty_rows(row, count, prior, unordered)
      }
      Op::EraseRows => {
        let row = self.read_u64()?;
        let count = self.read_u64()?;
        let prior = self.read_u64()?;
        let unordered = self.read_bool()?;
        hd.erase_rows(row, count, prior, unordered)
      }
      Op::AddIntToColumn => {
        let col = self.read_u64()?;
        let v = self.read_i64()?;
        hd.add_int_to_column(col, v)
      }
      Op::ClearTable => hd.clear_table(),
      Op::OptimizeTable => hd.optimize_table(),
      Op::SelectDescriptor => {
        self.read_col_path()?;
        hd.select_descriptor(&self.cols)
      }
      Op::InsertColumn => {
        let col = self.read_u64()?;
        let ty = DataType::try_from(self.read_u64()?)?;
        let name = self.read_str()?;
        hd.insert_column(col, ty, name)
      }
      Op::InsertLinkColumn => {
        let col = self.read_u64()?;
        let ty = DataType::try_from(self.read_u64()?)?;
        // 线上顺序名字在前，后续还要读整数，须先落为私有
        // Name precedes the trailing integers on the wire, so it
        // must be owned before reading them
        let name = self.read_str()?.to_owned();
        let target_table = self.read_u64()?;
        let backlink_col = self.read_u64()?;
        hd.insert_link_column(col, ty, &name, target_table, backlink_col)
      }
      Op::EraseColumn => {
        let col = self.read_u64()?;
        hd.erase_column(col)
      }
      Op::EraseLinkColumn => {
        let col = self.read_u64()?;
        let target_table = self.read_u64()?;
        let backlink_col = self.read_u64()?;
        hd.erase_link_column(col, target_table, backlink_col)
      }
      Op::RenameColumn => {
        let col = self.read_u64()?;
        let name = self.read_str()?;
        hd.rename_column(col, name)
      }
      Op::AddSearchIndex => {
        let col = self.read_u64()?;
        hd.add_search_index(col)
      }
      Op::RemoveSearchIndex => {
        let col = self.read_u64()?;
        hd.remove_search_index(col)
      }
      Op::AddPrimaryKey => {
        let col = self.read_u64()?;
        hd.add_primary_key(col)
      }
      Op::RemovePrimaryKey => hd.remove_primary_key(),
      Op::SetLinkType => {
        let col = self.read_u64()?;
        let ty = tlog_val::LinkType::try_from(self.read_u64()?)?;
        hd.set_link_type(col, ty)
      }
      Op::SelectLinkList => {
        let col = self.read_u64()?;
        let row = self.read_u64()?;
        hd.select_link_list(col, row)
      }
      Op::LinkListSet => {
        let ndx = self.read_u64()?;
        let target = self.read_u64()?;
        hd.link_list_set(ndx, target)
      }
      Op::LinkListInsert => {
        let ndx = self.read_u64()?;
        let target = self.read_u64()?;
        hd.link_list_insert(ndx, target)
      }
      Op::LinkListMove => {
        let from = self.read_u64()?;
        let to = self.read_u64()?;
        hd.link_list_move(from, to)
      }
      Op::LinkListErase => {
        let ndx = self.read_u64()?;
        hd.link_list_erase(ndx)
      }
      Op::LinkListClear => hd.link_list_clear(),
      Op::LinkListSetAll => {
        let count = self.read_u64()?;
        self.targets.clear();
        for _ in 0..count {
          let target = self.read_u64()?;
          self.targets.push(target);
        }
        hd.link_list_set_all(&self.targets)
      }
    };
    if ok { Ok(true) } else { Err(E::Rejected(op)) }
  }

  /// 解析到流结尾 Parse to the end of the stream
  pub fn parse_all<H: Handler>(&mut self, hd: &mut H) -> R<()> {
    loop {
      match self.parse_one(hd) {
        Ok(true) => {}
        Ok(false) => return Ok(()),
        Err(e) => {
          warn!("bad transaction log: {e}");
          return Err(e);
        }
      }
    }
  }
}
