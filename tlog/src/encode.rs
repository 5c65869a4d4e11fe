//! 指令流编码器 Instruction stream encoder
//!
//! 每条指令先按上界一次性预留空间，再写操作码与操作数，
//! 最后按实际长度提交，保证不会写出半条指令。
//! Each instruction reserves its byte bound up front, writes the opcode
//! and operands, then commits the actual size, so a malformed half
//! instruction can never be appended.

use tlog_val::{DataType, LinkType, Mixed};
use tlog_varint::{MAX_BYTES_64, Varint, encode as varint};

use crate::{op::Op, sink::Sink};

/// 单个整数操作数的字节上界 Byte bound of one integer operand
const V: usize = MAX_BYTES_64;

/// 写入游标，指向单条指令的预留区 Cursor over one instruction's reservation
struct Cur<'a> {
  buf: &'a mut [u8],
  pos: usize,
}

impl Cur<'_> {
  #[inline]
  fn int<T: Varint>(&mut self, v: T) {
    self.pos += varint(&mut self.buf[self.pos..], v);
  }

  #[inline]
  fn bool_(&mut self, v: bool) {
    self.int(v as u64);
  }

  #[inline]
  fn bytes(&mut self, b: &[u8]) {
    self.buf[self.pos..self.pos + b.len()].copy_from_slice(b);
    self.pos += b.len();
  }

  /// 变长长度前缀 + 原始字节 Varint length prefix + raw bytes
  #[inline]
  fn bin(&mut self, b: &[u8]) {
    self.int(b.len() as u64);
    self.bytes(b);
  }

  #[inline]
  fn str_(&mut self, s: &str) {
    self.bin(s.as_bytes());
  }

  // 浮点定宽小端 Floats are fixed-width little-endian
  #[inline]
  fn f32_(&mut self, v: f32) {
    self.bytes(&v.to_le_bytes());
  }

  #[inline]
  fn f64_(&mut self, v: f64) {
    self.bytes(&v.to_le_bytes());
  }

  /// 链接目标 1 起始，0 表示空 Link target is 1-based, 0 means null
  ///
  /// u64::MAX 加一后与空值冲突，不可编码
  /// u64::MAX would collide with null after the shift, unencodable
  #[inline]
  fn link(&mut self, target: Option<u64>) {
    debug_assert!(target != Some(u64::MAX));
    self.int(match target {
      Some(row) => row + 1,
      None => 0,
    });
  }

  /// 类型标签 + 按类载荷 Type tag + per-type payload
  fn mixed(&mut self, v: &Mixed) {
    self.int(v.data_type().tag());
    match v {
      Mixed::Int(v) | Mixed::DateTime(v) => self.int(*v),
      Mixed::Bool(v) => self.bool_(*v),
      Mixed::Float(v) => self.f32_(v.0),
      Mixed::Double(v) => self.f64_(v.0),
      Mixed::Str(s) => self.str_(s),
      Mixed::Bin(b) => self.bin(b),
      Mixed::Table => {}
    }
  }
}

/// Mixed 载荷的字节上界 Byte bound of a mixed payload
#[inline]
fn mixed_cap(v: &Mixed) -> usize {
  V + match v {
    Mixed::Int(_) | Mixed::DateTime(_) | Mixed::Bool(_) => V,
    Mixed::Float(_) => 4,
    Mixed::Double(_) => 8,
    Mixed::Str(s) => V + s.len(),
    Mixed::Bin(b) => V + b.len(),
    Mixed::Table => 0,
  }
}

/// 指令流编码器 Instruction stream encoder
///
/// 只追加，无删除或回退 Append only, no delete or undo
pub struct Encoder<S: Sink> {
  sink: S,
}

impl<S: Sink> Encoder<S> {
  #[inline]
  pub fn new(sink: S) -> Self {
    Self { sink }
  }

  #[inline]
  pub fn sink(&self) -> &S {
    &self.sink
  }

  #[inline]
  pub fn into_sink(self) -> S {
    self.sink
  }

  /// 预留 1+cap 字节，写入操作码与操作数后提交
  /// Reserve 1+cap bytes, write opcode and operands, commit
  #[inline]
  fn emit(&mut self, op: Op, cap: usize, f: impl FnOnce(&mut Cur)) {
    let buf = self.sink.reserve(1 + cap);
    buf[0] = op as u8;
    let mut cur = Cur { buf, pos: 1 };
    f(&mut cur);
    let n = cur.pos;
    self.sink.advance(n);
  }

  // ---- 表级 Table scope ----

  pub fn insert_group_level_table(&mut self, table_ndx: u64, num_tables: u64, name: &str) {
    self.emit(Op::InsertGroupLevelTable, 3 * V + name.len(), |c| {
      c.int(table_ndx);
      c.int(num_tables);
      c.str_(name);
    });
  }

  pub fn erase_group_level_table(&mut self, table_ndx: u64, num_tables: u64) {
    self.emit(Op::EraseGroupLevelTable, 2 * V, |c| {
      c.int(table_ndx);
      c.int(num_tables);
    });
  }

  pub fn rename_group_level_table(&mut self, table_ndx: u64, name: &str) {
    self.emit(Op::RenameGroupLevelTable, 2 * V + name.len(), |c| {
      c.int(table_ndx);
      c.str_(name);
    });
  }

  /// 路径为 (列,行) 对，自顶层表逐级定位子表
  /// Path of (col,row) pairs addressing a nested subtable from the root
  pub fn select_table(&mut self, group_ndx: u64, path: &[(u64, u64)]) {
    self.emit(Op::SelectTable, 2 * V + path.len() * 2 * V, |c| {
      c.int(group_ndx);
      c.int(path.len() as u64);
      for &(col, row) in path {
        c.int(col);
        c.int(row);
      }
    });
  }

  // ---- 行级 Row scope ----

  pub fn set_int(&mut self, col: u64, row: u64, value: i64) {
    self.emit(Op::SetInt, 3 * V, |c| {
      c.int(col);
      c.int(row);
      c.int(value);
    });
  }

  pub fn set_bool(&mut self, col: u64, row: u64, value: bool) {
    self.emit(Op::SetBool, 3 * V, |c| {
      c.int(col);
      c.int(row);
      c.bool_(value);
    });
  }

  pub fn set_float(&mut self, col: u64, row: u64, value: f32) {
    self.emit(Op::SetFloat, 2 * V + 4, |c| {
      c.int(col);
      c.int(row);
      c.f32_(value);
    });
  }

  pub fn set_double(&mut self, col: u64, row: u64, value: f64) {
    self.emit(Op::SetDouble, 2 * V + 8, |c| {
      c.int(col);
      c.int(row);
      c.f64_(value);
    });
  }

  pub fn set_string(&mut self, col: u64, row: u64, value: &str) {
    self.emit(Op::SetString, 3 * V + value.len(), |c| {
      c.int(col);
      c.int(row);
      c.str_(value);
    });
  }

  pub fn set_binary(&mut self, col: u64, row: u64, value: &[u8]) {
    self.emit(Op::SetBinary, 3 * V + value.len(), |c| {
      c.int(col);
      c.int(row);
      c.bin(value);
    });
  }

  pub fn set_date_time(&mut self, col: u64, row: u64, value: i64) {
    self.emit(Op::SetDateTime, 3 * V, |c| {
      c.int(col);
      c.int(row);
      c.int(value);
    });
  }

  /// 将单元格置为空子表 Reset the cell to an empty subtable
  pub fn set_table(&mut self, col: u64, row: u64) {
    self.emit(Op::SetTable, 2 * V, |c| {
      c.int(col);
      c.int(row);
    });
  }

  pub fn set_mixed(&mut self, col: u64, row: u64, value: &Mixed) {
    self.emit(Op::SetMixed, 2 * V + mixed_cap(value), |c| {
      c.int(col);
      c.int(row);
      c.mixed(value);
    });
  }

  pub fn set_link(&mut self, col: u64, row: u64, target_row: Option<u64>) {
    self.emit(Op::SetLink, 3 * V, |c| {
      c.int(col);
      c.int(row);
      c.link(target_row);
    });
  }

  pub fn insert_int(&mut self, col: u64, row: u64, prior_rows: u64, value: i64) {
    self.emit(Op::InsertInt, 4 * V, |c| {
      c.int(col);
      c.int(row);
      c.int(prior_rows);
      c.int(value);
    });
  }

  pub fn insert_bool(&mut self, col: u64, row: u64, prior_rows: u64, value: bool) {
    self.emit(Op::InsertBool, 4 * V, |c| {
      c.int(col);
      c.int(row);
      c.int(prior_rows);
      c.bool_(value);
    });
  }

  pub fn insert_float(&mut self, col: u64, row: u64, prior_rows: u64, value: f32) {
    self.emit(Op::InsertFloat, 3 * V + 4, |c| {
      c.int(col);
      c.int(row);
      c.int(prior_rows);
      c.f32_(value);
    });
  }

  pub fn insert_double(&mut self, col: u64, row: u64, prior_rows: u64, value: f64) {
    self.emit(Op::InsertDouble, 3 * V + 8, |c| {
      c.int(col);
      c.int(row);
      c.int(prior_rows);
      c.f64_(value);
    });
  }

  pub fn insert_string(&mut self, col: u64, row: u64, prior_rows: u64, value: &str) {
    self.emit(Op::InsertString, 4 * V + value.len(), |c| {
      c.int(col);
      c.int(row);
      c.int(prior_rows);
      c.str_(value);
    });
  }

  pub fn insert_binary(&mut self, col: u64, row: u64, prior_rows: u64, value: &[u8]) {
    self.emit(Op::InsertBinary, 4 * V + value.len(), |c| {
      c.int(col);
      c.int(row);
      c.int(prior_rows);
      c.bin(value);
    });
  }

  pub fn insert_date_time(&mut self, col: u64, row: u64, prior_rows: u64, value: i64) {
    self.emit(Op::InsertDateTime, 4 * V, |c| {
      c.int(col);
      c.int(row);
      c.int(prior_rows);
      c.int(value);
    });
  }

  pub fn insert_table(&mut self, col: u64, row: u64, prior_rows: u64) {
    self.emit(Op::InsertTable, 3 * V, |c| {
      c.int(col);
      c.int(row);
      c.int(prior_rows);
    });
  }

  pub fn insert_mixed(&mut self, col: u64, row: u64, prior_rows: u64, value: &Mixed) {
    self.emit(Op::InsertMixed, 3 * V + mixed_cap(value), |c| {
      c.int(col);
      c.int(row);
      c.int(prior_rows);
      c.mixed(value);
    });
  }

  pub fn insert_link(&mut self, col: u64, row: u64, prior_rows: u64, target_row: Option<u64>) {
    self.emit(Op::InsertLink, 4 * V, |c| {
      c.int(col);
      c.int(row);
      c.int(prior_rows);
      c.link(target_row);
    });
  }

  pub fn insert_link_list(&mut self, col: u64, row: u64, prior_rows: u64) {
    self.emit(Op::InsertLinkList, 3 * V, |c| {
      c.int(col);
      c.int(row);
      c.int(prior_rows);
    });
  }

  /// 一行各列插入完毕 Row insertion across columns is complete
  pub fn row_insert_complete(&mut self) {
    self.emit(Op::RowInsertComplete, 0, |_| {});
  }

  pub fn insert_empty_rows(&mut self, row: u64, count: u64, prior_rows: u64, unordered: bool) {
    self.emit(Op::InsertEmptyRows, 4 * V, |c| {
      c.int(row);
      c.int(count);
      c.int(prior_rows);
      c.bool_(unordered);
    });
  }

  pub fn erase_rows(&mut self, row: u64, count: u64, prior_rows: u64, unordered: bool) {
    self.emit(Op::EraseRows, 4 * V, |c| {
      c.int(row);
      c.int(count);
      c.int(prior_rows);
      c.bool_(unordered);
    });
  }

  /// 整列所有单元格加同一增量 Add one delta to every cell of a column
  pub fn add_int_to_column(&mut self, col: u64, value: i64) {
    self.emit(Op::AddIntToColumn, 2 * V, |c| {
      c.int(col);
      c.int(value);
    });
  }

  pub fn clear_table(&mut self) {
    self.emit(Op::ClearTable, 0, |_| {});
  }

  pub fn optimize_table(&mut self) {
    self.emit(Op::OptimizeTable, 0, |_| {});
  }

  // ---- 描述符级 Descriptor scope ----

  /// 路径为列索引序列，相对当前选中表
  /// Path of column indices, relative to the selected table
  pub fn select_descriptor(&mut self, path: &[u64]) {
    self.emit(Op::SelectDescriptor, V + path.len() * V, |c| {
      c.int(path.len() as u64);
      for &col in path {
        c.int(col);
      }
    });
  }

  pub fn insert_column(&mut self, col: u64, ty: DataType, name: &str) {
    self.emit(Op::InsertColumn, 2 * V + name.len() + V, |c| {
      c.int(col);
      c.int(ty.tag());
      c.str_(name);
    });
  }

  pub fn insert_link_column(
    &mut self,
    col: u64,
    ty: DataType,
    name: &str,
    target_table: u64,
    backlink_col: u64,
  ) {
    self.emit(Op::InsertLinkColumn, 4 * V + name.len() + V, |c| {
      c.int(col);
      c.int(ty.tag());
      c.str_(name);
      c.int(target_table);
      c.int(backlink_col);
    });
  }

  pub fn erase_column(&mut self, col: u64) {
    self.emit(Op::EraseColumn, V, |c| {
      c.int(col);
    });
  }

  pub fn erase_link_column(&mut self, col: u64, target_table: u64, backlink_col: u64) {
    self.emit(Op::EraseLinkColumn, 3 * V, |c| {
      c.int(col);
      c.int(target_table);
      c.int(backlink_col);
    });
  }

  pub fn rename_column(&mut self, col: u64, name: &str) {
    self.emit(Op::RenameColumn, 2 * V + name.len(), |c| {
      c.int(col);
      c.str_(name);
    });
  }

  pub fn add_search_index(&mut self, col: u64) {
    self.emit(Op::AddSearchIndex, V, |c| {
      c.int(col);
    });
  }

  pub fn remove_search_index(&mut self, col: u64) {
    self.emit(Op::RemoveSearchIndex, V, |c| {
      c.int(col);
    });
  }

  pub fn add_primary_key(&mut self, col: u64) {
    self.emit(Op::AddPrimaryKey, V, |c| {
      c.int(col);
    });
  }

  pub fn remove_primary_key(&mut self) {
    self.emit(Op::RemovePrimaryKey, 0, |_| {});
  }

  pub fn set_link_type(&mut self, col: u64, ty: LinkType) {
    self.emit(Op::SetLinkType, 2 * V, |c| {
      c.int(col);
      c.int(ty.tag());
    });
  }

  // ---- 链接列表级 Link-list scope ----

  pub fn select_link_list(&mut self, col: u64, row: u64) {
    self.emit(Op::SelectLinkList, 2 * V, |c| {
      c.int(col);
      c.int(row);
    });
  }

  pub fn link_list_set(&mut self, ndx: u64, target_row: u64) {
    self.emit(Op::LinkListSet, 2 * V, |c| {
      c.int(ndx);
      c.int(target_row);
    });
  }

  pub fn link_list_insert(&mut self, ndx: u64, target_row: u64) {
    self.emit(Op::LinkListInsert, 2 * V, |c| {
      c.int(ndx);
      c.int(target_row);
    });
  }

  pub fn link_list_move(&mut self, from: u64, to: u64) {
    self.emit(Op::LinkListMove, 2 * V, |c| {
      c.int(from);
      c.int(to);
    });
  }

  pub fn link_list_erase(&mut self, ndx: u64) {
    self.emit(Op::LinkListErase, V, |c| {
      c.int(ndx);
    });
  }

  pub fn link_list_clear(&mut self) {
    self.emit(Op::LinkListClear, 0, |_| {});
  }

  /// 整体覆写：条数前缀 + 各目标行 Bulk overwrite: count prefix + target rows
  pub fn link_list_set_all(&mut self, targets: &[u64]) {
    self.emit(Op::LinkListSetAll, V + targets.len() * V, |c| {
      c.int(targets.len() as u64);
      for &row in targets {
        c.int(row);
      }
    });
  }
}
