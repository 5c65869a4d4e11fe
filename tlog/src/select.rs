//! 选择状态便捷层 Selection-state convenience layer
//!
//! 缓存当前选中的表 / 描述符 / 链接列表，目标变化时才补发
//! select 指令；同一目标的连续 N 次操作只产生一条 select。
//! Caches the selected table / descriptor / link list and emits a
//! select instruction only when the target changes; N consecutive
//! operations on one target cost a single select.
//!
//! 身份用代际句柄而非索引：索引在并发变更下漂移，裸指针可能悬垂。
//! Identity is a generation-counted handle, not an index: indices
//! shift under mutation and raw pointers can dangle.

use tlog_val::{DataType, LinkType, Mixed};

use crate::{encode::Encoder, sink::Sink};

/// 代际身份句柄 Generation-counted identity handle
///
/// id 为槽位，ver 每次复用递增，槽位复用后旧句柄不再相等
/// id is the slot, ver bumps on reuse so a recycled slot never
/// matches a stale handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
  pub id: u64,
  pub ver: u64,
}

impl Key {
  #[inline]
  pub const fn new(id: u64, ver: u64) -> Self {
    Self { id, ver }
  }
}

/// 表目标：顶层索引 + 子表路径 Table target: root index + subtable path
#[derive(Debug, Clone, Copy)]
pub struct TableRef<'a> {
  pub key: Key,
  pub group_ndx: u64,
  /// 自顶层到目标的 (列,行) 对 (col,row) pairs from the root down
  pub path: &'a [(u64, u64)],
}

/// 描述符目标：相对选中表的列路径 Descriptor target: column path inside the table
#[derive(Debug, Clone, Copy)]
pub struct DescRef<'a> {
  pub key: Key,
  pub path: &'a [u64],
}

/// 链接列表目标 Link-list target
#[derive(Debug, Clone, Copy)]
pub struct ListRef {
  pub key: Key,
  pub col: u64,
  pub row: u64,
}

/// 带选择缓存的日志写入器 Log writer with a selection cache
///
/// 任一时刻只缓存 {无, 表, 表+描述符, 表+链接列表} 之一
/// At most one of {none, table, table+descriptor, table+link-list}
/// is cached at any time
pub struct LogWriter<S: Sink> {
  enc: Encoder<S>,
  table: Option<Key>,
  desc: Option<Key>,
  list: Option<Key>,
}

impl<S: Sink> LogWriter<S> {
  #[inline]
  pub fn new(sink: S) -> Self {
    Self {
      enc: Encoder::new(sink),
      table: None,
      desc: None,
      list: None,
    }
  }

  #[inline]
  pub fn sink(&self) -> &S {
    self.enc.sink()
  }

  #[inline]
  pub fn into_sink(self) -> S {
    self.enc.into_sink()
  }

  /// 需要时补发 SelectTable Emit SelectTable when needed
  fn table(&mut self, t: &TableRef) {
    if self.table != Some(t.key) {
      self.enc.select_table(t.group_ndx, t.path);
      self.table = Some(t.key);
      self.desc = None;
      self.list = None;
    }
  }

  /// 需要时补发 SelectDescriptor Emit SelectDescriptor when needed
  fn desc(&mut self, t: &TableRef, d: &DescRef) {
    self.table(t);
    if self.desc != Some(d.key) {
      self.enc.select_descriptor(d.path);
      self.desc = Some(d.key);
      self.list = None;
    }
  }

  /// 需要时补发 SelectLinkList Emit SelectLinkList when needed
  fn list(&mut self, t: &TableRef, l: &ListRef) {
    self.table(t);
    if self.list != Some(l.key) {
      self.enc.select_link_list(l.col, l.row);
      self.list = Some(l.key);
      self.desc = None;
    }
  }

  // ---- 失效钩子 Invalidation hooks ----

  /// 表销毁后清除匹配缓存 Clear matching cache after a table is gone
  pub fn on_table_gone(&mut self, key: Key) {
    if self.table == Some(key) {
      self.table = None;
      self.desc = None;
      self.list = None;
    }
  }

  pub fn on_desc_gone(&mut self, key: Key) {
    if self.desc == Some(key) {
      self.desc = None;
    }
  }

  pub fn on_list_gone(&mut self, key: Key) {
    if self.list == Some(key) {
      self.list = None;
    }
  }

  // ---- 表级 DDL，无需选择 Table DDL, no selection needed ----

  #[inline]
  pub fn insert_group_level_table(&mut self, table_ndx: u64, num_tables: u64, name: &str) {
    self.enc.insert_group_level_table(table_ndx, num_tables, name);
  }

  #[inline]
  pub fn erase_group_level_table(&mut self, table_ndx: u64, num_tables: u64) {
    self.enc.erase_group_level_table(table_ndx, num_tables);
  }

  #[inline]
  pub fn rename_group_level_table(&mut self, table_ndx: u64, name: &str) {
    self.enc.rename_group_level_table(table_ndx, name);
  }

  // ---- 行级 Row scope ----

  pub fn set_int(&mut self, t: &TableRef, col: u64, row: u64, value: i64) {
    self.table(t);
    self.enc.set_int(col, row, value);
  }

  pub fn set_bool(&mut self, t: &TableRef, col: u64, row: u64, value: bool) {
    self.table(t);
    self.enc.set_bool(col, row, value);
  }

  pub fn set_float(&mut self, t: &TableRef, col: u64, row: u64, value: f32) {
    self.table(t);
    self.enc.set_float(col, row, value);
  }

  pub fn set_double(&mut self, t: &TableRef, col: u64, row: u64, value: f64) {
    self.table(t);
    self.enc.set_double(col, row, value);
  }

  pub fn set_string(&mut self, t: &TableRef, col: u64, row: u64, value: &str) {
    self.table(t);
    self.enc.set_string(col, row, value);
  }

  pub fn set_binary(&mut self, t: &TableRef, col: u64, row: u64, value: &[u8]) {
    self.table(t);
    self.enc.set_binary(col, row, value);
  }

  pub fn set_date_time(&mut self, t: &TableRef, col: u64, row: u64, value: i64) {
    self.table(t);
    self.enc.set_date_time(col, row, value);
  }

  pub fn set_table(&mut self, t: &TableRef, col: u64, row: u64) {
    self.table(t);
    self.enc.set_table(col, row);
  }

  pub fn set_mixed(&mut self, t: &TableRef, col: u64, row: u64, value: &Mixed) {
    self.table(t);
    self.enc.set_mixed(col, row, value);
  }

  pub fn set_link(&mut self, t: &TableRef, col: u64, row: u64, target_row: Option<u64>) {
    self.table(t);
    self.enc.set_link(col, row, target_row);
  }

  pub fn insert_int(&mut self, t: &TableRef, col: u64, row: u64, prior_rows: u64, value: i64) {
    self.table(t);
    self.enc.insert_int(col, row, prior_rows, value);
  }

  pub fn insert_bool(&mut self, t: &TableRef, col: u64, row: u64, prior_rows: u64, value: bool) {
    self.table(t);
    self.enc.insert_bool(col, row, prior_rows, value);
  }

  pub fn insert_float(&mut self, t: &TableRef, col: u64, row: u64, prior_rows: u64, value: f32) {
    self.table(t);
    self.enc.insert_float(col, row, prior_rows, value);
  }

  pub fn insert_double(&mut self, t: &TableRef, col: u64, row: u64, prior_rows: u64, value: f64) {
    self.table(t);
    self.enc.insert_double(col, row, prior_rows, value);
  }

  pub fn insert_string(&mut self, t: &TableRef, col: u64, row: u64, prior_rows: u64, value: &str) {
    self.table(t);
    self.enc.insert_string(col, row, prior_rows, value);
  }

  pub fn insert_binary(&mut self, t: &TableRef, col: u64, row: u64, prior_rows: u64, value: &[u8]) {
    self.table(t);
    self.enc.insert_binary(col, row, prior_rows, value);
  }

  pub fn insert_date_time(&mut self, t: &TableRef, col: u64, row: u64, prior_rows: u64, value: i64) {
    self.table(t);
    self.enc.insert_date_time(col, row, prior_rows, value);
  }

  pub fn insert_table(&mut self, t: &TableRef, col: u64, row: u64, prior_rows: u64) {
    self.table(t);
    self.enc.insert_table(col, row, prior_rows);
  }

  pub fn insert_mixed(&mut self, t: &TableRef, col: u64, row: u64, prior_rows: u64, value: &Mixed) {
    self.table(t);
    self.enc.insert_mixed(col, row, prior_rows, value);
  }

  pub fn insert_link(
    &mut self,
    t: &TableRef,
    col: u64,
    row: u64,
    prior_rows: u64,
    target_row: Option<u64>,
  ) {
    self.table(t);
    self.enc.insert_link(col, row, prior_rows, target_row);
  }

  pub fn insert_link_list(&mut self, t: &TableRef, col: u64, row: u64, prior_rows: u64) {
    self.table(t);
    self.enc.insert_link_list(col, row, prior_rows);
  }

  pub fn row_insert_complete(&mut self, t: &TableRef) {
    self.table(t);
    self.enc.row_insert_complete();
  }

  pub fn insert_empty_rows(
    &mut self,
    t: &TableRef,
    row: u64,
    count: u64,
    prior_rows: u64,
    unordered: bool,
  ) {
    self.table(t);
    self.enc.insert_empty_rows(row, count, prior_rows, unordered);
  }

  pub fn erase_rows(
    &mut self,
    t: &TableRef,
    row: u64,
    count: u64,
    prior_rows: u64,
    unordered: bool,
  ) {
    self.table(t);
    self.enc.erase_rows(row, count, prior_rows, unordered);
  }

  pub fn add_int_to_column(&mut self, t: &TableRef, col: u64, value: i64) {
    self.table(t);
    self.enc.add_int_to_column(col, value);
  }

  pub fn clear_table(&mut self, t: &TableRef) {
    self.table(t);
    self.enc.clear_table();
  }

  pub fn optimize_table(&mut self, t: &TableRef) {
    self.table(t);
    self.enc.optimize_table();
  }

  // ---- 描述符级 Descriptor scope ----

  pub fn insert_column(&mut self, t: &TableRef, d: &DescRef, col: u64, ty: DataType, name: &str) {
    self.desc(t, d);
    self.enc.insert_column(col, ty, name);
  }

  #[allow(clippy::too_many_arguments)]
  pub fn insert_link_column(
    &mut self,
    t: &TableRef,
    d: &DescRef,
    col: u64,
    ty: DataType,
    name: &str,
    target_table: u64,
    backlink_col: u64,
  ) {
    self.desc(t, d);
    self
      .enc
      .insert_link_column(col, ty, name, target_table, backlink_col);
  }

  pub fn erase_column(&mut self, t: &TableRef, d: &DescRef, col: u64) {
    self.desc(t, d);
    self.enc.erase_column(col);
  }

  pub fn erase_link_column(
    &mut self,
    t: &TableRef,
    d: &DescRef,
    col: u64,
    target_table: u64,
    backlink_col: u64,
  ) {
    self.desc(t, d);
    self.enc.erase_link_column(col, target_table, backlink_col);
  }

  pub fn rename_column(&mut self, t: &TableRef, d: &DescRef, col: u64, name: &str) {
    self.desc(t, d);
    self.enc.rename_column(col, name);
  }

  pub fn add_search_index(&mut self, t: &TableRef, d: &DescRef, col: u64) {
    self.desc(t, d);
    self.enc.add_search_index(col);
  }

  pub fn remove_search_index(&mut self, t: &TableRef, d: &DescRef, col: u64) {
    self.desc(t, d);
    self.enc.remove_search_index(col);
  }

  pub fn add_primary_key(&mut self, t: &TableRef, d: &DescRef, col: u64) {
    self.desc(t, d);
    self.enc.add_primary_key(col);
  }

  pub fn remove_primary_key(&mut self, t: &TableRef, d: &DescRef) {
    self.desc(t, d);
    self.enc.remove_primary_key();
  }

  pub fn set_link_type(&mut self, t: &TableRef, d: &DescRef, col: u64, ty: LinkType) {
    self.desc(t, d);
    self.enc.set_link_type(col, ty);
  }

  // ---- 链接列表级 Link-list scope ----

  pub fn link_list_set(&mut self, t: &TableRef, l: &ListRef, ndx: u64, target_row: u64) {
    self.list(t, l);
    self.enc.link_list_set(ndx, target_row);
  }

  pub fn link_list_insert(&mut self, t: &TableRef, l: &ListRef, ndx: u64, target_row: u64) {
    self.list(t, l);
    self.enc.link_list_insert(ndx, target_row);
  }

  pub fn link_list_move(&mut self, t: &TableRef, l: &ListRef, from: u64, to: u64) {
    self.list(t, l);
    self.enc.link_list_move(from, to);
  }

  pub fn link_list_erase(&mut self, t: &TableRef, l: &ListRef, ndx: u64) {
    self.list(t, l);
    self.enc.link_list_erase(ndx);
  }

  pub fn link_list_clear(&mut self, t: &TableRef, l: &ListRef) {
    self.list(t, l);
    self.enc.link_list_clear();
  }

  pub fn link_list_set_all(&mut self, t: &TableRef, l: &ListRef, targets: &[u64]) {
    self.list(t, l);
    self.enc.link_list_set_all(targets);
  }
}
