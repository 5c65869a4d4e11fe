//! 指令处理器 Instruction handler
//!
//! 解析器每解出一条指令就调用对应方法；返回 false 视为流损坏，
//! 解析中止。选择顺序的语义校验（如未选表即 set_int）由处理器负责，
//! 解析器只做语法解码。
//! The parser calls the matching method per decoded instruction;
//! false means the stream is corrupt and parsing aborts. Semantic
//! ordering (e.g. set_int before any select_table) is the handler's
//! job, the parser only decodes syntax.

use tlog_val::{DataType, LinkType, Mixed};

/// 指令处理器，方法与操作码一一对应 One method per opcode
pub trait Handler {
  // ---- 表级 Table scope ----

  fn insert_group_level_table(&mut self, table_ndx: u64, num_tables: u64, name: &str) -> bool;

  fn erase_group_level_table(&mut self, table_ndx: u64, num_tables: u64) -> bool;

  fn rename_group_level_table(&mut self, table_ndx: u64, name: &str) -> bool;

  fn select_table(&mut self, group_ndx: u64, path: &[(u64, u64)]) -> bool;

  // ---- 行级 Row scope ----

  fn set_int(&mut self, col: u64, row: u64, value: i64) -> bool;

  fn set_bool(&mut self, col: u64, row: u64, value: bool) -> bool;

  fn set_float(&mut self, col: u64, row: u64, value: f32) -> bool;

  fn set_double(&mut self, col: u64, row: u64, value: f64) -> bool;

  fn set_string(&mut self, col: u64, row: u64, value: &str) -> bool;

  fn set_binary(&mut self, col: u64, row: u64, value: &[u8]) -> bool;

  fn set_date_time(&mut self, col: u64, row: u64, value: i64) -> bool;

  fn set_table(&mut self, col: u64, row: u64) -> bool;

  fn set_mixed(&mut self, col: u64, row: u64, value: Mixed) -> bool;

  /// target_row 为 None 表示置空链接 None clears the link
  fn set_link(&mut self, col: u64, row: u64, target_row: Option<u64>) -> bool;

  fn insert_int(&mut self, col: u64, row: u64, prior_rows: u64, value: i64) -> bool;

  fn insert_bool(&mut self, col: u64, row: u64, prior_rows: u64, value: bool) -> bool;

  fn insert_float(&mut self, col: u64, row: u64, prior_rows: u64, value: f32) -> bool;

  fn insert_double(&mut self, col: u64, row: u64, prior_rows: u64, value: f64) -> bool;

  fn insert_string(&mut self, col: u64, row: u64, prior_rows: u64, value: &str) -> bool;

  fn insert_binary(&mut self, col: u64, row: u64, prior_rows: u64, value: &[u8]) -> bool;

  fn insert_date_time(&mut self, col: u64, row: u64, prior_rows: u64, value: i64) -> bool;

  fn insert_table(&mut self, col: u64, row: u64, prior_rows: u64) -> bool;

  fn insert_mixed(&mut self, col: u64, row: u64, prior_rows: u64, value: Mixed) -> bool;

  fn insert_link(&mut self, col: u64, row: u64, prior_rows: u64, target_row: Option<u64>) -> bool;

  fn insert_link_list(&mut self, col: u64, row: u64, prior_rows: u64) -> bool;

  fn row_insert_complete(&mut self) -> bool;

  fn insert_empty_rows(&mut self, row: u64, count: u64, prior_rows: u64, unordered: bool) -> bool;

  fn erase_rows(&mut self, row: u64, count: u64, prior_rows: u64, unordered: bool) -> bool;

  fn add_int_to_column(&mut self, col: u64, value: i64) -> bool;

  fn clear_table(&mut self) -> bool;

  fn optimize_table(&mut self) -> bool;

  // ---- 描述符级 Descriptor scope ----

  fn select_descriptor(&mut self, path: &[u64]) -> bool;

  fn insert_column(&mut self, col: u64, ty: DataType, name: &str) -> bool;

  fn insert_link_column(
    &mut self,
    col: u64,
    ty: DataType,
    name: &str,
    target_table: u64,
    backlink_col: u64,
  ) -> bool;

  fn erase_column(&mut self, col: u64) -> bool;

  fn erase_link_column(&mut self, col: u64, target_table: u64, backlink_col: u64) -> bool;

  fn rename_column(&mut self, col: u64, name: &str) -> bool;

  fn add_search_index(&mut self, col: u64) -> bool;

  fn remove_search_index(&mut self, col: u64) -> bool;

  fn add_primary_key(&mut self, col: u64) -> bool;

  fn remove_primary_key(&mut self) -> bool;

  fn set_link_type(&mut self, col: u64, ty: LinkType) -> bool;

  // ---- 链接列表级 Link-list scope ----

  fn select_link_list(&mut self, col: u64, row: u64) -> bool;

  fn link_list_set(&mut self, ndx: u64, target_row: u64) -> bool;

  fn link_list_insert(&mut self, ndx: u64, target_row: u64) -> bool;

  fn link_list_move(&mut self, from: u64, to: u64) -> bool;

  fn link_list_erase(&mut self, ndx: u64) -> bool;

  fn link_list_clear(&mut self) -> bool;

  fn link_list_set_all(&mut self, targets: &[u64]) -> bool;
}
