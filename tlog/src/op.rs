//! 指令操作码 Instruction opcodes
//!
//! 数值 1-49 是日志兼容面的一部分，不可重新编号
//! Values 1-49 are part of the log compatibility surface, never renumber

use crate::error::{E, R};

macro_rules! def_op {
  ($($name:ident = $val:literal),+ $(,)?) => {
    /// 指令操作码，按作用域分组：表级 DDL、行、描述符、链接列表
    /// Instruction opcode, grouped by scope: table DDL, row, descriptor, link list
    #[repr(u8)]
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub enum Op {
      $($name = $val),+
    }

    impl TryFrom<u8> for Op {
      type Error = E;

      #[inline]
      fn try_from(b: u8) -> R<Self> {
        match b {
          $($val => Ok(Op::$name),)+
          _ => Err(E::BadOp(b)),
        }
      }
    }
  };
}

def_op! {
  // 表级 Table scope
  InsertGroupLevelTable = 1,
  EraseGroupLevelTable = 2,
  RenameGroupLevelTable = 3,
  SelectTable = 4,
  // 行级，要求已选中表 Row scope, requires a selected table
  SetInt = 5,
  SetBool = 6,
  SetFloat = 7,
  SetDouble = 8,
  SetString = 9,
  SetBinary = 10,
  SetDateTime = 11,
  SetTable = 12,
  SetMixed = 13,
  SetLink = 14,
  InsertInt = 15,
  InsertBool = 16,
  InsertFloat = 17,
  InsertDouble = 18,
  InsertString = 19,
  InsertBinary = 20,
  InsertDateTime = 21,
  InsertTable = 22,
  InsertMixed = 23,
  InsertLink = 24,
  InsertLinkList = 25,
  RowInsertComplete = 26,
  InsertEmptyRows = 27,
  EraseRows = 28,
  AddIntToColumn = 29,
  ClearTable = 30,
  OptimizeTable = 31,
  // 描述符级，要求已选中描述符 Descriptor scope, requires a selected descriptor
  SelectDescriptor = 32,
  InsertColumn = 33,
  InsertLinkColumn = 34,
  EraseColumn = 35,
  EraseLinkColumn = 36,
  RenameColumn = 37,
  AddSearchIndex = 38,
  RemoveSearchIndex = 39,
  AddPrimaryKey = 40,
  RemovePrimaryKey = 41,
  SetLinkType = 42,
  // 链接列表级，要求已选中链接列表 Link-list scope, requires a selected link list
  SelectLinkList = 43,
  LinkListSet = 44,
  LinkListInsert = 45,
  LinkListMove = 46,
  LinkListErase = 47,
  LinkListClear = 48,
  LinkListSetAll = 49,
}
