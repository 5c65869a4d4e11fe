#![cfg_attr(docsrs, feature(doc_cfg))]

//! 事务日志值模型 Transaction log value model
//!
//! 线上标签值是兼容面的一部分，不可重新编号
//! Wire tag values are part of the compatibility surface, never renumber

mod error;

use hipstr::{HipByt, HipStr};
use ordered_float::OrderedFloat;

pub use error::{E, R};

/// 列数据类型，判别值即线上标签 Column data type, discriminant is the wire tag
///
/// 3、8、11 为历史空洞 Gaps at 3, 8, 11 are historical
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
  Int = 0,
  Bool = 1,
  String = 2,
  Binary = 4,
  Table = 5,
  Mixed = 6,
  DateTime = 7,
  Float = 9,
  Double = 10,
  Link = 12,
  LinkList = 13,
}

impl DataType {
  /// 线上标签 Wire tag
  #[inline]
  pub const fn tag(self) -> u64 {
    self as u64
  }
}

impl TryFrom<u64> for DataType {
  type Error = E;

  #[inline]
  fn try_from(v: u64) -> R<Self> {
    Ok(match v {
      0 => Self::Int,
      1 => Self::Bool,
      2 => Self::String,
      4 => Self::Binary,
      5 => Self::Table,
      6 => Self::Mixed,
      7 => Self::DateTime,
      9 => Self::Float,
      10 => Self::Double,
      12 => Self::Link,
      13 => Self::LinkList,
      _ => return Err(E::BadDataType(v)),
    })
  }
}

/// 链接列强弱类型 Link column strength
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkType {
  Strong = 0,
  Weak = 1,
}

impl LinkType {
  /// 线上标签 Wire tag
  #[inline]
  pub const fn tag(self) -> u64 {
    self as u64
  }
}

impl TryFrom<u64> for LinkType {
  type Error = E;

  #[inline]
  fn try_from(v: u64) -> R<Self> {
    Ok(match v {
      0 => Self::Strong,
      1 => Self::Weak,
      _ => return Err(E::BadLinkType(v)),
    })
  }
}

/// 混合单元格值 Mixed cell value
///
/// 封闭和类型：Mixed 套 Mixed 及 Link/LinkList 载荷在构造上不可表达
/// Closed sum type: Mixed-in-Mixed and Link/LinkList payloads are
/// unrepresentable by construction
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Mixed {
  Int(i64),
  Bool(bool),
  Float(OrderedFloat<f32>),
  Double(OrderedFloat<f64>),
  DateTime(i64),
  Str(HipStr<'static>),
  Bin(HipByt<'static>),
  /// 空子表标记，无载荷 Empty subtable marker, no payload
  Table,
}

impl Mixed {
  /// 对应的数据类型标签 Matching data type tag
  #[inline]
  pub const fn data_type(&self) -> DataType {
    match self {
      Self::Int(_) => DataType::Int,
      Self::Bool(_) => DataType::Bool,
      Self::Float(_) => DataType::Float,
      Self::Double(_) => DataType::Double,
      Self::DateTime(_) => DataType::DateTime,
      Self::Str(_) => DataType::String,
      Self::Bin(_) => DataType::Binary,
      Self::Table => DataType::Table,
    }
  }
}

// From trait implementations for convenient conversions
// From trait 实现以便于转换

macro_rules! impl_from_mixed {
  ($($src:ty => $variant:ident),+ $(,)?) => {
    $(
      impl From<$src> for Mixed {
        #[inline]
        fn from(v: $src) -> Self {
          Mixed::$variant(v.into())
        }
      }
    )+
  };
}

impl_from_mixed! {
  i64 => Int,
  bool => Bool,
  &str => Str,
  String => Str,
  HipStr<'static> => Str,
  &[u8] => Bin,
  Vec<u8> => Bin,
  HipByt<'static> => Bin,
}

// 浮点用 OrderedFloat 包装以获得 Eq
// Floats wrapped in OrderedFloat for Eq
impl From<f32> for Mixed {
  #[inline]
  fn from(v: f32) -> Self {
    Mixed::Float(OrderedFloat(v))
  }
}

impl From<f64> for Mixed {
  #[inline]
  fn from(v: f64) -> Self {
    Mixed::Double(OrderedFloat(v))
  }
}
