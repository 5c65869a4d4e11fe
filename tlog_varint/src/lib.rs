#![cfg_attr(docsrs, feature(doc_cfg))]

//! 符号折叠变长整数编解码 Sign-folded variable-length integer codec
//!
//! 每字节 7 个数据位，除末字节外 bit 7 为续延标志；末字节 bit 6 存符号。
//! 负数 v 先折叠为幅值 -(v+1)，因此小负数与小正数字节数相同。
//!
//! 7 data bits per byte, continuation flag in bit 7 of all but the last
//! byte; the last byte stores the sign in bit 6. A negative v is folded
//! to magnitude -(v+1) first, so small negative numbers cost as few
//! bytes as small positive ones.

mod error;

pub use error::{E, R};

/// 末字节续延标志 Continuation flag
const CONT: u8 = 0x80;

/// 末字节符号位 Sign flag of the last byte
const SIGN: u8 = 0x40;

/// 类型位宽对应的最大编码字节数 Max encoded bytes for a bit width
///
/// 容量为 7*(n-1)+6 个幅值位，等价于 ceil((bits+1)/7)
/// Capacity is 7*(n-1)+6 magnitude bits, equals ceil((bits+1)/7)
#[inline]
pub const fn max_bytes(bits: u32) -> usize {
  ((bits + 7) / 7) as usize
}

/// 64 位整数的最大编码字节数 Max encoded bytes for 64-bit integers
pub const MAX_BYTES_64: usize = max_bytes(64);

/// 可变长编码的整数类型 Integer types with varint encoding
pub trait Varint: Copy + Sized {
  /// 编码字节数上限，用于缓冲区预留 Byte bound for buffer reservation
  const MAX_BYTES: usize;

  /// 折叠为 (负号, 幅值) Fold into (negative, magnitude)
  fn fold(self) -> (bool, u64);

  /// 从 (负号, 幅值) 还原，越界报错 Unfold, error when out of range
  fn unfold(neg: bool, mag: u64) -> R<Self>;
}

macro_rules! impl_signed {
  ($($t:ty),+ $(,)?) => {
    $(
      impl Varint for $t {
        const MAX_BYTES: usize = max_bytes(<$t>::BITS);

        #[inline]
        fn fold(self) -> (bool, u64) {
          let v = self as i64;
          if v < 0 {
            (true, (-(v + 1)) as u64)
          } else {
            (false, v as u64)
          }
        }

        #[inline]
        fn unfold(neg: bool, mag: u64) -> R<Self> {
          if mag > i64::MAX as u64 {
            return Err(E::Overflow);
          }
          let v = if neg { -(mag as i64) - 1 } else { mag as i64 };
          v.try_into().map_err(|_| E::Overflow)
        }
      }
    )+
  };
}

macro_rules! impl_unsigned {
  ($($t:ty),+ $(,)?) => {
    $(
      impl Varint for $t {
        const MAX_BYTES: usize = max_bytes(<$t>::BITS);

        #[inline]
        fn fold(self) -> (bool, u64) {
          (false, self as u64)
        }

        #[inline]
        fn unfold(neg: bool, mag: u64) -> R<Self> {
          // 无符号类型不存在负值 No negative values for unsigned types
          if neg {
            return Err(E::Overflow);
          }
          mag.try_into().map_err(|_| E::Overflow)
        }
      }
    )+
  };
}

impl_signed!(i8, i16, i32, i64);
impl_unsigned!(u8, u16, u32, u64);

/// 编码到缓冲区，返回写入字节数 Encode into buf, return bytes written
///
/// buf 长度须不小于 `T::MAX_BYTES`
/// buf must hold at least `T::MAX_BYTES` bytes
#[inline]
pub fn encode<T: Varint>(buf: &mut [u8], v: T) -> usize {
  let (neg, mut mag) = v.fold();
  let mut i = 0;
  while mag > 0x3F {
    buf[i] = (mag as u8 & 0x7F) | CONT;
    mag >>= 7;
    i += 1;
  }
  buf[i] = mag as u8 | if neg { SIGN } else { 0 };
  i + 1
}

/// 从切片解码，返回 (值, 消耗字节数) Decode from slice, return (value, bytes)
pub fn decode<T: Varint>(buf: &[u8]) -> R<(T, usize)> {
  let mut mag: u64 = 0;
  for i in 0..T::MAX_BYTES {
    let Some(&b) = buf.get(i) else {
      return Err(E::Truncated);
    };
    let shift = 7 * i as u32;
    if b & CONT != 0 {
      let part = (b & 0x7F) as u64;
      if part != 0 && (shift >= 64 || (part << shift) >> shift != part) {
        return Err(E::Overflow);
      }
      if shift < 64 {
        mag |= part << shift;
      }
    } else {
      let neg = b & SIGN != 0;
      let part = (b & 0x3F) as u64;
      if part != 0 && (shift >= 64 || (part << shift) >> shift != part) {
        return Err(E::Overflow);
      }
      if shift < 64 {
        mag |= part << shift;
      }
      return Ok((T::unfold(neg, mag)?, i + 1));
    }
  }
  // 续延位越过字节上限 Continuation past the byte bound
  Err(E::Overflow)
}
