//! Varint codec tests
//! 变长整数编解码测试

use aok::{OK, Void};
use log::trace;
use proptest::prelude::*;
use tlog_varint::{E, MAX_BYTES_64, Varint, decode, encode, max_bytes};

#[static_init::constructor(0)]
extern "C" fn _log_init() {
  log_init::init();
}

/// Encode then decode one value
/// 编码后再解码一个值
fn rt<T: Varint + PartialEq + std::fmt::Debug>(v: T) -> usize {
  let mut buf = [0u8; MAX_BYTES_64];
  let n = encode(&mut buf, v);
  assert!(n <= T::MAX_BYTES, "{v:?} used {n} bytes");
  let (back, used) = decode::<T>(&buf[..n]).unwrap();
  assert_eq!(back, v);
  assert_eq!(used, n);
  n
}

#[test]
fn test_bounds() -> Void {
  assert_eq!(max_bytes(8), 2);
  assert_eq!(max_bytes(16), 3);
  assert_eq!(max_bytes(32), 5);
  assert_eq!(max_bytes(64), 10);
  assert_eq!(MAX_BYTES_64, 10);

  // 8 位类型至多 2 字节 8-bit types never exceed 2 bytes
  for v in i8::MIN..=i8::MAX {
    assert!(rt(v) <= 2);
  }
  for v in u8::MIN..=u8::MAX {
    assert!(rt(v) <= 2);
  }

  // 64 位极值至多 10 字节 64-bit extremes never exceed 10 bytes
  assert_eq!(rt(i64::MIN), 10);
  assert_eq!(rt(i64::MAX), 10);
  assert_eq!(rt(u64::MAX), 10);

  trace!("bounds passed");
  OK
}

#[test]
fn test_edge_values() -> Void {
  rt(0i64);
  rt(-1i64);
  rt(63i64);
  rt(64i64);
  rt(-64i64);
  rt(-65i64);
  rt(i8::MIN);
  rt(i8::MAX);
  rt(i16::MIN);
  rt(i16::MAX);
  rt(i32::MIN);
  rt(i32::MAX);
  rt(u16::MAX);
  rt(u32::MAX);
  rt(0u64);
  rt(1u64 << 63);
  OK
}

#[test]
fn test_negative_compactness() -> Void {
  // -1 与 0 字节数相同 -1 costs the same bytes as 0
  assert_eq!(rt(-1i64), rt(0i64));
  assert_eq!(rt(-1i64), 1);

  // 小负数与小正数对称 Small negatives mirror small positives
  for m in 0u32..20 {
    let v = 1i64 << m;
    assert_eq!(rt(-v), rt(v - 1));
  }
  OK
}

#[test]
fn test_single_byte_wire() -> Void {
  let mut buf = [0u8; MAX_BYTES_64];

  assert_eq!(encode(&mut buf, 0i64), 1);
  assert_eq!(buf[0], 0x00);

  assert_eq!(encode(&mut buf, -1i64), 1);
  assert_eq!(buf[0], 0x40);

  assert_eq!(encode(&mut buf, 63i64), 1);
  assert_eq!(buf[0], 0x3F);

  // 64 需要一个续延字节 64 needs one continuation byte
  assert_eq!(encode(&mut buf, 64i64), 2);
  assert_eq!(buf[0], 0xC0);
  assert_eq!(buf[1], 0x00);
  OK
}

#[test]
fn test_truncated() -> Void {
  let mut buf = [0u8; MAX_BYTES_64];
  let n = encode(&mut buf, 1u64 << 40);
  assert!(n > 1);

  // 每个不完整前缀都报 Truncated Every incomplete prefix is Truncated
  for cut in 0..n {
    assert_eq!(decode::<u64>(&buf[..cut]).unwrap_err(), E::Truncated);
  }
  OK
}

#[test]
fn test_overflow_narrow_type() -> Void {
  let mut buf = [0u8; MAX_BYTES_64];

  // 300 不适配 u8/i8 300 does not fit u8/i8
  let n = encode(&mut buf, 300i64);
  assert_eq!(decode::<u8>(&buf[..n]).unwrap_err(), E::Overflow);
  assert_eq!(decode::<i8>(&buf[..n]).unwrap_err(), E::Overflow);

  // 128 适配 u8 不适配 i8 128 fits u8 but not i8
  let n = encode(&mut buf, 128i64);
  assert_eq!(decode::<u8>(&buf[..n]).unwrap().0, 128);
  assert_eq!(decode::<i8>(&buf[..n]).unwrap_err(), E::Overflow);
  OK
}

#[test]
fn test_negative_into_unsigned() -> Void {
  let mut buf = [0u8; MAX_BYTES_64];
  let n = encode(&mut buf, -5i64);
  assert_eq!(decode::<u64>(&buf[..n]).unwrap_err(), E::Overflow);
  OK
}

#[test]
fn test_continuation_past_bound() -> Void {
  // 10 个全续延字节超出 64 位上限 10 continuation bytes exceed the 64-bit bound
  let buf = [0x80u8; 10];
  assert_eq!(decode::<u64>(&buf).unwrap_err(), E::Overflow);

  // 高位幅值溢出 High magnitude bits overflow
  let buf = [0xFFu8, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x3F];
  assert_eq!(decode::<u64>(&buf).unwrap_err(), E::Overflow);
  OK
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(2000))]

  /// Round-trip over the full i64 domain
  /// i64 全域往返
  #[test]
  fn prop_i64(v in any::<i64>()) {
    rt(v);
  }

  /// Round-trip over the full u64 domain
  /// u64 全域往返
  #[test]
  fn prop_u64(v in any::<u64>()) {
    rt(v);
  }

  #[test]
  fn prop_i32(v in any::<i32>()) {
    rt(v);
  }

  #[test]
  fn prop_u32(v in any::<u32>()) {
    rt(v);
  }

  #[test]
  fn prop_i16(v in any::<i16>()) {
    rt(v);
  }

  #[test]
  fn prop_u16(v in any::<u16>()) {
    rt(v);
  }

  /// Wide and narrow decode agree when in range
  /// 值在窄类型范围内时，宽窄解码一致
  #[test]
  fn prop_cross_width(v in any::<i16>()) {
    let mut buf = [0u8; MAX_BYTES_64];
    let n = encode(&mut buf, v as i64);
    let (back, _) = decode::<i16>(&buf[..n]).unwrap();
    prop_assert_eq!(back, v);
  }
}
