//! 输出流抽象 Output sink abstraction
//!
//! 编码器每条指令只调用一次 reserve，写入后用 advance 提交，
//! 指令中途不会触发扩容。
//! The encoder calls reserve once per instruction and commits with
//! advance; no growth ever happens mid instruction.

/// 可增长输出流 Growable output sink
pub trait Sink {
  /// 预留至少 n 字节可写空间 Reserve at least n writable bytes
  fn reserve(&mut self, n: usize) -> &mut [u8];

  /// 提交实际写入的字节数 Commit the bytes actually written
  fn advance(&mut self, n: usize);

  /// 追加字节 Append bytes
  #[inline]
  fn append(&mut self, bytes: &[u8]) {
    let buf = self.reserve(bytes.len());
    buf[..bytes.len()].copy_from_slice(bytes);
    self.advance(bytes.len());
  }
}

/// 最小分配容量 Minimum allocation
const MIN_CAP: usize = 128;

/// 内存缓冲流，几何扩容 In-memory buffer sink with geometric growth
#[derive(Debug, Default)]
pub struct Buf {
  data: Vec<u8>,
  len: usize,
}

impl Buf {
  #[inline]
  pub fn new() -> Self {
    Self::default()
  }

  /// 已提交字节 Committed bytes
  #[inline]
  pub fn as_slice(&self) -> &[u8] {
    &self.data[..self.len]
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.len
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// 分配容量 Allocated capacity
  #[inline]
  pub fn cap(&self) -> usize {
    self.data.len()
  }

  #[inline]
  pub fn clear(&mut self) {
    self.len = 0;
  }

  /// 取出已提交字节 Take the committed bytes
  #[inline]
  pub fn into_vec(mut self) -> Vec<u8> {
    self.data.truncate(self.len);
    self.data
  }
}

impl Sink for Buf {
  #[inline]
  fn reserve(&mut self, n: usize) -> &mut [u8] {
    let need = self.len + n;
    if need > self.data.len() {
      // 几何扩容摊平长日志的拷贝成本
      // Geometric growth amortizes copies over long logs
      let cap = need.max(self.data.len() * 2).max(MIN_CAP);
      self.data.resize(cap, 0);
    }
    &mut self.data[self.len..]
  }

  #[inline]
  fn advance(&mut self, n: usize) {
    debug_assert!(self.len + n <= self.data.len());
    self.len += n;
  }
}

impl AsRef<[u8]> for Buf {
  #[inline]
  fn as_ref(&self) -> &[u8] {
    self.as_slice()
  }
}
