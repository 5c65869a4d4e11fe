//! 输入流抽象 Input source abstraction
//!
//! 解析器按块拉取输入，块可任意切分；空块表示输入结束。
//! The parser pulls input in blocks of arbitrary size; an empty
//! block signals end of input.

use crate::error::R;

/// 分块输入流 Chunked input source
///
/// 块借用自底层存储（mmap 日志、内存缓冲），与 &mut self 无关，
/// 解析器可跨次调用持有当前块。
/// Blocks borrow from the backing storage (mmap log, memory buffer),
/// independent of &mut self, so the parser may hold the current
/// block across calls.
pub trait Source<'a> {
  /// 下一块，空切片表示结束 Next block, empty slice means end
  fn next_block(&mut self) -> R<&'a [u8]>;
}

/// 单块输入 Whole log in one block
pub struct SliceSource<'a> {
  data: Option<&'a [u8]>,
}

impl<'a> SliceSource<'a> {
  #[inline]
  pub fn new(data: &'a [u8]) -> Self {
    Self { data: Some(data) }
  }
}

impl<'a> Source<'a> for SliceSource<'a> {
  #[inline]
  fn next_block(&mut self) -> R<&'a [u8]> {
    Ok(self.data.take().unwrap_or(&[]))
  }
}

/// 多块输入，用于跨块边界场景 Multi-block input for boundary cases
///
/// 跳过中间的空块，空块只在真正结束时出现
/// Interior empty chunks are skipped, empty only ever means the end
pub struct ChunkSource<'a> {
  chunks: Vec<&'a [u8]>,
  pos: usize,
}

impl<'a> ChunkSource<'a> {
  #[inline]
  pub fn new(chunks: Vec<&'a [u8]>) -> Self {
    Self { chunks, pos: 0 }
  }
}

impl<'a> Source<'a> for ChunkSource<'a> {
  #[inline]
  fn next_block(&mut self) -> R<&'a [u8]> {
    while let Some(&chunk) = self.chunks.get(self.pos) {
      self.pos += 1;
      if !chunk.is_empty() {
        return Ok(chunk);
      }
    }
    Ok(&[])
  }
}
