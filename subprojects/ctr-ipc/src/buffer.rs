//! Fixed-capacity command buffer.
//!
//! One sync request or response occupies a 64-word buffer at a well-known
//! offset inside the calling thread's communication area. The buffer is
//! exclusively owned by the calling context for the duration of the call,
//! which is why the accessors here take plain `&`/`&mut` with no locking.

use crate::header::Header;

/// Capacity of a command buffer in 32-bit words.
pub const COMMAND_BUFFER_WORDS: usize = 64;

/// Byte offset of the command buffer inside the per-thread communication
/// area.
pub const COMMAND_BUFFER_OFFSET: usize = 0x80;

/// A word-addressed IPC command buffer.
///
/// Word 0 is the packed [`Header`]; the remaining words hold normal and
/// translate parameters per the layout documented at the crate level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBuffer {
    words: [u32; COMMAND_BUFFER_WORDS],
}

impl CommandBuffer {
    /// Creates a zeroed command buffer.
    pub const fn new() -> Self {
        Self {
            words: [0; COMMAND_BUFFER_WORDS],
        }
    }

    /// Creates a command buffer from raw words, as read from the thread's
    /// communication area.
    pub const fn from_words(words: [u32; COMMAND_BUFFER_WORDS]) -> Self {
        Self { words }
    }

    /// Parses the header word.
    pub fn header(&self) -> Header {
        Header::from_raw(self.words[0])
    }

    /// Writes the header word.
    pub fn set_header(&mut self, raw: u32) {
        self.words[0] = raw;
    }

    /// All words of the buffer.
    pub fn as_words(&self) -> &[u32; COMMAND_BUFFER_WORDS] {
        &self.words
    }

    /// Mutable view of all words.
    pub fn as_words_mut(&mut self) -> &mut [u32; COMMAND_BUFFER_WORDS] {
        &mut self.words
    }
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl core::ops::Index<usize> for CommandBuffer {
    type Output = u32;

    fn index(&self, index: usize) -> &u32 {
        &self.words[index]
    }
}

impl core::ops::IndexMut<usize> for CommandBuffer {
    fn index_mut(&mut self, index: usize) -> &mut u32 {
        &mut self.words[index]
    }
}
