//! Output buffers handed to the provider's update and finalize calls.

use zeroize::Zeroize;

use super::algorithm::{AeadAlgorithm, BlockCipherAlgorithm, AES_BLOCK_LEN};
use crate::error::{CryptoError, Result};

/// Capacity contract for the output of one transform (all update calls plus finalize).
pub trait OutputCapacity {
    /// Number of bytes which must be available for `input_len` input bytes.
    fn output_capacity(&self, input_len: usize) -> usize;
}

/// GCM and CCM are stream-like: update writes exactly the input length and finalize writes
/// nothing. One spare block is reserved anyway, so a provider emitting trailing bytes in
/// finalize cannot overrun the buffer.
impl OutputCapacity for AeadAlgorithm {
    fn output_capacity(&self, input_len: usize) -> usize {
        input_len.saturating_add(AES_BLOCK_LEN)
    }
}

/// Padded modes (ECB, CBC) may emit a full padding block in finalize, and the provider
/// requires one spare block on each update. Stream modes get the same slack.
impl OutputCapacity for BlockCipherAlgorithm {
    fn output_capacity(&self, input_len: usize) -> usize {
        input_len.saturating_add(AES_BLOCK_LEN)
    }
}

/// Zero initialized output buffer tracking how many bytes the provider has written.
/// Its content is wiped when dropped, so discarded plaintext does not linger in memory.
pub(crate) struct CipherBuffer {
    data: Vec<u8>,
    written: usize,
}

impl CipherBuffer {
    pub(crate) fn try_allocate(capacity: usize) -> Result<Self> {
        log::trace!("Trying to allocate buffer of size {capacity}");
        let mut data = Vec::new();
        data.try_reserve_exact(capacity)
            .map_err(|_| CryptoError::Allocation(capacity))?;
        data.resize(capacity, 0);

        Ok(Self { data, written: 0 })
    }

    /// The part of the buffer the provider may write to next
    pub(crate) fn unwritten(&mut self) -> &mut [u8] {
        &mut self.data[self.written..]
    }

    /// Records that the provider wrote `len` bytes into [`Self::unwritten`]
    pub(crate) fn advance(&mut self, len: usize) {
        debug_assert!(
            self.written + len <= self.data.len(),
            "provider reported more output than the buffer holds"
        );
        self.written = (self.written + len).min(self.data.len());
    }

    pub(crate) fn written(&self) -> usize {
        self.written
    }

    /// Hands out the written bytes, wiping the unused tail first
    pub(crate) fn into_written(mut self) -> Vec<u8> {
        let mut data = std::mem::take(&mut self.data);
        data[self.written..].zeroize();
        data.truncate(self.written);
        data
    }
}

impl Drop for CipherBuffer {
    fn drop(&mut self) {
        self.data.zeroize();
    }
}
