//! One-shot AES-GCM and AES-CCM encryption and decryption.

use std::fmt;

use super::{
    algorithm::{AeadAlgorithm, AeadParamsRef},
    buffer::{CipherBuffer, OutputCapacity},
    provider::{CipherContext, CryptoProvider, Direction},
    DefaultProvider,
};
use crate::error::{CryptoError, Result};

/// Authentication tag produced by encryption and required for decryption
pub type AuthTag = Vec<u8>;

/// Input of a single AEAD operation.
///
/// `data` is the plaintext when encrypting and the ciphertext (without tag) when decrypting.
/// An empty `aad` means no additional authenticated data.
#[derive(Clone, Copy)]
pub struct CipherRequest<'a> {
    pub algorithm: AeadAlgorithm,
    pub data: &'a [u8],
    pub key: &'a [u8],
    pub nonce: &'a [u8],
    pub aad: &'a [u8],
    /// length of the produced tag, and the only tag length accepted on decryption
    ///
    /// default: 16 bytes
    pub tag_len: usize,
}

impl<'a> CipherRequest<'a> {
    pub fn new(algorithm: AeadAlgorithm, key: &'a [u8], nonce: &'a [u8], data: &'a [u8]) -> Self {
        Self {
            algorithm,
            data,
            key,
            nonce,
            aad: &[],
            tag_len: algorithm.params().default_tag_len,
        }
    }

    pub fn with_aad(self, aad: &'a [u8]) -> Self {
        Self { aad, ..self }
    }

    pub fn with_tag_len(self, tag_len: usize) -> Self {
        Self { tag_len, ..self }
    }

    fn validate(&self) -> Result<AeadParamsRef> {
        let params = self.algorithm.params();
        params.check_key(self.key)?;
        params.check_nonce(self.nonce)?;
        params.check_tag_len(self.tag_len)?;

        Ok(params)
    }
}

impl fmt::Debug for CipherRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CipherRequest")
            .field("algorithm", &self.algorithm)
            .field("data", &format_args!("<{} bytes>", self.data.len()))
            .field("key", &format_args!("<{} bytes>", self.key.len()))
            .field("nonce", &self.nonce)
            .field("aad", &format_args!("<{} bytes>", self.aad.len()))
            .field("tag_len", &self.tag_len)
            .finish()
    }
}

/// Result of an AEAD encryption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedData {
    pub ciphertext: Vec<u8>,
    pub tag: AuthTag,
}

/// Drives AEAD encryption and decryption through a [`CryptoProvider`].
///
/// Holds no per-operation state: every call acquires its own cipher context and releases it
/// on return, so one instance may be shared between threads.
#[derive(Debug, Default, Clone)]
pub struct AeadCipher<P = DefaultProvider> {
    provider: P,
}

impl AeadCipher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: CryptoProvider> AeadCipher<P> {
    pub fn with_provider(provider: P) -> Self {
        Self { provider }
    }

    /// Encrypts `request.data`, authenticating it together with `request.aad`.
    /// Returns the ciphertext, which has the same length as the plaintext, and a tag of
    /// `request.tag_len` bytes.
    ///
    /// May fail with
    /// - [`CryptoError::KeyOrNonceRejected`]
    /// - [`CryptoError::ProviderInit`]
    /// - [`CryptoError::UpdateFailed`]
    /// - [`CryptoError::Allocation`]
    pub fn encrypt(&self, request: &CipherRequest) -> Result<SealedData> {
        let params = request.validate()?;
        log::trace!(
            "Encrypting {} bytes with {:?}",
            request.data.len(),
            params.algorithm
        );

        let mut ctx = self.acquire_context()?;
        init_context(&mut ctx, Direction::Encrypt, request, None)?;
        feed_aad(&mut ctx, request)?;

        let capacity = request.algorithm.output_capacity(request.data.len());
        let mut buffer = CipherBuffer::try_allocate(capacity)?;
        let written = ctx
            .update(request.data, buffer.unwritten())
            .map_err(CryptoError::update_failed)?;
        buffer.advance(written);

        let written = ctx
            .finalize(buffer.unwritten())
            .map_err(CryptoError::update_failed)?;
        buffer.advance(written);
        debug_assert!(
            buffer.written() == request.data.len(),
            "AEAD ciphertext has the same length as the plaintext"
        );

        let mut tag = vec![0u8; request.tag_len];
        ctx.tag(&mut tag).map_err(CryptoError::update_failed)?;

        Ok(SealedData {
            ciphertext: buffer.into_written(),
            tag,
        })
    }

    /// Decrypts `request.data` and verifies it together with `request.aad` against `tag`.
    /// The plaintext is only returned if the tag matches; otherwise it is wiped.
    ///
    /// May fail with
    /// - [`CryptoError::AuthenticationFailure`] if ciphertext, AAD or tag were tampered with,
    ///   or the tag length differs from `request.tag_len`
    /// - [`CryptoError::KeyOrNonceRejected`]
    /// - [`CryptoError::ProviderInit`]
    /// - [`CryptoError::UpdateFailed`]
    /// - [`CryptoError::Allocation`]
    pub fn decrypt(&self, request: &CipherRequest, tag: &[u8]) -> Result<Vec<u8>> {
        let params = request.validate()?;
        if tag.len() != request.tag_len {
            log::debug!(
                "Tag of {} bytes does not have the expected length {}, discarding",
                tag.len(),
                request.tag_len
            );
            return Err(CryptoError::AuthenticationFailure);
        }
        log::trace!(
            "Decrypting {} bytes with {:?}",
            request.data.len(),
            params.algorithm
        );

        let mut ctx = self.acquire_context()?;
        init_context(&mut ctx, Direction::Decrypt, request, Some(tag))?;
        feed_aad(&mut ctx, request)?;

        let capacity = request.algorithm.output_capacity(request.data.len());
        let mut buffer = CipherBuffer::try_allocate(capacity)?;
        match ctx.update(request.data, buffer.unwritten()) {
            Ok(written) => buffer.advance(written),
            // CCM verifies the tag while decrypting the data
            Err(_) if request.algorithm.is_ccm() => {
                log::debug!("Tags mismatching, discarding output.");
                return Err(CryptoError::AuthenticationFailure);
            }
            Err(err) => return Err(CryptoError::update_failed(err)),
        }

        if !request.algorithm.is_ccm() {
            ctx.set_tag(tag).map_err(CryptoError::rejected)?;
        }

        match ctx.finalize(buffer.unwritten()) {
            Ok(written) => buffer.advance(written),
            Err(_) => {
                log::debug!("Tags mismatching, discarding output.");
                return Err(CryptoError::AuthenticationFailure);
            }
        }

        Ok(buffer.into_written())
    }

    fn acquire_context(&self) -> Result<P::Context> {
        self.provider
            .new_context()
            .map_err(CryptoError::provider_init)
    }
}

/// Selects the cipher, sets the nonce length and, for CCM, the tag before key and nonce.
fn init_context<C: CipherContext>(
    ctx: &mut C,
    direction: Direction,
    request: &CipherRequest,
    expected_tag: Option<&[u8]>,
) -> Result<()> {
    ctx.init(direction, Some(request.algorithm.into()), None, None)
        .map_err(CryptoError::rejected)?;
    ctx.set_iv_length(request.nonce.len())
        .map_err(CryptoError::rejected)?;

    if request.algorithm.is_ccm() {
        let tag_set = match expected_tag {
            Some(tag) => ctx.set_tag(tag),
            None => ctx.set_tag_length(request.tag_len),
        };
        tag_set.map_err(CryptoError::rejected)?;
    }

    ctx.init(direction, None, Some(request.key), Some(request.nonce))
        .map_err(CryptoError::rejected)
}

/// CCM needs the message length before any AAD. Empty AAD skips the AAD step.
fn feed_aad<C: CipherContext>(ctx: &mut C, request: &CipherRequest) -> Result<()> {
    if request.algorithm.is_ccm() {
        ctx.set_data_len(request.data.len())
            .map_err(CryptoError::update_failed)?;
    }
    if !request.aad.is_empty() {
        ctx.update_aad(request.aad)
            .map_err(CryptoError::update_failed)?;
    }

    Ok(())
}
