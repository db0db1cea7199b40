//! The capability the cipher drivers consume: an EVP style cipher context plus
//! bytes-to-key derivation and a CSPRNG.

use super::{
    algorithm::{AeadAlgorithm, BlockCipherAlgorithm, Digest},
    key_derivation::DerivedKeyMaterial,
};

/// Diagnostic string of a failed provider call, e.g. a rendered OpenSSL error stack
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ProviderError(String);

impl ProviderError {
    pub fn new<S: Into<String>>(message: S) -> Self {
        Self(message.into())
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Direction {
    Encrypt,
    Decrypt,
}

/// Any cipher a provider context can be initialized with
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CipherAlgorithm {
    Aead(AeadAlgorithm),
    Block(BlockCipherAlgorithm),
}

impl From<AeadAlgorithm> for CipherAlgorithm {
    fn from(algorithm: AeadAlgorithm) -> Self {
        CipherAlgorithm::Aead(algorithm)
    }
}

impl From<BlockCipherAlgorithm> for CipherAlgorithm {
    fn from(algorithm: BlockCipherAlgorithm) -> Self {
        CipherAlgorithm::Block(algorithm)
    }
}

/// A single use cipher context, released when dropped.
///
/// Mirrors the EVP protocol: `init` may be called several times, first selecting the cipher
/// and later providing key and IV once control parameters (IV length, CCM tag length) are set.
pub trait CipherContext {
    /// Initializes the context. `None` arguments leave the corresponding setting untouched.
    fn init(
        &mut self,
        direction: Direction,
        algorithm: Option<CipherAlgorithm>,
        key: Option<&[u8]>,
        iv: Option<&[u8]>,
    ) -> ProviderResult<()>;

    fn set_iv_length(&mut self, len: usize) -> ProviderResult<()>;

    /// Declares the tag length to produce, needed by CCM before the key is set
    fn set_tag_length(&mut self, len: usize) -> ProviderResult<()>;

    /// Installs the expected tag for decryption
    fn set_tag(&mut self, tag: &[u8]) -> ProviderResult<()>;

    /// Retrieves the tag after an encryption has been finalized, `tag.len()` bytes are written
    fn tag(&self, tag: &mut [u8]) -> ProviderResult<()>;

    /// Declares the total message length, needed by CCM before any AAD is passed
    fn set_data_len(&mut self, len: usize) -> ProviderResult<()>;

    fn set_padding(&mut self, padding: bool);

    /// Feeds additional authenticated data, no output is produced
    fn update_aad(&mut self, aad: &[u8]) -> ProviderResult<()>;

    /// Feeds data and returns the number of bytes written to `output`
    fn update(&mut self, input: &[u8], output: &mut [u8]) -> ProviderResult<usize>;

    /// Completes the transform and returns the number of trailing bytes written to `output`
    fn finalize(&mut self, output: &mut [u8]) -> ProviderResult<usize>;
}

/// A cryptographic provider, e.g. OpenSSL
pub trait CryptoProvider {
    type Context: CipherContext;

    fn new_context(&self) -> ProviderResult<Self::Context>;

    /// The classic bytes-to-key construction, byte compatible with `EVP_BytesToKey`
    fn bytes_to_key(
        &self,
        algorithm: BlockCipherAlgorithm,
        digest: Digest,
        password: &[u8],
        salt: Option<&[u8; 8]>,
        rounds: u32,
    ) -> ProviderResult<DerivedKeyMaterial>;

    /// Fills `buffer` from a cryptographically secure random number generator
    fn fill_random(&self, buffer: &mut [u8]) -> ProviderResult<()>;
}

#[cfg(test)]
pub(crate) mod test {
    //! A provider wrapping the default backend, counting live contexts and injecting failures

    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use super::*;
    use crate::crypto::DefaultProvider;

    type InnerContext = <DefaultProvider as CryptoProvider>::Context;

    #[derive(Debug, PartialEq, Eq, Clone, Copy)]
    pub enum FailurePoint {
        NewContext,
        Init,
        Aad,
        Update,
        Finalize,
    }

    #[derive(Default)]
    pub struct InstrumentedProvider {
        inner: DefaultProvider,
        live_contexts: Arc<AtomicUsize>,
        created_contexts: Arc<AtomicUsize>,
        fail_at: Option<FailurePoint>,
    }

    impl InstrumentedProvider {
        pub fn failing_at(fail_at: FailurePoint) -> Self {
            Self {
                fail_at: Some(fail_at),
                ..Default::default()
            }
        }

        pub fn live_contexts(&self) -> usize {
            self.live_contexts.load(Ordering::SeqCst)
        }

        pub fn created_contexts(&self) -> usize {
            self.created_contexts.load(Ordering::SeqCst)
        }
    }

    pub struct InstrumentedContext {
        inner: InnerContext,
        live_contexts: Arc<AtomicUsize>,
        fail_at: Option<FailurePoint>,
    }

    impl InstrumentedContext {
        fn inject(&self, point: FailurePoint) -> ProviderResult<()> {
            if self.fail_at == Some(point) {
                return Err(ProviderError::new(format!("injected failure at {point:?}")));
            }
            Ok(())
        }
    }

    impl Drop for InstrumentedContext {
        fn drop(&mut self) {
            self.live_contexts.fetch_sub(1, Ordering::SeqCst);
        }
    }

    impl CipherContext for InstrumentedContext {
        fn init(
            &mut self,
            direction: Direction,
            algorithm: Option<CipherAlgorithm>,
            key: Option<&[u8]>,
            iv: Option<&[u8]>,
        ) -> ProviderResult<()> {
            self.inject(FailurePoint::Init)?;
            self.inner.init(direction, algorithm, key, iv)
        }

        fn set_iv_length(&mut self, len: usize) -> ProviderResult<()> {
            self.inner.set_iv_length(len)
        }

        fn set_tag_length(&mut self, len: usize) -> ProviderResult<()> {
            self.inner.set_tag_length(len)
        }

        fn set_tag(&mut self, tag: &[u8]) -> ProviderResult<()> {
            self.inner.set_tag(tag)
        }

        fn tag(&self, tag: &mut [u8]) -> ProviderResult<()> {
            self.inner.tag(tag)
        }

        fn set_data_len(&mut self, len: usize) -> ProviderResult<()> {
            self.inner.set_data_len(len)
        }

        fn set_padding(&mut self, padding: bool) {
            self.inner.set_padding(padding);
        }

        fn update_aad(&mut self, aad: &[u8]) -> ProviderResult<()> {
            self.inject(FailurePoint::Aad)?;
            self.inner.update_aad(aad)
        }

        fn update(&mut self, input: &[u8], output: &mut [u8]) -> ProviderResult<usize> {
            self.inject(FailurePoint::Update)?;
            self.inner.update(input, output)
        }

        fn finalize(&mut self, output: &mut [u8]) -> ProviderResult<usize> {
            self.inject(FailurePoint::Finalize)?;
            self.inner.finalize(output)
        }
    }

    impl CryptoProvider for InstrumentedProvider {
        type Context = InstrumentedContext;

        fn new_context(&self) -> ProviderResult<Self::Context> {
            if self.fail_at == Some(FailurePoint::NewContext) {
                return Err(ProviderError::new("injected allocation failure"));
            }
            let inner = self.inner.new_context()?;
            self.live_contexts.fetch_add(1, Ordering::SeqCst);
            self.created_contexts.fetch_add(1, Ordering::SeqCst);

            Ok(InstrumentedContext {
                inner,
                live_contexts: self.live_contexts.clone(),
                fail_at: self.fail_at,
            })
        }

        fn bytes_to_key(
            &self,
            algorithm: BlockCipherAlgorithm,
            digest: Digest,
            password: &[u8],
            salt: Option<&[u8; 8]>,
            rounds: u32,
        ) -> ProviderResult<DerivedKeyMaterial> {
            self.inner
                .bytes_to_key(algorithm, digest, password, salt, rounds)
        }

        fn fill_random(&self, buffer: &mut [u8]) -> ProviderResult<()> {
            self.inner.fill_random(buffer)
        }
    }
}
