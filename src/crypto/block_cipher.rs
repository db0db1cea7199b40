//! Password based AES block cipher encryption (ECB, CBC, CFB, OFB, CTR).

use super::{
    algorithm::{BlockCipherAlgorithm, Digest},
    buffer::{CipherBuffer, OutputCapacity},
    key_derivation::{self, DerivedKeyMaterial},
    provider::{CipherContext, CryptoProvider, Direction},
    DefaultProvider,
};
use crate::error::{CryptoError, Result};

/// options for the password based cipher,
/// allows to create a [`PasswordBlockCipher`] object using [Into]/[From]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordCipherOptions {
    /// cipher and mode used for encryption, also decides the derived key and IV lengths
    ///
    /// default: [`BlockCipherAlgorithm::AES_256_CBC`]
    pub algorithm: BlockCipherAlgorithm,
    /// digest iterated by the key derivation
    ///
    /// default: [`Digest::Sha256`]
    pub digest: Digest,
    /// number of digest iterations per derived block
    ///
    /// default: `10000`
    pub rounds: u32,
}

impl Default for PasswordCipherOptions {
    fn default() -> Self {
        Self {
            algorithm: BlockCipherAlgorithm::AES_256_CBC,
            digest: Digest::Sha256,
            rounds: 10_000,
        }
    }
}

/// Encrypts and decrypts with key material derived from a password and salt.
///
/// Like [`crate::AeadCipher`] it keeps no state between calls.
/// Note that these modes provide confidentiality only, the ciphertext is not authenticated.
#[derive(Debug, Clone)]
pub struct PasswordBlockCipher<P = DefaultProvider> {
    provider: P,
    options: PasswordCipherOptions,
}

impl Default for PasswordBlockCipher {
    fn default() -> Self {
        PasswordCipherOptions::default().into()
    }
}

impl From<PasswordCipherOptions> for PasswordBlockCipher {
    fn from(options: PasswordCipherOptions) -> Self {
        PasswordBlockCipher::with_provider(DefaultProvider::default(), options)
    }
}

impl PasswordBlockCipher {
    /// creates a [`PasswordBlockCipher`] for the given algorithm with the default parameters
    pub fn with_algorithm(algorithm: BlockCipherAlgorithm) -> Self {
        log::debug!("Setting up password based cipher using {algorithm:?}");
        PasswordCipherOptions {
            algorithm,
            ..Default::default()
        }
        .into()
    }
}

impl<P: CryptoProvider> PasswordBlockCipher<P> {
    pub fn with_provider(provider: P, options: PasswordCipherOptions) -> Self {
        Self { provider, options }
    }

    pub fn options(&self) -> &PasswordCipherOptions {
        &self.options
    }

    /// Derives key and IV for the configured algorithm using the configured digest and rounds.
    /// See [`key_derivation::derive_key_and_iv`].
    pub fn derive_key_and_iv(&self, password: &[u8], salt: &[u8]) -> Result<DerivedKeyMaterial> {
        key_derivation::derive_key_and_iv(
            &self.provider,
            self.options.algorithm,
            self.options.digest,
            password,
            salt,
            self.options.rounds,
        )
    }

    /// Generates a random salt of `len` bytes, 8 bytes are consumed by the key derivation
    pub fn generate_salt(&self, len: usize) -> Result<Vec<u8>> {
        key_derivation::generate_salt(&self.provider, len)
    }

    /// Encrypts `plain_text`, padded modes append up to one block of PKCS#7 padding.
    ///
    /// May fail with
    /// - [`CryptoError::KeyOrNonceRejected`] if the material does not fit the algorithm
    /// - [`CryptoError::ProviderInit`]
    /// - [`CryptoError::UpdateFailed`]
    /// - [`CryptoError::Allocation`]
    pub fn encrypt(&self, plain_text: &[u8], material: &DerivedKeyMaterial) -> Result<Vec<u8>> {
        self.transform(Direction::Encrypt, plain_text, material)
    }

    /// Decrypts `cipher_text` and strips the padding of padded modes.
    ///
    /// May fail with
    /// - [`CryptoError::PaddingOrIntegrity`] if the padding is malformed
    /// - [`CryptoError::KeyOrNonceRejected`] if the material does not fit the algorithm
    /// - [`CryptoError::ProviderInit`]
    /// - [`CryptoError::UpdateFailed`]
    /// - [`CryptoError::Allocation`]
    pub fn decrypt(&self, cipher_text: &[u8], material: &DerivedKeyMaterial) -> Result<Vec<u8>> {
        self.transform(Direction::Decrypt, cipher_text, material)
    }

    /// Derives key and IV from `password` and `salt`, then encrypts `plain_text`
    pub fn encrypt_with_password(
        &self,
        plain_text: &[u8],
        password: &[u8],
        salt: &[u8],
    ) -> Result<Vec<u8>> {
        let material = self.derive_key_and_iv(password, salt)?;
        self.encrypt(plain_text, &material)
    }

    /// Derives key and IV from `password` and `salt`, then decrypts `cipher_text`
    pub fn decrypt_with_password(
        &self,
        cipher_text: &[u8],
        password: &[u8],
        salt: &[u8],
    ) -> Result<Vec<u8>> {
        let material = self.derive_key_and_iv(password, salt)?;
        self.decrypt(cipher_text, &material)
    }

    fn transform(
        &self,
        direction: Direction,
        input: &[u8],
        material: &DerivedKeyMaterial,
    ) -> Result<Vec<u8>> {
        let algorithm = self.options.algorithm;
        if material.key().len() != algorithm.key_len() || material.iv().len() != algorithm.iv_len()
        {
            return Err(CryptoError::KeyOrNonceRejected(format!(
                "{algorithm:?} requires {} key and {} iv bytes, got {} and {}",
                algorithm.key_len(),
                algorithm.iv_len(),
                material.key().len(),
                material.iv().len()
            )));
        }

        let mut ctx = self
            .provider
            .new_context()
            .map_err(CryptoError::provider_init)?;
        let iv = (!material.iv().is_empty()).then(|| material.iv());
        ctx.init(direction, Some(algorithm.into()), Some(material.key()), iv)
            .map_err(CryptoError::rejected)?;
        ctx.set_padding(algorithm.mode.is_padded());

        let mut buffer = CipherBuffer::try_allocate(algorithm.output_capacity(input.len()))?;
        let written = ctx
            .update(input, buffer.unwritten())
            .map_err(CryptoError::update_failed)?;
        buffer.advance(written);

        let written = ctx.finalize(buffer.unwritten()).map_err(|err| match direction {
            Direction::Encrypt => CryptoError::update_failed(err),
            Direction::Decrypt => {
                log::debug!("Finalizing decryption failed, provider error: {err}");
                CryptoError::PaddingOrIntegrity(err.to_string())
            }
        })?;
        buffer.advance(written);

        Ok(buffer.into_written())
    }
}
