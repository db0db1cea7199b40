use std::path::PathBuf;

use crate::crypto::provider::ProviderError;

/// Represents either success(T) or an failure ([`CryptoError`])
pub type Result<T> = std::result::Result<T, CryptoError>;

/// Represents an error which has occured while driving the crypto provider
#[derive(PartialEq, Eq, Debug, thiserror::Error)]
pub enum CryptoError {
    /// the provider could not allocate a cipher context
    #[error("Unable to acquire a cipher context: {0}")]
    ProviderInit(String),

    /// key, nonce, tag length or algorithm were rejected before any data was processed
    #[error("Key or nonce rejected: {0}")]
    KeyOrNonceRejected(String),

    /// feeding AAD or data into the cipher context failed
    #[error("Failed to process data: {0}")]
    UpdateFailed(String),

    /// the authentication tag did not match, all output has been discarded
    #[error("Authentication failed")]
    AuthenticationFailure,

    /// finalizing a padded decryption failed, the ciphertext is malformed or corrupted
    #[error("Invalid padding or corrupted ciphertext: {0}")]
    PaddingOrIntegrity(String),

    /// an output buffer of the given size could not be allocated
    #[error("Unable to allocate buffer of size {0}")]
    Allocation(usize),

    /// the salt has a length the bytes-to-key derivation cannot consume
    #[error("Salt with length {0} is not supported, expected 8 bytes or none")]
    InvalidSaltLength(usize),

    /// a certificate file or directory does not exist
    #[error("Certificate location {} does not exist", .0.display())]
    CertificateLocationNotFound(PathBuf),

    /// the provider rejected a trust store setting
    #[error("Trust store configuration failed: {0}")]
    TrustStore(String),
}

impl CryptoError {
    /// true if decryption failed because the ciphertext, tag or AAD were not authentic
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, CryptoError::AuthenticationFailure)
    }

    pub(crate) fn provider_init(err: ProviderError) -> Self {
        log::debug!("Cipher context allocation failed, provider error: {err}");
        CryptoError::ProviderInit(err.to_string())
    }

    pub(crate) fn rejected(err: ProviderError) -> Self {
        log::debug!("Cipher parameters rejected, provider error: {err}");
        CryptoError::KeyOrNonceRejected(err.to_string())
    }

    pub(crate) fn update_failed(err: ProviderError) -> Self {
        log::debug!("Cipher update failed, provider error: {err}");
        CryptoError::UpdateFailed(err.to_string())
    }
}
