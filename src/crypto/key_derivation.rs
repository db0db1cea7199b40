use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{
    algorithm::{BlockCipherAlgorithm, Digest},
    provider::CryptoProvider,
};
use crate::error::{CryptoError, Result};

/// Salt length consumed by the bytes-to-key construction
pub const BYTES_TO_KEY_SALT_LEN: usize = 8;

// Below this the derivation is little more than a single hash of the password
const WEAK_ROUND_COUNT: u32 = 1000;

/// Key and IV derived from a password, wiped from memory when dropped
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKeyMaterial {
    key: Vec<u8>,
    iv: Vec<u8>,
}

impl DerivedKeyMaterial {
    pub fn new(key: Vec<u8>, iv: Vec<u8>) -> Self {
        Self { key, iv }
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// empty for modes without IV, e.g. ECB
    pub fn iv(&self) -> &[u8] {
        &self.iv
    }
}

impl fmt::Debug for DerivedKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKeyMaterial")
            .field("key", &format_args!("<{} bytes>", self.key.len()))
            .field("iv", &format_args!("<{} bytes>", self.iv.len()))
            .finish()
    }
}

/// Derives key and IV for `algorithm` from `password` and `salt` by iterating `digest`
/// `rounds` times per output block (`EVP_BytesToKey`).
/// The result is a pure function of its inputs.
///
/// May fail with
/// - [`CryptoError::InvalidSaltLength`] if the salt is neither empty nor 8 bytes long
/// - [`CryptoError::KeyOrNonceRejected`] if `rounds` is zero or the provider rejects the parameters
pub fn derive_key_and_iv<P: CryptoProvider>(
    provider: &P,
    algorithm: BlockCipherAlgorithm,
    digest: Digest,
    password: &[u8],
    salt: &[u8],
    rounds: u32,
) -> Result<DerivedKeyMaterial> {
    let salt: Option<&[u8; BYTES_TO_KEY_SALT_LEN]> = match salt.len() {
        0 => None,
        _ => Some(
            salt.try_into()
                .map_err(|_| CryptoError::InvalidSaltLength(salt.len()))?,
        ),
    };

    if rounds == 0 {
        return Err(CryptoError::KeyOrNonceRejected(
            "key derivation needs at least one round".into(),
        ));
    }
    if rounds < WEAK_ROUND_COUNT {
        log::warn!("Deriving key with only {rounds} rounds, consider using at least {WEAK_ROUND_COUNT}");
    }
    if salt.is_none() {
        log::warn!("Deriving key without salt, identical passwords will yield identical keys");
    }

    let material = provider
        .bytes_to_key(algorithm, digest, password, salt, rounds)
        .map_err(CryptoError::rejected)?;

    if material.key().len() != algorithm.key_len() || material.iv().len() != algorithm.iv_len() {
        return Err(CryptoError::KeyOrNonceRejected(format!(
            "provider derived {} key and {} iv bytes for {algorithm:?}",
            material.key().len(),
            material.iv().len()
        )));
    }

    Ok(material)
}

/// Draws `len` bytes from the provider's CSPRNG
pub fn generate_salt<P: CryptoProvider>(provider: &P, len: usize) -> Result<Vec<u8>> {
    let mut salt = Vec::new();
    salt.try_reserve_exact(len)
        .map_err(|_| CryptoError::Allocation(len))?;
    salt.resize(len, 0);

    provider
        .fill_random(&mut salt)
        .map_err(CryptoError::provider_init)?;

    Ok(salt)
}
