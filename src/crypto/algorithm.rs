use crate::error::{CryptoError, Result};

pub(crate) const AES_BLOCK_LEN: usize = 16;

/// Depicts which AES based AEAD construction and key size is used
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum AeadAlgorithm {
    /// AES GCM with a 128 bit key
    AesGcm128,
    /// AES GCM with a 192 bit key
    AesGcm192,
    /// AES GCM with a 256 bit key
    AesGcm256,
    /// AES CCM with a 128 bit key
    AesCcm128,
    /// AES CCM with a 192 bit key
    AesCcm192,
    /// AES CCM with a 256 bit key
    AesCcm256,
}

/// The AEAD construction, which decides the order in which parameters are passed to the provider
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AeadMode {
    /// Galois/Counter Mode, nonce length and tag may be set independently
    Gcm,
    /// Counter with CBC-MAC, nonce length, tag length and message length are fixed up front
    Ccm,
}

/// Static parameters of an [`AeadAlgorithm`], all lengths in bytes
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct AeadParams {
    pub algorithm: AeadAlgorithm,
    pub mode: AeadMode,
    pub key_len: usize,
    pub default_nonce_len: usize,
    pub min_nonce_len: usize,
    pub max_nonce_len: usize,
    pub default_tag_len: usize,
    pub min_tag_len: usize,
    pub max_tag_len: usize,
}

pub type AeadParamsRef = &'static AeadParams;

const GCM_NONCE_LEN: usize = 12;
// Wider nonces are hashed down by GHASH anyway
const GCM_MAX_NONCE_LEN: usize = 128;
const CCM_NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

const fn gcm(algorithm: AeadAlgorithm, key_len: usize) -> AeadParams {
    AeadParams {
        algorithm,
        mode: AeadMode::Gcm,
        key_len,
        default_nonce_len: GCM_NONCE_LEN,
        min_nonce_len: 1,
        max_nonce_len: GCM_MAX_NONCE_LEN,
        default_tag_len: TAG_LEN,
        min_tag_len: 4,
        max_tag_len: TAG_LEN,
    }
}

const fn ccm(algorithm: AeadAlgorithm, key_len: usize) -> AeadParams {
    AeadParams {
        algorithm,
        mode: AeadMode::Ccm,
        key_len,
        default_nonce_len: CCM_NONCE_LEN,
        min_nonce_len: 7,
        max_nonce_len: 13,
        default_tag_len: TAG_LEN,
        min_tag_len: 4,
        max_tag_len: TAG_LEN,
    }
}

static AES_GCM_128: AeadParams = gcm(AeadAlgorithm::AesGcm128, 16);
static AES_GCM_192: AeadParams = gcm(AeadAlgorithm::AesGcm192, 24);
static AES_GCM_256: AeadParams = gcm(AeadAlgorithm::AesGcm256, 32);
static AES_CCM_128: AeadParams = ccm(AeadAlgorithm::AesCcm128, 16);
static AES_CCM_192: AeadParams = ccm(AeadAlgorithm::AesCcm192, 24);
static AES_CCM_256: AeadParams = ccm(AeadAlgorithm::AesCcm256, 32);

impl From<AeadAlgorithm> for AeadParamsRef {
    fn from(algorithm: AeadAlgorithm) -> Self {
        match algorithm {
            AeadAlgorithm::AesGcm128 => &AES_GCM_128,
            AeadAlgorithm::AesGcm192 => &AES_GCM_192,
            AeadAlgorithm::AesGcm256 => &AES_GCM_256,
            AeadAlgorithm::AesCcm128 => &AES_CCM_128,
            AeadAlgorithm::AesCcm192 => &AES_CCM_192,
            AeadAlgorithm::AesCcm256 => &AES_CCM_256,
        }
    }
}

impl AeadAlgorithm {
    /// the static parameters of this algorithm
    pub fn params(self) -> AeadParamsRef {
        self.into()
    }

    pub fn mode(self) -> AeadMode {
        self.params().mode
    }

    pub(crate) fn is_ccm(self) -> bool {
        self.mode() == AeadMode::Ccm
    }
}

impl AeadParams {
    pub(crate) fn check_key(&self, key: &[u8]) -> Result<()> {
        if key.len() != self.key_len {
            return Err(CryptoError::KeyOrNonceRejected(format!(
                "{:?} requires a key of {} bytes, got {}",
                self.algorithm,
                self.key_len,
                key.len()
            )));
        }
        Ok(())
    }

    pub(crate) fn check_nonce(&self, nonce: &[u8]) -> Result<()> {
        if !(self.min_nonce_len..=self.max_nonce_len).contains(&nonce.len()) {
            return Err(CryptoError::KeyOrNonceRejected(format!(
                "{:?} requires a nonce of {} to {} bytes, got {}",
                self.algorithm,
                self.min_nonce_len,
                self.max_nonce_len,
                nonce.len()
            )));
        }
        Ok(())
    }

    pub(crate) fn check_tag_len(&self, tag_len: usize) -> Result<()> {
        let in_range = (self.min_tag_len..=self.max_tag_len).contains(&tag_len);
        // CCM encodes (M-2)/2 into the flags byte
        let even = self.mode == AeadMode::Gcm || tag_len % 2 == 0;
        if !in_range || !even {
            return Err(CryptoError::KeyOrNonceRejected(format!(
                "{:?} does not support a tag of {} bytes",
                self.algorithm, tag_len
            )));
        }
        Ok(())
    }
}

/// AES key sizes for the non-AEAD block cipher modes
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum AesKeySize {
    Aes128,
    Aes192,
    Aes256,
}

impl AesKeySize {
    pub const fn key_len(self) -> usize {
        match self {
            AesKeySize::Aes128 => 16,
            AesKeySize::Aes192 => 24,
            AesKeySize::Aes256 => 32,
        }
    }
}

/// Non-AEAD block cipher modes of operation
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum BlockMode {
    /// electronic codebook, PKCS#7 padded, no IV
    Ecb,
    /// cipher block chaining, PKCS#7 padded
    Cbc,
    /// 128 bit cipher feedback
    Cfb128,
    /// output feedback
    Ofb,
    /// counter mode with a 128 bit big endian counter block
    Ctr,
}

impl BlockMode {
    /// true if the mode pads its input to full blocks, so finalize may emit an extra block
    pub const fn is_padded(self) -> bool {
        matches!(self, BlockMode::Ecb | BlockMode::Cbc)
    }

    pub const fn iv_len(self) -> usize {
        match self {
            BlockMode::Ecb => 0,
            BlockMode::Cbc | BlockMode::Cfb128 | BlockMode::Ofb | BlockMode::Ctr => AES_BLOCK_LEN,
        }
    }
}

/// An AES block cipher in a given mode, used by the password based cipher
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct BlockCipherAlgorithm {
    pub key_size: AesKeySize,
    pub mode: BlockMode,
}

impl BlockCipherAlgorithm {
    pub const AES_128_CBC: Self = Self::new(AesKeySize::Aes128, BlockMode::Cbc);
    pub const AES_192_CBC: Self = Self::new(AesKeySize::Aes192, BlockMode::Cbc);
    pub const AES_256_CBC: Self = Self::new(AesKeySize::Aes256, BlockMode::Cbc);
    pub const AES_256_CTR: Self = Self::new(AesKeySize::Aes256, BlockMode::Ctr);

    pub const fn new(key_size: AesKeySize, mode: BlockMode) -> Self {
        Self { key_size, mode }
    }

    pub const fn key_len(&self) -> usize {
        self.key_size.key_len()
    }

    pub const fn iv_len(&self) -> usize {
        self.mode.iv_len()
    }
}

/// Message digests usable for the bytes-to-key derivation
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Digest {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}
