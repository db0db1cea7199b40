//! OpenSSL based crypto provider, driving `EVP_CIPHER_CTX` through the rust-openssl bindings.
mod cipher_context;
mod key_derivation;

pub use cipher_context::OpensslCipherContext;

use openssl::cipher::{Cipher, CipherRef};

use crate::crypto::{
    algorithm::{AeadAlgorithm, AesKeySize, BlockCipherAlgorithm, BlockMode, Digest},
    key_derivation::DerivedKeyMaterial,
    provider::{CipherAlgorithm, CryptoProvider, ProviderError, ProviderResult},
};

/// Provider backed by the OpenSSL EVP API
#[derive(Debug, Default, Clone, Copy)]
pub struct OpensslProvider;

impl CryptoProvider for OpensslProvider {
    type Context = OpensslCipherContext;

    fn new_context(&self) -> ProviderResult<Self::Context> {
        OpensslCipherContext::new()
    }

    fn bytes_to_key(
        &self,
        algorithm: BlockCipherAlgorithm,
        digest: Digest,
        password: &[u8],
        salt: Option<&[u8; 8]>,
        rounds: u32,
    ) -> ProviderResult<DerivedKeyMaterial> {
        key_derivation::bytes_to_key(algorithm, digest, password, salt, rounds)
    }

    fn fill_random(&self, buffer: &mut [u8]) -> ProviderResult<()> {
        openssl::rand::rand_bytes(buffer)?;
        Ok(())
    }
}

impl From<openssl::error::ErrorStack> for ProviderError {
    fn from(err: openssl::error::ErrorStack) -> Self {
        ProviderError::new(err.to_string())
    }
}

impl From<CipherAlgorithm> for &'static CipherRef {
    fn from(algorithm: CipherAlgorithm) -> Self {
        match algorithm {
            CipherAlgorithm::Aead(algorithm) => algorithm.into(),
            CipherAlgorithm::Block(algorithm) => algorithm.into(),
        }
    }
}

impl From<AeadAlgorithm> for &'static CipherRef {
    fn from(algorithm: AeadAlgorithm) -> Self {
        match algorithm {
            AeadAlgorithm::AesGcm128 => Cipher::aes_128_gcm(),
            AeadAlgorithm::AesGcm192 => Cipher::aes_192_gcm(),
            AeadAlgorithm::AesGcm256 => Cipher::aes_256_gcm(),
            AeadAlgorithm::AesCcm128 => Cipher::aes_128_ccm(),
            AeadAlgorithm::AesCcm192 => Cipher::aes_192_ccm(),
            AeadAlgorithm::AesCcm256 => Cipher::aes_256_ccm(),
        }
    }
}

impl From<BlockCipherAlgorithm> for &'static CipherRef {
    fn from(algorithm: BlockCipherAlgorithm) -> Self {
        match (algorithm.key_size, algorithm.mode) {
            (AesKeySize::Aes128, BlockMode::Ecb) => Cipher::aes_128_ecb(),
            (AesKeySize::Aes128, BlockMode::Cbc) => Cipher::aes_128_cbc(),
            (AesKeySize::Aes128, BlockMode::Cfb128) => Cipher::aes_128_cfb128(),
            (AesKeySize::Aes128, BlockMode::Ofb) => Cipher::aes_128_ofb(),
            (AesKeySize::Aes128, BlockMode::Ctr) => Cipher::aes_128_ctr(),
            (AesKeySize::Aes192, BlockMode::Ecb) => Cipher::aes_192_ecb(),
            (AesKeySize::Aes192, BlockMode::Cbc) => Cipher::aes_192_cbc(),
            (AesKeySize::Aes192, BlockMode::Cfb128) => Cipher::aes_192_cfb128(),
            (AesKeySize::Aes192, BlockMode::Ofb) => Cipher::aes_192_ofb(),
            (AesKeySize::Aes192, BlockMode::Ctr) => Cipher::aes_192_ctr(),
            (AesKeySize::Aes256, BlockMode::Ecb) => Cipher::aes_256_ecb(),
            (AesKeySize::Aes256, BlockMode::Cbc) => Cipher::aes_256_cbc(),
            (AesKeySize::Aes256, BlockMode::Cfb128) => Cipher::aes_256_cfb128(),
            (AesKeySize::Aes256, BlockMode::Ofb) => Cipher::aes_256_ofb(),
            (AesKeySize::Aes256, BlockMode::Ctr) => Cipher::aes_256_ctr(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test_case(AeadAlgorithm::AesGcm128; "AesGcm128")]
    #[test_case(AeadAlgorithm::AesGcm192; "AesGcm192")]
    #[test_case(AeadAlgorithm::AesGcm256; "AesGcm256")]
    #[test_case(AeadAlgorithm::AesCcm128; "AesCcm128")]
    #[test_case(AeadAlgorithm::AesCcm192; "AesCcm192")]
    #[test_case(AeadAlgorithm::AesCcm256; "AesCcm256")]
    fn aead_key_len_matches_openssl(algorithm: AeadAlgorithm) {
        let cipher: &CipherRef = algorithm.into();
        assert_eq!(cipher.key_length(), algorithm.params().key_len);
    }

    #[test_case(BlockMode::Ecb; "Ecb")]
    #[test_case(BlockMode::Cbc; "Cbc")]
    #[test_case(BlockMode::Cfb128; "Cfb128")]
    #[test_case(BlockMode::Ofb; "Ofb")]
    #[test_case(BlockMode::Ctr; "Ctr")]
    fn block_cipher_lengths_match_openssl(mode: BlockMode) {
        for key_size in [AesKeySize::Aes128, AesKeySize::Aes192, AesKeySize::Aes256] {
            let algorithm = BlockCipherAlgorithm::new(key_size, mode);
            let cipher: &CipherRef = algorithm.into();
            assert_eq!(cipher.key_length(), algorithm.key_len());
            assert_eq!(cipher.iv_length(), algorithm.iv_len());
        }
    }

    #[test]
    fn fills_random_bytes() {
        let mut buffer = [0u8; 32];
        OpensslProvider.fill_random(&mut buffer).unwrap();
        assert_ne!(buffer, [0u8; 32]);
    }
}
