use openssl::{hash::MessageDigest, symm::Cipher};

use crate::crypto::{
    algorithm::{AesKeySize, BlockCipherAlgorithm, BlockMode, Digest},
    key_derivation::DerivedKeyMaterial,
    provider::{ProviderError, ProviderResult},
};

pub(super) fn bytes_to_key(
    algorithm: BlockCipherAlgorithm,
    digest: Digest,
    password: &[u8],
    salt: Option<&[u8; 8]>,
    rounds: u32,
) -> ProviderResult<DerivedKeyMaterial> {
    let count = i32::try_from(rounds)
        .map_err(|_| ProviderError::new(format!("round count {rounds} exceeds i32::MAX")))?;

    let pair = openssl::pkcs5::bytes_to_key(
        algorithm.into(),
        digest.into(),
        password,
        salt.map(|salt| &salt[..]),
        count,
    )?;

    Ok(DerivedKeyMaterial::new(pair.key, pair.iv.unwrap_or_default()))
}

impl From<Digest> for MessageDigest {
    fn from(digest: Digest) -> Self {
        match digest {
            Digest::Md5 => MessageDigest::md5(),
            Digest::Sha1 => MessageDigest::sha1(),
            Digest::Sha224 => MessageDigest::sha224(),
            Digest::Sha256 => MessageDigest::sha256(),
            Digest::Sha384 => MessageDigest::sha384(),
            Digest::Sha512 => MessageDigest::sha512(),
        }
    }
}

// EVP_BytesToKey only needs the key and IV lengths, which live on the legacy cipher handle
impl From<BlockCipherAlgorithm> for Cipher {
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
