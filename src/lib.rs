//! # evp-aead
//! One-shot authenticated encryption (AES-GCM, AES-CCM), password based AES block cipher
//! encryption and X.509 trust store setup on top of an EVP style crypto provider.
//!
//! Every operation owns its cipher context for the duration of the call, so the cipher
//! objects keep no state and can be shared between threads.
//!
//! ```
//! use evp_aead::{AeadAlgorithm, AeadCipher, CipherRequest};
//!
//! let key = [0xAA; 32];
//! let nonce = [0x01; 12];
//! let cipher = AeadCipher::new();
//!
//! let request = CipherRequest::new(AeadAlgorithm::AesGcm256, &key, &nonce, b"hello aead")
//!     .with_aad(b"ctx");
//! let sealed = cipher.encrypt(&request).unwrap();
//!
//! let request = CipherRequest::new(AeadAlgorithm::AesGcm256, &key, &nonce, &sealed.ciphertext)
//!     .with_aad(b"ctx");
//! assert_eq!(cipher.decrypt(&request, &sealed.tag).unwrap(), b"hello aead");
//! ```
//!
//! # Optional features
//!
//! - **`openssl`** *(enabled by default)*: uses the [rust-openssl](https://crates.io/crates/openssl) crate, which provides bindings to OpenSSL.
//!   Per default the OpenSSL library is locally compiled and then statically linked. The build process requires a C compiler,
//!   `perl` (and `perl-core`), and `make`. For further options see the [openssl crate documentation](https://docs.rs/openssl/0.10.55/openssl/).
//!   Currently this is the only backend, disabling it issues a compiler error.

#![deny(clippy::missing_panics_doc)]
#![deny(
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_import_braces,
    unused_qualifications
)]
#![warn(
    // missing_docs,
    clippy::doc_markdown,
    clippy::semicolon_if_nothing_returned,
    clippy::single_match_else,
    clippy::inconsistent_struct_constructor,
    clippy::map_unwrap_or,
    clippy::match_same_arms
)]

mod crypto;
#[cfg(test)]
mod util;

/// error definitions
pub mod error;
/// X.509 certificate store configuration
#[cfg(feature = "openssl")]
pub mod trust_store;

pub use crypto::provider;

pub use crypto::{
    aead::{AeadCipher, AuthTag, CipherRequest, SealedData},
    algorithm::{
        AeadAlgorithm, AeadMode, AeadParams, AesKeySize, BlockCipherAlgorithm, BlockMode, Digest,
    },
    block_cipher::{PasswordBlockCipher, PasswordCipherOptions},
    buffer::OutputCapacity,
    key_derivation::{derive_key_and_iv, generate_salt, DerivedKeyMaterial, BYTES_TO_KEY_SALT_LEN},
    DefaultProvider,
};
#[cfg(feature = "openssl")]
pub use crypto::{OpensslCipherContext, OpensslProvider};
