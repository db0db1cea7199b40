pub mod aead;
pub mod algorithm;
pub mod block_cipher;
pub mod buffer;
pub mod key_derivation;
pub mod provider;

cfg_if::cfg_if! {
if #[cfg(feature = "openssl")] {
    mod openssl;
    pub use self::openssl::{OpensslCipherContext, OpensslProvider};

    /// provider used when none is given explicitly
    pub type DefaultProvider = OpensslProvider;
} else {
    compile_error!("No crypto backend configured, enable the `openssl` feature.");
}
}
