use openssl::cipher::CipherRef;
use openssl::cipher_ctx::CipherCtx;

use crate::crypto::provider::{
    CipherAlgorithm, CipherContext, Direction, ProviderError, ProviderResult,
};

/// Owns an `EVP_CIPHER_CTX`, which is freed when this value is dropped.
///
/// rust-openssl asserts on undersized key, IV and output buffers. Those conditions are
/// checked up front here and reported as [`ProviderError`] instead of panicking.
pub struct OpensslCipherContext {
    ctx: CipherCtx,
    direction: Option<Direction>,
}

impl OpensslCipherContext {
    pub(super) fn new() -> ProviderResult<Self> {
        Ok(Self {
            ctx: CipherCtx::new()?,
            direction: None,
        })
    }

    // Querying lengths of a context without a cipher dereferences a null cipher in OpenSSL
    fn ensure_initialized(&self) -> ProviderResult<Direction> {
        self.direction
            .ok_or_else(|| ProviderError::new("cipher context has not been initialized"))
    }
}

impl CipherContext for OpensslCipherContext {
    fn init(
        &mut self,
        direction: Direction,
        algorithm: Option<CipherAlgorithm>,
        key: Option<&[u8]>,
        iv: Option<&[u8]>,
    ) -> ProviderResult<()> {
        let cipher: Option<&CipherRef> = algorithm.map(Into::into);
        if cipher.is_none() {
            let initialized = self.ensure_initialized()?;
            if initialized != direction {
                return Err(ProviderError::new(format!(
                    "context was initialized for {initialized:?}, not {direction:?}"
                )));
            }
        }

        if let Some(key) = key {
            let key_len = cipher.map_or_else(|| self.ctx.key_length(), CipherRef::key_length);
            if key.len() != key_len {
                return Err(ProviderError::new(format!(
                    "invalid key length {}, cipher expects {key_len}",
                    key.len()
                )));
            }
        }

        if let Some(iv) = iv {
            let iv_len = cipher.map_or_else(|| self.ctx.iv_length(), CipherRef::iv_length);
            if iv.len() < iv_len {
                return Err(ProviderError::new(format!(
                    "invalid iv length {}, cipher expects {iv_len}",
                    iv.len()
                )));
            }
        }

        match direction {
            Direction::Encrypt => self.ctx.encrypt_init(cipher, key, iv)?,
            Direction::Decrypt => self.ctx.decrypt_init(cipher, key, iv)?,
        }
        self.direction = Some(direction);

        Ok(())
    }

    fn set_iv_length(&mut self, len: usize) -> ProviderResult<()> {
        self.ensure_initialized()?;
        self.ctx.set_iv_length(len)?;
        Ok(())
    }

    fn set_tag_length(&mut self, len: usize) -> ProviderResult<()> {
        self.ensure_initialized()?;
        self.ctx.set_tag_length(len)?;
        Ok(())
    }

    fn set_tag(&mut self, tag: &[u8]) -> ProviderResult<()> {
        self.ensure_initialized()?;
        self.ctx.set_tag(tag)?;
        Ok(())
    }

    fn tag(&self, tag: &mut [u8]) -> ProviderResult<()> {
        self.ensure_initialized()?;
        self.ctx.tag(tag)?;
        Ok(())
    }

    fn set_data_len(&mut self, len: usize) -> ProviderResult<()> {
        self.ensure_initialized()?;
        self.ctx.set_data_len(len)?;
        Ok(())
    }

    fn set_padding(&mut self, padding: bool) {
        if self.direction.is_some() {
            self.ctx.set_padding(padding);
        }
    }

    fn update_aad(&mut self, aad: &[u8]) -> ProviderResult<()> {
        self.ensure_initialized()?;
        self.ctx.cipher_update(aad, None)?;
        Ok(())
    }

    fn update(&mut self, input: &[u8], output: &mut [u8]) -> ProviderResult<usize> {
        self.ensure_initialized()?;
        let block_size = self.ctx.block_size();
        let spare = if block_size > 1 { block_size } else { 0 };
        let needed = input.len().saturating_add(spare);
        if output.len() < needed {
            return Err(ProviderError::new(format!(
                "output buffer of {} bytes is too small, {needed} bytes needed",
                output.len()
            )));
        }

        Ok(self.ctx.cipher_update(input, Some(output))?)
    }

    fn finalize(&mut self, output: &mut [u8]) -> ProviderResult<usize> {
        self.ensure_initialized()?;
        let block_size = self.ctx.block_size();
        if block_size > 1 && output.len() < block_size {
            return Err(ProviderError::new(format!(
                "output buffer of {} bytes is too small for the final block",
                output.len()
            )));
        }

        Ok(self.ctx.cipher_final(output)?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::algorithm::{AeadAlgorithm, BlockCipherAlgorithm};

    #[test]
    fn rejects_use_before_init() {
        let mut ctx = OpensslCipherContext::new().unwrap();
        assert!(ctx.set_iv_length(12).is_err());
        assert!(ctx.update(b"data", &mut [0u8; 32]).is_err());
        assert!(ctx
            .init(Direction::Encrypt, None, Some(&[0u8; 16]), None)
            .is_err());
    }

    #[test]
    fn rejects_wrong_key_len_without_panicking() {
        let mut ctx = OpensslCipherContext::new().unwrap();
        let result = ctx.init(
            Direction::Encrypt,
            Some(AeadAlgorithm::AesGcm256.into()),
            Some(&[0u8; 16]),
            Some(&[0u8; 12]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn rejects_switching_direction() {
        let mut ctx = OpensslCipherContext::new().unwrap();
        ctx.init(
            Direction::Encrypt,
            Some(AeadAlgorithm::AesGcm128.into()),
            None,
            None,
        )
        .unwrap();
        let result = ctx.init(Direction::Decrypt, None, Some(&[0u8; 16]), Some(&[0u8; 12]));
        assert!(result.is_err());
    }

    #[test]
    fn rejects_undersized_output_for_block_modes() {
        let mut ctx = OpensslCipherContext::new().unwrap();
        ctx.init(
            Direction::Encrypt,
            Some(BlockCipherAlgorithm::AES_128_CBC.into()),
            Some(&[0u8; 16]),
            Some(&[0u8; 16]),
        )
        .unwrap();

        assert!(ctx.update(&[0u8; 16], &mut [0u8; 16]).is_err());
        assert_eq!(ctx.update(&[0u8; 16], &mut [0u8; 32]).unwrap(), 16);
        assert!(ctx.finalize(&mut [0u8; 8]).is_err());
        assert_eq!(ctx.finalize(&mut [0u8; 16]).unwrap(), 16);
    }
}
