//! Segment decryption: AES-128-CBC with PKCS#7 padding, optionally
//! offloaded to the blocking thread pool so CPU-bound cipher work does
//! not stall the async worker.

use aes::Aes128;
use bytes::Bytes;
use cipher::{BlockModeDecrypt, KeyIvInit, block_padding::Pkcs7};

use crate::error::TransmuxError;

type Aes128CbcDec = cbc::Decryptor<Aes128>;

/// Encryption method attached to a pushed segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptionMethod {
    /// Whole-segment AES-128-CBC.
    Aes128,
    /// Per-sample encryption; handled inside capable parsers, not here.
    SampleAes,
    /// Explicitly unencrypted.
    None,
}

/// Decryption descriptor accompanying one pushed segment.
///
/// The decrypt stage runs only when the method is AES-128 and a key is
/// present; any other combination passes the segment through untouched.
/// Scoped to a single push.
#[derive(Debug, Clone)]
pub struct DecryptData {
    pub method: EncryptionMethod,
    pub key: Option<Bytes>,
    pub iv: [u8; 16],
}

impl DecryptData {
    /// Descriptor for a whole-segment AES-128 encrypted buffer.
    pub fn aes128(key: Bytes, iv: [u8; 16]) -> Self {
        Self {
            method: EncryptionMethod::Aes128,
            key: Some(key),
            iv,
        }
    }

    /// Whether this descriptor gates an actual decryption pass.
    pub fn is_aes128_ready(&self) -> bool {
        self.method == EncryptionMethod::Aes128 && self.key.is_some()
    }
}

/// Parse an initialization vector from its `0x…` hex playlist form.
pub fn parse_iv(iv_hex: &str) -> Result<[u8; 16], TransmuxError> {
    let iv_str = iv_hex.trim_start_matches("0x");
    let mut iv = [0u8; 16];
    hex::decode_to_slice(iv_str, &mut iv).map_err(|e| TransmuxError::Decrypt {
        reason: format!("failed to parse IV '{iv_hex}': {e}"),
    })?;
    Ok(iv)
}

/// Decrypts segment buffers.
///
/// Created lazily by the controller on the first encrypted push and kept
/// for the controller's whole lifetime.
#[derive(Debug)]
pub struct Decrypter {
    offload: bool,
}

impl Decrypter {
    pub fn new(offload: bool) -> Self {
        Self { offload }
    }

    /// Decrypt one segment. The completion is asynchronous; a caller
    /// awaiting this future observes completions in call order.
    pub async fn decrypt(
        &self,
        data: Bytes,
        key: &[u8],
        iv: &[u8; 16],
    ) -> Result<Bytes, TransmuxError> {
        let key: [u8; 16] = key.try_into().map_err(|_| TransmuxError::Decrypt {
            reason: format!("AES-128 key must be 16 bytes, got {}", key.len()),
        })?;

        if self.offload {
            let iv = *iv;
            tokio::task::spawn_blocking(move || Self::decrypt_sync(data, &key, &iv))
                .await
                .map_err(|e| TransmuxError::Decrypt {
                    reason: format!("decryption offload task failed: {e}"),
                })?
        } else {
            Self::decrypt_sync(data, &key, iv)
        }
    }

    /// Synchronous AES-128-CBC helper shared by both paths.
    fn decrypt_sync(data: Bytes, key: &[u8; 16], iv: &[u8; 16]) -> Result<Bytes, TransmuxError> {
        let mut buffer = data.to_vec();

        let cipher = Aes128CbcDec::new_from_slices(key, iv).map_err(|e| TransmuxError::Decrypt {
            reason: format!("failed to initialize AES decryptor: {e}"),
        })?;

        let decrypted_len = cipher
            .decrypt_padded::<Pkcs7>(&mut buffer)
            .map_err(|e| TransmuxError::Decrypt {
                reason: format!("decryption failed: {e}"),
            })?
            .len();

        buffer.truncate(decrypted_len);
        Ok(Bytes::from(buffer))
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::encrypt_data;
    use super::*;

    #[test]
    fn test_decrypt_sync_round_trip() {
        let key: [u8; 16] = [0x42; 16];
        let iv: [u8; 16] = [0x24; 16];
        let plaintext = b"transport stream payload bytes";

        let encrypted = Bytes::from(encrypt_data(plaintext, &key, &iv));
        let decrypted = Decrypter::decrypt_sync(encrypted, &key, &iv).unwrap();
        assert_eq!(decrypted.as_ref(), plaintext);
    }

    #[tokio::test]
    async fn test_decrypt_offloaded_round_trip() {
        let key: [u8; 16] = [0x11; 16];
        let iv: [u8; 16] = [0x22; 16];
        let plaintext: Vec<u8> = (0..4096).map(|i| (i % 256) as u8).collect();

        let encrypted = Bytes::from(encrypt_data(&plaintext, &key, &iv));
        let decrypter = Decrypter::new(true);
        let decrypted = decrypter.decrypt(encrypted, &key, &iv).await.unwrap();
        assert_eq!(decrypted.as_ref(), plaintext.as_slice());
    }

    #[tokio::test]
    async fn test_decrypt_inline_round_trip() {
        let key: [u8; 16] = [0x33; 16];
        let iv: [u8; 16] = [0x44; 16];
        let plaintext = b"inline path";

        let encrypted = Bytes::from(encrypt_data(plaintext, &key, &iv));
        let decrypter = Decrypter::new(false);
        let decrypted = decrypter.decrypt(encrypted, &key, &iv).await.unwrap();
        assert_eq!(decrypted.as_ref(), plaintext);
    }

    #[tokio::test]
    async fn test_decrypt_rejects_short_key() {
        let decrypter = Decrypter::new(false);
        let result = decrypter
            .decrypt(Bytes::from_static(&[0u8; 16]), &[0u8; 8], &[0u8; 16])
            .await;
        match result {
            Err(TransmuxError::Decrypt { reason }) => {
                assert!(reason.contains("16 bytes"), "reason: {reason}");
            }
            other => panic!("expected decrypt error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_iv() {
        let iv = parse_iv("0x000102030405060708090a0b0c0d0e0f").unwrap();
        assert_eq!(iv[0], 0x00);
        assert_eq!(iv[15], 0x0f);

        // Bare hex without the 0x prefix is accepted too
        assert!(parse_iv("000102030405060708090a0b0c0d0e0f").is_ok());
        assert!(parse_iv("0xzz").is_err());
        assert!(parse_iv("0x0001").is_err());
    }

    #[test]
    fn test_descriptor_gating() {
        let key = Bytes::from_static(&[0u8; 16]);
        assert!(DecryptData::aes128(key.clone(), [0u8; 16]).is_aes128_ready());

        let keyless = DecryptData {
            method: EncryptionMethod::Aes128,
            key: None,
            iv: [0u8; 16],
        };
        assert!(!keyless.is_aes128_ready());

        let sample_aes = DecryptData {
            method: EncryptionMethod::SampleAes,
            key: Some(key),
            iv: [0u8; 16],
        };
        assert!(!sample_aes.is_aes128_ready());
    }
}
