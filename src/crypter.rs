use bytes::{BufMut, BytesMut};
use openssl::sha::sha256;

use crate::encode::base64::{from_base64, to_base64};
use crate::encrypt::aes::{Aes256, Aes256Ecb};
use crate::encrypt::cipher::{pkcs7_pad, pkcs7_unpad, CipherCore, CipherMode, PaddingMode};
use crate::error::CrypterError;

/// Derives the cipher key from a secret: the full SHA-256 digest over its raw
/// bytes, which is exactly the AES-256 key size. Same secret, same key.
pub fn derive_key(secret: &str) -> [u8; 32] {
    sha256(secret.as_bytes())
}

/// Encrypts and decrypts single-line records under one secret. The key is
/// derived once; every record is an independent transformation with no state
/// carried between calls.
pub struct Crypter {
    enc: Aes256Ecb,
    dec: Aes256Ecb,
    padding: PaddingMode,
}

impl Crypter {
    pub fn new(secret: &str) -> Result<Self, CrypterError> {
        let key = derive_key(secret);
        Ok(Self {
            enc: Aes256Ecb::init(&key, CipherMode::Encrypt)?,
            dec: Aes256Ecb::init(&key, CipherMode::Decrypt)?,
            padding: PaddingMode::default(),
        })
    }

    pub fn with_padding(mut self, padding: PaddingMode) -> Self {
        self.padding = padding;
        self
    }

    /// Encrypts one record into a single base64 line. An empty record is
    /// rejected before any cipher work.
    pub fn encrypt_record(&self, plaintext: &str) -> Result<String, CrypterError> {
        if plaintext.is_empty() {
            return Err(CrypterError::EmptyInput);
        }

        let mut content = BytesMut::with_capacity(plaintext.len() + Aes256::BYTES);
        content.put(plaintext.as_bytes());
        pkcs7_pad(&mut content, Aes256::BYTES);

        let mut crypted = Vec::with_capacity(content.len());
        self.enc.crypt_blocks(&content, &mut crypted)?;

        Ok(to_base64(&crypted))
    }

    /// Decrypts one base64 line back into the record text. A wrong secret
    /// yields a padding/alignment error or garbage text, never a panic.
    pub fn decrypt_record(&self, text: &str) -> Result<String, CrypterError> {
        if text.is_empty() {
            return Err(CrypterError::EmptyInput);
        }

        let crypted = from_base64(text)?;
        let mut content = Vec::with_capacity(crypted.len());
        self.dec.crypt_blocks(&crypted, &mut content)?;

        let plain = pkcs7_unpad(&content, Aes256::BYTES, self.padding)?;
        Ok(String::from_utf8_lossy(plain).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let crypter = Crypter::new("mysecret").unwrap();
        let crypted = crypter.encrypt_record("hello world").unwrap();
        assert!(crypted.is_ascii());
        assert!(!crypted.contains(char::is_whitespace));
        assert_eq!(crypter.decrypt_record(&crypted).unwrap(), "hello world");
    }

    #[test]
    fn round_trip_multibyte_utf8() {
        let crypter = Crypter::new("schlüssel").unwrap();
        let long = "x".repeat(300);
        for record in ["héllo wörld", "線路は続くよ", "a", long.as_str()] {
            let crypted = crypter.encrypt_record(record).unwrap();
            assert_eq!(crypter.decrypt_record(&crypted).unwrap(), record);
        }
    }

    #[test]
    fn encryption_is_deterministic() {
        let crypter = Crypter::new("mysecret").unwrap();
        assert_eq!(
            crypter.encrypt_record("hello world").unwrap(),
            crypter.encrypt_record("hello world").unwrap()
        );
    }

    #[test]
    fn empty_records_are_rejected() {
        let crypter = Crypter::new("mysecret").unwrap();
        assert!(matches!(
            crypter.encrypt_record(""),
            Err(CrypterError::EmptyInput)
        ));
        assert!(matches!(
            crypter.decrypt_record(""),
            Err(CrypterError::EmptyInput)
        ));
    }

    #[test]
    fn key_derivation_is_deterministic() {
        assert_eq!(derive_key("mysecret"), derive_key("mysecret"));
        assert_ne!(derive_key("mysecret"), derive_key("mysecret2"));
    }

    #[test]
    fn block_aligned_plaintext_gains_a_full_pad_block() {
        let crypter = Crypter::new("mysecret").unwrap();
        // 16 bytes of plaintext pad out to 32 bytes of ciphertext
        let crypted = crypter.encrypt_record("exactly 16 bytes").unwrap();
        let raw = crate::encode::base64::from_base64(&crypted).unwrap();
        assert_eq!(raw.len(), 32);
        assert_eq!(crypter.decrypt_record(&crypted).unwrap(), "exactly 16 bytes");
    }

    #[test]
    fn wrong_secret_never_panics() {
        let crypter = Crypter::new("mysecret").unwrap();
        let crypted = crypter.encrypt_record("hello world").unwrap();

        let other = Crypter::new("not my secret").unwrap();
        match other.decrypt_record(&crypted) {
            Ok(garbage) => assert_ne!(garbage, "hello world"),
            Err(
                CrypterError::PaddingIntegrity
                | CrypterError::BlockAlignment { .. }
                | CrypterError::Decode(_),
            ) => {}
            Err(unexpected) => panic!("unexpected error: {unexpected}"),
        }
    }

    #[test]
    fn malformed_ciphertext_is_a_decode_error() {
        let crypter = Crypter::new("mysecret").unwrap();
        assert!(matches!(
            crypter.decrypt_record("this is *not* base64"),
            Err(CrypterError::Decode(_))
        ));
    }

    #[test]
    fn truncated_ciphertext_is_an_alignment_error() {
        let crypter = Crypter::new("mysecret").unwrap();
        // 9 raw bytes decode fine but cannot be block-aligned
        assert!(matches!(
            crypter.decrypt_record("AAAAAAAAAAAA"),
            Err(CrypterError::BlockAlignment { .. })
        ));
    }

    #[test]
    fn lenient_padding_round_trips_too() {
        let crypter = Crypter::new("mysecret")
            .unwrap()
            .with_padding(PaddingMode::Lenient);
        let crypted = crypter.encrypt_record("hello world").unwrap();
        assert_eq!(crypter.decrypt_record(&crypted).unwrap(), "hello world");
    }
}
