pub mod cipher {
    use bytes::{BufMut, BytesMut};

    use crate::error::CrypterError;

    /// How unpadding treats the trailing padding block.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub enum PaddingMode {
        /// Validate the pad length and every pad byte before stripping.
        #[default]
        Strict,
        /// Trust the trailing length byte, checking only that it stays in
        /// range of the buffer.
        Lenient,
    }

    /// Mutates the given buffer to get valid PKCS#7 padding for the block
    /// size. Always appends between 1 and `block_size` bytes, so an already
    /// aligned input gains a full pad block.
    pub fn pkcs7_pad(buf: &mut BytesMut, block_size: usize) {
        let pad = block_size - (buf.len() % block_size);
        buf.put_bytes(pad as u8, pad);
    }

    /// Strips PKCS#7 padding and returns the body. Returns Err on an
    /// inconsistent pad block; Lenient mode only rejects a length byte that
    /// would reach past the start of the buffer.
    pub fn pkcs7_unpad(
        padded: &[u8],
        block_size: usize,
        mode: PaddingMode,
    ) -> Result<&[u8], CrypterError> {
        let pad = *padded.last().ok_or(CrypterError::PaddingIntegrity)? as usize;
        if pad > padded.len() {
            return Err(CrypterError::PaddingIntegrity);
        }
        let body = padded.len() - pad;
        match mode {
            PaddingMode::Lenient => Ok(&padded[..body]),
            PaddingMode::Strict => {
                if (1..=block_size).contains(&pad)
                    && padded[body..].iter().all(|&v| v as usize == pad)
                {
                    Ok(&padded[..body])
                } else {
                    Err(CrypterError::PaddingIntegrity)
                }
            }
        }
    }

    /// Basic trait for block ciphers like AES: one keyed transform over a
    /// single block of exactly `BYTES` bytes.
    pub trait CipherCore: Sized {
        /// Block size in bytes.
        const BYTES: usize;
        /// Accepted key length in bytes.
        const KEY_BYTES: usize;

        fn init(key: &[u8]) -> Result<Self, CrypterError>;
        fn encrypt(&self, block: &[u8]) -> Result<Vec<u8>, CrypterError>;
        fn decrypt(&self, block: &[u8]) -> Result<Vec<u8>, CrypterError>;
    }

    /// Modes for encryption or decryption.
    #[derive(Clone, Copy)]
    pub enum CipherMode {
        Encrypt,
        Decrypt,
    }

    /// ECB implementation for a generic cipher implementation. Every block is
    /// transformed independently, with no chaining between blocks: identical
    /// plaintext blocks under one key give identical ciphertext blocks.
    pub struct EcbMode<C: CipherCore> {
        cipher_mode: CipherMode,
        core: C,
    }

    impl<C: CipherCore> EcbMode<C> {
        /// Initializes with a given key. The length of key must be C::KEY_BYTES.
        pub fn init(key: &[u8], cipher_mode: CipherMode) -> Result<Self, CrypterError> {
            Ok(Self {
                cipher_mode,
                core: C::init(key)?,
            })
        }

        /// Transforms the whole input into `output`. The input length must be
        /// an exact multiple of C::BYTES; partial blocks mean padding was
        /// skipped upstream and the call fails before touching the cipher.
        pub fn crypt_blocks(&self, input: &[u8], output: &mut Vec<u8>) -> Result<(), CrypterError> {
            if input.len() % C::BYTES != 0 {
                return Err(CrypterError::BlockAlignment {
                    len: input.len(),
                    block_size: C::BYTES,
                });
            }
            output.reserve(input.len());
            for block in input.chunks(C::BYTES) {
                match self.cipher_mode {
                    CipherMode::Encrypt => output.extend(self.core.encrypt(block)?),
                    CipherMode::Decrypt => output.extend(self.core.decrypt(block)?),
                }
            }
            Ok(())
        }
    }

    #[test]
    fn test_pkcs7_pad() {
        let mut buf = BytesMut::with_capacity(200);
        buf.put(b"YELLOW SUBMARINE".as_slice());
        pkcs7_pad(&mut buf, 20);
        assert_eq!(
            buf.get(0..),
            Some(b"YELLOW SUBMARINE\x04\x04\x04\x04".as_slice())
        )
    }

    #[test]
    fn test_pkcs7_pad_aligned_input_gets_full_block() {
        let mut buf = BytesMut::with_capacity(32);
        buf.put_bytes(0x41, 16);
        pkcs7_pad(&mut buf, 16);
        assert_eq!(buf.len(), 32);
        assert!(buf[16..].iter().all(|&v| v == 0x10));
    }

    #[test]
    fn test_pkcs7_pad_always_grows() {
        for len in 0..48usize {
            let mut buf = BytesMut::with_capacity(64);
            buf.put_bytes(0x00, len);
            pkcs7_pad(&mut buf, 16);
            assert!(buf.len() > len);
            assert_eq!(buf.len() % 16, 0);
        }
    }

    #[test]
    fn strict_padding_validation() {
        assert_eq!(
            pkcs7_unpad(b"ICE ICE BABY\x04\x04\x04\x04", 16, PaddingMode::Strict).unwrap(),
            b"ICE ICE BABY"
        );
        assert!(pkcs7_unpad(b"ICE ICE BABY\x05\x05\x05\x05", 16, PaddingMode::Strict).is_err());
        assert!(pkcs7_unpad(b"ICE ICE BABY\x01\x02\x03\x04", 16, PaddingMode::Strict).is_err());
        // length byte larger than the block size
        assert!(pkcs7_unpad(&[0x11; 16], 16, PaddingMode::Strict).is_err());
    }

    #[test]
    fn lenient_padding_trusts_length_byte() {
        assert_eq!(
            pkcs7_unpad(b"ICE ICE BABY\x01\x02\x03\x04", 16, PaddingMode::Lenient).unwrap(),
            b"ICE ICE BABY"
        );
        // still never reaches past the start of the buffer
        assert!(pkcs7_unpad(&[0x00, 0xff], 16, PaddingMode::Lenient).is_err());
        assert!(pkcs7_unpad(&[], 16, PaddingMode::Lenient).is_err());
        // a zero length byte strips nothing
        assert_eq!(
            pkcs7_unpad(&[0x61, 0x00], 16, PaddingMode::Lenient).unwrap(),
            &[0x61, 0x00]
        );
    }

    #[test]
    fn test_unpad_inverts_pad() {
        for len in 1..40usize {
            let data = vec![0xa5u8; len];
            let mut buf = BytesMut::with_capacity(64);
            buf.put(data.as_slice());
            pkcs7_pad(&mut buf, 16);
            assert_eq!(
                pkcs7_unpad(&buf, 16, PaddingMode::Strict).unwrap(),
                data.as_slice()
            );
        }
    }

    /// Adds a fixed offset to every byte. Enough structure to exercise the
    /// engine without a real cipher.
    #[cfg(test)]
    struct ShiftCore {
        offset: u8,
    }

    #[cfg(test)]
    impl CipherCore for ShiftCore {
        const BYTES: usize = 4;
        const KEY_BYTES: usize = 1;

        fn init(key: &[u8]) -> Result<Self, CrypterError> {
            if key.len() != Self::KEY_BYTES {
                return Err(CrypterError::KeySetup {
                    expected: Self::KEY_BYTES,
                    got: key.len(),
                });
            }
            Ok(Self { offset: key[0] })
        }

        fn encrypt(&self, block: &[u8]) -> Result<Vec<u8>, CrypterError> {
            Ok(block.iter().map(|v| v.wrapping_add(self.offset)).collect())
        }

        fn decrypt(&self, block: &[u8]) -> Result<Vec<u8>, CrypterError> {
            Ok(block.iter().map(|v| v.wrapping_sub(self.offset)).collect())
        }
    }

    #[test]
    fn ecb_round_trip_with_fake_core() {
        let enc = EcbMode::<ShiftCore>::init(&[3], CipherMode::Encrypt).unwrap();
        let dec = EcbMode::<ShiftCore>::init(&[3], CipherMode::Decrypt).unwrap();

        let mut crypted = Vec::new();
        enc.crypt_blocks(b"abcdefgh", &mut crypted).unwrap();
        assert_eq!(crypted, b"defghijk");

        let mut plain = Vec::new();
        dec.crypt_blocks(&crypted, &mut plain).unwrap();
        assert_eq!(plain, b"abcdefgh");
    }

    #[test]
    fn ecb_blocks_are_independent() {
        let enc = EcbMode::<ShiftCore>::init(&[7], CipherMode::Encrypt).unwrap();
        let mut crypted = Vec::new();
        enc.crypt_blocks(b"samesame", &mut crypted).unwrap();
        assert_eq!(crypted[0..4], crypted[4..8]);
    }

    #[test]
    fn ecb_rejects_partial_blocks() {
        let enc = EcbMode::<ShiftCore>::init(&[1], CipherMode::Encrypt).unwrap();
        let mut output = Vec::new();
        assert!(matches!(
            enc.crypt_blocks(b"abcde", &mut output),
            Err(CrypterError::BlockAlignment {
                len: 5,
                block_size: 4
            })
        ));
        assert!(output.is_empty());
    }

    #[test]
    fn ecb_rejects_bad_key_length() {
        assert!(matches!(
            EcbMode::<ShiftCore>::init(&[1, 2], CipherMode::Encrypt),
            Err(CrypterError::KeySetup {
                expected: 1,
                got: 2
            })
        ));
    }
}

pub mod aes {
    use openssl::cipher::Cipher;
    use openssl::cipher_ctx::CipherCtx;

    use super::cipher::{CipherCore, EcbMode};
    use crate::error::CrypterError;

    pub type Aes256Ecb = EcbMode<Aes256>;

    /// Implementation of CipherCore for AES-256. The openssl context does one
    /// block per call with its own padding switched off.
    pub struct Aes256 {
        key: Vec<u8>,
    }

    impl CipherCore for Aes256 {
        const BYTES: usize = 16;
        const KEY_BYTES: usize = 32;

        fn init(key: &[u8]) -> Result<Self, CrypterError> {
            if key.len() != Self::KEY_BYTES {
                return Err(CrypterError::KeySetup {
                    expected: Self::KEY_BYTES,
                    got: key.len(),
                });
            }
            Ok(Self { key: key.to_vec() })
        }

        fn encrypt(&self, block: &[u8]) -> Result<Vec<u8>, CrypterError> {
            debug_assert_eq!(block.len(), Self::BYTES);

            let mut cipher_ctx = CipherCtx::new()?;
            cipher_ctx.encrypt_init(Some(Cipher::aes_256_ecb()), Some(&self.key), None)?;
            cipher_ctx.set_padding(false);

            let mut output = Vec::with_capacity(Self::BYTES);
            cipher_ctx.cipher_update_vec(block, &mut output)?;
            cipher_ctx.cipher_final_vec(&mut output)?;

            Ok(output)
        }

        fn decrypt(&self, block: &[u8]) -> Result<Vec<u8>, CrypterError> {
            debug_assert_eq!(block.len(), Self::BYTES);

            let mut cipher_ctx = CipherCtx::new()?;
            cipher_ctx.decrypt_init(Some(Cipher::aes_256_ecb()), Some(&self.key), None)?;
            cipher_ctx.set_padding(false);

            let mut output = Vec::with_capacity(Self::BYTES);
            cipher_ctx.cipher_update_vec(block, &mut output)?;
            cipher_ctx.cipher_final_vec(&mut output)?;

            Ok(output)
        }
    }

    #[test]
    fn test_aes256_fips197_vector() {
        // FIPS-197 appendix C.3
        let key: Vec<u8> = (0x00..=0x1fu8).collect();
        let plain: Vec<u8> = b"\x00\x11\x22\x33\x44\x55\x66\x77\x88\x99\xaa\xbb\xcc\xdd\xee\xff"
            .to_vec();
        let expected = b"\x8e\xa2\xb7\xca\x51\x67\x45\xbf\xea\xfc\x49\x90\x4b\x49\x60\x89";

        let core = Aes256::init(&key).unwrap();
        assert_eq!(core.encrypt(&plain).unwrap(), expected);
        assert_eq!(core.decrypt(expected).unwrap(), plain);
    }

    #[test]
    fn test_identical_blocks_leak_through_ecb() {
        use super::cipher::CipherMode;

        let key = [0x42u8; 32];
        let enc = Aes256Ecb::init(&key, CipherMode::Encrypt).unwrap();

        let mut crypted = Vec::new();
        enc.crypt_blocks(&[0x33u8; 32], &mut crypted).unwrap();
        assert_eq!(crypted[0..16], crypted[16..32]);
    }

    #[test]
    fn test_init_rejects_short_key() {
        assert!(matches!(
            Aes256::init(&[0u8; 16]),
            Err(CrypterError::KeySetup {
                expected: 32,
                got: 16
            })
        ));
    }
}
