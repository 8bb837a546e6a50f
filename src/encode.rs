pub mod base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    use crate::error::CrypterError;

    /// Encodes bytes into standard padded base64: a single line, no
    /// whitespace, `=` padding included.
    pub fn to_base64(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    /// Decodes standard base64 back into bytes.
    pub fn from_base64(text: &str) -> Result<Vec<u8>, CrypterError> {
        Ok(STANDARD.decode(text)?)
    }

    #[test]
    fn test_to_base64() {
        assert_eq!(to_base64(b"Man"), "TWFu");
        assert_eq!(to_base64(b"Ma"), "TWE=");
        assert_eq!(to_base64(b"M"), "TQ==");
    }

    #[test]
    fn test_from_base64() {
        assert_eq!(from_base64("TWFu").unwrap(), b"Man");
        assert_eq!(from_base64("TWE=").unwrap(), b"Ma");
        assert_eq!(from_base64("TQ==").unwrap(), b"M");
    }

    #[test]
    fn test_from_base64_rejects_garbage() {
        assert!(matches!(
            from_base64("not base64 at all!"),
            Err(CrypterError::Decode(_))
        ));
    }
}
