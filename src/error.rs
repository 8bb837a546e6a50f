use thiserror::Error;

/// Failures the record transformations can return. All of them surface to the
/// caller; the core never logs or retries.
#[derive(Debug, Error)]
pub enum CrypterError {
    /// An empty record was passed in. Rejected before any cipher work.
    #[error("empty input")]
    EmptyInput,

    /// The key does not match any length the cipher accepts.
    #[error("key is {got} bytes, cipher expects {expected}")]
    KeySetup { expected: usize, got: usize },

    /// Ciphertext text is not valid base64.
    #[error("ciphertext is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Data handed to the ECB engine is not block-aligned. Padding was
    /// skipped or corrupted upstream.
    #[error("input of {len} bytes is not a multiple of the block size {block_size}")]
    BlockAlignment { len: usize, block_size: usize },

    /// The trailing padding block is inconsistent.
    #[error("invalid PKCS#7 padding")]
    PaddingIntegrity,

    #[error(transparent)]
    Cipher(#[from] openssl::error::ErrorStack),
}
