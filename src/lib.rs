//! Line-oriented symmetric encryption: each record is padded, run through
//! AES-256 in ECB mode with a key derived from a secret, and emitted as one
//! base64 line.

pub mod crypter;
pub mod encode;
pub mod encrypt;
pub mod error;
pub mod pipeline;
