//! Digest codec and response-blob encoding.
//!
//! Every digest is built by [`DigestEncoder`]: a length-prefixed domain tag
//! followed by typed fields in a fixed order (integers big-endian and fixed
//! width, variable-length values length-prefixed), hashed with Blake2b-256.
//! Two different logical inputs therefore never share a pre-image.

pub mod blob;
pub mod digest;
pub mod encoder;
pub mod error;

pub use blob::{ResponseBlob, MAX_BLOB_SIZE};
pub use digest::{registration_digest, response_digest, task_digest};
pub use encoder::DigestEncoder;
pub use error::CodecError;
