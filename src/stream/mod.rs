//! Stream adapters for stamp and event pipelines

mod decode;

pub use decode::{DecodeExt, Decoded};
