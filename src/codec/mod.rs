//! Byte-level decoders for the historical embedding schemes.
//!
//! Packaging tools turned project bytes into text two ways: a custom
//! base-85 codec that changed incompatibly across releases ([`base85`])
//! and base64 data URIs ([`datauri`]). Both are pure functions over a
//! contiguous text fragment; neither performs I/O.

pub mod base85;
pub mod datauri;
