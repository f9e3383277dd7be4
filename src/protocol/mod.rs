//! Memcache ASCII protocol recognition
//!
//! mctop only ever observes traffic, so this module is a strict subset
//! recognizer: it understands the `GET`/`GETS` request line and the
//! `VALUE`/`END` response lines, and silently ignores everything else.

mod decoder;

pub use decoder::Decoder;
