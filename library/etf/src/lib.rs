//! This crate decodes the Erlang External Term Format (ETF), the tagged,
//! self-describing binary encoding for structured values used by the
//! distribution layer, into a neutral [`Term`] value.
//!
//! Decoding is a pure function of `(buffer, offset, options)`: it reads one
//! term, returns it together with the offset just past its encoding, and
//! touches nothing else. Callers strip the leading version byte
//! ([`ETF_VERSION`]) and handle compressed payloads before calling in; see
//! [`DecodeOptions`] for the representation tradeoffs and the nesting
//! guard.
//!
//! # Examples
//!
//! Decode `{ok, [1, 2]}` (version byte already stripped):
//!
//! ```
//! use erltf::{decode, DecodeOptions};
//!
//! let buf = [
//!     104, 2, 100, 0, 2, b'o', b'k', 108, 0, 0, 0, 2, 97, 1, 97, 2, 106,
//! ];
//! let options = DecodeOptions::default();
//! let (term, used) = decode(&buf, 0, &options).unwrap();
//! assert_eq!(used, buf.len());
//! assert_eq!(term.to_string(), "{ok, [1, 2]}");
//! ```
//!
//! Consecutive terms in one buffer chain through the returned offset:
//!
//! ```
//! use erltf::{decode, DecodeOptions, Term};
//!
//! let buf = [97, 1, 97, 2];
//! let options = DecodeOptions::default();
//! let (first, next) = decode(&buf, 0, &options).unwrap();
//! let (second, _) = decode(&buf, next, &options).unwrap();
//! assert_eq!((first, second), (Term::Integer(1), Term::Integer(2)));
//! ```

mod decode;
mod options;
mod reader;
mod term;

pub use self::decode::{decode, DecodeError, DecodeResult};
pub use self::options::{DecodeOptions, DEFAULT_MAX_DEPTH};
pub use self::term::{
    Atom, AtomEncoding, Binary, List, Map, Pid, Reference, Term, Tuple,
};

/// Leading version byte of a complete external-term encoding.
///
/// The decoder itself never consumes it; validating and stripping it is the
/// caller's job, exported here so callers need not hardcode the value.
pub const ETF_VERSION: u8 = 131;
