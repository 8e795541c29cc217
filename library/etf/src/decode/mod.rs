//! Recursive-descent decoder for the external term format.
//!
//! One call to [`decode`] reads a single tag byte at the starting offset,
//! dispatches to the matching routine, and returns the decoded [`Term`]
//! together with the offset of the first byte it did not consume. Compound
//! tags recurse, counting nesting depth against
//! [`DecodeOptions::max_depth`].
//!
//! The leading version byte (131) and zlib-compressed payloads are the
//! caller's concern; the compressed-term tag is reported as unsupported
//! here.


use log::trace;

use crate::options::DecodeOptions;
use crate::reader::{read_big_f64, read_big_u16, read_big_u32};
use crate::term::{Atom, AtomEncoding, Binary, List, Map, Pid, Reference, Term, Tuple};

const NEW_FLOAT_EXT: u8 = 70;
const BIT_BINARY_EXT: u8 = 77;
const SMALL_INTEGER_EXT: u8 = 97;
const INTEGER_EXT: u8 = 98;
const ATOM_EXT: u8 = 100;
const PID_EXT: u8 = 103;
const SMALL_TUPLE_EXT: u8 = 104;
const LARGE_TUPLE_EXT: u8 = 105;
const NIL_EXT: u8 = 106;
const STRING_EXT: u8 = 107;
const LIST_EXT: u8 = 108;
const BINARY_EXT: u8 = 109;
const NEW_REFERENCE_EXT: u8 = 114;
const SMALL_ATOM_EXT: u8 = 115;
const MAP_EXT: u8 = 116;
const ATOM_UTF8_EXT: u8 = 118;
const SMALL_ATOM_UTF8_EXT: u8 = 119;

/// Errors which can occur when decoding a term
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A declared or implicit length runs past the end of the buffer. For a
    /// streaming caller this can simply mean "wait for more input".
    #[error("incomplete data: {context}")]
    IncompleteData { context: &'static str },
    /// The tag byte is not in the supported set. Compressed terms (80) and
    /// the legacy float encoding (99) land here.
    #[error("unsupported tag: '{tag}'")]
    UnsupportedTag { tag: u8 },
    /// Nesting ran past [`DecodeOptions::max_depth`].
    #[error("term nesting exceeds the depth limit of {limit}")]
    DepthExceeded { limit: usize },
    /// A utf8 atom name holds malformed utf8.
    #[error("invalid utf8 string")]
    InvalidString(#[from] core::str::Utf8Error),
}

pub type DecodeResult = Result<(Term, usize), DecodeError>;

/// Decodes one term from `buf` starting at `offset`.
///
/// Returns the term and the offset just past its encoding; feeding that
/// offset back in decodes the next term of a concatenated stream. On error
/// the cursor position is meaningless and must not be reused.
pub fn decode(buf: &[u8], offset: usize, options: &DecodeOptions) -> DecodeResult {
    let mut decoder = Decoder {
        buf,
        pos: offset,
        options,
        depth: 0,
    };
    let term = decoder.decode_term()?;
    Ok((term, decoder.pos))
}

struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
    options: &'a DecodeOptions,
    depth: usize,
}

impl<'a> Decoder<'a> {
    fn decode_term(&mut self) -> Result<Term, DecodeError> {
        if self.pos >= self.buf.len() {
            return Err(DecodeError::IncompleteData {
                context: "no data remaining",
            });
        }
        let tag = self.buf[self.pos];
        self.pos += 1;
        trace!(target: "etf", "tag {} at offset {}", tag, self.pos - 1);
        match tag {
            SMALL_INTEGER_EXT => self.decode_small_integer_ext(),
            INTEGER_EXT => self.decode_integer_ext(),
            NEW_FLOAT_EXT => self.decode_new_float_ext(),
            ATOM_EXT => self.decode_atom_ext(),
            ATOM_UTF8_EXT => self.decode_atom_utf8_ext(),
            SMALL_ATOM_EXT => self.decode_small_atom_ext(),
            SMALL_ATOM_UTF8_EXT => self.decode_small_atom_utf8_ext(),
            NIL_EXT => Ok(Term::List(List::nil())),
            STRING_EXT => self.decode_string_ext(),
            LIST_EXT => self.decode_list_ext(),
            MAP_EXT => self.decode_map_ext(),
            SMALL_TUPLE_EXT => self.decode_small_tuple_ext(),
            LARGE_TUPLE_EXT => self.decode_large_tuple_ext(),
            PID_EXT => self.decode_pid_ext(),
            NEW_REFERENCE_EXT => self.decode_new_reference_ext(),
            BINARY_EXT => self.decode_binary_ext(),
            BIT_BINARY_EXT => self.decode_bit_binary_ext(),
            _ => Err(DecodeError::UnsupportedTag { tag }),
        }
    }

    /// Child decode of a compound term, counted against the depth limit.
    fn decode_nested(&mut self) -> Result<Term, DecodeError> {
        if self.depth >= self.options.max_depth {
            return Err(DecodeError::DepthExceeded {
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        let term = self.decode_term();
        self.depth -= 1;
        term
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Every length check runs through here, before any payload access.
    fn ensure(&self, needed: usize, context: &'static str) -> Result<(), DecodeError> {
        if self.remaining() < needed {
            return Err(DecodeError::IncompleteData { context });
        }
        Ok(())
    }

    fn take_u8(&mut self, context: &'static str) -> Result<u8, DecodeError> {
        self.ensure(1, context)?;
        let value = self.buf[self.pos];
        self.pos += 1;
        Ok(value)
    }

    fn take_u16(&mut self, context: &'static str) -> Result<u16, DecodeError> {
        self.ensure(2, context)?;
        let value = read_big_u16(self.buf, self.pos);
        self.pos += 2;
        Ok(value)
    }

    fn take_u32(&mut self, context: &'static str) -> Result<u32, DecodeError> {
        self.ensure(4, context)?;
        let value = read_big_u32(self.buf, self.pos);
        self.pos += 4;
        Ok(value)
    }

    fn take_f64(&mut self, context: &'static str) -> Result<f64, DecodeError> {
        self.ensure(8, context)?;
        let value = read_big_f64(self.buf, self.pos);
        self.pos += 8;
        Ok(value)
    }

    fn take_bytes(&mut self, len: usize, context: &'static str) -> Result<&'a [u8], DecodeError> {
        self.ensure(len, context)?;
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    fn decode_small_integer_ext(&mut self) -> Result<Term, DecodeError> {
        let value = self.take_u8("reading a small integer")?;
        Ok(Term::Integer(value as i64))
    }

    fn decode_integer_ext(&mut self) -> Result<Term, DecodeError> {
        // Two's-complement signed 32-bit, sign-extended into the i64.
        let value = self.take_u32("reading an integer")? as i32;
        Ok(Term::Integer(value as i64))
    }

    fn decode_new_float_ext(&mut self) -> Result<Term, DecodeError> {
        let value = self.take_f64("reading a float")?;
        Ok(Term::Float(value))
    }

    fn decode_atom_ext(&mut self) -> Result<Term, DecodeError> {
        let len = self.take_u16("reading the length of an atom")? as usize;
        let bytes = self.take_bytes(len, "decoding text for an atom")?;
        Ok(self.atom_to_term(latin1_to_string(bytes), AtomEncoding::Latin1))
    }

    fn decode_small_atom_ext(&mut self) -> Result<Term, DecodeError> {
        let len = self.take_u8("reading the length of an atom")? as usize;
        let bytes = self.take_bytes(len, "decoding text for an atom")?;
        Ok(self.atom_to_term(latin1_to_string(bytes), AtomEncoding::Latin1))
    }

    fn decode_atom_utf8_ext(&mut self) -> Result<Term, DecodeError> {
        let len = self.take_u16("reading the length of an atom")? as usize;
        let bytes = self.take_bytes(len, "decoding text for an atom")?;
        let name = core::str::from_utf8(bytes)?.to_string();
        Ok(self.atom_to_term(name, AtomEncoding::Utf8))
    }

    fn decode_small_atom_utf8_ext(&mut self) -> Result<Term, DecodeError> {
        let len = self.take_u8("reading the length of an atom")? as usize;
        let bytes = self.take_bytes(len, "decoding text for an atom")?;
        let name = core::str::from_utf8(bytes)?.to_string();
        Ok(self.atom_to_term(name, AtomEncoding::Utf8))
    }

    /// The mapping is uniform over all four atom tags: the reserved names
    /// win over `atoms_as_strings`.
    fn atom_to_term(&self, name: String, encoding: AtomEncoding) -> Term {
        match name.as_str() {
            "true" => Term::Boolean(true),
            "false" => Term::Boolean(false),
            "undefined" => Term::Nil,
            _ if self.options.atoms_as_strings => Term::Text(name),
            _ => Term::Atom(Atom { name, encoding }),
        }
    }

    fn decode_string_ext(&mut self) -> Result<Term, DecodeError> {
        let len = self.take_u16("reading the length of a string")? as usize;
        let bytes = self.take_bytes(len, "reading characters for a string")?;
        Ok(Term::Text(latin1_to_string(bytes)))
    }

    fn decode_list_ext(&mut self) -> Result<Term, DecodeError> {
        let count = self.take_u32("reading the element count of a list")? as usize;
        // Each element takes at least one byte, plus one for the tail term.
        self.ensure(count.saturating_add(1), "decoding elements of a list")?;
        let mut elements = Vec::with_capacity(count);
        for _ in 0..count {
            elements.push(self.decode_nested()?);
        }
        let tail = self.decode_nested()?;
        if self.options.simple_lists {
            Ok(Term::List(List::proper(elements)))
        } else {
            Ok(Term::List(List::with_tail(elements, tail)))
        }
    }

    fn decode_map_ext(&mut self) -> Result<Term, DecodeError> {
        let count = self.take_u32("reading the pair count of a map")? as usize;
        self.ensure(count.saturating_mul(2), "decoding pairs of a map")?;
        let mut map = Map::new();
        for _ in 0..count {
            let key = self.decode_nested()?;
            let value = self.decode_nested()?;
            map.insert(key, value);
        }
        Ok(Term::Map(map))
    }

    fn decode_small_tuple_ext(&mut self) -> Result<Term, DecodeError> {
        let arity = self.take_u8("reading the arity of a tuple")? as usize;
        self.decode_tuple(arity)
    }

    fn decode_large_tuple_ext(&mut self) -> Result<Term, DecodeError> {
        let arity = self.take_u32("reading the arity of a tuple")? as usize;
        self.decode_tuple(arity)
    }

    fn decode_tuple(&mut self, arity: usize) -> Result<Term, DecodeError> {
        self.ensure(arity, "decoding elements of a tuple")?;
        let mut elements = Vec::with_capacity(arity);
        for _ in 0..arity {
            elements.push(self.decode_nested()?);
        }
        Ok(Term::Tuple(Tuple::from(elements)))
    }

    fn decode_pid_ext(&mut self) -> Result<Term, DecodeError> {
        let node = self.decode_nested()?;
        let id = self.take_u32("reading the fields of a pid")?;
        let serial = self.take_u32("reading the fields of a pid")?;
        let creation = self.take_u8("reading the fields of a pid")?;
        Ok(Term::Pid(Pid {
            node: Box::new(node),
            id,
            serial,
            creation,
        }))
    }

    fn decode_new_reference_ext(&mut self) -> Result<Term, DecodeError> {
        let term_len = self.take_u16("reading the id length of a reference")? as usize;
        let node = self.decode_nested()?;
        let creation = self.take_u8("reading the creation of a reference")?;
        let id = self
            .take_bytes(term_len * 4, "reading id data for a reference")?
            .to_vec();
        Ok(Term::Reference(Reference {
            node: Box::new(node),
            creation,
            id,
        }))
    }

    fn decode_binary_ext(&mut self) -> Result<Term, DecodeError> {
        let len = self.take_u32("reading the length of a binary")? as usize;
        let bytes = self.take_bytes(len, "reading data for a binary")?.to_vec();
        if self.options.simple_binaries {
            Ok(Term::Bytes(bytes))
        } else {
            Ok(Term::Binary(Binary {
                bytes,
                bits_in_last_byte: 8,
            }))
        }
    }

    fn decode_bit_binary_ext(&mut self) -> Result<Term, DecodeError> {
        let len = self.take_u32("reading the length of a binary")? as usize;
        let bits_in_last_byte = self.take_u8("reading the bit count of a binary")?;
        let bytes = self.take_bytes(len, "reading data for a binary")?.to_vec();
        if self.options.simple_binaries {
            Ok(Term::Bytes(bytes))
        } else {
            Ok(Term::Binary(Binary {
                bytes,
                bits_in_last_byte,
            }))
        }
    }
}

/// Latin-1 code points are the first 256 Unicode scalars, so this cannot
/// fail.
fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
