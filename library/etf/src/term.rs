//! The tagged value model every decode operation produces.
//!
//! A [`Term`] tree is built fresh by one top-level decode call and owns all
//! of its data; nothing borrows from the input buffer and cycles cannot
//! occur (the wire format cannot encode them).

use core::fmt;

/// Character encoding an atom name was transmitted in.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AtomEncoding {
    Latin1,
    Utf8,
}

impl fmt::Display for AtomEncoding {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Latin1 => f.write_str("latin1"),
            Self::Utf8 => f.write_str("utf8"),
        }
    }
}

/// A general atom: an owned copy of the name plus its wire encoding.
///
/// The reserved names `true`, `false` and `undefined` never appear here;
/// they decode to [`Term::Boolean`] / [`Term::Nil`] instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub name: String,
    pub encoding: AtomEncoding,
}

impl Atom {
    pub fn latin1<S: Into<String>>(name: S) -> Atom {
        Atom {
            name: name.into(),
            encoding: AtomEncoding::Latin1,
        }
    }

    pub fn utf8<S: Into<String>>(name: S) -> Atom {
        Atom {
            name: name.into(),
            encoding: AtomEncoding::Utf8,
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut chars = self.name.chars();
        let plain = match chars.next() {
            Some(c) if c.is_ascii_lowercase() => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '@')
            }
            _ => false,
        };
        if plain {
            f.write_str(&self.name)
        } else {
            write!(f, "'{}'", self.name.replace('\\', "\\\\").replace('\'', "\\'"))
        }
    }
}

/// An ordered sequence of elements plus a tail term.
///
/// The tail is [`Term::Nil`] for a proper list. Decoding stores a non-`Nil`
/// tail only when `simple_lists` is disabled; see
/// [`DecodeOptions`](crate::DecodeOptions).
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub elements: Vec<Term>,
    pub tail: Box<Term>,
}

impl List {
    /// The empty list.
    pub fn nil() -> List {
        List::proper(Vec::new())
    }

    /// A proper list of `elements`.
    pub fn proper(elements: Vec<Term>) -> List {
        List {
            elements,
            tail: Box::new(Term::Nil),
        }
    }

    /// A list with an explicit tail. An empty-list tail marks a proper list
    /// and is normalized to [`Term::Nil`].
    pub fn with_tail(elements: Vec<Term>, tail: Term) -> List {
        let tail = if tail.is_empty_list() { Term::Nil } else { tail };
        List {
            elements,
            tail: Box::new(tail),
        }
    }

    pub fn is_nil(&self) -> bool {
        self.elements.is_empty() && self.is_proper()
    }

    pub fn is_proper(&self) -> bool {
        matches!(*self.tail, Term::Nil)
    }
}

impl From<Vec<Term>> for List {
    fn from(elements: Vec<Term>) -> List {
        List::proper(elements)
    }
}

impl fmt::Display for List {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("[")?;
        for (i, e) in self.elements.iter().enumerate() {
            if i != 0 {
                f.write_str(", ")?;
            }
            e.fmt(f)?;
        }
        if !self.is_proper() {
            write!(f, "|{}", self.tail)?;
        }
        f.write_str("]")
    }
}

/// A fixed-arity ordered sequence of terms.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    pub elements: Vec<Term>,
}

impl From<Vec<Term>> for Tuple {
    fn from(elements: Vec<Term>) -> Tuple {
        Tuple { elements }
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("{")?;
        for (i, e) in self.elements.iter().enumerate() {
            if i != 0 {
                f.write_str(", ")?;
            }
            e.fmt(f)?;
        }
        f.write_str("}")
    }
}

/// Key/value pairs in encounter order with logically unique keys.
///
/// [`Map::insert`] overwrites in place when the key is already present, so a
/// duplicate key on the wire keeps its first position but the last value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Map {
    pub pairs: Vec<(Term, Term)>,
}

impl Map {
    pub fn new() -> Map {
        Map::default()
    }

    pub fn insert(&mut self, key: Term, value: Term) {
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn get(&self, key: &Term) -> Option<&Term> {
        self.pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl From<Vec<(Term, Term)>> for Map {
    fn from(pairs: Vec<(Term, Term)>) -> Map {
        let mut map = Map::new();
        for (k, v) in pairs {
            map.insert(k, v);
        }
        map
    }
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("#{")?;
        for (i, (k, v)) in self.pairs.iter().enumerate() {
            if i != 0 {
                f.write_str(", ")?;
            }
            write!(f, "{} => {}", k, v)?;
        }
        f.write_str("}")
    }
}

/// A binary payload with the significant-bit count of its final byte.
///
/// Plain binaries always carry `bits_in_last_byte == 8`; a bit-binary may
/// use only the leading 1..=8 bits of its last byte. The payload is stored
/// exactly as transmitted, without re-aligning the final byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binary {
    pub bytes: Vec<u8>,
    pub bits_in_last_byte: u8,
}

impl Binary {
    pub fn is_whole_bytes(&self) -> bool {
        self.bits_in_last_byte == 8
    }
}

impl From<Vec<u8>> for Binary {
    fn from(bytes: Vec<u8>) -> Binary {
        Binary {
            bytes,
            bits_in_last_byte: 8,
        }
    }
}

impl fmt::Display for Binary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_binary(f, &self.bytes, self.bits_in_last_byte)
    }
}

fn write_binary(f: &mut fmt::Formatter, bytes: &[u8], bits_in_last_byte: u8) -> fmt::Result {
    f.write_str("<<")?;
    for (i, b) in bytes.iter().enumerate() {
        if i != 0 {
            f.write_str(",")?;
        }
        write!(f, "{}", b)?;
    }
    if bits_in_last_byte != 8 {
        write!(f, ":{}", bits_in_last_byte)?;
    }
    f.write_str(">>")
}

/// A process identifier: originating node, numeric id/serial, creation.
///
/// `node` is the recursively decoded node term and follows the same atom
/// mapping rules as any other atom, so it may be a [`Term::Text`] when
/// `atoms_as_strings` is set.
#[derive(Debug, Clone, PartialEq)]
pub struct Pid {
    pub node: Box<Term>,
    pub id: u32,
    pub serial: u32,
    pub creation: u8,
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{}.{}.{}>", self.node, self.id, self.serial)
    }
}

/// An opaque unique identifier tied to a node and creation counter.
///
/// `id` holds the raw identifier words as transmitted: four bytes per word,
/// big-endian, uninterpreted.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub node: Box<Term>,
    pub creation: u8,
    pub id: Vec<u8>,
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#Ref<{}", self.node)?;
        if self.id.len() % 4 == 0 {
            for word in self.id.chunks(4) {
                write!(f, ".{}", u32::from_be_bytes([word[0], word[1], word[2], word[3]]))?;
            }
        } else {
            f.write_str(".")?;
            for b in &self.id {
                write!(f, "{:02x}", b)?;
            }
        }
        f.write_str(">")
    }
}

/// A decoded value.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// Both the 1-byte unsigned and 4-byte signed integer forms, after sign
    /// extension.
    Integer(i64),
    /// A bit-exact IEEE-754 double; NaN and infinities pass through.
    Float(f64),
    /// Any atom other than the three reserved names, unless
    /// `atoms_as_strings` turned it into [`Term::Text`].
    Atom(Atom),
    /// The atoms `true` and `false`.
    Boolean(bool),
    /// The atom `undefined`, and the tail of every proper list.
    Nil,
    /// A character string, from the string tag or from an atom under
    /// `atoms_as_strings`.
    Text(String),
    List(List),
    Tuple(Tuple),
    Map(Map),
    /// A binary with bit-count metadata (`simple_binaries` disabled).
    Binary(Binary),
    /// A raw binary payload (`simple_binaries` enabled).
    Bytes(Vec<u8>),
    Pid(Pid),
    Reference(Reference),
}

impl Term {
    /// True for the empty proper list and for `Nil` itself.
    pub fn is_empty_list(&self) -> bool {
        match self {
            Term::Nil => true,
            Term::List(list) => list.is_nil(),
            _ => false,
        }
    }
}

impl From<i64> for Term {
    fn from(value: i64) -> Term {
        Term::Integer(value)
    }
}
impl From<f64> for Term {
    fn from(value: f64) -> Term {
        Term::Float(value)
    }
}
impl From<bool> for Term {
    fn from(value: bool) -> Term {
        Term::Boolean(value)
    }
}
impl From<Atom> for Term {
    fn from(atom: Atom) -> Term {
        Term::Atom(atom)
    }
}
impl From<List> for Term {
    fn from(list: List) -> Term {
        Term::List(list)
    }
}
impl From<Tuple> for Term {
    fn from(tuple: Tuple) -> Term {
        Term::Tuple(tuple)
    }
}
impl From<Map> for Term {
    fn from(map: Map) -> Term {
        Term::Map(map)
    }
}
impl From<Binary> for Term {
    fn from(binary: Binary) -> Term {
        Term::Binary(binary)
    }
}
impl From<Pid> for Term {
    fn from(pid: Pid) -> Term {
        Term::Pid(pid)
    }
}
impl From<Reference> for Term {
    fn from(reference: Reference) -> Term {
        Term::Reference(reference)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Term::Integer(v) => write!(f, "{}", v),
            Term::Float(v) => write!(f, "{}", v),
            Term::Atom(a) => a.fmt(f),
            Term::Boolean(true) => f.write_str("true"),
            Term::Boolean(false) => f.write_str("false"),
            Term::Nil => f.write_str("undefined"),
            Term::Text(s) => write!(f, "{:?}", s),
            Term::List(l) => l.fmt(f),
            Term::Tuple(t) => t.fmt(f),
            Term::Map(m) => m.fmt(f),
            Term::Binary(b) => b.fmt(f),
            Term::Bytes(bytes) => write_binary(f, bytes, 8),
            Term::Pid(p) => p.fmt(f),
            Term::Reference(r) => r.fmt(f),
        }
    }
}
