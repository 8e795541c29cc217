//! Configuration for a decode call.

/// Nesting depth allowed by [`DecodeOptions::default`].
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Representation tradeoffs and the recursion guard for one decode call.
///
/// The defaults favor plain host values: binaries come back as raw bytes
/// and lists as element vectors. Clear `simple_binaries`/`simple_lists` to
/// keep bit-count metadata and improper-list tails instead.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Decode every non-reserved atom to [`Term::Text`](crate::Term::Text)
    /// instead of [`Term::Atom`](crate::Term::Atom).
    pub atoms_as_strings: bool,
    /// Drop bit-count metadata and return binaries as raw byte payloads.
    pub simple_binaries: bool,
    /// Drop the tail term of decoded lists. Lossy for improper lists; the
    /// tail bytes are still consumed so the cursor stays correct.
    pub simple_lists: bool,
    /// Fail with `DepthExceeded` instead of recursing past this many
    /// nesting levels. Untrusted input must not be able to exhaust the
    /// call stack.
    pub max_depth: usize,
}

impl Default for DecodeOptions {
    fn default() -> DecodeOptions {
        DecodeOptions {
            atoms_as_strings: false,
            simple_binaries: true,
            simple_lists: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl DecodeOptions {
    pub fn new() -> DecodeOptions {
        DecodeOptions::default()
    }

    pub fn with_atoms_as_strings(mut self, value: bool) -> DecodeOptions {
        self.atoms_as_strings = value;
        self
    }

    pub fn with_simple_binaries(mut self, value: bool) -> DecodeOptions {
        self.simple_binaries = value;
        self
    }

    pub fn with_simple_lists(mut self, value: bool) -> DecodeOptions {
        self.simple_lists = value;
        self
    }

    pub fn with_max_depth(mut self, value: usize) -> DecodeOptions {
        self.max_depth = value;
        self
    }
}
