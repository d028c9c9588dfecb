//! Process-wide symbol interning.
//!
//! Symbols are append-only: an index handed out once stays valid for the
//! lifetime of the interner. Lookup is a binary search over an index vector
//! kept sorted by symbol text, so interning an existing string is `O(log n)`
//! and inserting a new one is `O(n)` for the ordered insert.

use std::fmt;

/// Identifier of an interned symbol.
///
/// Two ids are equal exactly when their symbol texts are byte-for-byte equal
/// (they came from the same interner entry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u32);

impl SymbolId {
    /// The `nil` symbol, always interned at index 0.
    pub const NIL: Self = Self(0);
    /// The `nothing` symbol, always interned at index 1. Marks an absent
    /// argument in function application.
    pub const NOTHING: Self = Self(1);

    pub(crate) fn from_index(index: usize) -> Self {
        Self(u32::try_from(index).expect("symbol table overflow"))
    }

    /// Returns the raw index value.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Append-only symbol store.
#[derive(Debug)]
pub struct Interner {
    /// Symbol texts, indexed by `SymbolId`.
    strings: Vec<Box<str>>,
    /// Symbol indices ordered by their text, for binary-search lookup.
    order: Vec<u32>,
}

impl Interner {
    /// Creates an interner with the two reserved symbols pre-interned.
    #[must_use]
    pub fn new() -> Self {
        let mut interner = Self { strings: Vec::new(), order: Vec::new() };
        assert_eq!(interner.intern("nil"), SymbolId::NIL);
        assert_eq!(interner.intern("nothing"), SymbolId::NOTHING);
        interner
    }

    /// Interns `text`, returning the existing id when the string was seen
    /// before.
    pub fn intern(&mut self, text: &str) -> SymbolId {
        match self.search(text) {
            Ok(pos) => SymbolId(self.order[pos]),
            Err(pos) => {
                let id = SymbolId::from_index(self.strings.len());
                self.strings.push(text.into());
                self.order.insert(pos, id.0);
                id
            }
        }
    }

    /// Looks a string up without interning it.
    #[must_use]
    pub fn lookup(&self, text: &str) -> Option<SymbolId> {
        self.search(text).ok().map(|pos| SymbolId(self.order[pos]))
    }

    /// Returns the text of an interned symbol. Panics on an id that this
    /// interner never produced.
    #[must_use]
    pub fn get(&self, id: SymbolId) -> &str {
        &self.strings[id.index()]
    }

    /// Number of interned symbols, including the reserved ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    fn search(&self, text: &str) -> Result<usize, usize> {
        self.order.binary_search_by(|&ix| self.strings[ix as usize].as_ref().cmp(text))
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
