//! The uniform tagged value.
//!
//! Every expression in the language produces a [`Value`]. Numbers,
//! characters, and symbols are carried inline; arrays, functions, modifiers,
//! namespaces, and streams are reference-counted heap objects. Composition
//! always descends (a composed function refers only to values that already
//! exist), so plain reference counting is sound and cycles cannot form among
//! the immutable kinds.
//!
//! `unpack_*` on the wrong kind is an internal invariant violation and
//! panics; use the `is_*`/`as_*` forms when the kind is not known.

use std::rc::Rc;

use crate::{
    array::Array,
    error::{RunError, RunResult},
    function::{Function, Modifier1, Modifier2},
    intern::{Interner, SymbolId},
    namespace::NamespaceRef,
    resource::MAX_MATCH_DEPTH,
    target::Target,
};

/// Reserved kind for asynchronous streams. The surface language sketches
/// these; the core only reserves the tag.
#[derive(Debug)]
pub struct Stream;

/// The nine value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Kind {
    Number,
    Character,
    Symbol,
    Array,
    Function,
    Modifier1,
    Modifier2,
    Namespace,
    Stream,
}

/// A tagged runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    /// Any IEEE-754 double.
    Number(f64),
    /// A Unicode scalar.
    Character(char),
    /// An interned symbol.
    Symbol(SymbolId),
    Array(Rc<Array>),
    Function(Rc<Function>),
    Modifier1(Rc<Modifier1>),
    Modifier2(Rc<Modifier2>),
    Namespace(NamespaceRef),
    Stream(Rc<Stream>),
    /// Assignment receiver pushed by the VM while destructuring. Never
    /// produced by user-visible evaluation and never a result.
    Target(Rc<Target>),
}

impl Value {
    /// The `nil` symbol.
    #[must_use]
    pub fn nil() -> Self {
        Self::Symbol(SymbolId::NIL)
    }

    /// The distinguished "argument absent" marker.
    #[must_use]
    pub fn nothing() -> Self {
        Self::Symbol(SymbolId::NOTHING)
    }

    #[must_use]
    pub fn zero() -> Self {
        Self::Number(0.0)
    }

    #[must_use]
    pub fn one() -> Self {
        Self::Number(1.0)
    }

    /// The canonical initial character, `@`.
    #[must_use]
    pub fn default_character() -> Self {
        Self::Character('@')
    }

    /// A character array holding `text`, with the canonical space fill.
    #[must_use]
    pub fn string(text: &str) -> Self {
        Self::Array(Rc::new(Array::string(text)))
    }

    /// A rank-1 boxed array of `cells`.
    #[must_use]
    pub fn list(cells: Vec<Self>) -> Self {
        Self::Array(Rc::new(Array::from_values(cells)))
    }

    /// The canonical empty array: shape `[0]`, no cells, fill `0`.
    #[must_use]
    pub fn empty_array() -> Self {
        Self::Array(Rc::new(Array::empty()))
    }

    /// The kind tag. Panics on a target, which is not a value kind.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Self::Number(_) => Kind::Number,
            Self::Character(_) => Kind::Character,
            Self::Symbol(_) => Kind::Symbol,
            Self::Array(_) => Kind::Array,
            Self::Function(_) => Kind::Function,
            Self::Modifier1(_) => Kind::Modifier1,
            Self::Modifier2(_) => Kind::Modifier2,
            Self::Namespace(_) => Kind::Namespace,
            Self::Stream(_) => Kind::Stream,
            Self::Target(_) => panic!("assignment target escaped the VM"),
        }
    }

    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    #[must_use]
    pub fn is_character(&self) -> bool {
        matches!(self, Self::Character(_))
    }

    #[must_use]
    pub fn is_symbol(&self) -> bool {
        matches!(self, Self::Symbol(_))
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    #[must_use]
    pub fn is_function(&self) -> bool {
        matches!(self, Self::Function(_))
    }

    #[must_use]
    pub fn is_namespace(&self) -> bool {
        matches!(self, Self::Namespace(_))
    }

    /// True for the `nothing` symbol.
    #[must_use]
    pub fn is_nothing(&self) -> bool {
        matches!(self, Self::Symbol(SymbolId::NOTHING))
    }

    #[must_use]
    pub fn unpack_number(&self) -> f64 {
        match self {
            Self::Number(n) => *n,
            other => panic!("expected a number, found {:?}", other.kind()),
        }
    }

    #[must_use]
    pub fn unpack_character(&self) -> char {
        match self {
            Self::Character(c) => *c,
            other => panic!("expected a character, found {:?}", other.kind()),
        }
    }

    #[must_use]
    pub fn unpack_symbol(&self) -> SymbolId {
        match self {
            Self::Symbol(s) => *s,
            other => panic!("expected a symbol, found {:?}", other.kind()),
        }
    }

    #[must_use]
    pub fn unpack_array(&self) -> &Array {
        match self {
            Self::Array(a) => a,
            other => panic!("expected an array, found {:?}", other.kind()),
        }
    }

    #[must_use]
    pub fn unpack_function(&self) -> &Function {
        match self {
            Self::Function(f) => f,
            other => panic!("expected a function, found {:?}", other.kind()),
        }
    }

    #[must_use]
    pub fn unpack_namespace(&self) -> &NamespaceRef {
        match self {
            Self::Namespace(ns) => ns,
            other => panic!("expected a namespace, found {:?}", other.kind()),
        }
    }

    #[must_use]
    pub(crate) fn unpack_target(self) -> Rc<Target> {
        match self {
            Self::Target(t) => t,
            other => panic!("expected an assignment target, found {:?}", other.kind()),
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Coerces to a natural number: a finite number equal to its rounded
    /// value, nonnegative and below 2³². `None` when not coercible — callers
    /// that want an error use [`Self::expect_natural`] instead.
    #[must_use]
    pub fn as_natural(&self) -> Option<i64> {
        match self {
            Self::Number(n) => integral(*n).filter(|&i| (0..1i64 << 32).contains(&i)),
            _ => None,
        }
    }

    /// Like [`Self::as_natural`] but throws, prefixing the message with the
    /// call site's description of the operand.
    pub fn expect_natural(&self, what: &str) -> RunResult<i64> {
        self.as_natural().ok_or_else(|| RunError::msg(format!("{what} must be a natural number")))
    }

    /// The fill template of a value: space for characters, `0` for numbers,
    /// cell-wise recursion for arrays, `nil` otherwise.
    #[must_use]
    pub fn to_fill(&self) -> Self {
        match self {
            Self::Character(_) => Self::Character(' '),
            Self::Number(_) => Self::zero(),
            Self::Array(a) => {
                let cells: Vec<Self> = (0..a.num_cells()).map(|i| a.get_cell(i).to_fill()).collect();
                Self::Array(Rc::new(Array::new(
                    a.shape().clone(),
                    crate::data::Data::from_values(cells),
                    a.fill().clone(),
                )))
            }
            _ => Self::nil(),
        }
    }

    /// Renders the value to text, for error display and the exit path.
    #[must_use]
    pub fn render(&self, interner: &Interner) -> String {
        match self {
            Self::Number(n) => render_number(*n),
            Self::Character(c) => format!("'{c}'"),
            Self::Symbol(s) => interner.get(*s).to_owned(),
            Self::Array(a) => a.render(interner),
            Self::Function(f) => f.render(interner),
            Self::Modifier1(m) => m.render(interner),
            Self::Modifier2(m) => m.render(interner),
            Self::Namespace(_) => "(namespace)".to_owned(),
            Self::Stream(_) => "(stream)".to_owned(),
            Self::Target(_) => "(target)".to_owned(),
        }
    }
}

/// Renders a number the way the language writes literals: `¯` for the
/// minus sign, `∞` for infinities, integers without a fraction.
#[must_use]
pub(crate) fn render_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_owned();
    }
    let sign = if n.is_sign_negative() && n != 0.0 { "¯" } else { "" };
    let magnitude = n.abs();
    if magnitude.is_infinite() {
        return format!("{sign}∞");
    }
    if magnitude.fract() == 0.0 && magnitude < 1e15 {
        return format!("{sign}{}", magnitude as u64);
    }
    let mut buffer = ryu::Buffer::new();
    format!("{sign}{}", buffer.format(magnitude))
}

pub(crate) fn integral(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 2f64.powi(63) {
        Some(n as i64)
    } else {
        None
    }
}

/// Structural equality over values.
///
/// Bit-for-bit identical primitives are equal; otherwise the kinds must
/// match and the kind's structural rule applies: arrays compare shape and
/// cells, composed functions compare their parts, concrete built-ins compare
/// by identity, and compiled blocks are never equal across references.
/// Numbers use IEEE equality (`±0` identified, NaN never equal).
#[must_use]
pub fn deep_match(a: &Value, b: &Value) -> bool {
    match_at_depth(a, b, 0)
}

fn match_at_depth(a: &Value, b: &Value, depth: usize) -> bool {
    if depth > MAX_MATCH_DEPTH {
        return false;
    }
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::Character(x), Value::Character(y)) => x == y,
        (Value::Symbol(x), Value::Symbol(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            if Rc::ptr_eq(x, y) {
                return true;
            }
            if x.rank() != y.rank() {
                return false;
            }
            for k in 0..x.rank() {
                if x.axis_len(k) != y.axis_len(k) {
                    return false;
                }
            }
            (0..x.num_cells()).all(|i| match_at_depth(&x.get_cell(i), &y.get_cell(i), depth + 1))
        }
        (Value::Function(x), Value::Function(y)) => {
            Rc::ptr_eq(x, y) || function_match(x, y, depth)
        }
        (Value::Modifier1(x), Value::Modifier1(y)) => {
            Rc::ptr_eq(x, y) || modifier1_match(x, y, depth)
        }
        (Value::Modifier2(x), Value::Modifier2(y)) => {
            Rc::ptr_eq(x, y) || matches!((&**x, &**y), (Modifier2::Primitive(p), Modifier2::Primitive(q)) if p == q)
        }
        (Value::Namespace(x), Value::Namespace(y)) => Rc::ptr_eq(x, y),
        (Value::Stream(x), Value::Stream(y)) => Rc::ptr_eq(x, y),
        _ => false,
    }
}

fn function_match(a: &Function, b: &Function, depth: usize) -> bool {
    if depth > MAX_MATCH_DEPTH {
        return false;
    }
    match (a, b) {
        (Function::Primitive(p), Function::Primitive(q)) => p == q,
        (Function::AppliedM1 { m: ma, f: fa }, Function::AppliedM1 { m: mb, f: fb }) => {
            match_at_depth(ma, mb, depth + 1) && match_at_depth(fa, fb, depth + 1)
        }
        (
            Function::AppliedM2 { m: ma, f: fa, g: ga },
            Function::AppliedM2 { m: mb, f: fb, g: gb },
        ) => {
            match_at_depth(ma, mb, depth + 1)
                && match_at_depth(fa, fb, depth + 1)
                && match_at_depth(ga, gb, depth + 1)
        }
        (Function::Train2 { g: ga, h: ha }, Function::Train2 { g: gb, h: hb }) => {
            match_at_depth(ga, gb, depth + 1) && match_at_depth(ha, hb, depth + 1)
        }
        (Function::Train3 { f: fa, g: ga, h: ha }, Function::Train3 { f: fb, g: gb, h: hb }) => {
            match_at_depth(fa, fb, depth + 1)
                && match_at_depth(ga, gb, depth + 1)
                && match_at_depth(ha, hb, depth + 1)
        }
        // Compiled blocks are never equal across references.
        _ => false,
    }
}

fn modifier1_match(a: &Modifier1, b: &Modifier1, depth: usize) -> bool {
    match (a, b) {
        (Modifier1::Primitive(p), Modifier1::Primitive(q)) => p == q,
        (Modifier1::PartialM2 { m: ma, g: ga }, Modifier1::PartialM2 { m: mb, g: gb }) => {
            match_at_depth(ma, mb, depth + 1) && match_at_depth(ga, gb, depth + 1)
        }
        _ => false,
    }
}
