//! Function-kind values.
//!
//! Functions and modifiers are tagged unions of concrete built-ins, compiled
//! blocks closed over their environment, and composed forms. Applying a
//! modifier builds a new composed value rather than calling anything —
//! modifiers are curried through these variants, and the evaluator takes
//! them apart again at call time.
//!
//! Concrete built-ins carry a [`Primitive`] id; the id doubles as the
//! identity used by deep match, so two references to the same built-in
//! always compare equal.

use strum::{Display, EnumIter, EnumString};

use crate::{env::EnvRef, intern::Interner, value::Value};

/// A compiled block plus the environment it closed over.
#[derive(Debug, Clone)]
pub struct BlockClosure {
    /// Index into the program's block table.
    pub block: usize,
    /// Environment the block was instantiated in; bodies run in a child of
    /// this frame.
    pub env: EnvRef,
}

/// A function value.
#[derive(Debug)]
pub enum Function {
    /// Concrete built-in.
    Primitive(Primitive),
    /// Compiled block.
    Block(BlockClosure),
    /// `F M` for a 1-modifier `M`.
    AppliedM1 { m: Value, f: Value },
    /// `F M G` for a 2-modifier `M`.
    AppliedM2 { m: Value, f: Value, g: Value },
    /// 2-train `G H`.
    Train2 { g: Value, h: Value },
    /// 3-train `F G H`.
    Train3 { f: Value, g: Value, h: Value },
}

/// A 1-modifier value.
#[derive(Debug)]
pub enum Modifier1 {
    Primitive(Primitive1),
    Block(BlockClosure),
    /// A 2-modifier with its right operand bound, acting as a 1-modifier.
    PartialM2 { m: Value, g: Value },
}

/// A 2-modifier value.
#[derive(Debug)]
pub enum Modifier2 {
    Primitive(Primitive2),
    Block(BlockClosure),
}

/// Concrete built-in functions, named by glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
pub enum Primitive {
    #[strum(to_string = "+", serialize = "Add")]
    Add,
    #[strum(to_string = "-", serialize = "Sub")]
    Sub,
    #[strum(to_string = "×", serialize = "Mul")]
    Mul,
    #[strum(to_string = "÷", serialize = "Div")]
    Div,
    #[strum(to_string = "⋆", serialize = "Power")]
    Power,
    #[strum(to_string = "⌊", serialize = "Floor")]
    Floor,
    #[strum(to_string = "⌈", serialize = "Ceiling")]
    Ceiling,
    #[strum(to_string = "|", serialize = "Modulus")]
    Modulus,
    #[strum(to_string = "≤", serialize = "Le")]
    Le,
    #[strum(to_string = "<", serialize = "Lt")]
    Lt,
    #[strum(to_string = ">", serialize = "Gt")]
    Gt,
    #[strum(to_string = "≥", serialize = "Ge")]
    Ge,
    #[strum(to_string = "=", serialize = "Eq")]
    Eq,
    #[strum(to_string = "≠", serialize = "Ne")]
    Ne,
    #[strum(to_string = "≢", serialize = "Shape")]
    Shape,
    #[strum(to_string = "⥊", serialize = "Reshape")]
    Reshape,
    #[strum(to_string = "↕", serialize = "Range")]
    Range,
    #[strum(to_string = "⊑", serialize = "Pick")]
    Pick,
    #[strum(to_string = "!", serialize = "Assert")]
    Assert,
    #[strum(to_string = "⊣", serialize = "Left")]
    Left,
    #[strum(to_string = "⊢", serialize = "Right")]
    Right,
    /// Reads or replaces an array's fill element.
    Fill,
    /// Natural logarithm; dyad is log base 𝕨.
    Log,
    /// Length of each group for group-by indices.
    GroupLen,
    /// Grouped ordering of indices, given the lengths from `GroupLen`.
    GroupOrd,
}

/// Concrete built-in 1-modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
pub enum Primitive1 {
    #[strum(to_string = "˙", serialize = "Constant")]
    Constant,
    #[strum(to_string = "˜", serialize = "Swap")]
    Swap,
    #[strum(to_string = "¨", serialize = "Each")]
    Each,
    #[strum(to_string = "⌜", serialize = "Table")]
    Table,
    #[strum(to_string = "`", serialize = "Scan")]
    Scan,
}

/// Concrete built-in 2-modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
pub enum Primitive2 {
    #[strum(to_string = "∘", serialize = "Atop")]
    Atop,
    #[strum(to_string = "○", serialize = "Over")]
    Over,
    #[strum(to_string = "⊸", serialize = "Before")]
    Before,
    #[strum(to_string = "⟜", serialize = "After")]
    After,
    #[strum(to_string = "⊘", serialize = "Valences")]
    Valences,
    #[strum(to_string = "◶", serialize = "Choose")]
    Choose,
    #[strum(to_string = "⎊", serialize = "Catch")]
    Catch,
    #[strum(to_string = "_fill_by_")]
    FillBy,
}

impl Function {
    pub(crate) fn render(&self, interner: &Interner) -> String {
        match self {
            Self::Primitive(p) => p.to_string(),
            Self::Block(_) => "(block)".to_owned(),
            Self::AppliedM1 { m, f } => format!("{}{}", f.render(interner), m.render(interner)),
            Self::AppliedM2 { m, f, g } => {
                format!("{}{}{}", f.render(interner), m.render(interner), g.render(interner))
            }
            Self::Train2 { g, h } => format!("({} {})", g.render(interner), h.render(interner)),
            Self::Train3 { f, g, h } => {
                format!("({} {} {})", f.render(interner), g.render(interner), h.render(interner))
            }
        }
    }
}

impl Modifier1 {
    pub(crate) fn render(&self, interner: &Interner) -> String {
        match self {
            Self::Primitive(p) => p.to_string(),
            Self::Block(_) => "(1-modifier block)".to_owned(),
            Self::PartialM2 { m, g } => format!("{}{}", m.render(interner), g.render(interner)),
        }
    }
}

impl Modifier2 {
    pub(crate) fn render(&self, _interner: &Interner) -> String {
        match self {
            Self::Primitive(p) => p.to_string(),
            Self::Block(_) => "(2-modifier block)".to_owned(),
        }
    }
}
