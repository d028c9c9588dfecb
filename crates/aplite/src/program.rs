//! Compiled programs.
//!
//! The front-end compiler is external; what reaches the runtime is a
//! [`Program`]: one bytecode stream, a constant pool, a block table (one
//! entry per user-defined function or modifier), a body table (entry offset
//! plus variable count, with the named-slot symbols), and a name table for
//! field access.
//!
//! [`ProgramSpec`] is the serde wire form of the same thing, so a compiled
//! program can be delivered as JSON: constants are written as tagged
//! descriptors (`{"number": 3}`, `{"string": "hi"}`, `{"primitive": "+"}`,
//! `{"block": 1}`, …) and resolved against the interner and the
//! runtime-provided bindings at load time.

use std::rc::Rc;

use serde::Deserialize;

use crate::{
    error::{RunError, RunResult},
    intern::{Interner, SymbolId},
    namespace::Namespace,
    value::Value,
};

/// One constant-pool entry.
///
/// Block references resolve to a closure (or run, for immediate blocks)
/// only when pushed, because they capture the environment current at the
/// push site.
#[derive(Debug, Clone)]
pub enum Constant {
    Value(Value),
    Block(usize),
}

/// What a block produces when instantiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Function,
    Modifier1,
    Modifier2,
}

/// One entry of the block table.
#[derive(Debug, Clone)]
pub struct Block {
    pub kind: BlockKind,
    /// Immediate blocks evaluate at the push site instead of producing a
    /// deferred value.
    pub immediate: bool,
    /// Bodies tried in order until one's pattern header accepts.
    pub bodies: Vec<usize>,
}

/// One entry of the body table.
#[derive(Debug, Clone)]
pub struct Body {
    /// Offset of the body's first opcode in the bytecode stream.
    pub start: usize,
    /// Total variable slots in the body's environment.
    pub num_vars: usize,
    /// Symbols of the trailing named slots, in declaration order.
    pub names: Vec<SymbolId>,
}

/// A complete compiled program.
#[derive(Debug)]
pub struct Program {
    pub bytecode: Vec<u8>,
    pub constants: Vec<Constant>,
    pub blocks: Vec<Block>,
    pub bodies: Vec<Body>,
    /// Field-name table indexed by `NS_FIELD`/`NS_ALIAS` immediates.
    pub names: Vec<SymbolId>,
}

impl Program {
    /// Assembles a program from parts, checking cross-table indices. Block 0
    /// is the entry point.
    #[must_use]
    pub fn new(
        bytecode: Vec<u8>,
        constants: Vec<Constant>,
        blocks: Vec<Block>,
        bodies: Vec<Body>,
        names: Vec<SymbolId>,
    ) -> Self {
        assert!(!blocks.is_empty(), "a program needs an entry block");
        for block in &blocks {
            assert!(!block.bodies.is_empty(), "a block needs at least one body");
            for &b in &block.bodies {
                assert!(b < bodies.len(), "block references body {b} outside the body table");
            }
        }
        for constant in &constants {
            if let Constant::Block(b) = constant {
                assert!(*b < blocks.len(), "constant references block {b} outside the block table");
            }
        }
        for body in &bodies {
            assert!(body.names.len() <= body.num_vars, "more slot names than slots");
            assert!(body.start < bytecode.len() || bytecode.is_empty(), "body starts past the bytecode");
        }
        Self { bytecode, constants, blocks, bodies, names }
    }
}

/// Wire form of a program.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProgramSpec {
    pub bytecode: Vec<u8>,
    pub constants: Vec<ConstSpec>,
    pub blocks: Vec<BlockSpec>,
    pub bodies: Vec<BodySpec>,
    #[serde(default)]
    pub names: Vec<String>,
}

/// Wire form of a constant-pool entry.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstSpec {
    /// A plain number.
    Number(f64),
    /// A number written in the language's literal syntax (`¯2.5`, `∞`,
    /// `π`, `2E3`, …).
    NumberLit(String),
    Character(char),
    /// An interned symbol.
    Symbol(String),
    /// A character array.
    String(String),
    /// A runtime-provided function or modifier, by glyph or name.
    Primitive(String),
    /// A reference into the block table.
    Block(usize),
}

/// Wire form of a block-table entry.
#[derive(Debug, Deserialize)]
pub struct BlockSpec {
    pub kind: BlockKind,
    #[serde(default)]
    pub immediate: bool,
    pub bodies: Vec<usize>,
}

/// Wire form of a body-table entry. `names` indexes the program's name
/// table.
#[derive(Debug, Deserialize)]
pub struct BodySpec {
    pub start: usize,
    pub vars: usize,
    #[serde(default)]
    pub names: Vec<usize>,
}

impl ProgramSpec {
    /// Parses the JSON wire form.
    pub fn parse(json: &str) -> RunResult<Self> {
        serde_json::from_str(json).map_err(|e| RunError::msg(format!("Program: {e}")))
    }

    /// Resolves the wire form against an interner and the runtime-provided
    /// bindings, producing an executable program.
    pub fn resolve(self, interner: &mut Interner, provided: &Namespace) -> RunResult<Program> {
        let names: Vec<SymbolId> = self.names.iter().map(|n| interner.intern(n)).collect();

        let mut constants = Vec::with_capacity(self.constants.len());
        for spec in self.constants {
            constants.push(match spec {
                ConstSpec::Number(n) => Constant::Value(Value::Number(n)),
                ConstSpec::NumberLit(text) => {
                    let n = parse_number(&text)
                        .ok_or_else(|| RunError::msg(format!("Program: Invalid number literal {text}")))?;
                    Constant::Value(Value::Number(n))
                }
                ConstSpec::Character(c) => Constant::Value(Value::Character(c)),
                ConstSpec::Symbol(text) => Constant::Value(Value::Symbol(interner.intern(&text))),
                ConstSpec::String(text) => Constant::Value(Value::string(&text)),
                ConstSpec::Primitive(name) => {
                    let symbol = interner.intern(&name);
                    let value = provided
                        .get(symbol)
                        .ok_or_else(|| RunError::msg(format!("Program: Unknown primitive {name}")))?;
                    Constant::Value(value)
                }
                ConstSpec::Block(b) => {
                    if b >= self.blocks.len() {
                        return Err(RunError::msg(format!("Program: Block index {b} out of range")));
                    }
                    Constant::Block(b)
                }
            });
        }

        let bodies = self
            .bodies
            .into_iter()
            .map(|spec| {
                let slot_names = spec
                    .names
                    .iter()
                    .map(|&i| {
                        names
                            .get(i)
                            .copied()
                            .ok_or_else(|| RunError::msg(format!("Program: Name index {i} out of range")))
                    })
                    .collect::<RunResult<Vec<_>>>()?;
                Ok(Body { start: spec.start, num_vars: spec.vars, names: slot_names })
            })
            .collect::<RunResult<Vec<_>>>()?;

        let blocks = self
            .blocks
            .into_iter()
            .map(|spec| Block { kind: spec.kind, immediate: spec.immediate, bodies: spec.bodies })
            .collect();

        Ok(Program::new(self.bytecode, constants, blocks, bodies, names))
    }
}

/// Shared handle used by the VM.
pub(crate) type ProgramRef = Rc<Program>;

/// Parses a number in the language's literal syntax: optional `¯` sign,
/// `∞`, `π`, `τ`, or a decimal mantissa with an optional `E` exponent
/// (whose own sign is again `¯`).
#[must_use]
pub fn parse_number(text: &str) -> Option<f64> {
    let mut chars = text.chars().peekable();
    let negative = chars.peek() == Some(&'¯');
    if negative {
        chars.next();
    }
    let sign = if negative { -1.0 } else { 1.0 };

    let base = match chars.peek()? {
        '∞' => {
            chars.next();
            return if chars.next().is_none() { Some(f64::INFINITY * sign) } else { None };
        }
        'π' => {
            chars.next();
            std::f64::consts::PI
        }
        'τ' => {
            chars.next();
            std::f64::consts::TAU
        }
        '0'..='9' => {
            let mut mantissa = 0.0f64;
            while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                mantissa = mantissa * 10.0 + f64::from(d);
                chars.next();
            }
            if chars.peek() == Some(&'.') {
                chars.next();
                let mut scale = 0.1f64;
                let mut saw_digit = false;
                while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
                    mantissa += f64::from(d) * scale;
                    scale /= 10.0;
                    saw_digit = true;
                    chars.next();
                }
                if !saw_digit {
                    return None;
                }
            }
            mantissa
        }
        _ => return None,
    };

    let mut value = base;
    if chars.peek() == Some(&'E') {
        chars.next();
        let exp_negative = chars.peek() == Some(&'¯');
        if exp_negative {
            chars.next();
        }
        let mut exponent = 0i32;
        let mut saw_digit = false;
        while let Some(d) = chars.peek().and_then(|c| c.to_digit(10)) {
            exponent = exponent.saturating_mul(10).saturating_add(d as i32);
            saw_digit = true;
            chars.next();
        }
        if !saw_digit {
            return None;
        }
        value = base * 10f64.powi(if exp_negative { -exponent } else { exponent });
    }

    if chars.next().is_some() {
        // Trailing text; complex suffixes are not supported.
        return None;
    }
    Some(value * sign)
}
