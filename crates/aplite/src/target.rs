//! Assignment receivers.
//!
//! Assignment in the language goes through transient target objects: a
//! plain variable slot, a hole that discards, a matcher that compares, an
//! array of targets that destructures, and an alias that redirects to a
//! named namespace field. The VM builds targets on the operand stack and
//! the `SET_*` opcodes drive them through a small protocol: `get`,
//! define/update stores, and the soft `set_match` used by pattern headers.
//!
//! Stores throw on shape mismatches; `set_match` never throws for a plain
//! mismatch — it reports `false` so the VM can move to the next body.

use std::rc::Rc;

use crate::{
    array::Array,
    env::EnvRef,
    error::{RunError, RunResult},
    intern::SymbolId,
    namespace::NamespaceRef,
    value::{Value, deep_match},
};

/// Store discipline selected by the opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SetMode {
    /// First assignment.
    Define,
    /// The receiver must already be set.
    Update,
}

impl SetMode {
    /// Glyph used to prefix error messages, matching the surface syntax
    /// that produced the store.
    fn glyph(self) -> &'static str {
        match self {
            Self::Define => "←",
            Self::Update => "↩",
        }
    }
}

/// A transient assignment receiver.
#[derive(Debug)]
pub enum Target {
    /// An environment slot.
    Var { env: EnvRef, index: usize },
    /// Matches anything and discards it.
    Hole,
    /// Matches values that deep-match the stored one.
    Matcher(Value),
    /// Rank-1 destructuring over element targets.
    List(Vec<Rc<Target>>),
    /// Redirects to the field `name` of a namespace receiver, or renames
    /// the field an inner target projects from.
    Alias { recv: AliasRecv, name: SymbolId },
}

/// What an alias wraps.
#[derive(Debug)]
pub enum AliasRecv {
    Target(Rc<Target>),
    Namespace(NamespaceRef),
}

impl Target {
    /// Current value of the receiver, for read-modify-write stores.
    pub(crate) fn get(&self) -> RunResult<Value> {
        match self {
            Self::Var { env, index } => env.borrow().get(*index),
            Self::Hole => Ok(Value::default_character()),
            Self::Matcher(v) => Ok(v.clone()),
            Self::List(targets) => {
                let cells = targets.iter().map(|t| t.get()).collect::<RunResult<Vec<_>>>()?;
                Ok(Value::list(cells))
            }
            Self::Alias { recv: AliasRecv::Target(inner), .. } => inner.get(),
            Self::Alias { recv: AliasRecv::Namespace(ns), name } => ns
                .borrow()
                .get_local(*name)
                .ok_or_else(|| RunError::msg("Field: No such field in namespace")),
        }
    }

    /// Define or update store. Returns the stored value (for a destructuring
    /// target, the array of element results).
    pub(crate) fn set(&self, value: Value, mode: SetMode) -> RunResult<Value> {
        match self {
            Self::Var { env, index } => match mode {
                SetMode::Define => Ok(env.borrow_mut().set_define(*index, value)),
                SetMode::Update => env.borrow_mut().set_update(*index, value),
            },
            Self::Hole => Ok(value),
            Self::Matcher(_) => panic!("matcher target outside a pattern header"),
            Self::List(targets) => set_list(targets, &value, mode),
            Self::Alias { recv: AliasRecv::Target(inner), .. } => inner.set(value, mode),
            Self::Alias { recv: AliasRecv::Namespace(ns), name } => {
                let stored = match mode {
                    SetMode::Define => ns.borrow_mut().define(*name, value.clone()),
                    SetMode::Update => ns.borrow_mut().redefine(*name, value.clone()),
                };
                if stored {
                    Ok(value)
                } else {
                    Err(match mode {
                        SetMode::Define => RunError::msg("←: Field already defined in namespace"),
                        SetMode::Update => RunError::msg("↩: No such field in namespace"),
                    })
                }
            }
        }
    }

    /// Pattern-header store: `Ok(true)` when the value fits the target,
    /// `Ok(false)` when the body should be abandoned.
    pub(crate) fn set_match(&self, value: &Value) -> RunResult<bool> {
        match self {
            Self::Var { env, index } => {
                env.borrow_mut().set_define(*index, value.clone());
                Ok(true)
            }
            Self::Hole => Ok(true),
            Self::Matcher(expected) => Ok(deep_match(expected, value)),
            Self::List(targets) => match_list(targets, value),
            Self::Alias { recv: AliasRecv::Target(inner), .. } => inner.set_match(value),
            Self::Alias { recv: AliasRecv::Namespace(ns), name } => {
                ns.borrow_mut().put(*name, value.clone());
                Ok(true)
            }
        }
    }

    /// The field name this target projects out of a namespace, when it has
    /// one: a named variable slot projects its own name, an alias the name
    /// it was built with.
    pub(crate) fn field_name(&self) -> Option<SymbolId> {
        match self {
            Self::Var { env, index } => {
                let name = env.borrow().slot_name(*index);
                (name != SymbolId::NIL).then_some(name)
            }
            Self::Alias { name, .. } => Some(*name),
            _ => None,
        }
    }
}

fn set_list(targets: &[Rc<Target>], value: &Value, mode: SetMode) -> RunResult<Value> {
    let glyph = mode.glyph();
    match value {
        Value::Array(a) => {
            if a.rank() != 1 || a.axis_len(0) != targets.len() {
                return Err(RunError::msg(format!("{glyph}: Target and value shapes don't match")));
            }
            let results = targets
                .iter()
                .enumerate()
                .map(|(i, t)| t.set(a.get_cell(i), mode))
                .collect::<RunResult<Vec<_>>>()?;
            Ok(Value::Array(Rc::new(Array::from_values(results))))
        }
        Value::Namespace(ns) => {
            let results = targets
                .iter()
                .map(|t| {
                    let name = t.field_name().ok_or_else(|| {
                        RunError::msg(format!("{glyph}: Cannot extract non-name from namespace"))
                    })?;
                    let field = ns.borrow().get_local(name).ok_or_else(|| {
                        RunError::msg(format!("{glyph}: No such field in namespace"))
                    })?;
                    t.set(field, mode)
                })
                .collect::<RunResult<Vec<_>>>()?;
            Ok(Value::Array(Rc::new(Array::from_values(results))))
        }
        _ => Err(RunError::msg(format!("{glyph}: Multiple targets but atomic value"))),
    }
}

fn match_list(targets: &[Rc<Target>], value: &Value) -> RunResult<bool> {
    match value {
        Value::Array(a) => {
            if a.rank() != 1 || a.axis_len(0) != targets.len() {
                return Ok(false);
            }
            for (i, t) in targets.iter().enumerate() {
                if !t.set_match(&a.get_cell(i))? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Value::Namespace(ns) => {
            for t in targets {
                let Some(name) = t.field_name() else { return Ok(false) };
                let Some(field) = ns.borrow().get_local(name) else { return Ok(false) };
                if !t.set_match(&field)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        _ => Ok(false),
    }
}
