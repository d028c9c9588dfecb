//! Lexical environments.
//!
//! A frame holds a parent pointer and a sized vector of variable slots.
//! Each slot is a small state machine: `unset` until the first store,
//! `set` while it holds a value, and `cleared` once the VM has consumed it
//! with a get-and-clear. Reading an unset slot is a thrown error (the
//! program referenced a variable before defining it); touching a cleared
//! slot is an internal invariant violation, since only the compiler emits
//! clears and it must emit them last.

use std::{cell::RefCell, rc::Rc};

use crate::{
    error::{RunError, RunResult},
    intern::SymbolId,
    namespace::Namespace,
    value::Value,
};

/// Shared handle to an environment frame.
pub type EnvRef = Rc<RefCell<Env>>;

#[derive(Debug)]
enum SlotState {
    Unset,
    Set(Value),
    Cleared,
}

#[derive(Debug)]
struct Slot {
    /// Interned name, or [`SymbolId::NIL`] for anonymous positional slots.
    name: SymbolId,
    state: SlotState,
}

/// One lexical frame.
#[derive(Debug)]
pub struct Env {
    parent: Option<EnvRef>,
    slots: Vec<Slot>,
}

impl Env {
    /// Creates a frame with `num_vars` slots. The trailing `names.len()`
    /// slots are named in declaration order; the leading ones are anonymous.
    #[must_use]
    pub fn new(parent: Option<EnvRef>, num_vars: usize, names: &[SymbolId]) -> EnvRef {
        assert!(names.len() <= num_vars, "more slot names than slots");
        let first_named = num_vars - names.len();
        let slots = (0..num_vars)
            .map(|i| Slot {
                name: if i < first_named { SymbolId::NIL } else { names[i - first_named] },
                state: SlotState::Unset,
            })
            .collect();
        Rc::new(RefCell::new(Self { parent, slots }))
    }

    /// Follows `depth` parent links. Panics when the chain is too short,
    /// which means the bytecode is malformed.
    #[must_use]
    pub fn walk(env: &EnvRef, depth: usize) -> EnvRef {
        let mut current = Rc::clone(env);
        for _ in 0..depth {
            let parent = current.borrow().parent.clone();
            current = parent.expect("environment chain shorter than the requested depth");
        }
        current
    }

    #[must_use]
    pub fn num_vars(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn slot_name(&self, index: usize) -> SymbolId {
        self.slots[index].name
    }

    /// Reads a slot.
    pub fn get(&self, index: usize) -> RunResult<Value> {
        match &self.slots[index].state {
            SlotState::Set(v) => Ok(v.clone()),
            SlotState::Unset => Err(RunError::msg("Runtime: Variable referenced before definition")),
            SlotState::Cleared => panic!("variable used after clear"),
        }
    }

    /// Reads a slot and transitions it to `cleared`; any later touch is a
    /// bug.
    pub fn get_clear(&mut self, index: usize) -> RunResult<Value> {
        let slot = &mut self.slots[index];
        match std::mem::replace(&mut slot.state, SlotState::Cleared) {
            SlotState::Set(v) => Ok(v),
            SlotState::Unset => {
                slot.state = SlotState::Unset;
                Err(RunError::msg("Runtime: Variable referenced before definition"))
            }
            SlotState::Cleared => panic!("variable used after clear"),
        }
    }

    /// First-assignment store. Overwriting a set slot is permitted — header
    /// bodies may re-bind the same argument slots.
    pub fn set_define(&mut self, index: usize, value: Value) -> Value {
        let slot = &mut self.slots[index];
        match slot.state {
            SlotState::Cleared => panic!("variable used after clear"),
            _ => {
                slot.state = SlotState::Set(value.clone());
                value
            }
        }
    }

    /// Update store: the slot must already be set.
    pub fn set_update(&mut self, index: usize, value: Value) -> RunResult<Value> {
        let slot = &mut self.slots[index];
        match slot.state {
            SlotState::Set(_) => {
                slot.state = SlotState::Set(value.clone());
                Ok(value)
            }
            SlotState::Unset => Err(RunError::msg("↩: Variable modified before definition")),
            SlotState::Cleared => panic!("variable used after clear"),
        }
    }

    /// Builds a namespace from the named slots, in declaration order.
    /// Slots that never received a value are simply absent.
    #[must_use]
    pub fn to_namespace(&self) -> Namespace {
        let mut ns = Namespace::new(None);
        for slot in &self.slots {
            if slot.name == SymbolId::NIL {
                continue;
            }
            if let SlotState::Set(v) = &slot.state {
                ns.put(slot.name, v.clone());
            }
        }
        ns
    }
}
