//! The virtual machine.
//!
//! A stack-based interpreter over one compiled [`Program`]. Each body runs
//! with its own operand stack and a fresh environment frame; `evoke` is the
//! single entry point for applying any function-kind value, shared by the
//! call opcodes and by every primitive modifier that calls back into its
//! operands.
//!
//! Thrown errors unwind as `Err` through the interpreter; the `⎊` modifier
//! catches them at its application extent, which preserves the last-in
//! first-out handler discipline without a separate handler stack.

use std::rc::Rc;

use crate::{
    bytecode::{Cursor, Opcode},
    env::{Env, EnvRef},
    error::{RunError, RunResult},
    function::{BlockClosure, Function, Modifier1, Modifier2},
    intern::Interner,
    primitives,
    program::{BlockKind, Body, Constant, Program, ProgramRef, ProgramSpec},
    resource::Limits,
    target::{AliasRecv, SetMode, Target},
    tracer::{NoopTracer, VmTracer},
    value::{Value, deep_match},
};

/// How a function-kind value is being called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evocation {
    /// One argument: `𝕩`, with `𝕨` set to `nothing`.
    Monad,
    /// Two arguments: `𝕩` and `𝕨`.
    Dyad,
    /// Store through the callee, for writable selections.
    Write,
    /// Apply the callee's inverse.
    Inverse,
}

impl Evocation {
    pub(crate) fn describe(self) -> &'static str {
        match self {
            Self::Monad => "monadic",
            Self::Dyad => "dyadic",
            Self::Write => "write",
            Self::Inverse => "inverse",
        }
    }
}

/// A virtual machine bound to one compiled program.
#[derive(Debug)]
pub struct Vm<T: VmTracer = NoopTracer> {
    program: ProgramRef,
    interner: Interner,
    limits: Limits,
    tracer: T,
    depth: usize,
}

impl Vm<NoopTracer> {
    #[must_use]
    pub fn new(program: Program, interner: Interner) -> Self {
        Self::with_tracer(program, interner, NoopTracer)
    }

    /// Loads a program from its JSON wire form, resolving primitive
    /// references against the runtime-provided bindings.
    pub fn from_json(json: &str) -> RunResult<Self> {
        let mut interner = Interner::new();
        let provided = primitives::provided_namespace(&mut interner);
        let program = ProgramSpec::parse(json)?.resolve(&mut interner, &provided)?;
        Ok(Self::new(program, interner))
    }
}

impl<T: VmTracer> Vm<T> {
    #[must_use]
    pub fn with_tracer(program: Program, interner: Interner, tracer: T) -> Self {
        Self { program: Rc::new(program), interner, limits: Limits::default(), tracer, depth: 0 }
    }

    #[must_use]
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    #[must_use]
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    #[must_use]
    pub fn interner_mut(&mut self) -> &mut Interner {
        &mut self.interner
    }

    #[must_use]
    pub fn tracer(&self) -> &T {
        &self.tracer
    }

    pub(crate) fn note_throw(&mut self) {
        self.tracer.throw();
    }

    /// Executes block 0 to completion and returns its result. An uncaught
    /// throw surfaces as `Err`; rendering it and exiting nonzero is the
    /// host's decision.
    pub fn run(&mut self) -> RunResult<Value> {
        let program = Rc::clone(&self.program);
        let bodies = program.blocks[0].bodies.clone();
        let result = self.run_bodies(&bodies, |body| Env::new(None, body.num_vars, &body.names));
        if result.is_err() {
            self.tracer.throw();
        }
        result
    }

    /// Applies a function-kind value.
    ///
    /// Non-function values coerce to themselves: a constant called with any
    /// arguments is its own result. Monadic calls carry `nothing` as `w`.
    pub fn evoke(&mut self, callee: &Value, evocation: Evocation, x: Value, w: Value) -> RunResult<Value> {
        if self.depth >= self.limits.max_call_depth {
            return Err(RunError::msg("Runtime: Call depth exceeded"));
        }
        self.depth += 1;
        let result = self.evoke_inner(callee, evocation, x, w);
        self.depth -= 1;
        result
    }

    fn evoke_inner(&mut self, callee: &Value, evocation: Evocation, x: Value, w: Value) -> RunResult<Value> {
        let Value::Function(function) = callee else {
            return Ok(callee.clone());
        };
        match &**function {
            Function::Primitive(p) => primitives::function(*p, evocation, x, w),
            Function::Block(closure) => {
                let closure = closure.clone();
                self.call_block(&closure, BlockArgs::Function, evocation, x, w)
            }
            Function::AppliedM1 { m, f } => {
                let (m, f) = (m.clone(), f.clone());
                self.evoke_m1(&m, &f, evocation, x, w)
            }
            Function::AppliedM2 { m, f, g } => {
                let (m, f, g) = (m.clone(), f.clone(), g.clone());
                self.evoke_m2(&m, &f, &g, evocation, x, w)
            }
            Function::Train2 { g, h } => {
                let (g, h) = (g.clone(), h.clone());
                let inner = self.evoke(&h, evocation, x, w)?;
                self.evoke(&g, Evocation::Monad, inner, Value::nothing())
            }
            Function::Train3 { f, g, h } => {
                let (f, g, h) = (f.clone(), g.clone(), h.clone());
                let right = self.evoke(&h, evocation, x.clone(), w.clone())?;
                let left = self.evoke(&f, evocation, x, w)?;
                self.evoke(&g, Evocation::Dyad, right, left)
            }
        }
    }

    pub(crate) fn evoke_m1(
        &mut self,
        m: &Value,
        f: &Value,
        evocation: Evocation,
        x: Value,
        w: Value,
    ) -> RunResult<Value> {
        match m {
            Value::Modifier1(modifier) => match &**modifier {
                Modifier1::Primitive(p) => {
                    let p = *p;
                    primitives::modifier1(self, p, evocation, f, x, w)
                }
                Modifier1::Block(closure) => {
                    let closure = closure.clone();
                    self.call_block(&closure, BlockArgs::M1 { f: f.clone() }, evocation, x, w)
                }
                Modifier1::PartialM2 { m, g } => {
                    let (m, g) = (m.clone(), g.clone());
                    self.evoke_m2(&m, f, &g, evocation, x, w)
                }
            },
            other => panic!("applied 1-modifier does not hold a 1-modifier: {:?}", other.kind()),
        }
    }

    pub(crate) fn evoke_m2(
        &mut self,
        m: &Value,
        f: &Value,
        g: &Value,
        evocation: Evocation,
        x: Value,
        w: Value,
    ) -> RunResult<Value> {
        match m {
            Value::Modifier2(modifier) => match &**modifier {
                Modifier2::Primitive(p) => {
                    let p = *p;
                    primitives::modifier2(self, p, evocation, f, g, x, w)
                }
                Modifier2::Block(closure) => {
                    let closure = closure.clone();
                    self.call_block(
                        &closure,
                        BlockArgs::M2 { f: f.clone(), g: g.clone() },
                        evocation,
                        x,
                        w,
                    )
                }
            },
            other => panic!("applied 2-modifier does not hold a 2-modifier: {:?}", other.kind()),
        }
    }

    fn call_block(
        &mut self,
        closure: &BlockClosure,
        args: BlockArgs,
        evocation: Evocation,
        x: Value,
        w: Value,
    ) -> RunResult<Value> {
        if !matches!(evocation, Evocation::Monad | Evocation::Dyad) {
            return Err(RunError::msg(format!("Block: No {} form", evocation.describe())));
        }
        let program = Rc::clone(&self.program);
        let block = &program.blocks[closure.block];
        let lead: Vec<Value> = match args {
            BlockArgs::Function => vec![x, w],
            BlockArgs::M1 { f } => vec![f, x, w],
            BlockArgs::M2 { f, g } => vec![f, g, x, w],
        };
        let parent = Rc::clone(&closure.env);
        let bodies = block.bodies.clone();
        self.run_bodies(&bodies, move |body| {
            let env = Env::new(Some(Rc::clone(&parent)), body.num_vars, &body.names);
            {
                let mut frame = env.borrow_mut();
                for (i, v) in lead.iter().enumerate() {
                    if i < body.num_vars {
                        frame.set_define(i, v.clone());
                    }
                }
            }
            env
        })
    }

    /// Runs a block's bodies in order until one's header accepts.
    fn run_bodies(
        &mut self,
        bodies: &[usize],
        mut make_env: impl FnMut(&Body) -> EnvRef,
    ) -> RunResult<Value> {
        let program = Rc::clone(&self.program);
        for &body_index in bodies {
            let env = make_env(&program.bodies[body_index]);
            if let Some(result) = self.run_body(body_index, env)? {
                return Ok(result);
            }
        }
        Err(RunError::msg("No matching case"))
    }

    /// Resolves a block-reference constant at its push site: deferred
    /// blocks close over the current environment, immediate blocks run now.
    fn instantiate_block(&mut self, index: usize, env: &EnvRef) -> RunResult<Value> {
        let program = Rc::clone(&self.program);
        let block = &program.blocks[index];
        if block.immediate {
            let parent = Rc::clone(env);
            let bodies = block.bodies.clone();
            return self.run_bodies(&bodies, move |body| {
                Env::new(Some(Rc::clone(&parent)), body.num_vars, &body.names)
            });
        }
        let closure = BlockClosure { block: index, env: Rc::clone(env) };
        Ok(match block.kind {
            BlockKind::Function => Value::Function(Rc::new(Function::Block(closure))),
            BlockKind::Modifier1 => Value::Modifier1(Rc::new(Modifier1::Block(closure))),
            BlockKind::Modifier2 => Value::Modifier2(Rc::new(Modifier2::Block(closure))),
        })
    }

    /// Interprets one body. `Ok(None)` means a header rejected the
    /// arguments and the next body should be tried.
    fn run_body(&mut self, body_index: usize, env: EnvRef) -> RunResult<Option<Value>> {
        let program = Rc::clone(&self.program);
        let body = &program.bodies[body_index];
        let mut cursor = Cursor::new(&program.bytecode, body.start);
        let mut stack: Vec<Value> = Vec::new();

        loop {
            let pc = cursor.pos;
            let op = cursor.op();
            self.tracer.op(pc, op);
            match op {
                Opcode::PushConst => {
                    let n = cursor.nat();
                    let constant =
                        program.constants.get(n).unwrap_or_else(|| panic!("constant {n} out of range"));
                    match constant {
                        Constant::Value(v) => stack.push(v.clone()),
                        Constant::Block(b) => {
                            let v = self.instantiate_block(*b, &env)?;
                            stack.push(v);
                        }
                    }
                }
                Opcode::Drop => {
                    let _ = pop(&mut stack);
                }
                Opcode::Ret => return Ok(Some(pop(&mut stack))),
                Opcode::RetNs => {
                    let ns = env.borrow().to_namespace();
                    return Ok(Some(Value::Namespace(ns.into_ref())));
                }
                Opcode::MkArray => {
                    let n = cursor.nat();
                    let cells = pop_many(&mut stack, n);
                    stack.push(Value::list(cells));
                }
                Opcode::MkTargetArray => {
                    let n = cursor.nat();
                    let targets =
                        pop_many(&mut stack, n).into_iter().map(Value::unpack_target).collect();
                    stack.push(Value::Target(Rc::new(Target::List(targets))));
                }
                Opcode::Call1 => {
                    let x = pop(&mut stack);
                    let f = pop(&mut stack);
                    let r = self.evoke(&f, Evocation::Monad, x, Value::nothing())?;
                    stack.push(r);
                }
                Opcode::Call2 => {
                    let x = pop(&mut stack);
                    let f = pop(&mut stack);
                    let w = pop(&mut stack);
                    let r = self.evoke(&f, Evocation::Dyad, x, w)?;
                    stack.push(r);
                }
                Opcode::Call1Opt => {
                    let x = pop(&mut stack);
                    let f = pop(&mut stack);
                    let r = if x.is_nothing() {
                        x
                    } else {
                        self.evoke(&f, Evocation::Monad, x, Value::nothing())?
                    };
                    stack.push(r);
                }
                Opcode::Call2Opt => {
                    let x = pop(&mut stack);
                    let f = pop(&mut stack);
                    let w = pop(&mut stack);
                    let r = if x.is_nothing() {
                        x
                    } else if w.is_nothing() {
                        self.evoke(&f, Evocation::Monad, x, w)?
                    } else {
                        self.evoke(&f, Evocation::Dyad, x, w)?
                    };
                    stack.push(r);
                }
                Opcode::Train2 => {
                    let h = pop(&mut stack);
                    let g = pop(&mut stack);
                    stack.push(Value::Function(Rc::new(Function::Train2 { g, h })));
                }
                Opcode::Train3 => {
                    let h = pop(&mut stack);
                    let g = pop(&mut stack);
                    let f = pop(&mut stack);
                    stack.push(Value::Function(Rc::new(Function::Train3 { f, g, h })));
                }
                Opcode::Train3Opt => {
                    let h = pop(&mut stack);
                    let g = pop(&mut stack);
                    let f = pop(&mut stack);
                    let train = if f.is_nothing() {
                        Function::Train2 { g, h }
                    } else {
                        Function::Train3 { f, g, h }
                    };
                    stack.push(Value::Function(Rc::new(train)));
                }
                Opcode::RequireLeft => {
                    let top = stack.last().expect("operand stack underflow");
                    if top.is_nothing() {
                        return Err(RunError::msg("Left argument required"));
                    }
                }
                Opcode::ApplyM1 => {
                    let m = pop(&mut stack);
                    let f = pop(&mut stack);
                    assert!(
                        matches!(m, Value::Modifier1(_)),
                        "1-modifier application without a 1-modifier"
                    );
                    stack.push(Value::Function(Rc::new(Function::AppliedM1 { m, f })));
                }
                Opcode::ApplyM2 => {
                    let g = pop(&mut stack);
                    let m = pop(&mut stack);
                    let f = pop(&mut stack);
                    assert!(
                        matches!(m, Value::Modifier2(_)),
                        "2-modifier application without a 2-modifier"
                    );
                    stack.push(Value::Function(Rc::new(Function::AppliedM2 { m, f, g })));
                }
                Opcode::VarGet => {
                    let (depth, slot) = (cursor.nat(), cursor.nat());
                    let frame = Env::walk(&env, depth);
                    let v = frame.borrow().get(slot)?;
                    stack.push(v);
                }
                Opcode::VarAddr => {
                    let (depth, slot) = (cursor.nat(), cursor.nat());
                    let frame = Env::walk(&env, depth);
                    stack.push(Value::Target(Rc::new(Target::Var { env: frame, index: slot })));
                }
                Opcode::VarGetClear => {
                    let (depth, slot) = (cursor.nat(), cursor.nat());
                    let frame = Env::walk(&env, depth);
                    let v = frame.borrow_mut().get_clear(slot)?;
                    stack.push(v);
                }
                Opcode::HeaderTest => {
                    let predicate = pop(&mut stack);
                    if deep_match(&predicate, &Value::zero()) {
                        return Ok(None);
                    }
                    if !deep_match(&predicate, &Value::one()) {
                        return Err(RunError::msg("Predicate value must be 0 or 1"));
                    }
                }
                Opcode::HeaderMatcher => {
                    let v = pop(&mut stack);
                    stack.push(Value::Target(Rc::new(Target::Matcher(v))));
                }
                Opcode::HeaderHole => {
                    stack.push(Value::Target(Rc::new(Target::Hole)));
                }
                Opcode::SetMatch => {
                    let value = pop(&mut stack);
                    let target = pop(&mut stack).unpack_target();
                    if !target.set_match(&value)? {
                        return Ok(None);
                    }
                }
                Opcode::SetDefine => {
                    let value = pop(&mut stack);
                    let target = pop(&mut stack).unpack_target();
                    let r = target.set(value, SetMode::Define)?;
                    stack.push(r);
                }
                Opcode::SetUpdate => {
                    let value = pop(&mut stack);
                    let target = pop(&mut stack).unpack_target();
                    let r = target.set(value, SetMode::Update)?;
                    stack.push(r);
                }
                Opcode::SetModDyad => {
                    let w = pop(&mut stack);
                    let f = pop(&mut stack);
                    let target = pop(&mut stack).unpack_target();
                    let current = target.get()?;
                    let updated = self.evoke(&f, Evocation::Dyad, current, w)?;
                    let r = target.set(updated, SetMode::Update)?;
                    stack.push(r);
                }
                Opcode::SetModMonad => {
                    let f = pop(&mut stack);
                    let target = pop(&mut stack).unpack_target();
                    let current = target.get()?;
                    let updated = self.evoke(&f, Evocation::Monad, current, Value::nothing())?;
                    let r = target.set(updated, SetMode::Update)?;
                    stack.push(r);
                }
                Opcode::NsField => {
                    let n = cursor.nat();
                    let name = *program.names.get(n).unwrap_or_else(|| panic!("name {n} out of range"));
                    let value = pop(&mut stack);
                    let Value::Namespace(ns) = &value else {
                        return Err(RunError::msg("Field: Not a namespace"));
                    };
                    let field = ns
                        .borrow()
                        .get_local(name)
                        .ok_or_else(|| RunError::msg("Field: No such field in namespace"))?;
                    stack.push(field);
                }
                Opcode::NsAlias => {
                    let n = cursor.nat();
                    let name = *program.names.get(n).unwrap_or_else(|| panic!("name {n} out of range"));
                    let recv = match pop(&mut stack) {
                        Value::Target(t) => AliasRecv::Target(t),
                        Value::Namespace(ns) => AliasRecv::Namespace(ns),
                        _ => return Err(RunError::msg("Alias: Receiver must be a name or namespace")),
                    };
                    stack.push(Value::Target(Rc::new(Target::Alias { recv, name })));
                }
            }
            if stack.len() > self.limits.max_operand_stack {
                return Err(RunError::msg("Runtime: Operand stack exceeded"));
            }
        }
    }
}

/// Leading argument slots a block body receives.
enum BlockArgs {
    Function,
    M1 { f: Value },
    M2 { f: Value, g: Value },
}

fn pop(stack: &mut Vec<Value>) -> Value {
    stack.pop().expect("operand stack underflow")
}

/// Pops `n` values, preserving push order in the result.
fn pop_many(stack: &mut Vec<Value>, n: usize) -> Vec<Value> {
    assert!(n <= stack.len(), "operand stack underflow");
    stack.split_off(stack.len() - n)
}
