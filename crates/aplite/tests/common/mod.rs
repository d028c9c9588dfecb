//! Shared helpers for assembling programs in tests.

use std::rc::Rc;

use aplite::{
    Array, Block, BlockKind, Body, BytecodeBuilder, Constant, Data, Function, Interner, Modifier1,
    Modifier2, Opcode, Primitive, Primitive1, Primitive2, Program, Value, Vm,
};

pub fn num(n: f64) -> Value {
    Value::Number(n)
}

pub fn prim(p: Primitive) -> Value {
    Value::Function(Rc::new(Function::Primitive(p)))
}

pub fn mod1(p: Primitive1) -> Value {
    Value::Modifier1(Rc::new(Modifier1::Primitive(p)))
}

pub fn mod2(p: Primitive2) -> Value {
    Value::Modifier2(Rc::new(Modifier2::Primitive(p)))
}

/// A rank-1 array of 32-bit naturals with fill `0`.
pub fn naturals(cells: &[u32]) -> Value {
    Value::Array(Rc::new(Array::list(Data::from_naturals(cells), Value::zero())))
}

/// A rank-1 boxed array of numbers with fill `0`.
pub fn number_list(cells: &[f64]) -> Value {
    Value::Array(Rc::new(Array::list(
        Data::from_values(cells.iter().map(|&n| Value::Number(n)).collect()),
        Value::zero(),
    )))
}

pub fn as_number(v: &Value) -> f64 {
    v.unpack_number()
}

/// Asserts that a rank-1 array holds exactly these integer cells.
pub fn assert_cells(v: &Value, expected: &[i64]) {
    let a = v.as_array().expect("expected an array");
    assert_eq!(a.rank(), 1, "expected a rank-1 array");
    assert_eq!(a.axis_len(0), expected.len(), "length mismatch");
    for (i, &e) in expected.iter().enumerate() {
        assert_eq!(a.get_natural(i), e, "cell {i}");
    }
}

/// A program whose single immediate entry body is the assembled bytecode.
pub fn single_body_program(
    constants: Vec<Constant>,
    num_vars: usize,
    build: impl FnOnce(&mut BytecodeBuilder),
) -> Program {
    let mut b = BytecodeBuilder::new();
    build(&mut b);
    b.op(Opcode::Ret);
    Program::new(
        b.finish(),
        constants,
        vec![Block { kind: BlockKind::Function, immediate: true, bodies: vec![0] }],
        vec![Body { start: 0, num_vars, names: vec![] }],
        vec![],
    )
}

/// Runs a single-body program to completion.
pub fn run_program(
    constants: Vec<Constant>,
    num_vars: usize,
    build: impl FnOnce(&mut BytecodeBuilder),
) -> aplite::RunResult<Value> {
    let program = single_body_program(constants, num_vars, build);
    Vm::new(program, Interner::new()).run()
}

/// A VM over a trivial program, for driving `evoke` directly.
pub fn bare_vm() -> Vm {
    let program = Program::new(
        vec![Opcode::Ret as u8],
        vec![],
        vec![Block { kind: BlockKind::Function, immediate: true, bodies: vec![0] }],
        vec![Body { start: 0, num_vars: 0, names: vec![] }],
        vec![],
    );
    Vm::new(program, Interner::new())
}
