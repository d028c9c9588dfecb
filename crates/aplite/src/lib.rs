#![doc = include_str!("../../../README.md")]

mod array;
mod bytecode;
mod data;
mod env;
mod error;
mod function;
mod intern;
mod namespace;
mod primitives;
mod program;
mod resource;
mod target;
mod tracer;
mod value;
mod vm;

pub use crate::{
    array::Array,
    bytecode::{BytecodeBuilder, Opcode},
    data::{Data, DataBuilder, Format},
    env::{Env, EnvRef},
    error::{RunError, RunResult},
    function::{BlockClosure, Function, Modifier1, Modifier2, Primitive, Primitive1, Primitive2},
    intern::{Interner, SymbolId},
    namespace::{Namespace, NamespaceRef},
    program::{
        Block, BlockKind, BlockSpec, Body, BodySpec, ConstSpec, Constant, Program, ProgramSpec,
        parse_number,
    },
    resource::Limits,
    target::{AliasRecv, Target},
    tracer::{NoopTracer, RecordingTracer, VmTracer},
    value::{Kind, Stream, Value, deep_match},
    vm::{Evocation, Vm},
};
