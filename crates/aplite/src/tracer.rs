//! Execution tracing hooks.
//!
//! The VM is generic over a tracer so instrumentation costs nothing when
//! unused. [`NoopTracer`] is the default; [`RecordingTracer`] buffers events
//! for tests and offline inspection.

use crate::bytecode::Opcode;

/// Observer of VM execution events.
pub trait VmTracer {
    /// An opcode is about to be dispatched at bytecode offset `pc`.
    fn op(&mut self, pc: usize, op: Opcode) {
        let _ = (pc, op);
    }

    /// An error was thrown and is about to unwind (it may still be caught).
    fn throw(&mut self) {}
}

/// Tracer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl VmTracer for NoopTracer {}

/// Tracer that records dispatched opcodes and counts throws.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    /// Dispatched opcodes in execution order.
    pub ops: Vec<Opcode>,
    /// Number of observed throws.
    pub throws: usize,
}

impl VmTracer for RecordingTracer {
    fn op(&mut self, _pc: usize, op: Opcode) {
        self.ops.push(op);
    }

    fn throw(&mut self) {
        self.throws += 1;
    }
}
