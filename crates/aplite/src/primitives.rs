//! Concrete built-in functions and modifiers.
//!
//! Every primitive is an entry `(evocation, 𝕩[, 𝕨]) → value`. Type errors
//! are thrown with a message pinned to the glyph, so `⎊` can catch them;
//! only genuinely impossible states panic. Modifiers receive the VM so they
//! can call back into their operands.

use std::rc::Rc;

use smallvec::SmallVec;
use strum::IntoEnumIterator;

use crate::{
    array::Array,
    data::{Data, DataBuilder, Format},
    error::{RunError, RunResult},
    function::{Function, Modifier1, Modifier2, Primitive, Primitive1, Primitive2},
    intern::Interner,
    namespace::Namespace,
    tracer::VmTracer,
    value::Value,
    vm::{Evocation, Vm},
};

/// Builds the namespace of runtime-provided bindings: every concrete
/// function and modifier, keyed by its glyph and by its spelled-out name.
/// The program loader resolves `primitive` constants against this.
pub(crate) fn provided_namespace(interner: &mut Interner) -> Namespace {
    let mut ns = Namespace::new(None);
    for p in Primitive::iter() {
        let value = Value::Function(Rc::new(Function::Primitive(p)));
        ns.put(interner.intern(&p.to_string()), value.clone());
        ns.put(interner.intern(&format!("{p:?}")), value);
    }
    for p in Primitive1::iter() {
        let value = Value::Modifier1(Rc::new(Modifier1::Primitive(p)));
        ns.put(interner.intern(&p.to_string()), value.clone());
        ns.put(interner.intern(&format!("{p:?}")), value);
    }
    for p in Primitive2::iter() {
        let value = Value::Modifier2(Rc::new(Modifier2::Primitive(p)));
        ns.put(interner.intern(&p.to_string()), value.clone());
        ns.put(interner.intern(&format!("{p:?}")), value);
    }
    ns
}

fn unsupported(glyph: &str, evocation: Evocation) -> RunError {
    RunError::msg(format!("{glyph}: No {} form", evocation.describe()))
}

fn number(v: &Value, message: &str) -> RunResult<f64> {
    match v {
        Value::Number(n) => Ok(*n),
        _ => Err(RunError::msg(message)),
    }
}

fn numbers(x: &Value, w: &Value, message: &str) -> RunResult<(f64, f64)> {
    Ok((number(x, message)?, number(w, message)?))
}

fn array<'a>(v: &'a Value, message: &str) -> RunResult<&'a Array> {
    v.as_array().ok_or_else(|| RunError::msg(message))
}

fn character_offset(c: char, offset: f64, message: &str) -> RunResult<Value> {
    let Some(delta) = crate::value::integral(offset) else {
        return Err(RunError::msg(message));
    };
    let code = i64::from(c as u32) + delta;
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .map(Value::Character)
        .ok_or_else(|| RunError::msg(message))
}

/// Dispatches a concrete built-in function.
pub(crate) fn function(p: Primitive, evocation: Evocation, x: Value, w: Value) -> RunResult<Value> {
    match p {
        Primitive::Add => add(evocation, x, w),
        Primitive::Sub => sub(evocation, x, w),
        Primitive::Mul => mul(evocation, x, w),
        Primitive::Div => div(evocation, x, w),
        Primitive::Power => power(evocation, x, w),
        Primitive::Floor => floor(evocation, x, w),
        Primitive::Ceiling => ceiling(evocation, x, w),
        Primitive::Modulus => modulus(evocation, x, w),
        Primitive::Le | Primitive::Lt | Primitive::Gt | Primitive::Ge => {
            comparison(p, evocation, &x, &w)
        }
        Primitive::Eq => equals(evocation, &x, &w),
        Primitive::Ne => not_equals(evocation, &x, &w),
        Primitive::Shape => shape(evocation, &x),
        Primitive::Reshape => reshape(evocation, &x, &w),
        Primitive::Range => range(evocation, &x),
        Primitive::Pick => pick(evocation, x, &w),
        Primitive::Assert => assert_prim(evocation, x, w),
        Primitive::Left => Ok(match evocation {
            Evocation::Monad => x,
            Evocation::Dyad => w,
            _ => return Err(unsupported("⊣", evocation)),
        }),
        Primitive::Right => match evocation {
            Evocation::Monad | Evocation::Dyad => Ok(x),
            _ => Err(unsupported("⊢", evocation)),
        },
        Primitive::Fill => fill(evocation, &x, &w),
        Primitive::Log => log(evocation, &x, &w),
        Primitive::GroupLen => group_len(evocation, &x, &w),
        Primitive::GroupOrd => group_ord(evocation, &x, &w),
    }
}

// 𝕩 + : identity on numbers. number + number; character ± offset stays a
// character on either side.
fn add(evocation: Evocation, x: Value, w: Value) -> RunResult<Value> {
    const MSG: &str = "+: Arguments must be number + number, or character + number";
    match evocation {
        Evocation::Monad => Ok(x),
        Evocation::Dyad => match (&x, &w) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::Character(c), Value::Number(n)) | (Value::Number(n), Value::Character(c)) => {
                character_offset(*c, *n, MSG)
            }
            _ => Err(RunError::msg(MSG)),
        },
        _ => Err(unsupported("+", evocation)),
    }
}

// 𝕩 - : negate. 𝕨 - 𝕩 subtracts; character - character is the codepoint
// offset; character - number shifts the character.
fn sub(evocation: Evocation, x: Value, w: Value) -> RunResult<Value> {
    const MSG: &str = "-: Arguments must be number - number, character - character, or character - number";
    match evocation {
        Evocation::Monad => match x {
            Value::Number(n) => Ok(Value::Number(-n)),
            _ => Err(RunError::msg("-: Argument must be a number")),
        },
        Evocation::Dyad => match (&w, &x) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
            (Value::Character(a), Value::Character(b)) => {
                Ok(Value::Number(f64::from(*a as u32) - f64::from(*b as u32)))
            }
            (Value::Character(c), Value::Number(n)) => character_offset(*c, -n, MSG),
            _ => Err(RunError::msg(MSG)),
        },
        _ => Err(unsupported("-", evocation)),
    }
}

// 𝕩 × : sign. 𝕨 × 𝕩 multiplies.
fn mul(evocation: Evocation, x: Value, w: Value) -> RunResult<Value> {
    match evocation {
        Evocation::Monad => {
            let n = number(&x, "×: Argument must be a number")?;
            Ok(Value::Number(if n == 0.0 { 0.0 } else { n.signum() }))
        }
        Evocation::Dyad => {
            let (a, b) = numbers(&x, &w, "×: Arguments must be number × number")?;
            Ok(Value::Number(a * b))
        }
        _ => Err(unsupported("×", evocation)),
    }
}

// 𝕩 ÷ : reciprocal. 𝕨 ÷ 𝕩 divides.
fn div(evocation: Evocation, x: Value, w: Value) -> RunResult<Value> {
    const MSG: &str = "÷: Arguments must be number ÷ number";
    match evocation {
        Evocation::Monad => Ok(Value::Number(1.0 / number(&x, MSG)?)),
        Evocation::Dyad => {
            let (b, a) = numbers(&x, &w, MSG)?;
            Ok(Value::Number(a / b))
        }
        _ => Err(unsupported("÷", evocation)),
    }
}

// 𝕩 ⋆ : e to the 𝕩. 𝕨 ⋆ 𝕩 raises 𝕨 to the 𝕩.
fn power(evocation: Evocation, x: Value, w: Value) -> RunResult<Value> {
    const MSG: &str = "⋆: Arguments must be number ⋆ number";
    match evocation {
        Evocation::Monad => Ok(Value::Number(number(&x, MSG)?.exp())),
        Evocation::Dyad => {
            let (exponent, base) = numbers(&x, &w, MSG)?;
            Ok(Value::Number(base.powf(exponent)))
        }
        _ => Err(unsupported("⋆", evocation)),
    }
}

fn floor(evocation: Evocation, x: Value, w: Value) -> RunResult<Value> {
    match evocation {
        Evocation::Monad => Ok(Value::Number(number(&x, "⌊: Argument must be a number")?.floor())),
        Evocation::Dyad => {
            let (a, b) = numbers(&x, &w, "⌊: Arguments must be number ⌊ number")?;
            Ok(Value::Number(a.min(b)))
        }
        _ => Err(unsupported("⌊", evocation)),
    }
}

fn ceiling(evocation: Evocation, x: Value, w: Value) -> RunResult<Value> {
    match evocation {
        Evocation::Monad => Ok(Value::Number(number(&x, "⌈: Argument must be a number")?.ceil())),
        Evocation::Dyad => {
            let (a, b) = numbers(&x, &w, "⌈: Arguments must be number ⌈ number")?;
            Ok(Value::Number(a.max(b)))
        }
        _ => Err(unsupported("⌈", evocation)),
    }
}

// 𝕩 | : absolute value. 𝕨 | 𝕩 is 𝕩 modulo 𝕨, sign following 𝕨, with
// 0 | 𝕩 passing 𝕩 through.
fn modulus(evocation: Evocation, x: Value, w: Value) -> RunResult<Value> {
    match evocation {
        Evocation::Monad => Ok(Value::Number(number(&x, "|: Argument must be a number")?.abs())),
        Evocation::Dyad => {
            let (b, a) = numbers(&x, &w, "|: Arguments must be number | number")?;
            if a == 0.0 {
                Ok(Value::Number(b))
            } else {
                Ok(Value::Number(b - a * (b / a).floor()))
            }
        }
        _ => Err(unsupported("|", evocation)),
    }
}

/// Ordering of two atoms under the cross-kind rank
/// `array/function/modifier/namespace/stream < number < character < symbol`.
/// `None` means incomparable (a NaN was involved), which makes every
/// comparison falsy.
fn atom_ordering(glyph: &str, a: &Value, b: &Value) -> RunResult<Option<std::cmp::Ordering>> {
    fn rank(v: &Value) -> u32 {
        match v {
            Value::Number(_) => 1,
            Value::Character(_) => 2,
            Value::Symbol(_) => 3,
            _ => 0,
        }
    }
    match (a, b) {
        (Value::Number(p), Value::Number(q)) => Ok(p.partial_cmp(q)),
        (Value::Character(p), Value::Character(q)) => Ok(Some(p.cmp(q))),
        _ => {
            let (ra, rb) = (rank(a), rank(b));
            if ra == 0 || rb == 0 {
                return Err(RunError::msg(format!(
                    "{glyph}: Arguments must be number, character, or symbol"
                )));
            }
            Ok(Some(ra.cmp(&rb)))
        }
    }
}

fn comparison(p: Primitive, evocation: Evocation, x: &Value, w: &Value) -> RunResult<Value> {
    let glyph = p.to_string();
    match evocation {
        Evocation::Monad => Err(unsupported(&glyph, evocation)),
        Evocation::Dyad => {
            use std::cmp::Ordering::{Equal, Greater, Less};
            let ordering = atom_ordering(&glyph, w, x)?;
            let holds = match p {
                Primitive::Le => matches!(ordering, Some(Less | Equal)),
                Primitive::Lt => matches!(ordering, Some(Less)),
                Primitive::Gt => matches!(ordering, Some(Greater)),
                Primitive::Ge => matches!(ordering, Some(Greater | Equal)),
                _ => unreachable!("not a comparison: {p:?}"),
            };
            Ok(Value::Number(f64::from(holds)))
        }
        _ => Err(unsupported(&glyph, evocation)),
    }
}

fn atom_equal(glyph: &str, x: &Value, w: &Value) -> RunResult<bool> {
    match (x, w) {
        (Value::Number(a), Value::Number(b)) => Ok(a == b),
        (Value::Character(a), Value::Character(b)) => Ok(a == b),
        (Value::Symbol(a), Value::Symbol(b)) => Ok(a == b),
        (Value::Number(_) | Value::Character(_) | Value::Symbol(_), Value::Number(_) | Value::Character(_) | Value::Symbol(_)) => {
            Ok(false)
        }
        _ => Err(RunError::msg(format!("{glyph}: Arguments must be numbers, characters, or symbols"))),
    }
}

// 𝕩 = : rank of 𝕩 (0 for atoms). 𝕨 = 𝕩 compares atoms.
fn equals(evocation: Evocation, x: &Value, w: &Value) -> RunResult<Value> {
    match evocation {
        Evocation::Monad => {
            let rank = x.as_array().map_or(0, Array::rank);
            Ok(Value::Number(rank as f64))
        }
        Evocation::Dyad => Ok(Value::Number(f64::from(atom_equal("=", x, w)?))),
        _ => Err(unsupported("=", evocation)),
    }
}

// 𝕩 ≠ : leading-axis length (1 for atoms). 𝕨 ≠ 𝕩 is atom inequality.
fn not_equals(evocation: Evocation, x: &Value, w: &Value) -> RunResult<Value> {
    match evocation {
        Evocation::Monad => {
            let length = match x.as_array() {
                Some(a) if a.rank() > 0 => a.axis_len(0),
                _ => 1,
            };
            Ok(Value::Number(length as f64))
        }
        Evocation::Dyad => Ok(Value::Number(f64::from(!atom_equal("≠", x, w)?))),
        _ => Err(unsupported("≠", evocation)),
    }
}

// 𝕩 ≢ : the shape as a rank-1 natural array; atoms have no shape.
fn shape(evocation: Evocation, x: &Value) -> RunResult<Value> {
    match evocation {
        Evocation::Monad => match x.as_array() {
            Some(a) => {
                let mut builder = DataBuilder::new(Format::Natural32, a.rank());
                for k in 0..a.rank() {
                    builder.write_natural(k, u32::try_from(a.axis_len(k)).expect("axis overflow"));
                }
                Ok(Value::Array(Rc::new(Array::list(builder.finish(), Value::zero()))))
            }
            None => Ok(Value::empty_array()),
        },
        _ => Err(unsupported("≢", evocation)),
    }
}

// 𝕩 ⥊ : ravel. 𝕨 ⥊ 𝕩 reshapes, sharing the cell storage; the fill extends
// when the new bound exceeds the stored cells.
fn reshape(evocation: Evocation, x: &Value, w: &Value) -> RunResult<Value> {
    let a = array(x, "⥊: Argument must be an array")?;
    match evocation {
        Evocation::Monad => {
            let bound = u32::try_from(a.num_cells()).expect("bound overflow");
            Ok(Value::Array(Rc::new(Array::with_shape(&[bound], a.cells().clone(), a.fill().clone()))))
        }
        Evocation::Dyad => {
            let shape_arr = array(w, "⥊: Shape must be an array of natural numbers")?;
            let mut axes = SmallVec::<[u32; 4]>::new();
            for i in 0..shape_arr.num_cells() {
                let axis = shape_arr
                    .get_cell(i)
                    .as_natural()
                    .ok_or_else(|| RunError::msg("⥊: Shape must be an array of natural numbers"))?;
                axes.push(u32::try_from(axis).expect("axis overflow"));
            }
            Ok(Value::Array(Rc::new(Array::with_shape(&axes, a.cells().clone(), a.fill().clone()))))
        }
        _ => Err(unsupported("⥊", evocation)),
    }
}

// 𝕩 ↕ : the naturals below 𝕩.
fn range(evocation: Evocation, x: &Value) -> RunResult<Value> {
    match evocation {
        Evocation::Monad => {
            let n = x.expect_natural("↕: Argument")?;
            let n = u32::try_from(n).expect("natural out of range");
            let mut builder = DataBuilder::new(Format::Natural32, n as usize);
            for i in 0..n {
                builder.write_natural(i as usize, i);
            }
            Ok(Value::Array(Rc::new(Array::with_shape(&[n], builder.finish(), Value::zero()))))
        }
        _ => Err(unsupported("↕", evocation)),
    }
}

// 𝕩 ⊑ : first cell. 𝕨 ⊑ 𝕩 picks the cell indexed by 𝕨, with fill
// extension past the stored cells.
fn pick(evocation: Evocation, x: Value, w: &Value) -> RunResult<Value> {
    match evocation {
        Evocation::Monad => match x.as_array() {
            Some(a) => Ok(a.get_cell(0)),
            None => Ok(x),
        },
        Evocation::Dyad => {
            let a = array(&x, "⊑: Argument must be an array")?;
            let index = w.expect_natural("⊑: Index")?;
            Ok(a.get_cell(usize::try_from(index).expect("index out of range")))
        }
        _ => Err(unsupported("⊑", evocation)),
    }
}

// 𝕩 ! : throw 𝕩 unless it is 1. 𝕨 ! 𝕩 throws 𝕨 instead.
fn assert_prim(evocation: Evocation, x: Value, w: Value) -> RunResult<Value> {
    let message = match evocation {
        Evocation::Monad => x.clone(),
        Evocation::Dyad => w,
        _ => return Err(unsupported("!", evocation)),
    };
    if matches!(x, Value::Number(n) if n == 1.0) {
        Ok(x)
    } else {
        Err(RunError::new(message))
    }
}

// 𝕩 Fill : read the fill element. 𝕨 Fill 𝕩 keeps 𝕩's cells and installs
// the fill template of 𝕨.
fn fill(evocation: Evocation, x: &Value, w: &Value) -> RunResult<Value> {
    let a = array(x, "Fill: Argument must be an array")?;
    match evocation {
        Evocation::Monad => Ok(a.fill().clone()),
        Evocation::Dyad => {
            Ok(Value::Array(Rc::new(Array::new(a.shape().clone(), a.cells().clone(), w.to_fill()))))
        }
        _ => Err(unsupported("Fill", evocation)),
    }
}

// 𝕩 Log : natural logarithm. 𝕨 Log 𝕩 is the logarithm of 𝕩 in base 𝕨.
fn log(evocation: Evocation, x: &Value, w: &Value) -> RunResult<Value> {
    const MSG: &str = "Log: Arguments must be numbers";
    match evocation {
        Evocation::Monad => Ok(Value::Number(number(x, MSG)?.ln())),
        Evocation::Dyad => {
            let (a, base) = numbers(x, w, MSG)?;
            Ok(Value::Number(a.ln() / base.ln()))
        }
        _ => Err(unsupported("Log", evocation)),
    }
}

// 𝕩 GroupLen 𝕨? : bucket counts of the indices in 𝕩, with an optional
// minimum result length. Negative indices are skipped.
fn group_len(evocation: Evocation, x: &Value, w: &Value) -> RunResult<Value> {
    let a = match evocation {
        Evocation::Monad | Evocation::Dyad => array(x, "GroupLen: Argument must be an array")?,
        _ => return Err(unsupported("GroupLen", evocation)),
    };
    let min_len = match evocation {
        Evocation::Dyad => w.as_natural().map_or(-1, |n| n - 1),
        _ => -1,
    };

    let mut max = min_len;
    for i in 0..a.num_cells() {
        max = max.max(a.get_natural(i));
    }
    let len = usize::try_from(max + 1).expect("group count overflow");

    let mut counts = vec![0u32; len];
    for i in 0..a.num_cells() {
        let n = a.get_natural(i);
        if n >= 0 {
            counts[usize::try_from(n).expect("index overflow")] += 1;
        }
    }

    let mut builder = DataBuilder::new(Format::Natural32, len);
    for (i, &c) in counts.iter().enumerate() {
        builder.write_natural(i, c);
    }
    let len = u32::try_from(len).expect("group count overflow");
    Ok(Value::Array(Rc::new(Array::with_shape(&[len], builder.finish(), Value::zero()))))
}

// 𝕨 GroupOrd 𝕩 : with 𝕨 the group lengths, the indices of 𝕩 ordered by
// group. Negative indices drop out.
fn group_ord(evocation: Evocation, x: &Value, w: &Value) -> RunResult<Value> {
    if evocation != Evocation::Dyad {
        return Err(unsupported("GroupOrd", evocation));
    }
    let indices = array(x, "GroupOrd: Arguments must be arrays")?;
    let lengths = array(w, "GroupOrd: Arguments must be arrays")?;

    let mut starts = Vec::with_capacity(lengths.num_cells());
    let mut total: usize = 0;
    for i in 0..lengths.num_cells() {
        starts.push(total);
        let len = lengths.get_natural(i);
        total += usize::try_from(len.max(0)).expect("length overflow");
    }

    let mut order = vec![0u32; total];
    for i in 0..indices.num_cells() {
        let n = indices.get_natural(i);
        if n >= 0 {
            let group = usize::try_from(n).expect("index overflow");
            if group >= starts.len() {
                return Err(RunError::msg("GroupOrd: Group index out of range"));
            }
            let slot = starts[group];
            starts[group] += 1;
            order[slot] = u32::try_from(i).expect("index overflow");
        }
    }

    let mut builder = DataBuilder::new(Format::Natural32, total);
    for (i, &n) in order.iter().enumerate() {
        builder.write_natural(i, n);
    }
    let total = u32::try_from(total).expect("length overflow");
    Ok(Value::Array(Rc::new(Array::with_shape(&[total], builder.finish(), indices.fill().clone()))))
}

/// Dispatches a concrete 1-modifier applied as `F M`.
pub(crate) fn modifier1<T: VmTracer>(
    vm: &mut Vm<T>,
    p: Primitive1,
    evocation: Evocation,
    f: &Value,
    x: Value,
    w: Value,
) -> RunResult<Value> {
    match p {
        Primitive1::Constant => match evocation {
            Evocation::Monad | Evocation::Dyad => Ok(f.clone()),
            _ => Err(unsupported("˙", evocation)),
        },
        Primitive1::Swap => match evocation {
            Evocation::Monad => vm.evoke(f, Evocation::Dyad, x.clone(), x),
            Evocation::Dyad => vm.evoke(f, Evocation::Dyad, w, x),
            _ => Err(unsupported("˜", evocation)),
        },
        Primitive1::Each => each(vm, evocation, f, &x, &w),
        Primitive1::Table => match evocation {
            Evocation::Monad => each(vm, evocation, f, &x, &w),
            Evocation::Dyad => table(vm, f, &x, &w),
            _ => Err(unsupported("⌜", evocation)),
        },
        Primitive1::Scan => scan(vm, evocation, f, &x, &w),
    }
}

// 𝔽¨ applies 𝔽 to each cell, preserving shape. With 𝕨, cells are paired;
// an atom on either side is broadcast.
fn each<T: VmTracer>(
    vm: &mut Vm<T>,
    evocation: Evocation,
    f: &Value,
    x: &Value,
    w: &Value,
) -> RunResult<Value> {
    match evocation {
        Evocation::Monad => match x.as_array() {
            Some(a) => {
                let mut cells = Vec::with_capacity(a.num_cells());
                for i in 0..a.num_cells() {
                    cells.push(vm.evoke(f, Evocation::Monad, a.get_cell(i), Value::nothing())?);
                }
                Ok(Value::Array(Rc::new(Array::new(
                    a.shape().clone(),
                    Data::from_values(cells),
                    Value::nil(),
                ))))
            }
            None => vm.evoke(f, Evocation::Monad, x.clone(), Value::nothing()),
        },
        Evocation::Dyad => match (x.as_array(), w.as_array()) {
            (Some(a), Some(b)) => {
                if a.num_cells() != b.num_cells() {
                    return Err(RunError::msg("¨: Argument shapes don't match"));
                }
                let mut cells = Vec::with_capacity(a.num_cells());
                for i in 0..a.num_cells() {
                    cells.push(vm.evoke(f, Evocation::Dyad, a.get_cell(i), b.get_cell(i))?);
                }
                Ok(Value::Array(Rc::new(Array::new(
                    a.shape().clone(),
                    Data::from_values(cells),
                    Value::nil(),
                ))))
            }
            (Some(a), None) => {
                let mut cells = Vec::with_capacity(a.num_cells());
                for i in 0..a.num_cells() {
                    cells.push(vm.evoke(f, Evocation::Dyad, a.get_cell(i), w.clone())?);
                }
                Ok(Value::Array(Rc::new(Array::new(
                    a.shape().clone(),
                    Data::from_values(cells),
                    Value::nil(),
                ))))
            }
            (None, Some(b)) => {
                let mut cells = Vec::with_capacity(b.num_cells());
                for i in 0..b.num_cells() {
                    cells.push(vm.evoke(f, Evocation::Dyad, x.clone(), b.get_cell(i))?);
                }
                Ok(Value::Array(Rc::new(Array::new(
                    b.shape().clone(),
                    Data::from_values(cells),
                    Value::nil(),
                ))))
            }
            (None, None) => vm.evoke(f, Evocation::Dyad, x.clone(), w.clone()),
        },
        _ => Err(unsupported("¨", evocation)),
    }
}

fn axes_and_cells(v: &Value) -> (SmallVec<[u32; 4]>, Vec<Value>) {
    match v.as_array() {
        Some(a) => {
            let axes = (0..a.rank())
                .map(|k| u32::try_from(a.axis_len(k)).expect("axis overflow"))
                .collect();
            let cells = (0..a.num_cells()).map(|i| a.get_cell(i)).collect();
            (axes, cells)
        }
        None => (SmallVec::new(), vec![v.clone()]),
    }
}

// 𝕨 𝔽⌜ 𝕩 : outer product; the result shape is 𝕨's axes followed by 𝕩's.
fn table<T: VmTracer>(vm: &mut Vm<T>, f: &Value, x: &Value, w: &Value) -> RunResult<Value> {
    let (w_axes, w_cells) = axes_and_cells(w);
    let (x_axes, x_cells) = axes_and_cells(x);
    let mut axes = w_axes;
    axes.extend_from_slice(&x_axes);

    let mut cells = Vec::with_capacity(w_cells.len() * x_cells.len());
    for wc in &w_cells {
        for xc in &x_cells {
            cells.push(vm.evoke(f, Evocation::Dyad, xc.clone(), wc.clone())?);
        }
    }
    Ok(Value::Array(Rc::new(Array::with_shape(&axes, Data::from_values(cells), Value::nil()))))
}

// 𝔽` : inclusive prefix scan along the leading axis. 𝕨 seeds the first
// slice and must be shaped like one cell of 𝕩.
fn scan<T: VmTracer>(
    vm: &mut Vm<T>,
    evocation: Evocation,
    f: &Value,
    x: &Value,
    w: &Value,
) -> RunResult<Value> {
    if !matches!(evocation, Evocation::Monad | Evocation::Dyad) {
        return Err(unsupported("`", evocation));
    }
    let a = array(x, "`: Argument must be an array")?;
    if a.rank() == 0 {
        return Err(RunError::msg("`: Argument must have rank at least 1"));
    }
    if a.num_cells() == 0 {
        return Ok(x.clone());
    }
    let lead = a.axis_len(0);
    let stride = a.num_cells() / lead;

    let seed_cell = |j: usize| -> RunResult<Value> {
        match w.as_array() {
            Some(seed) => {
                if seed.num_cells() != stride {
                    return Err(RunError::msg("`: Left argument must be shaped like a cell of the right argument"));
                }
                Ok(seed.get_cell(j))
            }
            None => {
                if stride != 1 {
                    return Err(RunError::msg("`: Left argument must be shaped like a cell of the right argument"));
                }
                Ok(w.clone())
            }
        }
    };

    let mut out: Vec<Value> = Vec::with_capacity(a.num_cells());
    for j in 0..stride {
        let first = match evocation {
            Evocation::Monad => a.get_cell(j),
            _ => vm.evoke(f, Evocation::Dyad, a.get_cell(j), seed_cell(j)?)?,
        };
        out.push(first);
    }
    for i in 1..lead {
        for j in 0..stride {
            let previous = out[(i - 1) * stride + j].clone();
            let next = vm.evoke(f, Evocation::Dyad, a.get_cell(i * stride + j), previous)?;
            out.push(next);
        }
    }
    Ok(Value::Array(Rc::new(Array::new(
        a.shape().clone(),
        Data::from_values(out),
        a.fill().clone(),
    ))))
}

/// Dispatches a concrete 2-modifier applied as `F M G`.
pub(crate) fn modifier2<T: VmTracer>(
    vm: &mut Vm<T>,
    p: Primitive2,
    evocation: Evocation,
    f: &Value,
    g: &Value,
    x: Value,
    w: Value,
) -> RunResult<Value> {
    match p {
        // 𝔽∘𝔾 : 𝔽 applied monadically to the result of 𝔾.
        Primitive2::Atop => match evocation {
            Evocation::Monad | Evocation::Dyad => {
                let inner = vm.evoke(g, evocation, x, w)?;
                vm.evoke(f, Evocation::Monad, inner, Value::nothing())
            }
            _ => Err(unsupported("∘", evocation)),
        },
        // 𝔽○𝔾 : both arguments pass through 𝔾 before 𝔽 sees them.
        Primitive2::Over => match evocation {
            Evocation::Monad => {
                let inner = vm.evoke(g, Evocation::Monad, x, Value::nothing())?;
                vm.evoke(f, Evocation::Monad, inner, Value::nothing())
            }
            Evocation::Dyad => {
                let gx = vm.evoke(g, Evocation::Monad, x, Value::nothing())?;
                let gw = vm.evoke(g, Evocation::Monad, w, Value::nothing())?;
                vm.evoke(f, Evocation::Dyad, gx, gw)
            }
            _ => Err(unsupported("○", evocation)),
        },
        // 𝔽⊸𝔾 : 𝔽 preprocesses the left argument (or 𝕩 when monadic).
        Primitive2::Before => match evocation {
            Evocation::Monad => {
                let left = vm.evoke(f, Evocation::Monad, x.clone(), Value::nothing())?;
                vm.evoke(g, Evocation::Dyad, x, left)
            }
            Evocation::Dyad => {
                let left = vm.evoke(f, Evocation::Monad, w, Value::nothing())?;
                vm.evoke(g, Evocation::Dyad, x, left)
            }
            _ => Err(unsupported("⊸", evocation)),
        },
        // 𝔽⟜𝔾 : 𝔾 preprocesses the right argument.
        Primitive2::After => match evocation {
            Evocation::Monad => {
                let right = vm.evoke(g, Evocation::Monad, x.clone(), Value::nothing())?;
                vm.evoke(f, Evocation::Dyad, right, x)
            }
            Evocation::Dyad => {
                let right = vm.evoke(g, Evocation::Monad, x, Value::nothing())?;
                vm.evoke(f, Evocation::Dyad, right, w)
            }
            _ => Err(unsupported("⟜", evocation)),
        },
        // 𝔽⊘𝔾 : 𝔽 for one argument, 𝔾 for two.
        Primitive2::Valences => match evocation {
            Evocation::Monad => vm.evoke(f, Evocation::Monad, x, w),
            Evocation::Dyad => vm.evoke(g, Evocation::Dyad, x, w),
            _ => Err(unsupported("⊘", evocation)),
        },
        // 𝔽◶𝔾 : 𝔽 computes an index selecting which function in the list
        // 𝔾 to apply.
        Primitive2::Choose => match evocation {
            Evocation::Monad | Evocation::Dyad => {
                let chosen = vm.evoke(f, evocation, x.clone(), w.clone())?;
                let index = chosen
                    .as_natural()
                    .ok_or_else(|| RunError::msg("◶: Selector must return a natural number"))?;
                let list = array(g, "◶: Right operand must be a list")?;
                let picked = list.get_cell(usize::try_from(index).expect("index out of range"));
                vm.evoke(&picked, evocation, x, w)
            }
            _ => Err(unsupported("◶", evocation)),
        },
        // 𝔽⎊𝔾 : run 𝔽; when it throws, run 𝔾 with the same arguments.
        Primitive2::Catch => match evocation {
            Evocation::Monad | Evocation::Dyad => {
                match vm.evoke(f, evocation, x.clone(), w.clone()) {
                    Ok(v) => Ok(v),
                    Err(_) => {
                        vm.note_throw();
                        vm.evoke(g, evocation, x, w)
                    }
                }
            }
            _ => Err(unsupported("⎊", evocation)),
        },
        // 𝔽 _fill_by_ 𝔾 : the result of 𝔽, with its fill recomputed by
        // applying 𝔾 to the argument fills when that succeeds.
        Primitive2::FillBy => match evocation {
            Evocation::Monad | Evocation::Dyad => {
                let result = vm.evoke(f, evocation, x.clone(), w.clone())?;
                let Value::Array(a) = &result else { return Ok(result) };
                let a = Rc::clone(a);
                let x_fill = x.to_fill();
                let w_fill = match evocation {
                    Evocation::Dyad => w.to_fill(),
                    _ => Value::nothing(),
                };
                match vm.evoke(g, evocation, x_fill, w_fill) {
                    Ok(fill) => Ok(Value::Array(Rc::new(Array::new(
                        a.shape().clone(),
                        a.cells().clone(),
                        fill.to_fill(),
                    )))),
                    Err(_) => {
                        vm.note_throw();
                        Ok(result)
                    }
                }
            }
            _ => Err(unsupported("_fill_by_", evocation)),
        },
    }
}
