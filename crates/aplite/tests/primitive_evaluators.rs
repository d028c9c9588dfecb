//! Behavior of the primitive evaluators, driven through `evoke`.

mod common;

use std::rc::Rc;

use aplite::{Array, Data, Evocation, Function, Primitive, Primitive1, Primitive2, Value, deep_match};
use common::{as_number, assert_cells, bare_vm, mod1, mod2, naturals, num, number_list, prim};

fn monad(p: Primitive, x: Value) -> aplite::RunResult<Value> {
    bare_vm().evoke(&prim(p), Evocation::Monad, x, Value::nothing())
}

fn dyad(p: Primitive, x: Value, w: Value) -> aplite::RunResult<Value> {
    bare_vm().evoke(&prim(p), Evocation::Dyad, x, w)
}

/// `F M` as a callable value.
fn applied1(m: Primitive1, f: Value) -> Value {
    Value::Function(Rc::new(Function::AppliedM1 { m: mod1(m), f }))
}

/// `F M G` as a callable value.
fn applied2(m: Primitive2, f: Value, g: Value) -> Value {
    Value::Function(Rc::new(Function::AppliedM2 { m: mod2(m), f, g }))
}

#[test]
fn addition_and_character_arithmetic() {
    assert_eq!(as_number(&dyad(Primitive::Add, num(4.0), num(3.0)).unwrap()), 7.0);
    // 'a' + 1 on either side.
    let shifted = dyad(Primitive::Add, Value::Character('a'), num(1.0)).unwrap();
    assert!(matches!(shifted, Value::Character('b')));
    let shifted = dyad(Primitive::Add, num(2.0), Value::Character('a')).unwrap();
    assert!(matches!(shifted, Value::Character('c')));
    // Monadic + is the identity on numbers.
    assert_eq!(as_number(&monad(Primitive::Add, num(5.5)).unwrap()), 5.5);
    // Type errors are thrown, not fatal.
    let err = dyad(Primitive::Add, Value::nothing(), num(1.0)).unwrap_err();
    let text = err.render(bare_vm().interner());
    assert!(text.contains("+:"), "{text}");
}

#[test]
fn subtraction_follows_left_minus_right() {
    // 𝕨 - 𝕩 with w on the left: 3 - 1 = 2.
    assert_eq!(as_number(&dyad(Primitive::Sub, num(1.0), num(3.0)).unwrap()), 2.0);
    assert_eq!(as_number(&monad(Primitive::Sub, num(4.0)).unwrap()), -4.0);
    // 'b' - 'a' = 1.
    let offset = dyad(Primitive::Sub, Value::Character('a'), Value::Character('b')).unwrap();
    assert_eq!(as_number(&offset), 1.0);
    // 'd' - 3 = 'a'.
    let back = dyad(Primitive::Sub, num(3.0), Value::Character('d')).unwrap();
    assert!(matches!(back, Value::Character('a')));
}

#[test]
fn multiplication_sign_and_product() {
    assert_eq!(as_number(&monad(Primitive::Mul, num(-3.5)).unwrap()), -1.0);
    assert_eq!(as_number(&monad(Primitive::Mul, num(0.0)).unwrap()), 0.0);
    assert_eq!(as_number(&monad(Primitive::Mul, num(9.0)).unwrap()), 1.0);
    assert_eq!(as_number(&dyad(Primitive::Mul, num(4.0), num(3.0)).unwrap()), 12.0);
}

#[test]
fn division_reciprocal_and_quotient() {
    assert_eq!(as_number(&monad(Primitive::Div, num(4.0)).unwrap()), 0.25);
    // 3 ÷ 4 = 0.75.
    assert_eq!(as_number(&dyad(Primitive::Div, num(4.0), num(3.0)).unwrap()), 0.75);
}

#[test]
fn power_and_log() {
    assert_eq!(as_number(&dyad(Primitive::Power, num(3.0), num(2.0)).unwrap()), 8.0);
    assert!((as_number(&monad(Primitive::Power, num(1.0)).unwrap()) - std::f64::consts::E).abs() < 1e-12);
    assert!((as_number(&monad(Primitive::Log, num(std::f64::consts::E)).unwrap()) - 1.0).abs() < 1e-12);
    // 2 Log 8 = 3.
    assert!((as_number(&dyad(Primitive::Log, num(8.0), num(2.0)).unwrap()) - 3.0).abs() < 1e-12);
}

#[test]
fn floor_ceiling_min_max() {
    assert_eq!(as_number(&monad(Primitive::Floor, num(3.7)).unwrap()), 3.0);
    assert_eq!(as_number(&monad(Primitive::Ceiling, num(3.2)).unwrap()), 4.0);
    assert_eq!(as_number(&dyad(Primitive::Floor, num(2.0), num(5.0)).unwrap()), 2.0);
    assert_eq!(as_number(&dyad(Primitive::Ceiling, num(2.0), num(5.0)).unwrap()), 5.0);
}

#[test]
fn modulus_sign_follows_the_left_argument() {
    assert_eq!(as_number(&monad(Primitive::Modulus, num(-4.0)).unwrap()), 4.0);
    // 3 | 7 = 1, 3 | ¯5 = 1, 0 | 9 = 9.
    assert_eq!(as_number(&dyad(Primitive::Modulus, num(7.0), num(3.0)).unwrap()), 1.0);
    assert_eq!(as_number(&dyad(Primitive::Modulus, num(-5.0), num(3.0)).unwrap()), 1.0);
    assert_eq!(as_number(&dyad(Primitive::Modulus, num(9.0), num(0.0)).unwrap()), 9.0);
}

#[test]
fn comparisons_on_numbers_and_characters() {
    // 3 ≤ 4, 3 < 4, 4 ≥ 4, ¬(4 > 4).
    assert_eq!(as_number(&dyad(Primitive::Le, num(4.0), num(3.0)).unwrap()), 1.0);
    assert_eq!(as_number(&dyad(Primitive::Lt, num(4.0), num(3.0)).unwrap()), 1.0);
    assert_eq!(as_number(&dyad(Primitive::Ge, num(4.0), num(4.0)).unwrap()), 1.0);
    assert_eq!(as_number(&dyad(Primitive::Gt, num(4.0), num(4.0)).unwrap()), 0.0);
    assert_eq!(
        as_number(&dyad(Primitive::Lt, Value::Character('b'), Value::Character('a')).unwrap()),
        1.0
    );
}

#[test]
fn comparisons_with_nan_are_falsy() {
    for p in [Primitive::Le, Primitive::Lt, Primitive::Gt, Primitive::Ge] {
        assert_eq!(as_number(&dyad(p, num(f64::NAN), num(1.0)).unwrap()), 0.0, "{p:?}");
        assert_eq!(as_number(&dyad(p, num(1.0), num(f64::NAN)).unwrap()), 0.0, "{p:?}");
    }
}

#[test]
fn cross_kind_ordering_ranks_number_character_symbol() {
    // number < character < symbol.
    assert_eq!(as_number(&dyad(Primitive::Lt, Value::Character('a'), num(99.0)).unwrap()), 1.0);
    assert_eq!(as_number(&dyad(Primitive::Lt, Value::nil(), Value::Character('z')).unwrap()), 1.0);
    // Arrays are not ordered; the error is thrown.
    assert!(dyad(Primitive::Le, naturals(&[1]), num(0.0)).is_err());
}

#[test]
fn equality_and_rank() {
    assert_eq!(as_number(&dyad(Primitive::Eq, num(2.0), num(2.0)).unwrap()), 1.0);
    assert_eq!(as_number(&dyad(Primitive::Eq, num(2.0), Value::Character('a')).unwrap()), 0.0);
    assert_eq!(as_number(&dyad(Primitive::Ne, Value::nil(), Value::nothing()).unwrap()), 1.0);

    // Monadic = is the rank; atoms have rank 0.
    let table = Value::Array(Rc::new(Array::with_shape(
        &[2, 3],
        Data::from_naturals(&[0, 0, 0, 0, 0, 0]),
        Value::zero(),
    )));
    assert_eq!(as_number(&monad(Primitive::Eq, table.clone()).unwrap()), 2.0);
    assert_eq!(as_number(&monad(Primitive::Eq, num(7.0)).unwrap()), 0.0);

    // Monadic ≠ is the leading-axis length; 1 for atoms.
    assert_eq!(as_number(&monad(Primitive::Ne, table).unwrap()), 2.0);
    assert_eq!(as_number(&monad(Primitive::Ne, num(7.0)).unwrap()), 1.0);
}

#[test]
fn shape_of_arrays_and_atoms() {
    let table = Value::Array(Rc::new(Array::with_shape(
        &[2, 3],
        Data::from_naturals(&[0; 6]),
        Value::zero(),
    )));
    assert_cells(&monad(Primitive::Shape, table).unwrap(), &[2, 3]);

    let of_atom = monad(Primitive::Shape, num(1.0)).unwrap();
    let a = of_atom.as_array().unwrap();
    assert_eq!(a.num_cells(), 0);
}

#[test]
fn reshape_properties() {
    let flat = naturals(&[0, 1, 2, 3, 4, 5]);
    let shaped = dyad(Primitive::Reshape, flat.clone(), naturals(&[2, 3])).unwrap();
    let a = shaped.as_array().unwrap();
    assert_eq!(a.rank(), 2);
    assert_eq!(a.num_cells(), 6);

    // Ravel restores the original cell sequence.
    let raveled = monad(Primitive::Reshape, shaped).unwrap();
    assert!(deep_match(&raveled, &flat));

    // Reshaping beyond the stored cells reads the fill.
    let grown = dyad(Primitive::Reshape, naturals(&[7]), naturals(&[3])).unwrap();
    assert_cells(&grown, &[7, 0, 0]);
}

#[test]
fn range_and_pick() {
    let r = monad(Primitive::Range, num(5.0)).unwrap();
    assert_cells(&r, &[0, 1, 2, 3, 4]);

    assert_eq!(as_number(&dyad(Primitive::Pick, r.clone(), num(3.0)).unwrap()), 3.0);
    assert_eq!(as_number(&monad(Primitive::Pick, r).unwrap()), 0.0);

    assert!(monad(Primitive::Range, num(2.5)).is_err());
    assert!(monad(Primitive::Range, num(-1.0)).is_err());
}

#[test]
fn assert_throws_its_message() {
    assert_eq!(as_number(&dyad(Primitive::Assert, num(1.0), Value::string("ok")).unwrap()), 1.0);

    let err = dyad(Primitive::Assert, num(0.0), Value::string("boom")).unwrap_err();
    assert!(deep_match(err.message(), &Value::string("boom")));

    // Monadic ! throws 𝕩 itself.
    let err = monad(Primitive::Assert, num(0.0)).unwrap_err();
    assert!(deep_match(err.message(), &num(0.0)));
}

#[test]
fn left_and_right_tacks() {
    assert_eq!(as_number(&dyad(Primitive::Left, num(1.0), num(2.0)).unwrap()), 2.0);
    assert_eq!(as_number(&dyad(Primitive::Right, num(1.0), num(2.0)).unwrap()), 1.0);
    assert_eq!(as_number(&monad(Primitive::Left, num(3.0)).unwrap()), 3.0);
}

#[test]
fn fill_reads_and_replaces() {
    let a = naturals(&[1, 2]);
    assert_eq!(as_number(&monad(Primitive::Fill, a.clone()).unwrap()), 0.0);

    let refilled = dyad(Primitive::Fill, a, Value::Character('q')).unwrap();
    assert!(matches!(refilled.as_array().unwrap().fill(), Value::Character(' ')));
}

#[test]
fn group_len_counts_buckets() {
    let indices = number_list(&[0.0, 1.0, 1.0, 2.0, -1.0]);
    let lens = dyad(Primitive::GroupLen, indices.clone(), Value::nothing()).unwrap();
    assert_cells(&lens, &[1, 2, 1]);

    // A minimum length pads with empty groups.
    let padded = dyad(Primitive::GroupLen, indices, num(5.0)).unwrap();
    assert_cells(&padded, &[1, 2, 1, 0, 0]);
}

#[test]
fn group_ord_orders_indices_by_group() {
    let indices = number_list(&[1.0, 0.0, 1.0, -1.0, 0.0]);
    let lens = dyad(Primitive::GroupLen, indices.clone(), Value::nothing()).unwrap();
    assert_cells(&lens, &[2, 2]);
    let order = dyad(Primitive::GroupOrd, indices, lens).unwrap();
    assert_cells(&order, &[1, 4, 0, 2]);
}

#[test]
fn trains_follow_the_split_application_rule() {
    let mut vm = bare_vm();
    // (F G H) applied dyadically is (𝕨 F 𝕩) G (𝕨 H 𝕩).
    let train3 = Value::Function(Rc::new(Function::Train3 {
        f: prim(Primitive::Add),
        g: prim(Primitive::Mul),
        h: prim(Primitive::Sub),
    }));
    let (x, w) = (2.0, 5.0);
    let direct = as_number(&vm.evoke(&train3, Evocation::Dyad, num(x), num(w)).unwrap());
    assert_eq!(direct, (w + x) * (w - x));

    // (G H) applied is G of H's result.
    let train2 = Value::Function(Rc::new(Function::Train2 {
        g: prim(Primitive::Floor),
        h: prim(Primitive::Sub),
    }));
    assert_eq!(as_number(&vm.evoke(&train2, Evocation::Monad, num(2.5), Value::nothing()).unwrap()), -3.0);
}

#[test]
fn constants_coerce_to_themselves() {
    let mut vm = bare_vm();
    let c = num(42.0);
    let r = vm.evoke(&c, Evocation::Dyad, num(1.0), num(2.0)).unwrap();
    assert_eq!(as_number(&r), 42.0);
}

#[test]
fn constant_modifier_returns_its_operand() {
    let mut vm = bare_vm();
    let five = applied1(Primitive1::Constant, num(5.0));
    assert_eq!(as_number(&vm.evoke(&five, Evocation::Dyad, num(1.0), num(2.0)).unwrap()), 5.0);

    // The operand may itself be a function; it is returned, not called.
    let held = applied1(Primitive1::Constant, prim(Primitive::Add));
    let r = vm.evoke(&held, Evocation::Monad, num(0.0), Value::nothing()).unwrap();
    assert!(deep_match(&r, &prim(Primitive::Add)));
}

#[test]
fn swap_exchanges_arguments() {
    let mut vm = bare_vm();
    let swapped_sub = applied1(Primitive1::Swap, prim(Primitive::Sub));
    // 5 -˜ 8 is 8 - 5.
    assert_eq!(as_number(&vm.evoke(&swapped_sub, Evocation::Dyad, num(8.0), num(5.0)).unwrap()), 3.0);
    // Monadic F˜ 𝕩 is 𝕩 F 𝕩.
    assert_eq!(as_number(&vm.evoke(&swapped_sub, Evocation::Monad, num(4.0), Value::nothing()).unwrap()), 0.0);
}

#[test]
fn each_preserves_shape() {
    let mut vm = bare_vm();
    let table = Value::Array(Rc::new(Array::with_shape(
        &[2, 3],
        Data::from_naturals(&[0, 1, 2, 3, 4, 5]),
        Value::zero(),
    )));
    let negate_each = applied1(Primitive1::Each, prim(Primitive::Sub));
    let r = vm.evoke(&negate_each, Evocation::Monad, table, Value::nothing()).unwrap();
    let a = r.as_array().unwrap();
    assert_eq!(a.rank(), 2);
    assert_eq!(a.axis_len(0), 2);
    assert_eq!(a.axis_len(1), 3);
    assert_eq!(as_number(&a.get_cell(5)), -5.0);
}

#[test]
fn each_broadcasts_atoms() {
    let mut vm = bare_vm();
    let add_each = applied1(Primitive1::Each, prim(Primitive::Add));
    let r = vm.evoke(&add_each, Evocation::Dyad, naturals(&[1, 2, 3]), num(10.0)).unwrap();
    assert_cells(&r, &[11, 12, 13]);

    let r = vm
        .evoke(&add_each, Evocation::Dyad, naturals(&[1, 2]), naturals(&[10, 20]))
        .unwrap();
    assert_cells(&r, &[11, 22]);

    assert!(vm.evoke(&add_each, Evocation::Dyad, naturals(&[1, 2]), naturals(&[1])).is_err());
}

#[test]
fn table_concatenates_shapes() {
    let mut vm = bare_vm();
    let add_table = applied1(Primitive1::Table, prim(Primitive::Add));
    let r = vm
        .evoke(&add_table, Evocation::Dyad, naturals(&[0, 1, 2]), naturals(&[10, 20]))
        .unwrap();
    let a = r.as_array().unwrap();
    assert_eq!(a.rank(), 2);
    assert_eq!(a.axis_len(0), 2);
    assert_eq!(a.axis_len(1), 3);
    // Row-major: 𝕨's cells vary slowest.
    let flat: Vec<i64> = (0..6).map(|i| a.get_natural(i)).collect();
    assert_eq!(flat, vec![10, 11, 12, 20, 21, 22]);
}

#[test]
fn scan_is_an_inclusive_prefix_fold() {
    let mut vm = bare_vm();
    let add_scan = applied1(Primitive1::Scan, prim(Primitive::Add));
    let r = vm.evoke(&add_scan, Evocation::Monad, naturals(&[1, 2, 3, 4]), Value::nothing()).unwrap();
    assert_cells(&r, &[1, 3, 6, 10]);

    // Equivalent to a left fold emitting prefixes.
    let cells = [5u32, 1, 7];
    let scanned = vm.evoke(&add_scan, Evocation::Monad, naturals(&cells), Value::nothing()).unwrap();
    let mut acc = 0i64;
    for (i, &c) in cells.iter().enumerate() {
        acc += i64::from(c);
        assert_eq!(scanned.as_array().unwrap().get_natural(i), acc);
    }
}

#[test]
fn scan_with_a_seed() {
    let mut vm = bare_vm();
    let add_scan = applied1(Primitive1::Scan, prim(Primitive::Add));
    let r = vm.evoke(&add_scan, Evocation::Dyad, naturals(&[1, 2, 3]), num(10.0)).unwrap();
    assert_cells(&r, &[11, 13, 16]);

    // The seed must be shaped like one cell of 𝕩.
    assert!(vm.evoke(&add_scan, Evocation::Dyad, naturals(&[1, 2]), naturals(&[1, 2])).is_err());
}

#[test]
fn scan_runs_along_the_leading_axis() {
    let mut vm = bare_vm();
    let add_scan = applied1(Primitive1::Scan, prim(Primitive::Add));
    let table = Value::Array(Rc::new(Array::with_shape(
        &[2, 2],
        Data::from_naturals(&[1, 2, 3, 4]),
        Value::zero(),
    )));
    let r = vm.evoke(&add_scan, Evocation::Monad, table, Value::nothing()).unwrap();
    let a = r.as_array().unwrap();
    assert_eq!(a.rank(), 2);
    let flat: Vec<i64> = (0..4).map(|i| a.get_natural(i)).collect();
    assert_eq!(flat, vec![1, 2, 4, 6]);
}

#[test]
fn scan_rejects_units() {
    let mut vm = bare_vm();
    let add_scan = applied1(Primitive1::Scan, prim(Primitive::Add));
    assert!(vm.evoke(&add_scan, Evocation::Monad, num(1.0), Value::nothing()).is_err());
}

#[test]
fn atop_and_over() {
    let mut vm = bare_vm();
    // (⌊∘÷) 𝕨⋄𝕩: floor of the quotient.
    let floordiv = applied2(Primitive2::Atop, prim(Primitive::Floor), prim(Primitive::Div));
    assert_eq!(as_number(&vm.evoke(&floordiv, Evocation::Dyad, num(2.0), num(7.0)).unwrap()), 3.0);

    // (+○⌊) applies ⌊ to both arguments first.
    let add_floors = applied2(Primitive2::Over, prim(Primitive::Add), prim(Primitive::Floor));
    assert_eq!(as_number(&vm.evoke(&add_floors, Evocation::Dyad, num(2.9), num(3.9)).unwrap()), 5.0);
    assert_eq!(as_number(&vm.evoke(&add_floors, Evocation::Monad, num(2.9), Value::nothing()).unwrap()), 2.0);
}

#[test]
fn before_and_after_bind_one_side() {
    let mut vm = bare_vm();
    // (1⊸-) 𝕩 is 1 - 𝕩.
    let one_minus = applied2(Primitive2::Before, num(1.0), prim(Primitive::Sub));
    assert_eq!(as_number(&vm.evoke(&one_minus, Evocation::Monad, num(5.0), Value::nothing()).unwrap()), -4.0);
    // 𝕨 (1⊸-)… dyadic: (1) - 𝕩 still, 𝕨 replaced by F 𝕨 = 1.
    assert_eq!(as_number(&vm.evoke(&one_minus, Evocation::Dyad, num(5.0), num(9.0)).unwrap()), -4.0);

    // (-⟜1) 𝕩 is 𝕩 - 1.
    let minus_one = applied2(Primitive2::After, prim(Primitive::Sub), num(1.0));
    assert_eq!(as_number(&vm.evoke(&minus_one, Evocation::Monad, num(5.0), Value::nothing()).unwrap()), 4.0);
    // 𝕨 (-⟜1) 𝕩 is 𝕨 - 1 regardless of 𝕩.
    assert_eq!(as_number(&vm.evoke(&minus_one, Evocation::Dyad, num(5.0), num(9.0)).unwrap()), 8.0);
}

#[test]
fn valences_split_monad_and_dyad() {
    let mut vm = bare_vm();
    let f = applied2(Primitive2::Valences, prim(Primitive::Sub), prim(Primitive::Add));
    assert_eq!(as_number(&vm.evoke(&f, Evocation::Monad, num(3.0), Value::nothing()).unwrap()), -3.0);
    assert_eq!(as_number(&vm.evoke(&f, Evocation::Dyad, num(3.0), num(4.0)).unwrap()), 7.0);
}

#[test]
fn choose_selects_by_computed_index() {
    let mut vm = bare_vm();
    let functions = Value::list(vec![prim(Primitive::Sub), prim(Primitive::Add)]);
    // The selector is a constant index.
    let pick0 = applied2(Primitive2::Choose, num(0.0), functions.clone());
    assert_eq!(as_number(&vm.evoke(&pick0, Evocation::Dyad, num(4.0), num(3.0)).unwrap()), -1.0);
    let pick1 = applied2(Primitive2::Choose, num(1.0), functions);
    assert_eq!(as_number(&vm.evoke(&pick1, Evocation::Dyad, num(4.0), num(3.0)).unwrap()), 7.0);
}

#[test]
fn catch_runs_the_alternative_exactly_on_throw() {
    let mut vm = bare_vm();
    // (!⎊(0˙)) applied to a failing assertion yields the alternative.
    let guarded = applied2(
        Primitive2::Catch,
        prim(Primitive::Assert),
        applied1(Primitive1::Constant, num(0.0)),
    );
    assert_eq!(as_number(&vm.evoke(&guarded, Evocation::Monad, num(0.0), Value::nothing()).unwrap()), 0.0);

    // When the protected call succeeds, the alternative never runs.
    assert_eq!(as_number(&vm.evoke(&guarded, Evocation::Monad, num(1.0), Value::nothing()).unwrap()), 1.0);
}

#[test]
fn fill_by_recomputes_the_fill() {
    let mut vm = bare_vm();
    let source = Value::Array(Rc::new(Array::list(Data::from_naturals(&[1, 2]), num(9.0))));

    // 𝔾 is a constant; the result keeps 𝔽's cells with 𝔾's fill template.
    let refit = applied2(Primitive2::FillBy, prim(Primitive::Right), num(5.0));
    let r = vm.evoke(&refit, Evocation::Monad, source.clone(), Value::nothing()).unwrap();
    assert!(matches!(r.as_array().unwrap().fill(), Value::Number(n) if *n == 0.0));

    // When 𝔾 throws on the fills, the result is unchanged.
    let kept = applied2(Primitive2::FillBy, prim(Primitive::Right), prim(Primitive::Assert));
    let r = vm.evoke(&kept, Evocation::Monad, source, Value::nothing()).unwrap();
    assert!(matches!(r.as_array().unwrap().fill(), Value::Number(n) if *n == 9.0));
}

#[test]
fn partial_two_modifier_acts_as_a_one_modifier() {
    let mut vm = bare_vm();
    // ∘÷ with its right operand bound, then applied to ⌊.
    let partial = Value::Modifier1(Rc::new(aplite::Modifier1::PartialM2 {
        m: mod2(Primitive2::Atop),
        g: prim(Primitive::Div),
    }));
    let floordiv = Value::Function(Rc::new(Function::AppliedM1 {
        m: partial,
        f: prim(Primitive::Floor),
    }));
    assert_eq!(as_number(&vm.evoke(&floordiv, Evocation::Dyad, num(2.0), num(7.0)).unwrap()), 3.0);
}

#[test]
fn unsupported_evocations_are_thrown() {
    let mut vm = bare_vm();
    let err = vm.evoke(&prim(Primitive::Add), Evocation::Inverse, num(1.0), num(1.0)).unwrap_err();
    let text = err.render(vm.interner());
    assert!(text.contains("inverse"), "{text}");
}
