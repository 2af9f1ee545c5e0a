//! Integration tests for the interpreter.
//!
//! These tests run JavaScript source through a fresh `Engine` and check the completion value of
//! the program. Scripts usually fold several observations into one string so a single assertion
//! shows the whole picture when it fails.

extern crate walkjs;

use pretty_assertions::assert_eq;
use walkjs::runner::api::Engine;
use walkjs::runner::ds::value::JsValue;

/// Helper to parse and run JavaScript code, returning the program's completion value.
fn run_js(code: &str) -> Result<JsValue, String> {
    let mut engine = Engine::default();
    engine
        .evaluate_source(code)
        .map_err(|e| engine.describe_error(&e))
}

fn s(v: &str) -> JsValue {
    JsValue::from_str(v)
}

fn n(v: i64) -> JsValue {
    JsValue::from_i64(v)
}

// ============================================================================
// Arithmetic and coercion
// ============================================================================

#[test]
fn test_simple_arithmetic() {
    assert_eq!(run_js("1 + 2").unwrap(), n(3));
    assert_eq!(run_js("2 * (3 + 4)").unwrap(), n(14));
    assert_eq!(run_js("7 % -3").unwrap(), n(1));
    assert_eq!(run_js("-7 % 3").unwrap(), n(-1));
    assert_eq!(run_js("10 / 4").unwrap(), JsValue::from_f64(2.5));
    assert_eq!(run_js("0.1 + 0.2").unwrap(), JsValue::from_f64(0.1 + 0.2));
    assert_eq!(run_js("1 / 0").unwrap(), JsValue::from_f64(f64::INFINITY));
    assert_eq!(run_js("-1 / 0").unwrap(), JsValue::from_f64(f64::NEG_INFINITY));
}

#[test]
fn test_integer_overflow_becomes_double() {
    assert_eq!(
        run_js("9007199254740992 + 1").unwrap(),
        JsValue::from_f64(9_007_199_254_740_992.0)
    );
    assert_eq!(run_js("4294967296 * 4294967296").unwrap(), JsValue::from_f64(18446744073709551616.0));
}

#[test]
fn test_signed_zero() {
    assert_eq!(run_js("1 / (0 * -1)").unwrap(), JsValue::from_f64(f64::NEG_INFINITY));
    assert_eq!(run_js("1 / -0").unwrap(), JsValue::from_f64(f64::NEG_INFINITY));
    assert_eq!(run_js("-0 === 0").unwrap(), JsValue::Boolean(true));
}

#[test]
fn test_string_concatenation() {
    assert_eq!(run_js("'a' + 1 + 2").unwrap(), s("a12"));
    assert_eq!(run_js("1 + 2 + 'a'").unwrap(), s("3a"));
    assert_eq!(run_js("'x' + null + undefined + true").unwrap(), s("xnullundefinedtrue"));
    assert_eq!(run_js("[] + {}").unwrap(), s("[object Object]"));
    assert_eq!(run_js("[1, 2] + [3]").unwrap(), s("1,23"));
}

#[test]
fn test_numeric_string_coercion() {
    assert_eq!(run_js("'10' * '2'").unwrap(), n(20));
    assert_eq!(run_js("'3' - 1").unwrap(), n(2));
    assert_eq!(run_js("+'  12  '").unwrap(), n(12));
    assert_eq!(run_js("+'1e3'").unwrap(), n(1000));
    assert_eq!(run_js("+'0x10'").unwrap(), n(16));
    assert_eq!(run_js("+''").unwrap(), n(0));
    assert_eq!(run_js("+'abc'").unwrap(), JsValue::from_f64(f64::NAN));
    assert_eq!(run_js("+true + +null").unwrap(), n(1));
    assert_eq!(run_js("+undefined").unwrap(), JsValue::from_f64(f64::NAN));
}

#[test]
fn test_value_of_drives_arithmetic() {
    let code = r#"
        var money = { valueOf: function () { return 40; }, toString: function () { return 'forty'; } };
        [money + 2, String(money), money * 1, money + ''].join(';')
    "#;
    assert_eq!(run_js(code).unwrap(), s("42;forty;40;40"));
}

#[test]
fn test_bitwise_operators() {
    assert_eq!(run_js("1 << 31").unwrap(), n(-2147483648));
    assert_eq!(run_js("-1 >>> 0").unwrap(), n(4294967295));
    assert_eq!(run_js("-16 >> 2").unwrap(), n(-4));
    assert_eq!(run_js("~5").unwrap(), n(-6));
    assert_eq!(run_js("(0xF0 | 0x0F) ^ 0xFF").unwrap(), n(0));
    assert_eq!(run_js("4294967297 & 3").unwrap(), n(1));
    assert_eq!(run_js("1.9 | 0").unwrap(), n(1));
}

#[test]
fn test_typeof() {
    let code = r#"
        [typeof undefined, typeof null, typeof true, typeof 1, typeof 'x',
         typeof {}, typeof [], typeof function () {}, typeof notDeclaredAnywhere].join()
    "#;
    assert_eq!(
        run_js(code).unwrap(),
        s("undefined,object,boolean,number,string,object,object,function,undefined")
    );
}

#[test]
fn test_relational_comparison() {
    assert_eq!(run_js("'a' < 'b'").unwrap(), JsValue::Boolean(true));
    assert_eq!(run_js("'10' < '9'").unwrap(), JsValue::Boolean(true));
    assert_eq!(run_js("10 < '9'").unwrap(), JsValue::Boolean(false));
    assert_eq!(run_js("NaN < 1 || NaN >= 1").unwrap(), JsValue::Boolean(false));
    assert_eq!(run_js("null >= 0").unwrap(), JsValue::Boolean(true));
    assert_eq!(run_js("undefined >= 0").unwrap(), JsValue::Boolean(false));
    assert_eq!(run_js("'B' < 'a'").unwrap(), JsValue::Boolean(true));
}

// ============================================================================
// Abstract equality golden table
// ============================================================================

const EQUALITY_OPERANDS: [&str; 11] = [
    "undefined", "null", "true", "false", "0", "1", "NaN", "''", "'0'", "'1'", "o",
];

/// Pairs (by index into `EQUALITY_OPERANDS`) for which `==` holds, in one direction.
const EQUAL_PAIRS: [(usize, usize); 19] = [
    (0, 0),
    (0, 1),
    (1, 1),
    (2, 2),
    (2, 5),
    (2, 9),
    (3, 3),
    (3, 4),
    (3, 7),
    (3, 8),
    (4, 4),
    (4, 7),
    (4, 8),
    (5, 5),
    (5, 9),
    (7, 7),
    (8, 8),
    (9, 9),
    (10, 10),
];

#[test]
fn test_abstract_equality_golden_table() {
    let mut engine = Engine::default();
    engine.evaluate_source("var o = {};").unwrap();
    for (i, a) in EQUALITY_OPERANDS.iter().enumerate() {
        for (j, b) in EQUALITY_OPERANDS.iter().enumerate() {
            let expected = EQUAL_PAIRS
                .iter()
                .any(|&(x, y)| (x, y) == (i, j) || (y, x) == (i, j));
            let result = engine.evaluate_source(&format!("({}) == ({})", a, b)).unwrap();
            assert_eq!(result, JsValue::Boolean(expected), "{} == {}", a, b);
            let negated = engine.evaluate_source(&format!("({}) != ({})", a, b)).unwrap();
            assert_eq!(negated, JsValue::Boolean(!expected), "{} != {}", a, b);
        }
    }
}

#[test]
fn test_object_equality_goes_through_to_primitive() {
    let code = r#"
        var box = { valueOf: function () { return 1; } };
        [box == 1, box == '1', box == true, box == box, box == { valueOf: box.valueOf }, null == 0].join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("true,true,true,true,false,false"));
}

#[test]
fn test_strict_equality() {
    let code = "[1 === 1, 1 === '1', NaN === NaN, null === undefined, 'ab' === 'a' + 'b'].join()";
    assert_eq!(run_js(code).unwrap(), s("true,false,false,false,true"));
}

// ============================================================================
// Objects, prototypes and properties
// ============================================================================

#[test]
fn test_prototype_shadowing() {
    let code = r#"
        var parent = { x: 1 };
        var child = Object.create(parent);
        var before = child.x;
        child.x = 2;
        [before, child.x, parent.x, child.hasOwnProperty('x'), parent.hasOwnProperty('x')].join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("1,2,1,true,true"));
}

#[test]
fn test_prototype_shadowing_through_constructor() {
    let code = r#"
        function Child() {}
        Child.prototype = { x: 1 };
        var c = new Child();
        var before = c.x;
        c.x = 2;
        [before, c.x, Child.prototype.x].join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("1,2,1"));
}

#[test]
fn test_inherited_getter_sees_the_receiver() {
    let code = r#"
        var proto = { get who() { return this.name; } };
        var o = Object.create(proto);
        o.name = 'child';
        o.who
    "#;
    assert_eq!(run_js(code).unwrap(), s("child"));
}

#[test]
fn test_inherited_setter_runs_on_the_receiver() {
    let code = r#"
        var p = { set v(x) { this._v = x * 2; } };
        var o = Object.create(p);
        o.v = 5;
        [o._v, o.hasOwnProperty('v'), p._v].join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("10,false,"));
}

#[test]
fn test_inherited_read_only_blocks_assignment() {
    let code = r#"
        var p = {};
        Object.defineProperty(p, 'fixed', { value: 1 });
        var o = Object.create(p);
        o.fixed = 2;
        [o.fixed, o.hasOwnProperty('fixed')].join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("1,false"));
}

#[test]
fn test_getter_setter_literal() {
    let code = r#"
        var o = { _v: 1, get v() { return this._v; }, set v(x) { this._v = x + 1; } };
        o.v = 10;
        o.v
    "#;
    assert_eq!(run_js(code).unwrap(), n(11));
}

#[test]
fn test_object_literal_key_conflicts() {
    assert!(run_js("var o = { a: 1, get a() { return 2; } };").is_err());
    assert!(run_js("var o = { get a() { return 1; }, get a() { return 2; } };").is_err());
    assert!(run_js("'use strict'; var o = { a: 1, a: 2 };").is_err());
    assert_eq!(run_js("var o = { a: 1, a: 2 }; o.a").unwrap(), n(2));
    assert_eq!(
        run_js("var o = { get a() { return 1; }, set a(v) {} }; o.a").unwrap(),
        n(1)
    );
}

#[test]
fn test_computed_member_access() {
    let code = r#"
        var o = { 'a b': 1, 2: 'two' };
        var k = 'a';
        [o[k + ' b'], o[2], o['2'], o[1 + 1]].join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("1,two,two,two"));
}

#[test]
fn test_reading_property_of_undefined_is_type_error() {
    let code = r#"
        var r = [];
        try { undefined.x; } catch (e) { r.push(e.name); }
        try { null[0]; } catch (e) { r.push(e.name); }
        try { var u; u.y = 1; } catch (e) { r.push(e.name); }
        r.join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("TypeError,TypeError,TypeError"));
}

#[test]
fn test_primitive_property_access() {
    assert_eq!(run_js("'hello'.length").unwrap(), n(5));
    assert_eq!(run_js("'hello'[1]").unwrap(), s("e"));
    assert_eq!(run_js("(5).toString(2)").unwrap(), s("101"));
    assert_eq!(run_js("true.toString()").unwrap(), s("true"));
    assert_eq!(run_js("var p = 'abc'; p.extra = 1; p.extra").unwrap(), JsValue::Undefined);
}

#[test]
fn test_delete_operator() {
    let code = r#"
        var o = { a: 1, b: 2 };
        var fixed = Object.defineProperty({}, 'k', { value: 1 });
        [delete o.a, 'a' in o, delete o.missing, delete fixed.k, fixed.k].join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("true,false,true,false,1"));
}

#[test]
fn test_in_and_instanceof() {
    let code = r#"
        function P() {}
        var p = new P();
        [p instanceof P, p instanceof Object, p.constructor === P,
         Object.getPrototypeOf(p) === P.prototype, 'toString' in p, 'x' in { x: 1 },
         [] instanceof Array, 1 instanceof Number].join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("true,true,true,true,true,true,true,false"));
}

#[test]
fn test_in_and_instanceof_type_errors() {
    let code = r#"
        var r = [];
        try { ({}) instanceof {}; } catch (e) { r.push(e.name); }
        try { 'a' in 'abc'; } catch (e) { r.push(e.name); }
        r.join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("TypeError,TypeError"));
}

// ============================================================================
// Arrays
// ============================================================================

#[test]
fn test_array_length_truncation() {
    let code = r#"
        var a = [];
        for (var i = 0; i < 10; i++) a[i] = i;
        a.length = 3;
        [a.length, a.join(), a[5], 5 in a, 2 in a].join(';')
    "#;
    assert_eq!(run_js(code).unwrap(), s("3;0,1,2;;false;true"));
}

#[test]
fn test_array_index_write_extends_length() {
    let code = "var b = [1]; b[4] = 5; [b.length, b.join('-'), 2 in b].join()";
    assert_eq!(run_js(code).unwrap(), s("5,1----5,false"));
}

#[test]
fn test_array_truncation_stops_at_non_configurable_index() {
    let code = r#"
        var a = [1, 2, 3, 4];
        Object.defineProperty(a, 1, { value: 2, configurable: false });
        a.length = 0;
        [a.length, a.join()].join(';')
    "#;
    assert_eq!(run_js(code).unwrap(), s("2;1,2"));
}

#[test]
fn test_array_invalid_length() {
    let code = "var a = []; try { a.length = -1; } catch (e) { e.name }";
    assert_eq!(run_js(code).unwrap(), s("RangeError"));
}

#[test]
fn test_array_literal_holes() {
    let code = "var a = [1, , 3, ]; [a.length, 1 in a, a[1]].join()";
    assert_eq!(run_js(code).unwrap(), s("3,false,"));
}

// ============================================================================
// Statements and completion values
// ============================================================================

#[test]
fn test_completion_values() {
    assert_eq!(run_js("1; if (true) { 2; }").unwrap(), n(2));
    assert_eq!(run_js("3; var x = 4;").unwrap(), n(3));
    assert_eq!(run_js("var i = 0; while (i < 3) { i++; }").unwrap(), n(2));
    assert_eq!(run_js("5; if (false) { 6; }").unwrap(), JsValue::Undefined);
    assert_eq!(run_js("").unwrap(), JsValue::Undefined);
}

#[test]
fn test_if_else_chain() {
    let code = r#"
        function grade(score) {
            if (score >= 90) return 'A';
            else if (score >= 80) return 'B';
            else return 'C';
        }
        [grade(95), grade(85), grade(10)].join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("A,B,C"));
}

#[test]
fn test_loops() {
    let code = r#"
        var total = 0;
        for (var i = 0; i < 10; i++) { if (i % 2) continue; total += i; }
        var j = 0;
        while (true) { if (++j > 5) break; }
        var k = 10;
        do { k--; } while (k > 100);
        [total, j, k].join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("20,6,9"));
}

#[test]
fn test_labelled_break_and_continue() {
    let code = r#"
        var out = [];
        outer: for (var i = 0; i < 3; i++) {
            for (var j = 0; j < 3; j++) {
                if (j == 1) continue outer;
                if (i == 2) break outer;
                out.push(i + '' + j);
            }
        }
        out.join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("00,10"));
}

#[test]
fn test_labelled_block() {
    let code = "var x = 0; block: { x = 1; break block; x = 2; } x";
    assert_eq!(run_js(code).unwrap(), n(1));
}

#[test]
fn test_illegal_jumps_are_syntax_errors() {
    assert!(run_js("break;").is_err());
    assert!(run_js("while (true) { continue nowhere; }").is_err());
    assert!(run_js("return 1;").is_err());
    assert!(run_js("a: a: ;").is_err());
}

#[test]
fn test_switch_fall_through_and_default() {
    let code = r#"
        function classify(v) {
            var r = [];
            switch (v) {
                case 1: r.push('one');
                case 2: r.push('two'); break;
                default: r.push('default');
                case 3: r.push('three');
            }
            return r.join();
        }
        [classify(1), classify(2), classify(3), classify(9), classify('1')].join(';')
    "#;
    assert_eq!(
        run_js(code).unwrap(),
        s("one,two;two;three;default,three;default,three")
    );
}

#[test]
fn test_switch_inside_loop_continue() {
    let code = r#"
        var hits = 0;
        for (var i = 0; i < 4; i++) {
            switch (i) {
                case 1: continue;
                default: hits++;
            }
        }
        hits
    "#;
    assert_eq!(run_js(code).unwrap(), n(3));
}

#[test]
fn test_for_in_order_and_inheritance() {
    let code = r#"
        var proto = { inherited: 1 };
        var o = Object.create(proto);
        o.b = 2;
        o.a = 3;
        Object.defineProperty(o, 'hidden', { value: 4, enumerable: false });
        var seen = [];
        for (var k in o) seen.push(k);
        seen.join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("b,a,inherited"));
}

#[test]
fn test_for_in_array_indices_first() {
    let code = "var a = [5, 6]; a.x = 1; var ks = []; for (var k in a) ks.push(k); ks.join()";
    assert_eq!(run_js(code).unwrap(), s("0,1,x"));
}

#[test]
fn test_for_in_skips_deleted_keys() {
    let code = r#"
        var o = { a: 1, b: 2, c: 3 };
        var seen = [];
        for (var k in o) { seen.push(k); delete o.c; }
        seen.join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("a,b"));
}

#[test]
fn test_for_in_shadowed_keys_visited_once() {
    let code = r#"
        var o = Object.create({ a: 1, b: 2 });
        o.a = 3;
        var seen = [];
        for (var k in o) seen.push(k + '=' + o[k]);
        seen.join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("a=3,b=2"));
}

#[test]
fn test_for_in_over_nullish() {
    assert_eq!(run_js("var c = 0; for (var k in null) c++; for (var k in undefined) c++; c").unwrap(), n(0));
}

#[test]
fn test_with_statement() {
    let code = r#"
        var o = { x: 1 };
        var x = 'outer';
        with (o) { x = 2; var y = x; }
        [o.x, x, y].join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("2,outer,2"));
}

#[test]
fn test_with_supplies_this_for_calls() {
    let code = "var o = { v: 7, f: function () { return this.v; } }; with (o) { f(); }";
    assert_eq!(run_js(code).unwrap(), n(7));
}

#[test]
fn test_with_scope_is_popped_after_throw() {
    let code = r#"
        var o = { v: 'inner' };
        var v = 'outer';
        try { with (o) { throw 1; } } catch (e) {}
        v
    "#;
    assert_eq!(run_js(code).unwrap(), s("outer"));
}

// ============================================================================
// Exceptions
// ============================================================================

#[test]
fn test_finally_overrides_return() {
    let code = "function f() { try { return 1; } finally { return 2; } } f()";
    assert_eq!(run_js(code).unwrap(), n(2));
}

#[test]
fn test_finally_overrides_throw() {
    let code = r#"
        function f() { try { throw new Error('lost'); } finally { return 'finally'; } }
        var r = 'none';
        do { try { throw 1; } finally { r = 'swallowed'; break; } } while (false);
        [f(), r].join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("finally,swallowed"));
}

#[test]
fn test_finally_runs_on_every_exit() {
    let code = r#"
        var log = [];
        for (var i = 0; i < 3; i++) {
            try { if (i == 1) break; log.push('body' + i); } finally { log.push('fin' + i); }
        }
        function g() {
            try { return 'ret'; } finally { log.push('g'); }
        }
        log.push(g());
        try { try { throw 'x'; } finally { log.push('inner'); } } catch (e) { log.push('caught ' + e); }
        log.join()
    "#;
    assert_eq!(
        run_js(code).unwrap(),
        s("body0,fin0,fin1,g,ret,inner,caught x")
    );
}

#[test]
fn test_catch_receives_engine_errors_as_objects() {
    let code = r#"
        try { null.foo; }
        catch (e) { [e instanceof TypeError, e instanceof Error, e.name, typeof e.message].join() }
    "#;
    assert_eq!(run_js(code).unwrap(), s("true,true,TypeError,string"));
}

#[test]
fn test_reference_error_message() {
    let code = "try { nope; } catch (e) { e.name + ': ' + e.message }";
    assert_eq!(run_js(code).unwrap(), s("ReferenceError: nope is not defined"));
}

#[test]
fn test_catch_binding_is_scoped() {
    let code = "var e = 'outer'; try { throw 1; } catch (e) { e = 2; } e";
    assert_eq!(run_js(code).unwrap(), s("outer"));
}

#[test]
fn test_thrown_values_pass_through() {
    assert_eq!(run_js("try { throw { code: 42 }; } catch (err) { err.code }").unwrap(), n(42));
    assert_eq!(run_js("try { throw 'str'; } catch (err) { err }").unwrap(), s("str"));
}

#[test]
fn test_rethrow_from_catch() {
    let code = r#"
        var log = [];
        try {
            try { throw 'first'; } catch (e) { log.push(e); throw 'second'; } finally { log.push('f'); }
        } catch (e) { log.push(e); }
        log.join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("first,f,second"));
}

#[test]
fn test_uncaught_errors_are_reported() {
    assert_eq!(run_js("throw 'boom'").unwrap_err(), "Uncaught boom");
    assert_eq!(
        run_js("throw new TypeError('bad input')").unwrap_err(),
        "Uncaught TypeError: bad input"
    );
    assert!(run_js("missing()").unwrap_err().contains("missing is not defined"));
}

// ============================================================================
// Scoping
// ============================================================================

#[test]
fn test_sloppy_assignment_creates_global() {
    let code = "function f() { leaked = 42; } f(); [leaked, globalThis.leaked].join()";
    assert_eq!(run_js(code).unwrap(), s("42,42"));
}

#[test]
fn test_strict_assignment_to_undeclared_throws() {
    let error = run_js("'use strict'; function f() { notDeclared = 1; } f();").unwrap_err();
    assert!(error.contains("notDeclared is not defined"), "{}", error);
}

#[test]
fn test_var_hoisting() {
    let code = r#"
        function f() { var before = typeof x; var x = 1; return before + ',' + x; }
        f()
    "#;
    assert_eq!(run_js(code).unwrap(), s("undefined,1"));
}

#[test]
fn test_function_hoisting() {
    assert_eq!(run_js("var r = hoisted(); function hoisted() { return 'ok'; } r").unwrap(), s("ok"));
}

#[test]
fn test_block_scoped_let() {
    let code = r#"
        var r = [];
        let x = 'outer';
        { let x = 'inner'; r.push(x); }
        r.push(x);
        r.join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("inner,outer"));
}

#[test]
fn test_const_assignment_is_type_error() {
    let code = "const c = 1; var r; try { c = 2; } catch (e) { r = e.name; } [r, c].join()";
    assert_eq!(run_js(code).unwrap(), s("TypeError,1"));
    assert!(run_js("const missing;").is_err());
}

#[test]
fn test_closure_captures_per_iteration_let_binding() {
    let code = r#"
        var fns = [];
        for (let i = 0; i < 5; i++) { fns.push(function () { return i; }); }
        fns.map(function (f) { return f(); }).join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("0,1,2,3,4"));
}

#[test]
fn test_closure_over_var_sees_final_value() {
    let code = r#"
        var fns = [];
        for (var i = 0; i < 5; i++) { fns.push(function () { return i; }); }
        fns.map(function (f) { return f(); }).join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("5,5,5,5,5"));
}

#[test]
fn test_for_in_let_binding_per_iteration() {
    let code = r#"
        var fns = [];
        for (let k in { a: 1, b: 2 }) { fns.push(function () { return k; }); }
        fns.map(function (f) { return f(); }).join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("a,b"));
}

#[test]
fn test_closure_counter() {
    let code = r#"
        function counter() {
            var n = 0;
            return { inc: function () { return ++n; }, get: function () { return n; } };
        }
        var a = counter(), b = counter();
        a.inc(); a.inc(); b.inc();
        [a.get(), b.get()].join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("2,1"));
}

#[test]
fn test_top_level_functions_resolve_globals_at_call_time() {
    let code = "function read() { return value; } var value = 1; var first = read(); value = 2; [first, read()].join()";
    assert_eq!(run_js(code).unwrap(), s("1,2"));
}

// ============================================================================
// Functions and calls
// ============================================================================

#[test]
fn test_recursion() {
    let code = "function fib(n) { return n < 2 ? n : fib(n - 1) + fib(n - 2); } fib(15)";
    assert_eq!(run_js(code).unwrap(), n(610));
}

#[test]
fn test_named_function_expression_binds_itself() {
    let code = r#"
        var f = function fact(n) { return n <= 1 ? 1 : n * fact(n - 1); };
        [f(5), typeof fact].join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("120,undefined"));
}

#[test]
fn test_function_length_and_name() {
    let code = "function add(a, b, c) {} var anon = function () {}; [add.length, add.name, anon.name === ''].join()";
    assert_eq!(run_js(code).unwrap(), s("3,add,true"));
}

#[test]
fn test_method_call_binds_this() {
    let code = r#"
        var o = { v: 3, get: function () { return this.v; } };
        var detached = o.get;
        var v = 'global';
        [o.get(), o['get'](), detached()].join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("3,3,global"));
}

#[test]
fn test_new_uses_returned_object() {
    let code = r#"
        function F() { this.a = 1; return { b: 2 }; }
        function G() { this.a = 1; return 5; }
        var f = new F();
        [f.a, f.b, new G().a].join()
    "#;
    assert_eq!(run_js(code).unwrap(), s(",2,1"));
}

#[test]
fn test_calling_non_callable() {
    let code = "var o = {}; try { o.nope(); } catch (e) { e.name + ': ' + e.message }";
    assert_eq!(run_js(code).unwrap(), s("TypeError: o.nope is not a function"));
    let code = "try { new 5; } catch (e) { e.name }";
    assert_eq!(run_js(code).unwrap(), s("TypeError"));
}

#[test]
fn test_missing_arguments_are_undefined() {
    assert_eq!(run_js("function f(a, b) { return b; } f(1)").unwrap(), JsValue::Undefined);
    assert_eq!(run_js("function f() { } f()").unwrap(), JsValue::Undefined);
}

#[test]
fn test_arguments_aliasing() {
    assert_eq!(run_js("function f(a) { arguments[0] = 99; return a; } f(1)").unwrap(), n(99));
    assert_eq!(run_js("function g(a) { a = 5; return arguments[0]; } g(1)").unwrap(), n(5));
}

#[test]
fn test_arguments_without_aliasing() {
    let code = "function h(a) { 'use strict'; arguments[0] = 99; return a; } h(1)";
    assert_eq!(run_js(code).unwrap(), n(1));
    let code = "function k(a, b) { b = 3; return arguments.length + ':' + arguments[1]; } k(1)";
    assert_eq!(run_js(code).unwrap(), s("1:undefined"));
    let code = "function m(a) { delete arguments[0]; arguments[0] = 7; return a; } m(1)";
    assert_eq!(run_js(code).unwrap(), n(1));
}

#[test]
fn test_arguments_object_shape() {
    let code = r#"
        function f() { return [arguments.length, arguments[1], arguments.callee === f].join(); }
        f('a', 'b', 'c')
    "#;
    assert_eq!(run_js(code).unwrap(), s("3,b,true"));
}

#[test]
fn test_strict_arguments_callee_throws() {
    let code = r#"
        function s() { 'use strict'; try { arguments.callee; return 'no'; } catch (e) { return e.name; } }
        s()
    "#;
    assert_eq!(run_js(code).unwrap(), s("TypeError"));
}

// ============================================================================
// Strict mode
// ============================================================================

#[test]
fn test_this_binding_by_strictness() {
    assert_eq!(
        run_js("(function () { return this; })() === globalThis").unwrap(),
        JsValue::Boolean(true)
    );
    assert_eq!(
        run_js("'use strict'; (function () { return this; })()").unwrap(),
        JsValue::Undefined
    );
}

#[test]
fn test_primitive_this_boxing() {
    let sloppy = "String.prototype.kind = function () { return typeof this; }; 'x'.kind()";
    assert_eq!(run_js(sloppy).unwrap(), s("object"));
    let strict = "String.prototype.kind = function () { 'use strict'; return typeof this; }; 'x'.kind()";
    assert_eq!(run_js(strict).unwrap(), s("string"));
}

#[test]
fn test_strict_mode_early_errors() {
    assert!(run_js("'use strict'; with ({}) {}").is_err());
    assert!(run_js("'use strict'; var x; delete x;").is_err());
    assert!(run_js("'use strict'; eval = 1;").is_err());
    assert!(run_js("'use strict'; function f(a, a) {}").is_err());
    assert!(run_js("function f(a, a) { return a; } f(1, 2)").is_ok());
}

#[test]
fn test_strict_mode_rejections_throw() {
    let code = r#"
        'use strict';
        var r = [];
        var frozen = Object.freeze({ a: 1 });
        try { frozen.a = 2; } catch (e) { r.push(e.name); }
        var fixed = Object.defineProperty({}, 'x', { value: 1 });
        try { delete fixed.x; } catch (e) { r.push(e.name); }
        try { Object.preventExtensions({}).extra = 1; } catch (e) { r.push(e.name); }
        r.join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("TypeError,TypeError,TypeError"));
}

#[test]
fn test_sloppy_mode_rejections_are_silent() {
    let code = r#"
        var frozen = Object.freeze({ a: 1 });
        frozen.a = 2;
        frozen.b = 3;
        [frozen.a, frozen.b].join()
    "#;
    assert_eq!(run_js(code).unwrap(), s("1,"));
}
