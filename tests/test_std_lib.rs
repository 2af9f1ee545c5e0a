//! Tests for the builtin library.
//!
//! Each module exercises one global through scripts run on a fresh engine.

extern crate walkjs;

use pretty_assertions::assert_eq;
use walkjs::runner::api::Engine;
use walkjs::runner::ds::value::JsValue;

/// Helper to run JavaScript code and return the result.
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
// Object
// ============================================================================

mod object_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_keys_and_own_property_names() {
        let result = run_js(
            "var o = { b: 1, a: 2 };
             Object.defineProperty(o, 'hidden', { value: 3 });
             Object.keys(o).join() + '|' + Object.getOwnPropertyNames(o).join();",
        );
        assert_eq!(result.unwrap(), s("b,a|b,a,hidden"));

        let result = run_js("Object.getOwnPropertyNames([1, 2]).indexOf('length') >= 0");
        assert_eq!(result.unwrap(), JsValue::Boolean(true));
    }

    #[test]
    fn test_get_own_property_descriptor() {
        let result = run_js(
            "var d = Object.getOwnPropertyDescriptor({ a: 1 }, 'a');
             [d.value, d.writable, d.enumerable, d.configurable].join();",
        );
        assert_eq!(result.unwrap(), s("1,true,true,true"));

        let result = run_js(
            "var o = { get x() { return 1; } };
             var d = Object.getOwnPropertyDescriptor(o, 'x');
             [typeof d.get, typeof d.set, 'value' in d, 'writable' in d].join();",
        );
        assert_eq!(result.unwrap(), s("function,undefined,false,false"));

        assert_eq!(
            run_js("Object.getOwnPropertyDescriptor({}, 'missing')").unwrap(),
            JsValue::Undefined
        );
    }

    #[test]
    fn test_define_property_defaults() {
        let result = run_js(
            "var o = {};
             Object.defineProperty(o, 'x', { value: 1 });
             o.x = 2;
             var d = Object.getOwnPropertyDescriptor(o, 'x');
             [o.x, d.writable, d.enumerable, d.configurable, delete o.x].join();",
        );
        assert_eq!(result.unwrap(), s("1,false,false,false,false"));
    }

    #[test]
    fn test_define_properties_is_all_or_nothing() {
        let result = run_js(
            "var o = {};
             Object.defineProperties(o, { a: { value: 1, enumerable: true }, b: { get: function () { return 2; } } });
             var r = o.a + o.b;
             try {
               Object.defineProperties(o, { c: { value: 3 }, d: { get: 1 } });
             } catch (e) { r += ':' + (e instanceof TypeError); }
             r + ':' + ('c' in o);",
        );
        assert_eq!(result.unwrap(), s("3:true:false"));
    }

    #[test]
    fn test_create() {
        let result = run_js(
            "var proto = { greet: function () { return 'hi ' + this.name; } };
             var o = Object.create(proto, { name: { value: 'bob', enumerable: true } });
             [o.greet(), Object.getPrototypeOf(o) === proto, proto.isPrototypeOf(o)].join();",
        );
        assert_eq!(result.unwrap(), s("hi bob,true,true"));

        let result = run_js("var o = Object.create(null); typeof o.toString");
        assert_eq!(result.unwrap(), s("undefined"));

        let result = run_js("try { Object.create(1); } catch (e) { e instanceof TypeError; }");
        assert_eq!(result.unwrap(), JsValue::Boolean(true));
    }

    #[test]
    fn test_freeze_and_seal() {
        let result = run_js(
            "var f = Object.freeze({ a: 1 });
             f.a = 2; f.b = 3; delete f.a;
             var s = Object.seal({ a: 1 });
             s.a = 2; s.b = 3; delete s.a;
             [f.a, f.b, Object.isFrozen(f), Object.isSealed(f), Object.isExtensible(f),
              s.a, s.b, Object.isFrozen(s), Object.isSealed(s)].join();",
        );
        assert_eq!(result.unwrap(), s("1,,true,true,false,2,,false,true"));
    }

    #[test]
    fn test_empty_non_extensible_object_is_frozen() {
        let result = run_js(
            "var o = Object.preventExtensions({});
             [Object.isExtensible(o), Object.isSealed(o), Object.isFrozen(o)].join();",
        );
        assert_eq!(result.unwrap(), s("false,true,true"));
    }

    #[test]
    fn test_prototype_methods() {
        let result = run_js(
            "var o = { a: 1 };
             Object.defineProperty(o, 'h', { value: 2 });
             [o.hasOwnProperty('a'), o.hasOwnProperty('toString'),
              o.propertyIsEnumerable('a'), o.propertyIsEnumerable('h')].join();",
        );
        assert_eq!(result.unwrap(), s("true,false,true,false"));
    }

    #[test]
    fn test_to_string_tags() {
        let result = run_js(
            "var ts = Object.prototype.toString;
             [ts.call([]), ts.call({}), ts.call(function () {}), ts.call(new Error('x')),
              ts.call(null), ts.call(undefined), ts.call(1), ts.call('s')].join(' ');",
        );
        assert_eq!(
            result.unwrap(),
            s("[object Array] [object Object] [object Function] [object Error] [object Null] [object Undefined] [object Number] [object String]")
        );
    }

    #[test]
    fn test_object_wraps_primitives() {
        assert_eq!(run_js("typeof Object(1)").unwrap(), s("object"));
        assert_eq!(run_js("var o = {}; Object(o) === o").unwrap(), JsValue::Boolean(true));
        assert_eq!(run_js("Object(null) instanceof Object").unwrap(), JsValue::Boolean(true));
    }
}

// ============================================================================
// Function
// ============================================================================

mod function_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_call_and_apply() {
        let result = run_js(
            "function f(a, b) { return this.base + a + b; }
             var o = { base: 10 };
             f.call(o, 1, 2) + ',' + f.apply(o, [3, 4]) + ',' + f.apply(o);",
        );
        assert_eq!(result.unwrap(), s("13,17,NaN"));
    }

    #[test]
    fn test_bind() {
        let result = run_js(
            "function f(a, b, c) { return this.x + a + b + c; }
             var g = f.bind({ x: 1 }, 2);
             [g(1, 2), g.length, g.name].join();",
        );
        assert_eq!(result.unwrap(), s("6,1,bound f"));
    }

    #[test]
    fn test_new_through_bound_function() {
        let result = run_js(
            "function P(a, b) { this.s = a + b; }
             var B = P.bind(null, 1);
             var o = new B(2);
             [o.s, o instanceof P, o instanceof B].join();",
        );
        assert_eq!(result.unwrap(), s("3,true,true"));
    }

    #[test]
    fn test_function_constructor() {
        assert_eq!(run_js("new Function('a', 'b', 'return a + b')(2, 3)").unwrap(), n(5));
        assert_eq!(run_js("Function('return 7')()").unwrap(), n(7));
        let result = run_js("try { Function('return ('); } catch (e) { e instanceof SyntaxError; }");
        assert_eq!(result.unwrap(), JsValue::Boolean(true));
    }

    #[test]
    fn test_to_string() {
        assert_eq!(
            run_js("function add(a, b) { return a + b; } add.toString()").unwrap(),
            s("function add(a, b) { [code] }")
        );
        assert_eq!(
            run_js("parseInt.toString()").unwrap(),
            s("function parseInt() { [native code] }")
        );
    }

    #[test]
    fn test_call_on_non_callable_throws() {
        let result = run_js(
            "try { Function.prototype.call.call({}); } catch (e) { e instanceof TypeError; }",
        );
        assert_eq!(result.unwrap(), JsValue::Boolean(true));
    }

    #[test]
    fn test_length_and_name() {
        let result = run_js("function f(a, b, c) {} [f.length, f.name].join()");
        assert_eq!(result.unwrap(), s("3,f"));
    }
}

// ============================================================================
// Array
// ============================================================================

mod array_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_constructor() {
        assert_eq!(run_js("new Array(3).length").unwrap(), n(3));
        assert_eq!(run_js("Array(1, 2, 3).join('-')").unwrap(), s("1-2-3"));
        assert_eq!(run_js("new Array('3').length").unwrap(), n(1));
        let result = run_js("try { new Array(1.5); } catch (e) { e.message; }");
        assert_eq!(result.unwrap(), s("Invalid array length"));
    }

    #[test]
    fn test_is_array() {
        let result = run_js(
            "[Array.isArray([]), Array.isArray({ length: 0 }), Array.isArray('a')].join()",
        );
        assert_eq!(result.unwrap(), s("true,false,false"));
    }

    #[test]
    fn test_push_and_pop() {
        let result = run_js(
            "var a = [1];
             var len = a.push(2, 3);
             var last = a.pop();
             [len, last, a.length, a.join()].join(';');",
        );
        assert_eq!(result.unwrap(), s("3;3;2;1,2"));
        assert_eq!(run_js("[].pop()").unwrap(), JsValue::Undefined);
    }

    #[test]
    fn test_push_is_generic() {
        let result = run_js(
            "var o = { length: 1, 0: 'a' };
             Array.prototype.push.call(o, 'b');
             o.length + o[1];",
        );
        assert_eq!(result.unwrap(), s("2b"));
    }

    #[test]
    fn test_join_and_to_string() {
        assert_eq!(run_js("[1, null, undefined, 'x'].join()").unwrap(), s("1,,,x"));
        assert_eq!(run_js("[1, [2, 3]].toString()").unwrap(), s("1,2,3"));
        assert_eq!(run_js("String([])").unwrap(), s(""));
    }

    #[test]
    fn test_slice() {
        let result = run_js(
            "var a = [1, 2, 3, 4, 5];
             [a.slice(1, 3).join(), a.slice(-2).join(), a.slice(3, 1).length, a.slice().length].join(';');",
        );
        assert_eq!(result.unwrap(), s("2,3;4,5;0;5"));
    }

    #[test]
    fn test_concat() {
        let result = run_js("var c = [1].concat([2, 3], 4, [[5]]); c.length + ':' + c.join();");
        assert_eq!(result.unwrap(), s("4:1,2,3,4,5"));
    }

    #[test]
    fn test_index_of() {
        let result = run_js(
            "var a = [1, '1', NaN, 1];
             [a.indexOf(1), a.indexOf('1'), a.indexOf(NaN), a.indexOf(1, 1), a.indexOf(1, -1)].join();",
        );
        assert_eq!(result.unwrap(), s("0,1,-1,3,3"));
    }

    #[test]
    fn test_for_each_skips_holes() {
        let result = run_js(
            "var seen = [];
             [1, , 3].forEach(function (v, i, arr) { seen.push(i + ':' + v + ':' + (arr.length)); });
             seen.join(' ');",
        );
        assert_eq!(result.unwrap(), s("0:1:3 2:3:3"));
    }

    #[test]
    fn test_map_with_this_arg() {
        let result = run_js(
            "var r = [1, 2, 3].map(function (v) { return v * this.k; }, { k: 10 });
             r.join();",
        );
        assert_eq!(result.unwrap(), s("10,20,30"));
    }

    #[test]
    fn test_callback_must_be_callable() {
        let result = run_js("try { [1].map(5); } catch (e) { e instanceof TypeError; }");
        assert_eq!(result.unwrap(), JsValue::Boolean(true));
    }
}

// ============================================================================
// String
// ============================================================================

mod string_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_char_code() {
        assert_eq!(run_js("String.fromCharCode(72, 105)").unwrap(), s("Hi"));
        assert_eq!(run_js("String.fromCharCode()").unwrap(), s(""));
    }

    #[test]
    fn test_char_access() {
        assert_eq!(run_js("'abc'.charAt(1)").unwrap(), s("b"));
        assert_eq!(run_js("'abc'.charAt(5)").unwrap(), s(""));
        assert_eq!(run_js("'abc'.charCodeAt(0)").unwrap(), n(97));
        assert_eq!(run_js("isNaN('abc'.charCodeAt(9))").unwrap(), JsValue::Boolean(true));
        assert_eq!(run_js("'abc'[2]").unwrap(), s("c"));
        assert_eq!(run_js("'abc'.length").unwrap(), n(3));
    }

    #[test]
    fn test_index_of() {
        assert_eq!(run_js("'hello'.indexOf('l')").unwrap(), n(2));
        assert_eq!(run_js("'hello'.indexOf('l', 3)").unwrap(), n(3));
        assert_eq!(run_js("'hello'.indexOf('z')").unwrap(), n(-1));
    }

    #[test]
    fn test_slice_and_substring() {
        assert_eq!(run_js("'hello'.slice(-3)").unwrap(), s("llo"));
        assert_eq!(run_js("'hello'.slice(1, -1)").unwrap(), s("ell"));
        assert_eq!(run_js("'hello'.substring(3, 1)").unwrap(), s("el"));
        assert_eq!(run_js("'hello'.substring(-2, 2)").unwrap(), s("he"));
    }

    #[test]
    fn test_case_conversion() {
        assert_eq!(run_js("'MiXed'.toUpperCase()").unwrap(), s("MIXED"));
        assert_eq!(run_js("'MiXed'.toLowerCase()").unwrap(), s("mixed"));
    }

    #[test]
    fn test_wrappers() {
        let result = run_js(
            "var w = new String('ab');
             [typeof w, w.length, w[0], w == 'ab', w === 'ab', String(12)].join();",
        );
        assert_eq!(result.unwrap(), s("object,2,a,true,false,12"));
    }

    #[test]
    fn test_to_string_is_not_generic() {
        let result = run_js(
            "try { String.prototype.toString.call({}); } catch (e) { e instanceof TypeError; }",
        );
        assert_eq!(result.unwrap(), JsValue::Boolean(true));
    }
}

// ============================================================================
// Number and Boolean
// ============================================================================

mod number_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_to_string_radix() {
        assert_eq!(run_js("(255).toString(16)").unwrap(), s("ff"));
        assert_eq!(run_js("(-10).toString(2)").unwrap(), s("-1010"));
        assert_eq!(run_js("(1e21).toString()").unwrap(), s("1e+21"));
        let result = run_js("try { (1).toString(1); } catch (e) { e instanceof RangeError; }");
        assert_eq!(result.unwrap(), JsValue::Boolean(true));
    }

    #[test]
    fn test_to_fixed() {
        assert_eq!(run_js("(2.5).toFixed(0)").unwrap(), s("3"));
        assert_eq!(run_js("(1.005).toFixed(2)").unwrap(), s("1.00"));
        assert_eq!(run_js("(3).toFixed(2)").unwrap(), s("3.00"));
    }

    #[test]
    fn test_constants() {
        let result = run_js(
            "[Number.MAX_VALUE === 1.7976931348623157e308, Number.MIN_VALUE === 5e-324,
              isNaN(Number.NaN), Number.POSITIVE_INFINITY === Infinity,
              Number.NEGATIVE_INFINITY === -Infinity].join();",
        );
        assert_eq!(result.unwrap(), s("true,true,true,true,true"));
    }

    #[test]
    fn test_conversion() {
        assert_eq!(run_js("Number('  42 ')").unwrap(), n(42));
        assert_eq!(run_js("Number('0x10')").unwrap(), n(16));
        assert_eq!(run_js("Number()").unwrap(), n(0));
        assert_eq!(run_js("typeof new Number(1)").unwrap(), s("object"));
        assert_eq!(run_js("new Number(4) + 1").unwrap(), n(5));
    }

    #[test]
    fn test_boolean() {
        let result = run_js(
            "[Boolean(''), Boolean('0'), new Boolean(false) ? 1 : 2, true.toString(),
              new Boolean(true).valueOf()].join();",
        );
        assert_eq!(result.unwrap(), s("false,true,1,true,true"));
        let result = run_js(
            "try { Boolean.prototype.valueOf.call(1); } catch (e) { e instanceof TypeError; }",
        );
        assert_eq!(result.unwrap(), JsValue::Boolean(true));
    }
}

// ============================================================================
// Error
// ============================================================================

mod error_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_to_string() {
        assert_eq!(run_js("new TypeError('x').toString()").unwrap(), s("TypeError: x"));
        assert_eq!(run_js("new Error().toString()").unwrap(), s("Error"));
        assert_eq!(
            run_js("var e = new Error('m'); e.name = ''; e.toString()").unwrap(),
            s("m")
        );
    }

    #[test]
    fn test_call_without_new() {
        let result = run_js("var e = RangeError('r'); [e instanceof RangeError, e.message].join()");
        assert_eq!(result.unwrap(), s("true,r"));
    }

    #[test]
    fn test_hierarchy() {
        let result = run_js(
            "[new TypeError() instanceof Error, new SyntaxError() instanceof Error,
              new ReferenceError() instanceof TypeError, TypeError.prototype.name,
              Object.getPrototypeOf(RangeError.prototype) === Error.prototype].join();",
        );
        assert_eq!(result.unwrap(), s("true,true,false,TypeError,true"));
    }

    #[test]
    fn test_engine_errors_are_error_objects() {
        let result = run_js(
            "try { undefinedVariable; } catch (e) {
               [e instanceof ReferenceError, e.name, e.message].join('|');
             }",
        );
        assert_eq!(result.unwrap(), s("true|ReferenceError|undefinedVariable is not defined"));
    }
}

// ============================================================================
// Global functions and eval
// ============================================================================

mod global_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_int() {
        assert_eq!(run_js("parseInt('  42px')").unwrap(), n(42));
        assert_eq!(run_js("parseInt('0x1f')").unwrap(), n(31));
        assert_eq!(run_js("parseInt('101', 2)").unwrap(), n(5));
        assert_eq!(run_js("isNaN(parseInt('abc'))").unwrap(), JsValue::Boolean(true));
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(run_js("parseFloat('3.25abc')").unwrap(), JsValue::from_f64(3.25));
        assert_eq!(run_js("parseFloat('-.5e1')").unwrap(), n(-5));
        assert_eq!(run_js("isNaN(parseFloat('x'))").unwrap(), JsValue::Boolean(true));
    }

    #[test]
    fn test_is_nan_and_is_finite() {
        let result = run_js(
            "[isNaN('abc'), isNaN('12'), isFinite('12'), isFinite(Infinity), isFinite(NaN)].join()",
        );
        assert_eq!(result.unwrap(), s("true,false,true,false,false"));
    }

    #[test]
    fn test_constant_globals() {
        let result = run_js(
            "undefined = 1; NaN = 2; Infinity = 3;
             [typeof undefined, isNaN(NaN), Infinity > 1e308].join();",
        );
        assert_eq!(result.unwrap(), s("undefined,true,true"));
    }

    #[test]
    fn test_globals_are_not_enumerable() {
        let result = run_js(
            "var found = [];
             for (var k in globalThis) { if (k === 'Object' || k === 'parseInt') found.push(k); }
             found.length;",
        );
        assert_eq!(result.unwrap(), n(0));
    }

    #[test]
    fn test_eval_completion_value() {
        assert_eq!(run_js("eval('1; if (true) { 2; }')").unwrap(), n(2));
        assert_eq!(run_js("eval('')").unwrap(), JsValue::Undefined);
    }

    #[test]
    fn test_eval_non_string_passthrough() {
        assert_eq!(run_js("eval(42)").unwrap(), n(42));
        assert_eq!(run_js("var o = {}; eval(o) === o").unwrap(), JsValue::Boolean(true));
    }

    #[test]
    fn test_eval_creates_deletable_globals() {
        let result = run_js(
            "eval('var fromEval = 1;');
             var before = typeof fromEval;
             var deleted = delete fromEval;
             [before, deleted, typeof fromEval].join();",
        );
        assert_eq!(result.unwrap(), s("number,true,undefined"));
    }

    #[test]
    fn test_eval_runs_in_global_scope() {
        let result = run_js(
            "function f() { var local = 1; return eval('typeof local'); }
             f();",
        );
        assert_eq!(result.unwrap(), s("undefined"));
    }

    #[test]
    fn test_eval_syntax_error_is_catchable() {
        let result = run_js("try { eval('var = ;'); } catch (e) { e instanceof SyntaxError; }");
        assert_eq!(result.unwrap(), JsValue::Boolean(true));
    }

    #[test]
    fn test_strict_eval_keeps_its_variables() {
        let result = run_js(
            "eval(\"'use strict'; var inner = 1;\");
             typeof inner;",
        );
        assert_eq!(result.unwrap(), s("undefined"));
    }
}
