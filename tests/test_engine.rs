//! Tests for the host-facing engine API: configuration, host bindings, call depth and
//! interruption.

extern crate walkjs;

use std::cell::Cell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use walkjs::runner::api::{Engine, EngineError};
use walkjs::parser::JsParser;
use walkjs::runner::ds::error::JErrorType;
use walkjs::runner::ds::value::JsValue;
use walkjs::runner::plugin::EngineConfig;

fn s(v: &str) -> JsValue {
    JsValue::from_str(v)
}

fn n(v: i64) -> JsValue {
    JsValue::from_i64(v)
}

// ============================================================================
// Host bindings
// ============================================================================

#[test]
fn test_put_and_get_global() {
    let mut engine = Engine::default();
    engine.put_global("limit", n(10)).unwrap();
    engine.evaluate_source("var doubled = limit * 2; let hidden = 3;").unwrap();
    assert_eq!(engine.get_global("doubled").unwrap(), n(20));
    assert_eq!(engine.get_global("hidden").unwrap(), n(3));

    let error = engine.get_global("missing").unwrap_err();
    assert!(matches!(error, EngineError::Runtime(JErrorType::ReferenceError(_))));
}

#[test]
fn test_put_global_respects_read_only_bindings() {
    let mut engine = Engine::default();
    let error = engine.put_global("NaN", n(1)).unwrap_err();
    assert!(matches!(error, EngineError::Runtime(JErrorType::TypeError(_))));
}

#[test]
fn test_register_native_function() {
    let mut engine = Engine::default();
    engine.register_native_function("sum", 2, |_, _, args| {
        let total = args.iter().fold(0.0, |acc, v| match v {
            JsValue::Number(n) => acc + n.to_f64(),
            _ => acc,
        });
        Ok(JsValue::from_f64(total))
    });
    assert_eq!(engine.evaluate_source("sum(1, 2, 3)").unwrap(), n(6));
    assert_eq!(engine.evaluate_source("sum.length").unwrap(), n(2));
    assert_eq!(engine.evaluate_source("typeof sum").unwrap(), s("function"));
}

#[test]
fn test_native_function_errors_are_catchable() {
    let mut engine = Engine::default();
    engine.register_native_function("fail", 0, |_, _, _| {
        Err(JErrorType::TypeError("host refused".to_string()))
    });
    let result = engine
        .evaluate_source("try { fail(); } catch (e) { e.name + ': ' + e.message; }")
        .unwrap();
    assert_eq!(result, s("TypeError: host refused"));
}

#[test]
fn test_native_function_sees_this() {
    let mut engine = Engine::default();
    engine.register_native_function("kind", 0, |_, this, _| {
        Ok(JsValue::Boolean(this.is_object()))
    });
    let result = engine.evaluate_source("var o = { k: kind }; o.k()").unwrap();
    assert_eq!(result, JsValue::Boolean(true));
}

#[test]
fn test_call_function_and_construct() {
    let mut engine = Engine::default();
    engine
        .evaluate_source(
            "function Point(x, y) { this.x = x; this.y = y; }
             Point.prototype.sum = function () { return this.x + this.y; };
             function self() { return this; }",
        )
        .unwrap();

    let point = engine.get_global("Point").unwrap();
    let p = engine.construct(&point, vec![n(2), n(5)]).unwrap();
    let sum = match &p {
        JsValue::Object(_) => {
            engine.put_global("p", p.clone()).unwrap();
            engine.evaluate_source("p.sum()").unwrap()
        }
        other => panic!("expected an object, got {:?}", other),
    };
    assert_eq!(sum, n(7));

    let self_fn = engine.get_global("self").unwrap();
    let this = engine.call_function(&self_fn, n(1), vec![]).unwrap();
    assert!(this.is_object());

    let error = engine.call_function(&n(1), JsValue::Undefined, vec![]).unwrap_err();
    assert!(matches!(error, EngineError::Runtime(JErrorType::TypeError(_))));
}

#[test]
fn test_uncaught_throw_reaches_the_host() {
    let mut engine = Engine::default();
    let error = engine.evaluate_source("throw 42;").unwrap_err();
    match &error {
        EngineError::Runtime(JErrorType::Thrown(v)) => assert_eq!(v, &n(42)),
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(engine.describe_error(&error), "Uncaught 42");
}

#[test]
fn test_state_survives_between_evaluations() {
    let mut engine = Engine::default();
    engine.evaluate_source("var count = 0; function tick() { return ++count; }").unwrap();
    engine.evaluate_source("tick(); tick();").unwrap();
    assert_eq!(engine.evaluate_source("tick()").unwrap(), n(3));
}

#[test]
fn test_engines_are_isolated() {
    let mut a = Engine::default();
    let mut b = Engine::default();
    a.evaluate_source("var shared = 1; Object.prototype.polluted = true;").unwrap();
    assert_eq!(b.evaluate_source("typeof shared").unwrap(), s("undefined"));
    assert_eq!(b.evaluate_source("({}).polluted").unwrap(), JsValue::Undefined);
}

// ============================================================================
// Parse errors
// ============================================================================

#[test]
fn test_parse_errors() {
    let mut engine = Engine::default();
    for source in ["var = 1;", "function (", "if (", "a +;"] {
        let error = engine.evaluate_source(source).unwrap_err();
        assert!(matches!(error, EngineError::Parse(_)), "{} should not parse", source);
    }
}

#[test]
fn test_early_errors_are_parse_errors() {
    let mut engine = Engine::default();
    for source in [
        "'use strict'; with ({}) {}",
        "'use strict'; var x; delete x;",
        "break;",
        "function f() { continue; }",
        "return 1;",
        "a: a: ;",
        "const c;",
    ] {
        let error = engine.evaluate_source(source).unwrap_err();
        assert!(matches!(error, EngineError::Parse(_)), "{} should be rejected", source);
    }
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_strict_config() {
    let mut engine = Engine::new(EngineConfig::default().with_strict(true));
    let error = engine.evaluate_source("undeclared = 1;").unwrap_err();
    assert!(matches!(error, EngineError::Runtime(JErrorType::ReferenceError(_))));
    assert_eq!(
        engine.evaluate_source("(function () { return this; })()").unwrap(),
        JsValue::Undefined
    );

    let mut sloppy = Engine::default();
    sloppy.evaluate_source("undeclared = 1;").unwrap();
    assert_eq!(sloppy.get_global("undeclared").unwrap(), n(1));
}

#[test]
fn test_strict_config_reaches_functions_in_pre_parsed_programs() {
    let program = JsParser::parse_to_ast_from_str(
        "function self() { return this; }
         function leak() { leaked = 1; }
         var result = typeof self();
         try { leak(); result += ',' + typeof leaked; } catch (e) { result += ',' + e.name; }
         result",
    )
    .unwrap();

    let mut strict = Engine::new(EngineConfig::default().with_strict(true));
    assert_eq!(
        strict.evaluate_program(&program).unwrap(),
        s("undefined,ReferenceError")
    );

    let mut sloppy = Engine::default();
    assert_eq!(sloppy.evaluate_program(&program).unwrap(), s("object,number"));
}

#[test]
fn test_call_depth_limit_is_catchable() {
    let mut engine = Engine::new(EngineConfig::default().with_max_call_depth(20));
    let result = engine
        .evaluate_source(
            "var depth = 0;
             function dive() { depth++; dive(); }
             try { dive(); } catch (e) { [e instanceof RangeError, e.message, depth].join(); }",
        )
        .unwrap();
    assert_eq!(result, s("true,Maximum call stack size exceeded,20"));

    // The depth counter unwinds, so the engine stays usable.
    let result = engine
        .evaluate_source("function three() { return 3; } three()")
        .unwrap();
    assert_eq!(result, n(3));
}

#[test]
fn test_uncaught_call_depth_error() {
    let mut engine = Engine::new(EngineConfig::default().with_max_call_depth(10));
    let error = engine.evaluate_source("function f() { return f(); } f();").unwrap_err();
    assert!(matches!(error, EngineError::Runtime(JErrorType::RangeError(_))));
    assert_eq!(
        engine.describe_error(&error),
        "Uncaught range error: Maximum call stack size exceeded"
    );
}

#[test]
fn test_default_call_depth_limit_on_a_default_thread() {
    // Spawned threads get the platform default stack, which is smaller than the main thread's.
    let result = std::thread::spawn(|| {
        let mut engine = Engine::default();
        engine
            .evaluate_source(
                "function f(n) { return f(n + 1); }
                 try { f(0); } catch (e) { e.name; }",
            )
            .map(|v| format!("{:?}", v))
            .map_err(|e| format!("{:?}", e))
    })
    .join()
    .expect("evaluator thread panicked");
    assert_eq!(result, Ok(format!("{:?}", s("RangeError"))));
}

#[test]
fn test_default_call_depth_limit_through_constructors() {
    let result = std::thread::spawn(|| {
        let mut engine = Engine::default();
        engine
            .evaluate_source(
                "function Node(n) { this.next = new Node(n + 1); }
                 try { new Node(0); } catch (e) { e instanceof RangeError; }",
            )
            .map(|v| format!("{:?}", v))
            .map_err(|e| format!("{:?}", e))
    })
    .join()
    .expect("evaluator thread panicked");
    assert_eq!(result, Ok(format!("{:?}", JsValue::Boolean(true))));
}

// ============================================================================
// Interruption
// ============================================================================

#[test]
fn test_interrupt_stops_an_infinite_loop() {
    let mut engine = Engine::new(EngineConfig::default().with_interrupt_check_interval(16));
    let polls = Rc::new(Cell::new(0u32));
    let seen = polls.clone();
    engine.set_interrupt_handler(Box::new(move || {
        seen.set(seen.get() + 1);
        seen.get() >= 3
    }));
    let error = engine
        .evaluate_source("var x = 0; while (true) { x++; }")
        .unwrap_err();
    assert!(matches!(error, EngineError::Interrupted));
    assert_eq!(polls.get(), 3);
    assert_eq!(engine.describe_error(&error), "Evaluation interrupted by host");
}

#[test]
fn test_interrupt_is_not_catchable_and_skips_finally() {
    let mut engine = Engine::new(EngineConfig::default().with_interrupt_check_interval(1));
    engine.set_interrupt_handler(Box::new(|| true));
    let error = engine
        .evaluate_source(
            "var cleaned = false;
             try { while (true) {} } catch (e) { 'caught'; } finally { cleaned = true; }",
        )
        .unwrap_err();
    assert!(matches!(error, EngineError::Interrupted));
}

#[test]
fn test_handler_returning_false_lets_scripts_finish() {
    let mut engine = Engine::new(EngineConfig::default().with_interrupt_check_interval(1));
    let polls = Rc::new(Cell::new(0u32));
    let seen = polls.clone();
    engine.set_interrupt_handler(Box::new(move || {
        seen.set(seen.get() + 1);
        false
    }));
    let result = engine
        .evaluate_source("var t = 0; for (var i = 0; i < 100; i++) { t += i; } t")
        .unwrap();
    assert_eq!(result, n(4950));
    assert!(polls.get() > 0);
}
