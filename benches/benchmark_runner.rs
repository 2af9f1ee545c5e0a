//! Benchmark runner for the tree-walking interpreter.
//!
//! Each benchmark is parsed once and evaluated `iterations` times in a fresh engine; the result
//! binding is checked so a broken evaluator cannot post a fast time.

use std::time::{Duration, Instant};

use walkjs::parser::JsParser;
use walkjs::runner::api::Engine;
use walkjs::runner::ds::value::JsValue;

/// Run a benchmark and return the execution time.
fn run_benchmark(name: &str, code: &str, iterations: u32, expected: &JsValue) -> Duration {
    let ast = match JsParser::parse_to_ast_from_str(code) {
        Ok(ast) => ast,
        Err(e) => panic!("Failed to parse benchmark {}: {}", name, e),
    };

    let start = Instant::now();
    for _ in 0..iterations {
        let mut engine = Engine::default();
        if let Err(e) = engine.evaluate_program(&ast) {
            panic!("Benchmark {} failed: {}", name, e);
        }
        let result = engine.get_global("result").unwrap_or(JsValue::Undefined);
        assert_eq!(&result, expected, "Benchmark {} computed a wrong result", name);
    }
    start.elapsed()
}

// ============================================================================
// Benchmark definitions
// ============================================================================

const BENCH_LOOP_SUM: &str = r#"
var result = 0;
for (var i = 0; i < 10000; i = i + 1) {
    result = result + i;
}
"#;

const BENCH_NESTED_LOOPS: &str = r#"
var result = 0;
for (var i = 0; i < 100; i = i + 1) {
    for (var j = 0; j < 100; j = j + 1) {
        result = result + 1;
    }
}
"#;

const BENCH_BITWISE: &str = r#"
var result = 0;
for (var i = 0; i < 1000; i = i + 1) {
    result = (result ^ i) & 0xFFFF;
}
"#;

const BENCH_RECURSIVE_FIB: &str = r#"
function fib(n) { return n < 2 ? n : fib(n - 1) + fib(n - 2); }
var result = fib(15);
"#;

const BENCH_CLOSURES: &str = r#"
function counter() { var c = 0; return function () { c = c + 1; return c; }; }
var next = counter();
var result = 0;
for (var i = 0; i < 2000; i++) { result = next(); }
"#;

const BENCH_PROPERTY_ACCESS: &str = r#"
function Point(x, y) { this.x = x; this.y = y; }
Point.prototype.sum = function () { return this.x + this.y; };
var result = 0;
for (var i = 0; i < 1000; i++) { result = result + new Point(i, 1).sum(); }
"#;

const BENCH_ARRAY_BUILTINS: &str = r#"
var a = [];
for (var i = 0; i < 500; i++) { a.push(i); }
var result = a.map(function (x) { return x * 2; }).slice(10, 20).join("-").length;
"#;

const BENCH_STRING_CONCAT: &str = r#"
var s = "";
for (var i = 0; i < 1000; i++) { s += String.fromCharCode(97 + i % 26); }
var result = s.length;
"#;

const BENCH_PRIME_SIEVE: &str = r#"
var result = 0;
for (var n = 2; n < 200; n = n + 1) {
    var isPrime = true;
    for (var i = 2; i * i <= n; i = i + 1) {
        if (n % i === 0) {
            isPrime = false;
            break;
        }
    }
    if (isPrime) {
        result = result + 1;
    }
}
"#;

fn main() {
    println!("=======================================================");
    println!("  walkjs - Tree-Walking Interpreter Benchmarks");
    println!("=======================================================\n");

    let benchmarks: Vec<(&str, &str, u32, JsValue)> = vec![
        ("Loop Sum (10K iterations)", BENCH_LOOP_SUM, 20, JsValue::from_i64(49_995_000)),
        ("Nested Loops (100x100)", BENCH_NESTED_LOOPS, 20, JsValue::from_i64(10_000)),
        ("Bitwise Operations (1K)", BENCH_BITWISE, 100, JsValue::from_i64(0)),
        ("Recursive Fibonacci (n=15)", BENCH_RECURSIVE_FIB, 20, JsValue::from_i64(610)),
        ("Closures (2K calls)", BENCH_CLOSURES, 20, JsValue::from_i64(2000)),
        ("Property Access (1K)", BENCH_PROPERTY_ACCESS, 20, JsValue::from_i64(500_500)),
        ("Array Builtins", BENCH_ARRAY_BUILTINS, 50, JsValue::from_i64(29)),
        ("String Concat (1K)", BENCH_STRING_CONCAT, 50, JsValue::from_i64(1000)),
        ("Prime Sieve (<200)", BENCH_PRIME_SIEVE, 50, JsValue::from_i64(46)),
    ];

    println!("{:<30} {:>10} {:>14} {:>14}", "Benchmark", "Runs", "Total", "Per run");
    println!("{}", "-".repeat(72));

    let mut total = Duration::ZERO;
    for (name, code, iterations, expected) in &benchmarks {
        let elapsed = run_benchmark(name, code, *iterations, expected);
        total += elapsed;
        println!(
            "{:<30} {:>10} {:>12.2?} {:>12.2?}",
            name,
            iterations,
            elapsed,
            elapsed / *iterations
        );
    }

    println!("{}", "-".repeat(72));
    println!("{:<30} {:>10} {:>12.2?}", "Total", "", total);
}
