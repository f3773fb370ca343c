//! End-to-end tests: source text compiled, validated and run on the VM.
//!
//! Tests cover:
//! - Arithmetic, strings and printing
//! - Conditionals, loops and scope of loop counters
//! - Functions, recursion, closures and both scoping modes
//! - Runtime failures of compiled code
//! - Listing shape and determinism of the generated program

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use moonlet_assembler::{fingerprint, listing};
use moonlet_common::Program;
use moonlet_compiler::{compile, CompileError};
use moonlet_validator::validate;
use moonlet_vm::{OperationError, RuntimeError, Scoping, StandardLibrary, Value, VmConfig, VM};
use proptest::prelude::*;

// ============================================================
// Helper functions
// ============================================================

struct Run {
    result: Result<(), RuntimeError>,
    output: String,
    globals: moonlet_vm::Scope,
}

fn compile_ok(source: &str) -> Program {
    let program = compile(source).unwrap_or_else(|e| panic!("{e}\n{source}"));
    if let Err(errors) = validate(&program) {
        panic!("generated program failed validation: {errors:?}\n{program}");
    }
    program
}

fn run_source_with(source: &str, input: &str, config: VmConfig) -> Run {
    let program = compile_ok(source);
    let output = Rc::new(RefCell::new(Vec::new()));
    let input = Rc::new(RefCell::new(io::Cursor::new(input.as_bytes().to_vec())));

    let mut vm = VM::with_config(&program, config);
    StandardLibrary::new(output.clone(), input)
        .install(&mut vm)
        .unwrap();
    let result = vm.execute();

    let text = String::from_utf8(output.borrow().clone()).unwrap();
    Run {
        result,
        output: text,
        globals: vm.global_scope().clone(),
    }
}

fn run_source(source: &str) -> Run {
    run_source_with(source, "", VmConfig::default())
}

/// Run and return the printed output, failing on a runtime error.
fn output_of(source: &str) -> String {
    let run = run_source(source);
    if let Err(e) = run.result {
        panic!("runtime error: {e}\n{source}");
    }
    run.output
}

// ============================================================
// Expressions and assignment
// ============================================================

#[test]
fn sum_of_two_globals() {
    assert_eq!(output_of("a = 1\nb = 2\nprint(a + b)"), "3\n");
}

#[test]
fn arithmetic_precedence() {
    assert_eq!(output_of("print(2 + 3 * 4, (2 + 3) * 4, 10 - 4 - 3, -2 * 3)"), "14 20 3 -6\n");
}

#[test]
fn division_gives_fractions() {
    assert_eq!(output_of("print(7 / 2)"), "3.5\n");
}

#[test]
fn string_concatenation() {
    assert_eq!(
        output_of("local who = 'world'\nprint(\"hello, \" .. who .. \"!\")"),
        "hello, world!\n"
    );
}

#[test]
fn comparisons_and_logic() {
    assert_eq!(
        output_of("print(1 < 2, 2 <= 1, 'a' ~= 'b', not (1 == 1), true and false, false or true)"),
        "true false true false false true\n"
    );
}

#[test]
fn multiple_assignment_pads_and_drops() {
    let run = run_source("a, b, c = 1, 2\nd = 3, 4");
    assert_eq!(run.result, Ok(()));
    assert_eq!(run.globals.lookup("a"), Some(Value::Number(1.0)));
    assert_eq!(run.globals.lookup("b"), Some(Value::Number(2.0)));
    assert_eq!(run.globals.lookup("c"), Some(Value::Nil));
    assert_eq!(run.globals.lookup("d"), Some(Value::Number(3.0)));
}

#[test]
fn local_at_top_level_is_visible_to_later_statements() {
    assert_eq!(output_of("local x = 5\nlocal y = x * 2\nprint(y)"), "10\n");
}

#[test]
fn assignment_inside_block_updates_outer_local() {
    assert_eq!(output_of("local x = 1\ndo x = 2 end\nprint(x)"), "2\n");
}

#[test]
fn local_inside_block_shadows() {
    assert_eq!(
        output_of("x = 'outer'\ndo local x = 'inner' print(x) end\nprint(x)"),
        "inner\nouter\n"
    );
}

#[test]
fn undeclared_assignment_becomes_global() {
    let run = run_source("do do fresh = true end end");
    assert_eq!(run.result, Ok(()));
    assert_eq!(run.globals.get_local("fresh"), Some(Value::Boolean(true)));
}

#[test]
fn multiple_assignment_swaps() {
    assert_eq!(output_of("a = 1 b = 2\na, b = b, a\nprint(a, b)"), "2 1\n");
    assert_eq!(
        output_of("local a, b, c = 1, 2, 3\na, b, c = c, a, b\nprint(a, b, c)"),
        "3 1 2\n"
    );
}

#[test]
fn argument_is_read_before_later_call_reassigns_it() {
    let source = "
x = 1
function bump()
  x = 5
  return 0
end
print(x, bump())
print(x)
";
    assert_eq!(output_of(source), "1 0\n5\n");
}

#[test]
fn operand_is_read_before_later_call_reassigns_it() {
    let source = "
n = 10
function reset() n = 0 return 1 end
print(n + reset())
";
    assert_eq!(output_of(source), "11\n");
}

// ============================================================
// Control flow
// ============================================================

#[test]
fn if_runs_only_matching_branch() {
    let source = "
        function classify(n)
            if n < 0 then
                print('negative')
            elseif n == 0 then
                print('zero')
            else
                print('positive')
            end
        end
        classify(-5)
        classify(0)
        classify(7)
    ";
    assert_eq!(output_of(source), "negative\nzero\npositive\n");
}

#[test]
fn if_without_else_falls_through() {
    assert_eq!(output_of("if false then print('no') end\nprint('after')"), "after\n");
}

#[test]
fn nil_is_falsy() {
    assert_eq!(
        output_of("if missing then print('yes') else print('no') end"),
        "no\n"
    );
}

#[test]
fn numeric_for_prints_range_and_counter_is_scoped() {
    assert_eq!(
        output_of("for i = 1, 3 do print(i) end\nprint(i)"),
        "1\n2\n3\nnil\n"
    );
}

#[test]
fn numeric_for_with_step() {
    assert_eq!(output_of("for i = 0, 10, 5 do write(i, '') end"), "0 5 10 ");
}

#[test]
fn numeric_for_empty_range() {
    assert_eq!(output_of("for i = 5, 1 do print(i) end\nprint('done')"), "done\n");
}

#[test]
fn nested_for_loops() {
    let source = "
        total = 0
        for i = 1, 3 do
            for j = 1, i do
                total = total + j
            end
        end
        print(total)
    ";
    assert_eq!(output_of(source), "10\n");
}

#[test]
fn while_loop_counts_down() {
    assert_eq!(
        output_of("local n = 3\nwhile n > 0 do\n  write(n)\n  n = n - 1\nend\nprint()"),
        "321\n"
    );
}

#[test]
fn read_loop_echoes_input() {
    let source = "
        local line = read()
        local count = 0
        while line ~= '' do
            count = count + 1
            print(tostring(count) .. ': ' .. line)
            line = read()
        end
    ";
    let run = run_source_with(source, "alpha\nbeta\n\n", VmConfig::default());
    assert_eq!(run.result, Ok(()));
    assert_eq!(run.output, "1: alpha\n2: beta\n");
}

// ============================================================
// Functions
// ============================================================

#[test]
fn function_without_return_yields_nil() {
    assert_eq!(output_of("function f() end\nprint(f())"), "nil\n");
}

#[test]
fn bare_return_yields_nil() {
    assert_eq!(output_of("function f() return end\nprint(f())"), "nil\n");
}

#[test]
fn only_first_return_value_is_kept() {
    assert_eq!(output_of("function two() return 1, 2 end\nprint(two())"), "1\n");
}

#[test]
fn missing_arguments_are_nil_extra_are_dropped() {
    let source = "
        function show(a, b) print(a, b) end
        show(1)
        show(1, 2, 3)
    ";
    assert_eq!(output_of(source), "1 nil\n1 2\n");
}

#[test]
fn parameters_do_not_leak() {
    let run = run_source("function f(p) return p end\nf(1)");
    assert_eq!(run.result, Ok(()));
    assert_eq!(run.globals.get_local("p"), None);
}

#[test]
fn recursive_fibonacci() {
    let source = "
        function fib(n)
            if n < 2 then return n end
            return fib(n - 1) + fib(n - 2)
        end
        print(fib(15))
    ";
    assert_eq!(output_of(source), "610\n");
}

#[test]
fn local_function_recursion() {
    let source = "
        local function fact(n)
            if n <= 1 then return 1 end
            return n * fact(n - 1)
        end
        print(fact(10))
    ";
    assert_eq!(output_of(source), "3628800\n");
}

#[test]
fn functions_are_values() {
    let source = "
        function twice(f, x) return f(f(x)) end
        function inc(n) return n + 1 end
        local g = inc
        print(twice(g, 5))
    ";
    assert_eq!(output_of(source), "7\n");
}

#[test]
fn call_in_condition_and_arguments() {
    let source = "
        function max(a, b)
            if a > b then return a else return b end
        end
        print(max(max(1, 9), max(4, 2)))
    ";
    assert_eq!(output_of(source), "9\n");
}

#[test]
fn tostring_builtin() {
    assert_eq!(output_of("print(tostring(12) .. '!')"), "12!\n");
}

// ============================================================
// Scoping modes
// ============================================================

const COUNTER: &str = "
    function make_counter()
        local count = 0
        function step()
            count = count + 1
            return count
        end
        return step
    end
    local c = make_counter()
    c()
    print(c())
";

const CALLER_LOCAL: &str = "
    function show() print(x) end
    function wrap()
        local x = 'inner'
        show()
    end
    x = 'outer'
    wrap()
";

#[test]
fn closures_keep_their_scope() {
    assert_eq!(output_of(COUNTER), "2\n");
}

#[test]
fn lexical_scoping_ignores_caller_locals() {
    assert_eq!(output_of(CALLER_LOCAL), "outer\n");
}

#[test]
fn dynamic_scoping_sees_caller_locals() {
    let config = VmConfig::default().with_scoping(Scoping::Dynamic);
    let run = run_source_with(CALLER_LOCAL, "", config);
    assert_eq!(run.result, Ok(()));
    assert_eq!(run.output, "inner\n");
}

#[test]
fn dynamic_scoping_breaks_closures() {
    let config = VmConfig::default().with_scoping(Scoping::Dynamic);
    let run = run_source_with(COUNTER, "", config);
    assert!(matches!(
        run.result,
        Err(RuntimeError::InvalidOperation {
            source: OperationError::InvalidOperands { op: "+", .. },
            ..
        })
    ));
}

// ============================================================
// Runtime failures
// ============================================================

#[test]
fn adding_number_and_string_fails() {
    let run = run_source("x = 1 + 'x'");
    assert!(matches!(
        run.result,
        Err(RuntimeError::InvalidOperation {
            source: OperationError::InvalidOperands { op: "+", .. },
            ..
        })
    ));
}

#[test]
fn calling_a_number_fails() {
    let run = run_source("n = 3\nn()");
    assert!(matches!(
        run.result,
        Err(RuntimeError::InvalidOperation {
            source: OperationError::NotCallable(_),
            ..
        })
    ));
}

#[test]
fn output_before_failure_is_kept() {
    let run = run_source("print('before')\nx = nil .. 'x'\nprint('after')");
    assert!(run.result.is_err());
    assert_eq!(run.output, "before\n");
}

#[test]
fn runaway_recursion_hits_call_limit() {
    let config = VmConfig::default().with_max_call_depth(50);
    let run = run_source_with("function f() return f() end\nf()", "", config);
    assert!(matches!(
        run.result,
        Err(RuntimeError::CallDepthExceeded { limit: 50, .. })
    ));
}

// ============================================================
// Compile errors
// ============================================================

#[test]
fn compile_errors_carry_lines() {
    let cases: [(&str, usize); 5] = [
        ("x = 1\ny = = 2", 2),
        ("x = 1\n\nreturn x", 3),
        ("print('a')\nx", 2),
        ("if x then\n  y = 1\n", 3),
        ("a = 1\nb = $", 2),
    ];
    for (source, line) in cases {
        let err = compile(source).unwrap_err();
        assert_eq!(err.line(), line, "{source:?}: {err}");
    }
}

#[test]
fn unsupported_syntax_is_reported() {
    assert_eq!(
        compile("while true do\n  break\nend"),
        Err(CompileError::Unsupported {
            line: 2,
            feature: "break statements"
        })
    );
}

#[test]
fn deeply_nested_expression_is_a_compile_error() {
    let source = format!("x = {}1{}", "(".repeat(50_000), ")".repeat(50_000));
    assert!(matches!(
        compile(&source),
        Err(CompileError::TooDeep { line: 1, .. })
    ));
}

#[test]
fn nesting_within_the_limit_runs() {
    let source = format!("x = {}1{}\nprint(x)", "(".repeat(150), ")".repeat(150));
    assert_eq!(output_of(&source), "1\n");
}

#[test]
fn oversized_argument_list_is_a_compile_error() {
    let args = vec!["1"; 256].join(", ");
    assert!(matches!(
        compile(&format!("print({args})")),
        Err(CompileError::TooMany { line: 1, what: "arguments", limit: 255 })
    ));
}

// ============================================================
// Generated program shape
// ============================================================

#[test]
fn simple_assignment_listing() {
    let program = compile_ok("a = 1 + 2");
    assert_eq!(
        listing(&program).unwrap(),
        "0:\t PUSH 1\n1:\t PUSH 2\n2:\t SUM\n3:\t ASSIGN a\n"
    );
}

#[test]
fn print_call_listing() {
    let program = compile_ok("print(\"hi\")");
    assert_eq!(
        listing(&program).unwrap(),
        "0:\t PUSH \"hi\"\n1:\t PUSH print\n2:\t CALL 1\n3:\t POP\n"
    );
}

#[test]
fn compilation_is_deterministic() {
    let source = "function f(a) if a then return 1 end return 2 end\nfor i = 1, 2 do print(f(i)) end";
    assert_eq!(
        fingerprint(&compile_ok(source)),
        fingerprint(&compile_ok(source))
    );
}

#[test]
fn whitespace_and_comments_do_not_change_output() {
    let compact = compile_ok("x=1 if x>0 then print(x) end");
    let spaced = compile_ok("-- setup\nx = 1\n\nif x > 0 then -- check\n    print(x)\nend\n");
    assert_eq!(fingerprint(&compact), fingerprint(&spaced));
}

// ============================================================
// Properties
// ============================================================

#[derive(Debug, Clone)]
enum Arith {
    Num(u8),
    Add(Box<Arith>, Box<Arith>),
    Sub(Box<Arith>, Box<Arith>),
    Mul(Box<Arith>, Box<Arith>),
    Neg(Box<Arith>),
}

impl Arith {
    fn source(&self) -> String {
        match self {
            Arith::Num(n) => n.to_string(),
            Arith::Add(a, b) => format!("({} + {})", a.source(), b.source()),
            Arith::Sub(a, b) => format!("({} - {})", a.source(), b.source()),
            Arith::Mul(a, b) => format!("({} * {})", a.source(), b.source()),
            Arith::Neg(a) => format!("(-{})", a.source()),
        }
    }

    fn eval(&self) -> f64 {
        match self {
            Arith::Num(n) => f64::from(*n),
            Arith::Add(a, b) => a.eval() + b.eval(),
            Arith::Sub(a, b) => a.eval() - b.eval(),
            Arith::Mul(a, b) => a.eval() * b.eval(),
            Arith::Neg(a) => -a.eval(),
        }
    }
}

fn arith() -> impl Strategy<Value = Arith> {
    any::<u8>().prop_map(Arith::Num).prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Arith::Add(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Arith::Sub(Box::new(a), Box::new(b))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Arith::Mul(Box::new(a), Box::new(b))),
            inner.prop_map(|a| Arith::Neg(Box::new(a))),
        ]
    })
}

proptest! {
    /// Compiled arithmetic computes what the host computes.
    #[test]
    fn arithmetic_matches_host(expr in arith()) {
        let run = run_source(&format!("result = {}", expr.source()));
        prop_assert_eq!(run.result, Ok(()));
        prop_assert_eq!(run.globals.get_local("result"), Some(Value::Number(expr.eval())));
    }
}
