use std::path::Path;

use akane::{Interpreter, RuntimeErrorKind};

fn new_vm() -> Interpreter {
    Interpreter::new(Path::new("/nonexistent"), "test.ak")
}

#[test]
fn body_value_when_nothing_raises() {
    let mut vm = new_vm();
    let result = vm.run("begin\n  5\nend").expect("run");
    assert_eq!(vm.as_fixnum(result), Some(5));
}

#[test]
fn matching_rescue_yields_the_recovery_value() {
    let mut vm = new_vm();
    let program = "
begin
  raise 'Boom'
rescue Boom
  42
end
";
    let result = vm.run(program).expect("rescued");
    assert_eq!(vm.as_fixnum(result), Some(42));
}

#[test]
fn non_matching_rescue_leaves_the_original_error() {
    let mut vm = new_vm();
    let program = "
begin
  raise 'Boom'
rescue Other
  42
end
";
    let err = vm.run(program).expect_err("unhandled");
    assert_eq!(err.kind, RuntimeErrorKind::Raised);
    assert_eq!(err.display_name(), "Boom");
}

#[test]
fn first_matching_clause_wins() {
    let mut vm = new_vm();
    let program = "
begin
  raise 'Boom'
rescue Other
  1
rescue Boom
  2
rescue Boom
  3
end
";
    let result = vm.run(program).expect("rescued");
    assert_eq!(vm.as_fixnum(result), Some(2));
}

#[test]
fn clause_class_names_are_tried_in_order() {
    let mut vm = new_vm();
    let program = "
begin
  raise 'Boom'
rescue Other, Boom
  9
end
";
    let result = vm.run(program).expect("rescued");
    assert_eq!(vm.as_fixnum(result), Some(9));
}

#[test]
fn runtime_errors_are_rescuable_by_kind_name() {
    let mut vm = new_vm();
    let program = "
begin
  qux
rescue NameError
  7
end
";
    let result = vm.run(program).expect("rescued");
    assert_eq!(vm.as_fixnum(result), Some(7));

    let program = "
begin
  3.frobnicate
rescue NoMethodError
  8
end
";
    let result = vm.run(program).expect("rescued");
    assert_eq!(vm.as_fixnum(result), Some(8));
}

// Documented quirk: when a recovery body raises, the remaining clauses keep
// matching against the error that entered the construct, and the failed
// handler's error is what propagates if nothing else matches. See DESIGN.md
// before relying on it.
#[test]
fn failed_recovery_keeps_matching_the_original_error() {
    let mut vm = new_vm();
    let program = "
begin
  raise 'Boom'
rescue Boom
  raise 'Inner'
rescue Boom
  99
end
";
    let result = vm.run(program).expect("second clause handles the original");
    assert_eq!(vm.as_fixnum(result), Some(99));
}

#[test]
fn failed_recovery_error_propagates_when_nothing_else_matches() {
    let mut vm = new_vm();
    let program = "
begin
  raise 'Boom'
rescue Boom
  raise 'Inner'
end
";
    let err = vm.run(program).expect_err("inner error propagates");
    assert_eq!(err.display_name(), "Inner");
}

#[test]
fn errors_abort_the_enclosing_statement_sequence() {
    let mut vm = new_vm();
    let program = "
flag = 1
begin
  raise 'Boom'
  flag = 2
rescue Boom
  flag
end
";
    let result = vm.run(program).expect("rescued");
    // The statement after the raise never ran.
    assert_eq!(vm.as_fixnum(result), Some(1));
}

#[test]
fn raise_without_arguments_has_a_default_message() {
    let mut vm = new_vm();
    let err = vm.run("raise()").expect_err("raise");
    assert_eq!(err.message, "unhandled exception");
}

#[test]
fn raised_errors_carry_the_call_stack() {
    let mut vm = new_vm();
    let err = vm.run("raise 'bang'").expect_err("raise");
    assert!(err.backtrace.contains("main (test.ak)"), "backtrace: {}", err.backtrace);
}
