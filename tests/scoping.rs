use std::path::Path;

use akane::Interpreter;

fn new_vm() -> Interpreter {
    Interpreter::new(Path::new("/nonexistent"), "test.ak")
}

#[test]
fn method_arguments_bind_in_a_fresh_scope() {
    let mut vm = new_vm();
    let program = "
def echo(a)
  a
end
echo(42)
";
    let result = vm.run(program).expect("run");
    assert_eq!(vm.as_fixnum(result), Some(42));
}

#[test]
fn caller_locals_are_invisible_in_the_callee() {
    let mut vm = new_vm();
    let program = "
def inner()
  a
end
def outer(a)
  inner()
end
outer(1)
";
    let err = vm.run(program).expect_err("callee must not see caller locals");
    assert_eq!(err.display_name(), "NameError");
    assert!(err.message.contains("'a'"));
}

#[test]
fn default_parameter_used_when_argument_missing() {
    let mut vm = new_vm();
    let program = "
def answer(n = 7)
  n
end
answer()
";
    let result = vm.run(program).expect("run");
    assert_eq!(vm.as_fixnum(result), Some(7));
}

#[test]
fn provided_argument_overrides_the_default() {
    let mut vm = new_vm();
    let program = "
def answer(n = 7)
  n
end
answer(3)
";
    let result = vm.run(program).expect("run");
    assert_eq!(vm.as_fixnum(result), Some(3));
}

#[test]
fn bare_name_assignment_binds_the_object_space() {
    // Bare-name assignment writes the object space, not the local scope, so
    // the binding survives across runs of the same interpreter.
    let mut vm = new_vm();
    vm.run("x = 5").expect("assign");
    let result = vm.run("x").expect("read back");
    assert_eq!(vm.as_fixnum(result), Some(5));
}

#[test]
fn stacks_are_balanced_after_a_successful_run() {
    let mut vm = new_vm();
    let call_depth = vm.call_stack_depth();
    let scope_depth = vm.local_scope_depth();
    vm.run("def f(a)\n  a\nend\nf(1)").expect("run");
    assert_eq!(vm.call_stack_depth(), call_depth);
    assert_eq!(vm.local_scope_depth(), scope_depth);
}

#[test]
fn stacks_are_balanced_after_an_erroring_run() {
    let mut vm = new_vm();
    let call_depth = vm.call_stack_depth();
    let scope_depth = vm.local_scope_depth();
    let program = "
def boom()
  raise 'bang'
end
def wrapper()
  boom()
end
wrapper()
";
    vm.run(program).expect_err("run should raise");
    assert_eq!(vm.call_stack_depth(), call_depth);
    assert_eq!(vm.local_scope_depth(), scope_depth);
}

#[test]
fn stacks_are_balanced_after_a_rescued_error() {
    let mut vm = new_vm();
    let program = "
def boom()
  raise 'Boom'
end
begin
  boom()
rescue Boom
  1
end
";
    vm.run(program).expect("rescued");
    assert_eq!(vm.call_stack_depth(), 0);
    assert_eq!(vm.local_scope_depth(), 0);
}

#[test]
fn error_backtrace_names_the_failing_frames() {
    let mut vm = new_vm();
    let program = "
def boom()
  raise 'bang'
end
def wrapper()
  boom()
end
wrapper()
";
    let err = vm.run(program).expect_err("run should raise");
    assert!(err.backtrace.contains("boom"), "backtrace: {}", err.backtrace);
    assert!(err.backtrace.contains("wrapper"), "backtrace: {}", err.backtrace);
    assert!(err.backtrace.contains("main"), "backtrace: {}", err.backtrace);
    // Most recent frame first.
    let boom_at = err.backtrace.find("boom").unwrap();
    let wrapper_at = err.backtrace.find("wrapper").unwrap();
    assert!(boom_at < wrapper_at);
}
