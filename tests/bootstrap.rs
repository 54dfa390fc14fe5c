use std::path::Path;

use akane::Interpreter;

fn new_vm() -> Interpreter {
    Interpreter::new(Path::new("/nonexistent"), "test.ak")
}

#[test]
fn class_is_an_instance_of_itself() {
    let vm = new_vm();
    let class = vm.class_named("Class").expect("Class registered");
    assert_eq!(vm.class_of(class), class);
}

#[test]
fn module_class_is_an_instance_of_class() {
    let vm = new_vm();
    let class = vm.class_named("Class").expect("Class registered");
    let module = vm.class_named("Module").expect("Module registered");
    assert_eq!(vm.class_of(module), class);
}

#[test]
fn object_and_basic_object_are_instances_of_class() {
    let vm = new_vm();
    let class = vm.class_named("Class").expect("Class registered");
    for name in ["Object", "BasicObject"] {
        let c = vm.class_named(name).expect("registered");
        assert_eq!(vm.class_of(c), class, "{} should be an instance of Class", name);
    }
}

#[test]
fn superclass_chain_is_class_module_object_basic_object() {
    let vm = new_vm();
    let class = vm.class_named("Class").unwrap();
    let module = vm.class_named("Module").unwrap();
    let object = vm.class_named("Object").unwrap();
    let basic_object = vm.class_named("BasicObject").unwrap();
    assert_eq!(vm.superclass_of(class), Some(module));
    assert_eq!(vm.superclass_of(module), Some(object));
    assert_eq!(vm.superclass_of(object), Some(basic_object));
    assert_eq!(vm.superclass_of(basic_object), None);
}

#[test]
fn kernel_method_callable_on_a_bare_module() {
    // Kernel is included into the Module class, so module values respond to
    // Kernel's public methods; this proves the inclusion wiring.
    let mut vm = new_vm();
    let result = vm.run("Comparable.inspect").expect("inspect on a module");
    assert_eq!(vm.as_str(result), Some("Comparable"));
}

#[test]
fn kernel_method_callable_on_a_class_value() {
    let mut vm = new_vm();
    let result = vm.run("String.inspect").expect("inspect on a class");
    assert_eq!(vm.as_str(result), Some("String"));
}

#[test]
fn module_values_are_instances_of_the_module_class() {
    let vm = new_vm();
    let module_class = vm.class_named("Module").unwrap();
    for name in ["Kernel", "Comparable", "Process"] {
        let module = vm.module_named(name).expect("registered");
        assert_eq!(vm.class_of(module), module_class);
    }
}

#[test]
fn builtin_classes_are_registered() {
    let vm = new_vm();
    for name in [
        "BasicObject",
        "Object",
        "Class",
        "Module",
        "IO",
        "Array",
        "Hash",
        "True",
        "File",
        "False",
        "Nil",
        "String",
        "Fixnum",
        "Float",
        "Symbol",
    ] {
        assert!(vm.class_named(name).is_some(), "missing class {}", name);
    }
}

#[test]
fn top_level_environment_is_seeded() {
    let vm = new_vm();
    assert!(vm.get("main").is_some());
    assert!(vm.get("ARGV").is_some());
    assert!(vm.get("nil").is_some());
    assert!(vm.get("LOAD_PATH").is_some());
    assert_eq!(vm.get("LOAD_PATH"), vm.get(":"));
}

#[test]
fn boolean_and_nil_factories_return_the_singletons() {
    let mut vm = new_vm();
    let a = vm.run("True.new").expect("True.new");
    let b = vm.run("true").expect("true literal");
    assert_eq!(a, b);
    let n1 = vm.run("Nil.new").expect("Nil.new");
    let n2 = vm.run("nil").expect("nil");
    assert_eq!(n1, n2);
}

#[test]
fn process_module_reports_a_pid() {
    let mut vm = new_vm();
    let result = vm.run("Process.pid").expect("Process.pid");
    let pid = vm.as_fixnum(result).expect("fixnum pid");
    assert!(pid > 0);
}

#[test]
fn class_and_module_values_know_their_names() {
    let mut vm = new_vm();
    let result = vm.run("String.name").expect("String.name");
    assert_eq!(vm.as_str(result), Some("String"));
    let result = vm.run("Kernel.name").expect("Kernel.name");
    assert_eq!(vm.as_str(result), Some("Kernel"));
}
