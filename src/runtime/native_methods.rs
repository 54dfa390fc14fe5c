use super::Interpreter;
use crate::value::{ObjRef, Payload, RuntimeError};

impl Interpreter {
    /// Behavior shared by every value: Object's instance methods, the
    /// methods all class/module values inherit through the Module class,
    /// Kernel's mixed-in surface, Comparable, and the Process module.
    pub(super) fn register_core_methods(
        &mut self,
        object: ObjRef,
        module_class: ObjRef,
        kernel: ObjRef,
        comparable: ObjRef,
        process: ObjRef,
    ) {
        self.add_instance_method(object, "==", |vm, receiver, args| {
            let Some(&other) = args.first() else {
                return Ok(vm.false_ref);
            };
            Ok(vm.bool_ref(vm.heap.values_equal(receiver, other)))
        });
        self.add_instance_method(object, "to_s", |vm, receiver, _args| {
            let rendered = vm.heap.display(receiver);
            Ok(vm.alloc_str(rendered))
        });

        // Class and module values reach these through their class chain
        // (Class's superclass is Module).
        self.add_instance_method(module_class, "name", |vm, receiver, _args| {
            let name = vm.heap.type_name(receiver);
            Ok(vm.alloc_str(name))
        });
        self.add_instance_method(module_class, "to_s", |vm, receiver, _args| {
            let name = vm.heap.type_name(receiver);
            Ok(vm.alloc_str(name))
        });
        self.add_instance_method(module_class, "include", |vm, receiver, args| {
            for &arg in args {
                if vm.heap.get(arg).module_data().is_none() {
                    return Err(RuntimeError::raised(
                        format!(
                            "wrong argument type {} (expected Module)",
                            vm.heap.class_name(arg)
                        ),
                        vm.call_stack.render(),
                    ));
                }
                match &mut vm.heap.get_mut(receiver).payload {
                    Payload::Class(data) => data.includes.push(arg),
                    Payload::Module(data) => data.includes.push(arg),
                    other => panic!("include on a non-class, non-module receiver: {:?}", other),
                }
            }
            Ok(receiver)
        });

        // Kernel: public introspection plus the private top-level helpers.
        self.add_module_method(kernel, "inspect", false, |vm, receiver, _args| {
            let rendered = vm.heap.inspect(receiver);
            Ok(vm.alloc_str(rendered))
        });
        self.add_module_method(kernel, "class", false, |vm, receiver, _args| {
            Ok(vm.class_of(receiver))
        });
        self.add_module_method(kernel, "respond_to?", false, |vm, receiver, args| {
            let Some(&arg) = args.first() else {
                return Ok(vm.false_ref);
            };
            let name = match &vm.heap.get(arg).payload {
                Payload::Symbol(s) | Payload::Str(s) => s.clone(),
                _ => return Ok(vm.false_ref),
            };
            Ok(vm.bool_ref(vm.resolve_public(receiver, &name).is_some()))
        });

        self.add_module_method(kernel, "puts", true, |vm, _receiver, args| {
            kernel_puts(vm, args);
            Ok(vm.nil_ref)
        });
        self.add_module_method(kernel, "print", true, |vm, _receiver, args| {
            for &arg in args {
                let rendered = vm.heap.display(arg);
                vm.output.push_str(&rendered);
            }
            Ok(vm.nil_ref)
        });
        self.add_module_method(kernel, "p", true, |vm, _receiver, args| {
            for &arg in args {
                let rendered = vm.heap.inspect(arg);
                vm.output.push_str(&rendered);
                vm.output.push('\n');
            }
            Ok(args.last().copied().unwrap_or(vm.nil_ref))
        });
        self.add_module_method(kernel, "raise", true, |vm, _receiver, args| {
            let message = match args.first() {
                Some(&arg) => vm.heap.display(arg),
                None => "unhandled exception".to_string(),
            };
            Err(RuntimeError::raised(message, vm.call_stack.render()))
        });

        // Comparable's operators all re-dispatch to the receiver's `<=>`.
        self.add_module_method(comparable, "<", false, |vm, receiver, args| {
            let ordering = comparable_ordering(vm, receiver, args)?;
            Ok(vm.bool_ref(ordering < 0))
        });
        self.add_module_method(comparable, "<=", false, |vm, receiver, args| {
            let ordering = comparable_ordering(vm, receiver, args)?;
            Ok(vm.bool_ref(ordering <= 0))
        });
        self.add_module_method(comparable, ">", false, |vm, receiver, args| {
            let ordering = comparable_ordering(vm, receiver, args)?;
            Ok(vm.bool_ref(ordering > 0))
        });
        self.add_module_method(comparable, ">=", false, |vm, receiver, args| {
            let ordering = comparable_ordering(vm, receiver, args)?;
            Ok(vm.bool_ref(ordering >= 0))
        });
        self.add_module_method(comparable, "between?", false, |vm, receiver, args| {
            if args.len() < 2 {
                return Err(RuntimeError::raised(
                    format!("wrong number of arguments (given {}, expected 2)", args.len()),
                    vm.call_stack.render(),
                ));
            }
            let low = comparable_ordering(vm, receiver, &args[..1])?;
            let high = comparable_ordering(vm, receiver, &args[1..2])?;
            Ok(vm.bool_ref(low >= 0 && high <= 0))
        });

        self.add_own_method(process, "pid", |vm, _receiver, _args| {
            let pid = std::process::id() as i64;
            Ok(vm.alloc_fixnum(pid))
        });
    }
}

fn kernel_puts(vm: &mut Interpreter, args: &[ObjRef]) {
    if args.is_empty() {
        vm.output.push('\n');
        return;
    }
    for &arg in args {
        // Arrays print one element per line, matching puts convention.
        let lines: Vec<String> = match &vm.heap.get(arg).payload {
            Payload::Array(items) => items.iter().map(|&item| vm.heap.display(item)).collect(),
            _ => vec![vm.heap.display(arg)],
        };
        for line in lines {
            vm.output.push_str(&line);
            vm.output.push('\n');
        }
    }
}

fn comparable_ordering(
    vm: &mut Interpreter,
    receiver: ObjRef,
    args: &[ObjRef],
) -> Result<i64, RuntimeError> {
    let Some(&other) = args.first() else {
        return Err(RuntimeError::raised(
            "wrong number of arguments (given 0, expected 1)",
            vm.call_stack.render(),
        ));
    };
    let result = vm.send(receiver, "<=>", &[other])?;
    match &vm.heap.get(result).payload {
        Payload::Fixnum(n) => Ok(*n),
        _ => Err(RuntimeError::raised(
            format!(
                "comparison of {} with {} failed",
                vm.heap.class_name(receiver),
                vm.heap.class_name(other)
            ),
            vm.call_stack.render(),
        )),
    }
}
