use std::fs;
use std::path::Path;

use super::Interpreter;
use crate::value::{ObjRef, Payload, RuntimeError};

impl Interpreter {
    pub(super) fn register_io_methods(&mut self, io: ObjRef, file: ObjRef) {
        // Class-level writers on IO, shared with File through its superclass.
        self.add_own_method(io, "puts", |vm, _receiver, args| {
            if args.is_empty() {
                vm.output.push('\n');
            }
            for &arg in args {
                let rendered = vm.heap.display(arg);
                vm.output.push_str(&rendered);
                vm.output.push('\n');
            }
            Ok(vm.nil_ref)
        });
        self.add_own_method(io, "print", |vm, _receiver, args| {
            for &arg in args {
                let rendered = vm.heap.display(arg);
                vm.output.push_str(&rendered);
            }
            Ok(vm.nil_ref)
        });
        self.add_own_method(io, "write", |vm, _receiver, args| {
            let mut written = 0i64;
            for &arg in args {
                let rendered = vm.heap.display(arg);
                written += rendered.len() as i64;
                vm.output.push_str(&rendered);
            }
            Ok(vm.alloc_fixnum(written))
        });

        self.add_own_method(file, "exist?", |vm, _receiver, args| {
            let Some(&arg) = args.first() else {
                return Err(vm.arity_error(args.len(), 1));
            };
            let Payload::Str(path) = &vm.heap.get(arg).payload else {
                return Ok(vm.false_ref);
            };
            let exists = Path::new(path).exists();
            Ok(vm.bool_ref(exists))
        });
        self.add_own_method(file, "read", |vm, _receiver, args| {
            let Some(&arg) = args.first() else {
                return Err(vm.arity_error(args.len(), 1));
            };
            let Payload::Str(path) = &vm.heap.get(arg).payload else {
                panic!("File.read expects a String argument");
            };
            let path = path.clone();
            match fs::read_to_string(&path) {
                Ok(contents) => Ok(vm.alloc_str(contents)),
                Err(err) => Err(RuntimeError::raised(
                    format!("{} -- {}", err, path),
                    vm.call_stack.render(),
                )),
            }
        });
    }
}
