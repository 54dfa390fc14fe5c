use std::cmp::Ordering;

use super::Interpreter;
use crate::value::{ObjRef, Payload, RuntimeError};

fn str_of(vm: &Interpreter, r: ObjRef) -> Option<String> {
    match &vm.heap.get(r).payload {
        Payload::Str(s) => Some(s.clone()),
        _ => None,
    }
}

impl Interpreter {
    pub(super) fn register_string_methods(&mut self, string: ObjRef, symbol: ObjRef) {
        self.add_instance_method(string, "+", |vm, receiver, args| {
            let Some(&other) = args.first() else {
                return Err(vm.arity_error(args.len(), 1));
            };
            let left = str_of(vm, receiver).unwrap_or_default();
            let Some(right) = str_of(vm, other) else {
                return Err(RuntimeError::raised(
                    format!(
                        "no implicit conversion of {} into String",
                        vm.heap.class_name(other)
                    ),
                    vm.call_stack.render(),
                ));
            };
            Ok(vm.alloc_str(left + &right))
        });
        self.add_instance_method(string, "*", |vm, receiver, args| {
            let Some(&other) = args.first() else {
                return Err(vm.arity_error(args.len(), 1));
            };
            let Payload::Fixnum(count) = vm.heap.get(other).payload else {
                return Err(RuntimeError::raised(
                    format!(
                        "no implicit conversion of {} into Integer",
                        vm.heap.class_name(other)
                    ),
                    vm.call_stack.render(),
                ));
            };
            if count < 0 {
                return Err(RuntimeError::raised(
                    "negative argument",
                    vm.call_stack.render(),
                ));
            }
            let base = str_of(vm, receiver).unwrap_or_default();
            Ok(vm.alloc_str(base.repeat(count as usize)))
        });
        self.add_instance_method(string, "==", |vm, receiver, args| {
            let Some(&other) = args.first() else {
                return Ok(vm.false_ref);
            };
            Ok(vm.bool_ref(vm.heap.values_equal(receiver, other)))
        });
        self.add_instance_method(string, "<=>", |vm, receiver, args| {
            let Some(&other) = args.first() else {
                return Ok(vm.nil_ref);
            };
            let left = str_of(vm, receiver).unwrap_or_default();
            let Some(right) = str_of(vm, other) else {
                return Ok(vm.nil_ref);
            };
            let ordering = match left.cmp(&right) {
                Ordering::Less => -1,
                Ordering::Equal => 0,
                Ordering::Greater => 1,
            };
            Ok(vm.alloc_fixnum(ordering))
        });
        for name in ["length", "size"] {
            self.add_instance_method(string, name, |vm, receiver, _args| {
                let length = str_of(vm, receiver).unwrap_or_default().chars().count();
                Ok(vm.alloc_fixnum(length as i64))
            });
        }
        self.add_instance_method(string, "to_s", |_vm, receiver, _args| Ok(receiver));
        self.add_instance_method(string, "upcase", |vm, receiver, _args| {
            let upper = str_of(vm, receiver).unwrap_or_default().to_uppercase();
            Ok(vm.alloc_str(upper))
        });
        self.add_instance_method(string, "downcase", |vm, receiver, _args| {
            let lower = str_of(vm, receiver).unwrap_or_default().to_lowercase();
            Ok(vm.alloc_str(lower))
        });
        self.add_instance_method(string, "empty?", |vm, receiver, _args| {
            let empty = str_of(vm, receiver).unwrap_or_default().is_empty();
            Ok(vm.bool_ref(empty))
        });

        self.add_instance_method(symbol, "to_s", |vm, receiver, _args| {
            let name = match &vm.heap.get(receiver).payload {
                Payload::Symbol(name) => name.clone(),
                _ => String::new(),
            };
            Ok(vm.alloc_str(name))
        });
        self.add_instance_method(symbol, "==", |vm, receiver, args| {
            let Some(&other) = args.first() else {
                return Ok(vm.false_ref);
            };
            Ok(vm.bool_ref(vm.heap.values_equal(receiver, other)))
        });
    }
}
