use super::Interpreter;
use crate::value::{ObjRef, Payload, RuntimeError};

impl Interpreter {
    pub(super) fn register_collection_methods(&mut self, array: ObjRef, hash: ObjRef) {
        for name in ["<<", "push"] {
            self.add_instance_method(array, name, |vm, receiver, args| {
                let Some(&arg) = args.first() else {
                    return Err(vm.arity_error(args.len(), 1));
                };
                match &mut vm.heap.get_mut(receiver).payload {
                    Payload::Array(items) => items.push(arg),
                    other => panic!("Array method on a non-array receiver: {:?}", other),
                }
                Ok(receiver)
            });
        }
        for name in ["size", "length"] {
            self.add_instance_method(array, name, |vm, receiver, _args| {
                let len = match &vm.heap.get(receiver).payload {
                    Payload::Array(items) => items.len() as i64,
                    other => panic!("Array method on a non-array receiver: {:?}", other),
                };
                Ok(vm.alloc_fixnum(len))
            });
        }
        self.add_instance_method(array, "first", |vm, receiver, _args| {
            match &vm.heap.get(receiver).payload {
                Payload::Array(items) => Ok(items.first().copied().unwrap_or(vm.nil_ref)),
                other => panic!("Array method on a non-array receiver: {:?}", other),
            }
        });
        self.add_instance_method(array, "last", |vm, receiver, _args| {
            match &vm.heap.get(receiver).payload {
                Payload::Array(items) => Ok(items.last().copied().unwrap_or(vm.nil_ref)),
                other => panic!("Array method on a non-array receiver: {:?}", other),
            }
        });
        self.add_instance_method(array, "[]", |vm, receiver, args| {
            let Some(&index_ref) = args.first() else {
                return Err(vm.arity_error(args.len(), 1));
            };
            let Payload::Fixnum(index) = vm.heap.get(index_ref).payload else {
                return Err(RuntimeError::raised(
                    format!(
                        "no implicit conversion of {} into Integer",
                        vm.heap.class_name(index_ref)
                    ),
                    vm.call_stack.render(),
                ));
            };
            match &vm.heap.get(receiver).payload {
                Payload::Array(items) => {
                    let len = items.len() as i64;
                    let actual = if index < 0 { index + len } else { index };
                    if actual < 0 || actual >= len {
                        Ok(vm.nil_ref)
                    } else {
                        Ok(items[actual as usize])
                    }
                }
                other => panic!("Array method on a non-array receiver: {:?}", other),
            }
        });
        self.add_instance_method(array, "[]=", |vm, receiver, args| {
            if args.len() < 2 {
                return Err(vm.arity_error(args.len(), 2));
            }
            let (index_ref, value) = (args[0], args[1]);
            let Payload::Fixnum(index) = vm.heap.get(index_ref).payload else {
                return Err(RuntimeError::raised(
                    format!(
                        "no implicit conversion of {} into Integer",
                        vm.heap.class_name(index_ref)
                    ),
                    vm.call_stack.render(),
                ));
            };
            let len = match &vm.heap.get(receiver).payload {
                Payload::Array(items) => items.len() as i64,
                other => panic!("Array method on a non-array receiver: {:?}", other),
            };
            let actual = if index < 0 { index + len } else { index };
            if actual < 0 {
                return Err(RuntimeError::raised(
                    format!("index {} too small for array; minimum: -{}", index, len),
                    vm.call_stack.render(),
                ));
            }
            let nil = vm.nil_ref;
            match &mut vm.heap.get_mut(receiver).payload {
                Payload::Array(items) => {
                    while (items.len() as i64) <= actual {
                        items.push(nil);
                    }
                    items[actual as usize] = value;
                }
                other => panic!("Array method on a non-array receiver: {:?}", other),
            }
            Ok(value)
        });
        self.add_instance_method(array, "==", |vm, receiver, args| {
            let Some(&other) = args.first() else {
                return Ok(vm.false_ref);
            };
            Ok(vm.bool_ref(vm.heap.values_equal(receiver, other)))
        });
        self.add_instance_method(array, "to_s", |vm, receiver, _args| {
            let rendered = vm.heap.display(receiver);
            Ok(vm.alloc_str(rendered))
        });

        self.add_instance_method(hash, "[]", |vm, receiver, args| {
            let Some(&key) = args.first() else {
                return Err(vm.arity_error(args.len(), 1));
            };
            match &vm.heap.get(receiver).payload {
                Payload::Hash(pairs) => {
                    for &(existing, value) in pairs {
                        if vm.heap.values_equal(existing, key) {
                            return Ok(value);
                        }
                    }
                    Ok(vm.nil_ref)
                }
                other => panic!("Hash method on a non-hash receiver: {:?}", other),
            }
        });
        self.add_instance_method(hash, "[]=", |vm, receiver, args| {
            if args.len() < 2 {
                return Err(vm.arity_error(args.len(), 2));
            }
            let (key, value) = (args[0], args[1]);
            let position = match &vm.heap.get(receiver).payload {
                Payload::Hash(pairs) => pairs
                    .iter()
                    .position(|&(existing, _)| vm.heap.values_equal(existing, key)),
                other => panic!("Hash method on a non-hash receiver: {:?}", other),
            };
            match &mut vm.heap.get_mut(receiver).payload {
                Payload::Hash(pairs) => match position {
                    Some(index) => pairs[index].1 = value,
                    None => pairs.push((key, value)),
                },
                _ => unreachable!("checked above"),
            }
            Ok(value)
        });
        self.add_instance_method(hash, "size", |vm, receiver, _args| {
            let len = match &vm.heap.get(receiver).payload {
                Payload::Hash(pairs) => pairs.len() as i64,
                other => panic!("Hash method on a non-hash receiver: {:?}", other),
            };
            Ok(vm.alloc_fixnum(len))
        });
        self.add_instance_method(hash, "keys", |vm, receiver, _args| {
            let keys: Vec<ObjRef> = match &vm.heap.get(receiver).payload {
                Payload::Hash(pairs) => pairs.iter().map(|&(key, _)| key).collect(),
                other => panic!("Hash method on a non-hash receiver: {:?}", other),
            };
            Ok(vm.alloc_array(keys))
        });
        self.add_instance_method(hash, "==", |vm, receiver, args| {
            let Some(&other) = args.first() else {
                return Ok(vm.false_ref);
            };
            Ok(vm.bool_ref(vm.heap.values_equal(receiver, other)))
        });
        self.add_instance_method(hash, "to_s", |vm, receiver, _args| {
            let rendered = vm.heap.display(receiver);
            Ok(vm.alloc_str(rendered))
        });
    }
}
