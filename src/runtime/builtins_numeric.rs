use std::cmp::Ordering;

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

use super::Interpreter;
use crate::value::{ObjRef, Payload, RuntimeError};

/// A numeric payload lifted out of the heap. Arithmetic promotes silently:
/// i64 operations that overflow retry as big integers, and any float operand
/// makes the whole operation a float operation.
enum Num {
    Int(i64),
    Big(BigInt),
    Float(f64),
}

fn num_of(vm: &Interpreter, r: ObjRef) -> Option<Num> {
    match &vm.heap.get(r).payload {
        Payload::Fixnum(n) => Some(Num::Int(*n)),
        Payload::Bignum(n) => Some(Num::Big(n.clone())),
        Payload::Float(f) => Some(Num::Float(*f)),
        _ => None,
    }
}

fn num_to_f64(n: &Num) -> f64 {
    match n {
        Num::Int(v) => *v as f64,
        Num::Big(v) => v.to_f64().unwrap_or(f64::NAN),
        Num::Float(v) => *v,
    }
}

fn num_to_big(n: &Num) -> BigInt {
    match n {
        Num::Int(v) => BigInt::from(*v),
        Num::Big(v) => v.clone(),
        Num::Float(v) => BigInt::from(*v as i64),
    }
}

fn zero_division(vm: &Interpreter) -> RuntimeError {
    RuntimeError::raised("divided by 0", vm.call_stack.render())
}

impl Interpreter {
    pub(super) fn register_numeric_methods(&mut self, fixnum: ObjRef, float: ObjRef) {
        for class in [fixnum, float] {
            self.add_instance_method(class, "+", |vm, receiver, args| {
                numeric_binop(vm, receiver, args, "+")
            });
            self.add_instance_method(class, "-", |vm, receiver, args| {
                numeric_binop(vm, receiver, args, "-")
            });
            self.add_instance_method(class, "*", |vm, receiver, args| {
                numeric_binop(vm, receiver, args, "*")
            });
            self.add_instance_method(class, "/", |vm, receiver, args| {
                numeric_binop(vm, receiver, args, "/")
            });
            self.add_instance_method(class, "%", |vm, receiver, args| {
                numeric_binop(vm, receiver, args, "%")
            });
            self.add_instance_method(class, "<=>", |vm, receiver, args| {
                numeric_spaceship(vm, receiver, args)
            });
            self.add_instance_method(class, "==", |vm, receiver, args| {
                let Some(&other) = args.first() else {
                    return Ok(vm.false_ref);
                };
                Ok(vm.bool_ref(vm.heap.values_equal(receiver, other)))
            });
            self.add_instance_method(class, "zero?", |vm, receiver, _args| {
                let result = match &vm.heap.get(receiver).payload {
                    Payload::Fixnum(n) => *n == 0,
                    Payload::Bignum(n) => n.is_zero(),
                    Payload::Float(f) => *f == 0.0,
                    _ => false,
                };
                Ok(vm.bool_ref(result))
            });
        }
    }
}

fn numeric_binop(
    vm: &mut Interpreter,
    receiver: ObjRef,
    args: &[ObjRef],
    op: &str,
) -> Result<ObjRef, RuntimeError> {
    let Some(&other) = args.first() else {
        return Err(vm.arity_error(args.len(), 1));
    };
    let (Some(a), Some(b)) = (num_of(vm, receiver), num_of(vm, other)) else {
        return Err(RuntimeError::raised(
            format!(
                "{} can't be coerced into {}",
                vm.heap.class_name(other),
                vm.heap.class_name(receiver)
            ),
            vm.call_stack.render(),
        ));
    };

    if matches!(a, Num::Float(_)) || matches!(b, Num::Float(_)) {
        let x = num_to_f64(&a);
        let y = num_to_f64(&b);
        let value = match op {
            "+" => x + y,
            "-" => x - y,
            "*" => x * y,
            "/" => x / y,
            "%" => x % y,
            _ => unreachable!("unknown numeric operator {}", op),
        };
        return Ok(vm.alloc_float(value));
    }

    if let (Num::Int(x), Num::Int(y)) = (&a, &b) {
        let (x, y) = (*x, *y);
        let fast = match op {
            "+" => x.checked_add(y),
            "-" => x.checked_sub(y),
            "*" => x.checked_mul(y),
            "/" => {
                if y == 0 {
                    return Err(zero_division(vm));
                }
                x.checked_div(y)
            }
            "%" => {
                if y == 0 {
                    return Err(zero_division(vm));
                }
                x.checked_rem(y)
            }
            _ => unreachable!("unknown numeric operator {}", op),
        };
        if let Some(value) = fast {
            return Ok(vm.alloc_fixnum(value));
        }
        // Overflow falls through to the big-integer path.
    }

    let x = num_to_big(&a);
    let y = num_to_big(&b);
    let value = match op {
        "+" => x + y,
        "-" => x - y,
        "*" => x * y,
        "/" => {
            if y.is_zero() {
                return Err(zero_division(vm));
            }
            x / y
        }
        "%" => {
            if y.is_zero() {
                return Err(zero_division(vm));
            }
            x % y
        }
        _ => unreachable!("unknown numeric operator {}", op),
    };
    Ok(vm.alloc_bignum(value))
}

fn numeric_spaceship(
    vm: &mut Interpreter,
    receiver: ObjRef,
    args: &[ObjRef],
) -> Result<ObjRef, RuntimeError> {
    let Some(&other) = args.first() else {
        return Ok(vm.nil_ref);
    };
    let (Some(a), Some(b)) = (num_of(vm, receiver), num_of(vm, other)) else {
        return Ok(vm.nil_ref);
    };
    let ordering = if matches!(a, Num::Float(_)) || matches!(b, Num::Float(_)) {
        num_to_f64(&a).partial_cmp(&num_to_f64(&b))
    } else {
        Some(num_to_big(&a).cmp(&num_to_big(&b)))
    };
    match ordering {
        Some(Ordering::Less) => Ok(vm.alloc_fixnum(-1)),
        Some(Ordering::Equal) => Ok(vm.alloc_fixnum(0)),
        Some(Ordering::Greater) => Ok(vm.alloc_fixnum(1)),
        None => Ok(vm.nil_ref),
    }
}
