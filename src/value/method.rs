use std::fmt;
use std::rc::Rc;

use crate::ast::{MethodParam, Node};
use crate::runtime::Interpreter;
use crate::value::{ObjRef, RuntimeError};

/// Host function implementing a native method. Receives the interpreter, the
/// receiver, and the already-evaluated argument list.
pub type NativeFn = Rc<dyn Fn(&mut Interpreter, ObjRef, &[ObjRef]) -> Result<ObjRef, RuntimeError>>;

#[derive(Clone)]
pub struct NativeMethod {
    pub name: String,
    pub func: NativeFn,
}

impl NativeMethod {
    pub fn new<F>(name: &str, func: F) -> Self
    where
        F: Fn(&mut Interpreter, ObjRef, &[ObjRef]) -> Result<ObjRef, RuntimeError> + 'static,
    {
        Self {
            name: name.to_string(),
            func: Rc::new(func),
        }
    }
}

impl fmt::Debug for NativeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeMethod({})", self.name)
    }
}

/// A method declared in the interpreted language. Each invocation binds its
/// parameters into a fresh scope; there is no capture of the caller's locals.
#[derive(Debug, Clone)]
pub struct UserMethod {
    pub name: String,
    pub params: Vec<MethodParam>,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone)]
pub enum Method {
    Native(NativeMethod),
    User(Rc<UserMethod>),
}

impl Method {
    pub fn name(&self) -> &str {
        match self {
            Method::Native(native) => &native.name,
            Method::User(user) => &user.name,
        }
    }
}
