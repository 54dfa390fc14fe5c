use std::collections::HashMap;
use std::path::Path;

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::value::{
    ClassData, Heap, Method, ModuleData, NativeMethod, Obj, ObjRef, Payload, RuntimeError,
};

mod builtins_collection;
mod builtins_io;
mod builtins_numeric;
mod builtins_string;
mod calls;
mod eval;
mod native_methods;
mod registration;
mod resolution;
mod run;
mod stack;

use stack::{CallStack, Frame, LocalVariableStack};

/// One complete runtime: the object heap, every registry, and both execution
/// stacks. Nothing is process-global, so independent interpreters coexist and
/// can be tested in isolation.
pub struct Interpreter {
    pub(crate) filename: String,
    pub(crate) heap: Heap,
    pub(crate) object_space: HashMap<String, ObjRef>,
    pub(crate) globals: HashMap<String, ObjRef>,
    symbols: HashMap<String, ObjRef>,
    pub(crate) classes: HashMap<String, ObjRef>,
    pub(crate) modules: HashMap<String, ObjRef>,
    pub(crate) call_stack: CallStack,
    pub(crate) locals: LocalVariableStack,
    pub(crate) output: String,
    parse_trace: Vec<String>,
    pub(crate) nil_ref: ObjRef,
    pub(crate) true_ref: ObjRef,
    pub(crate) false_ref: ObjRef,
    pub(crate) main_ref: ObjRef,
    pub(crate) kernel_ref: ObjRef,
}

impl Interpreter {
    /// Build a runtime with the bootstrapped type graph. `home` is the
    /// directory whose `lib` subdirectory seeds the load path; `filename`
    /// names the script for call-stack attribution.
    pub fn new(home: &Path, filename: &str) -> Self {
        let mut vm = Interpreter {
            filename: filename.to_string(),
            heap: Heap::new(),
            object_space: HashMap::new(),
            globals: HashMap::new(),
            symbols: HashMap::new(),
            classes: HashMap::new(),
            modules: HashMap::new(),
            call_stack: CallStack::new(),
            locals: LocalVariableStack::new(),
            output: String::new(),
            parse_trace: Vec::new(),
            nil_ref: ObjRef::default(),
            true_ref: ObjRef::default(),
            false_ref: ObjRef::default(),
            main_ref: ObjRef::default(),
            kernel_ref: ObjRef::default(),
        };
        vm.bootstrap(home);
        vm
    }

    // ---- name-keyed lookup -------------------------------------------------

    /// Bare-name style lookup across the registries, in resolution order.
    pub fn get(&self, key: &str) -> Option<ObjRef> {
        self.object_space
            .get(key)
            .or_else(|| self.globals.get(key))
            .or_else(|| self.classes.get(key))
            .or_else(|| self.modules.get(key))
            .copied()
    }

    /// Bind a top-level name in the object space.
    pub fn set(&mut self, key: &str, value: ObjRef) {
        self.object_space.insert(key.to_string(), value);
    }

    pub fn class_named(&self, name: &str) -> Option<ObjRef> {
        self.classes.get(name).copied()
    }

    pub fn module_named(&self, name: &str) -> Option<ObjRef> {
        self.modules.get(name).copied()
    }

    pub(crate) fn must_class(&self, name: &str) -> ObjRef {
        match self.classes.get(name) {
            Some(&class) => class,
            None => panic!("class '{}' requested, but does not exist", name),
        }
    }

    // ---- value introspection ----------------------------------------------

    pub fn display(&self, r: ObjRef) -> String {
        self.heap.display(r)
    }

    pub fn inspect(&self, r: ObjRef) -> String {
        self.heap.inspect(r)
    }

    pub fn class_of(&self, r: ObjRef) -> ObjRef {
        self.heap
            .get(r)
            .class
            .expect("value has no class outside the bootstrap window")
    }

    pub fn superclass_of(&self, class: ObjRef) -> Option<ObjRef> {
        self.heap.get(class).class_data().and_then(|d| d.superclass)
    }

    pub fn as_fixnum(&self, r: ObjRef) -> Option<i64> {
        match &self.heap.get(r).payload {
            Payload::Fixnum(n) => Some(*n),
            Payload::Bignum(n) => n.to_i64(),
            _ => None,
        }
    }

    pub fn as_str(&self, r: ObjRef) -> Option<&str> {
        match &self.heap.get(r).payload {
            Payload::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self, r: ObjRef) -> Option<bool> {
        match &self.heap.get(r).payload {
            Payload::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn array_elements(&self, r: ObjRef) -> Option<Vec<ObjRef>> {
        match &self.heap.get(r).payload {
            Payload::Array(items) => Some(items.clone()),
            _ => None,
        }
    }

    pub fn is_nil(&self, r: ObjRef) -> bool {
        r == self.nil_ref
    }

    /// Everything except `nil` and `false` counts as true.
    pub(crate) fn truthy(&self, r: ObjRef) -> bool {
        r != self.nil_ref && r != self.false_ref
    }

    pub(crate) fn bool_ref(&self, value: bool) -> ObjRef {
        if value { self.true_ref } else { self.false_ref }
    }

    // ---- host-facing buffers ----------------------------------------------

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn clear_output(&mut self) {
        self.output.clear();
    }

    /// Trace entries recorded by the most recent parse, oldest first.
    pub fn parse_trace(&self) -> &[String] {
        &self.parse_trace
    }

    pub(crate) fn set_parse_trace(&mut self, trace: Vec<String>) {
        self.parse_trace = trace;
    }

    pub fn call_stack_depth(&self) -> usize {
        self.call_stack.depth()
    }

    pub fn local_scope_depth(&self) -> usize {
        self.locals.depth()
    }

    /// Append a directory to `$LOAD_PATH`.
    pub fn push_load_path(&mut self, dir: &str) {
        let entry = self.alloc_str(dir);
        if let Some(&load_path) = self.globals.get("LOAD_PATH")
            && let Payload::Array(items) = &mut self.heap.get_mut(load_path).payload
        {
            items.push(entry);
        }
    }

    // ---- scoped stack discipline ------------------------------------------

    /// Run `f` under a call-stack frame. The pop is unconditional, so frame
    /// balance holds on error paths as well as successes.
    pub(crate) fn with_frame<T>(&mut self, name: &str, f: impl FnOnce(&mut Self) -> T) -> T {
        let frame = Frame::new(name, &self.filename);
        self.call_stack.push(frame);
        let result = f(self);
        self.call_stack.pop();
        result
    }

    /// Run `f` under a fresh local-variable scope, released unconditionally.
    pub(crate) fn with_scope<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.locals.push_scope();
        let result = f(self);
        self.locals.pop_scope();
        result
    }

    // ---- allocation helpers ------------------------------------------------

    pub(crate) fn alloc_fixnum(&mut self, n: i64) -> ObjRef {
        let class = self.must_class("Fixnum");
        self.heap.alloc(Obj::new(class, Payload::Fixnum(n)))
    }

    /// Allocate an integer, normalizing back to Fixnum when it fits.
    pub(crate) fn alloc_bignum(&mut self, n: BigInt) -> ObjRef {
        if let Some(small) = n.to_i64() {
            return self.alloc_fixnum(small);
        }
        let class = self.must_class("Fixnum");
        self.heap.alloc(Obj::new(class, Payload::Bignum(n)))
    }

    pub(crate) fn alloc_float(&mut self, f: f64) -> ObjRef {
        let class = self.must_class("Float");
        self.heap.alloc(Obj::new(class, Payload::Float(f)))
    }

    pub(crate) fn alloc_str(&mut self, s: impl Into<String>) -> ObjRef {
        let class = self.must_class("String");
        self.heap.alloc(Obj::new(class, Payload::Str(s.into())))
    }

    pub(crate) fn alloc_array(&mut self, items: Vec<ObjRef>) -> ObjRef {
        let class = self.must_class("Array");
        self.heap.alloc(Obj::new(class, Payload::Array(items)))
    }

    pub(crate) fn alloc_hash(&mut self, pairs: Vec<(ObjRef, ObjRef)>) -> ObjRef {
        let class = self.must_class("Hash");
        self.heap.alloc(Obj::new(class, Payload::Hash(pairs)))
    }

    pub(crate) fn alloc_instance(&mut self, class: ObjRef) -> ObjRef {
        self.heap.alloc(Obj::instance_of(class))
    }

    /// Interned symbol lookup: the first request allocates, every later
    /// request with the same name returns the identical value.
    pub(crate) fn intern_symbol(&mut self, name: &str) -> ObjRef {
        if let Some(&existing) = self.symbols.get(name) {
            return existing;
        }
        let class = self.must_class("Symbol");
        let symbol = self
            .heap
            .alloc(Obj::new(class, Payload::Symbol(name.to_string())));
        self.symbols.insert(name.to_string(), symbol);
        symbol
    }

    pub(crate) fn arity_error(&self, given: usize, expected: usize) -> RuntimeError {
        RuntimeError::raised(
            format!(
                "wrong number of arguments (given {}, expected {})",
                given, expected
            ),
            self.call_stack.render(),
        )
    }

    // ---- method-table plumbing ---------------------------------------------

    pub(crate) fn class_data_mut_of(&mut self, class: ObjRef) -> &mut ClassData {
        self.heap
            .get_mut(class)
            .class_data_mut()
            .expect("expected a class value")
    }

    pub(crate) fn module_data_mut_of(&mut self, module: ObjRef) -> &mut ModuleData {
        self.heap
            .get_mut(module)
            .module_data_mut()
            .expect("expected a module value")
    }

    pub(crate) fn add_instance_method<F>(&mut self, class: ObjRef, name: &str, func: F)
    where
        F: Fn(&mut Interpreter, ObjRef, &[ObjRef]) -> Result<ObjRef, RuntimeError> + 'static,
    {
        let method = Method::Native(NativeMethod::new(name, func));
        self.class_data_mut_of(class)
            .instance_methods
            .insert(name.to_string(), method);
    }

    pub(crate) fn add_module_method<F>(
        &mut self,
        module: ObjRef,
        name: &str,
        private: bool,
        func: F,
    ) where
        F: Fn(&mut Interpreter, ObjRef, &[ObjRef]) -> Result<ObjRef, RuntimeError> + 'static,
    {
        let method = Method::Native(NativeMethod::new(name, func));
        let data = self.module_data_mut_of(module);
        if private {
            data.private_instance_methods.insert(name.to_string(), method);
        } else {
            data.instance_methods.insert(name.to_string(), method);
        }
    }

    /// Attach a method to the object's own table (class-level and
    /// module-function methods).
    pub(crate) fn add_own_method<F>(&mut self, target: ObjRef, name: &str, func: F)
    where
        F: Fn(&mut Interpreter, ObjRef, &[ObjRef]) -> Result<ObjRef, RuntimeError> + 'static,
    {
        let method = Method::Native(NativeMethod::new(name, func));
        self.heap
            .get_mut(target)
            .methods
            .insert(name.to_string(), method);
    }
}
