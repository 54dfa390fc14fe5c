use std::collections::HashMap;

use num_bigint::BigInt;
use num_traits::ToPrimitive;

mod error;
mod method;

pub use error::{RuntimeError, RuntimeErrorKind};
pub use method::{Method, NativeFn, NativeMethod, UserMethod};

/// Handle into the [`Heap`]. Values are compared by handle identity where
/// identity matters (symbols, singletons) and by payload otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ObjRef(pub(crate) usize);

/// Class-side data: superclass link, ordered module inclusions, and the
/// instance-method tables. The inclusion list is searched in reverse order so
/// the most recently included module wins.
#[derive(Debug)]
pub struct ClassData {
    pub name: String,
    pub superclass: Option<ObjRef>,
    pub includes: Vec<ObjRef>,
    pub instance_methods: HashMap<String, Method>,
    pub private_instance_methods: HashMap<String, Method>,
}

impl ClassData {
    pub fn new(name: &str, superclass: Option<ObjRef>) -> Self {
        Self {
            name: name.to_string(),
            superclass,
            includes: Vec::new(),
            instance_methods: HashMap::new(),
            private_instance_methods: HashMap::new(),
        }
    }
}

/// Module-side data. Modules have no superclass and no factory; methods
/// declared `def self.x` inside a module land in the owning object's own
/// method table instead.
#[derive(Debug)]
pub struct ModuleData {
    pub name: String,
    pub includes: Vec<ObjRef>,
    pub instance_methods: HashMap<String, Method>,
    pub private_instance_methods: HashMap<String, Method>,
}

impl ModuleData {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            includes: Vec::new(),
            instance_methods: HashMap::new(),
            private_instance_methods: HashMap::new(),
        }
    }
}

#[derive(Debug)]
pub enum Payload {
    /// A plain object instance; all state lives in the ivars.
    Instance,
    Class(ClassData),
    Module(ModuleData),
    Bool(bool),
    Nil,
    Fixnum(i64),
    Bignum(BigInt),
    Float(f64),
    Str(String),
    Symbol(String),
    Array(Vec<ObjRef>),
    Hash(Vec<(ObjRef, ObjRef)>),
}

/// A heap cell. `class` is `None` only for the bootstrap quadruple between
/// the allocate pass and the link pass; everywhere else it resolves.
#[derive(Debug)]
pub struct Obj {
    pub class: Option<ObjRef>,
    pub ivars: HashMap<String, ObjRef>,
    pub methods: HashMap<String, Method>,
    pub private_methods: HashMap<String, Method>,
    pub payload: Payload,
}

impl Obj {
    pub fn new(class: ObjRef, payload: Payload) -> Self {
        Self {
            class: Some(class),
            ivars: HashMap::new(),
            methods: HashMap::new(),
            private_methods: HashMap::new(),
            payload,
        }
    }

    /// Unlinked cell for the bootstrap allocate pass.
    pub(crate) fn raw(payload: Payload) -> Self {
        Self {
            class: None,
            ivars: HashMap::new(),
            methods: HashMap::new(),
            private_methods: HashMap::new(),
            payload,
        }
    }

    pub fn instance_of(class: ObjRef) -> Self {
        Self::new(class, Payload::Instance)
    }

    pub fn class_data(&self) -> Option<&ClassData> {
        match &self.payload {
            Payload::Class(data) => Some(data),
            _ => None,
        }
    }

    pub fn class_data_mut(&mut self) -> Option<&mut ClassData> {
        match &mut self.payload {
            Payload::Class(data) => Some(data),
            _ => None,
        }
    }

    pub fn module_data(&self) -> Option<&ModuleData> {
        match &self.payload {
            Payload::Module(data) => Some(data),
            _ => None,
        }
    }

    pub fn module_data_mut(&mut self) -> Option<&mut ModuleData> {
        match &mut self.payload {
            Payload::Module(data) => Some(data),
            _ => None,
        }
    }
}

/// Arena holding every runtime value for one interpreter. Cells are never
/// freed during a run, so handles stay valid for the interpreter's lifetime.
#[derive(Debug, Default)]
pub struct Heap {
    cells: Vec<Obj>,
}

impl Heap {
    pub fn new() -> Self {
        Self {
            cells: Vec::with_capacity(64),
        }
    }

    pub fn alloc(&mut self, obj: Obj) -> ObjRef {
        let index = self.cells.len();
        self.cells.push(obj);
        ObjRef(index)
    }

    pub fn get(&self, r: ObjRef) -> &Obj {
        &self.cells[r.0]
    }

    pub fn get_mut(&mut self, r: ObjRef) -> &mut Obj {
        &mut self.cells[r.0]
    }

    /// Name of a class or module value; for any other value, the name of its
    /// class.
    pub fn type_name(&self, r: ObjRef) -> String {
        match &self.get(r).payload {
            Payload::Class(data) => data.name.clone(),
            Payload::Module(data) => data.name.clone(),
            _ => self.class_name(r),
        }
    }

    /// Display name of the value's class.
    pub fn class_name(&self, r: ObjRef) -> String {
        match self.get(r).class {
            Some(class) => match &self.get(class).payload {
                Payload::Class(data) => data.name.clone(),
                Payload::Module(data) => data.name.clone(),
                _ => String::new(),
            },
            None => String::new(),
        }
    }

    pub fn display(&self, r: ObjRef) -> String {
        match &self.get(r).payload {
            Payload::Instance => format!("#<{}>", self.class_name(r)),
            Payload::Class(data) => data.name.clone(),
            Payload::Module(data) => data.name.clone(),
            Payload::Bool(true) => "true".to_string(),
            Payload::Bool(false) => "false".to_string(),
            Payload::Nil => "nil".to_string(),
            Payload::Fixnum(n) => n.to_string(),
            Payload::Bignum(n) => n.to_string(),
            Payload::Float(f) => format_float(*f),
            Payload::Str(s) => s.clone(),
            Payload::Symbol(name) => name.clone(),
            Payload::Array(items) => {
                let rendered: Vec<String> = items.iter().map(|r| self.inspect(*r)).collect();
                format!("[{}]", rendered.join(", "))
            }
            Payload::Hash(pairs) => {
                let rendered: Vec<String> = pairs
                    .iter()
                    .map(|(k, v)| format!("{} => {}", self.inspect(*k), self.inspect(*v)))
                    .collect();
                format!("{{{}}}", rendered.join(", "))
            }
        }
    }

    pub fn inspect(&self, r: ObjRef) -> String {
        match &self.get(r).payload {
            Payload::Str(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
            Payload::Symbol(name) => format!(":{}", name),
            _ => self.display(r),
        }
    }

    /// Structural equality: numeric payloads compare across the numeric
    /// tower, collections compare element-wise, everything else compares by
    /// handle identity.
    pub fn values_equal(&self, a: ObjRef, b: ObjRef) -> bool {
        if a == b {
            return true;
        }
        match (&self.get(a).payload, &self.get(b).payload) {
            (Payload::Fixnum(x), Payload::Fixnum(y)) => x == y,
            (Payload::Fixnum(x), Payload::Bignum(y)) | (Payload::Bignum(y), Payload::Fixnum(x)) => {
                BigInt::from(*x) == *y
            }
            (Payload::Bignum(x), Payload::Bignum(y)) => x == y,
            (Payload::Float(x), Payload::Float(y)) => x == y,
            (Payload::Fixnum(x), Payload::Float(y)) | (Payload::Float(y), Payload::Fixnum(x)) => {
                *x as f64 == *y
            }
            (Payload::Bignum(x), Payload::Float(y)) | (Payload::Float(y), Payload::Bignum(x)) => {
                x.to_f64().map(|f| f == *y).unwrap_or(false)
            }
            (Payload::Str(x), Payload::Str(y)) => x == y,
            (Payload::Symbol(x), Payload::Symbol(y)) => x == y,
            (Payload::Bool(x), Payload::Bool(y)) => x == y,
            (Payload::Nil, Payload::Nil) => true,
            (Payload::Array(x), Payload::Array(y)) => {
                x.len() == y.len()
                    && x.iter()
                        .zip(y.iter())
                        .all(|(ea, eb)| self.values_equal(*ea, *eb))
            }
            (Payload::Hash(x), Payload::Hash(y)) => {
                x.len() == y.len()
                    && x.iter().all(|(k, v)| {
                        y.iter()
                            .any(|(k2, v2)| self.values_equal(*k, *k2) && self.values_equal(*v, *v2))
                    })
            }
            _ => false,
        }
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        format!("{}", f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_formatting() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(3.25), "3.25");
        assert_eq!(format_float(f64::INFINITY), "Infinity");
        assert_eq!(format_float(f64::NAN), "NaN");
    }

    #[test]
    fn numeric_equality_crosses_the_tower() {
        let mut heap = Heap::new();
        let small = heap.alloc(Obj::raw(Payload::Fixnum(7)));
        let big = heap.alloc(Obj::raw(Payload::Bignum(BigInt::from(7))));
        let float = heap.alloc(Obj::raw(Payload::Float(7.0)));
        assert!(heap.values_equal(small, big));
        assert!(heap.values_equal(small, float));
        assert!(heap.values_equal(big, small));
    }

    #[test]
    fn array_equality_is_elementwise() {
        let mut heap = Heap::new();
        let one_a = heap.alloc(Obj::raw(Payload::Fixnum(1)));
        let one_b = heap.alloc(Obj::raw(Payload::Fixnum(1)));
        let two = heap.alloc(Obj::raw(Payload::Fixnum(2)));
        let xs = heap.alloc(Obj::raw(Payload::Array(vec![one_a, two])));
        let ys = heap.alloc(Obj::raw(Payload::Array(vec![one_b, two])));
        let zs = heap.alloc(Obj::raw(Payload::Array(vec![two, one_a])));
        assert!(heap.values_equal(xs, ys));
        assert!(!heap.values_equal(xs, zs));
    }

    #[test]
    fn string_inspect_is_quoted() {
        let mut heap = Heap::new();
        let s = heap.alloc(Obj::raw(Payload::Str("hi".to_string())));
        assert_eq!(heap.display(s), "hi");
        assert_eq!(heap.inspect(s), "\"hi\"");
    }
}
