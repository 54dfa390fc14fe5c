use super::Interpreter;
use crate::value::{Method, ObjRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Visibility {
    Public,
    Private,
}

impl Interpreter {
    pub(crate) fn resolve_public(&self, receiver: ObjRef, name: &str) -> Option<Method> {
        self.resolve(receiver, name, Visibility::Public)
    }

    pub(crate) fn resolve_private(&self, receiver: ObjRef, name: &str) -> Option<Method> {
        self.resolve(receiver, name, Visibility::Private)
    }

    /// Map a method name and receiver to a concrete method. Search order:
    /// the receiver's own table, then its class's instance methods, then that
    /// class's included modules in reverse inclusion order (most recently
    /// included wins), then the same walk up the superclass chain until the
    /// root. Private visibility runs the identical walk over the private
    /// tables.
    pub(crate) fn resolve(
        &self,
        receiver: ObjRef,
        name: &str,
        visibility: Visibility,
    ) -> Option<Method> {
        let obj = self.heap.get(receiver);
        let own = match visibility {
            Visibility::Public => &obj.methods,
            Visibility::Private => &obj.private_methods,
        };
        if let Some(method) = own.get(name) {
            return Some(method.clone());
        }
        let mut current = obj.class;
        while let Some(class_ref) = current {
            let Some(data) = self.heap.get(class_ref).class_data() else {
                break;
            };
            let table = match visibility {
                Visibility::Public => &data.instance_methods,
                Visibility::Private => &data.private_instance_methods,
            };
            if let Some(method) = table.get(name) {
                return Some(method.clone());
            }
            for &included in data.includes.iter().rev() {
                if let Some(method) = self.module_method(included, name, visibility) {
                    return Some(method);
                }
            }
            current = data.superclass;
        }
        None
    }

    fn module_method(
        &self,
        module: ObjRef,
        name: &str,
        visibility: Visibility,
    ) -> Option<Method> {
        let data = self.heap.get(module).module_data()?;
        let table = match visibility {
            Visibility::Public => &data.instance_methods,
            Visibility::Private => &data.private_instance_methods,
        };
        if let Some(method) = table.get(name) {
            return Some(method.clone());
        }
        for &included in data.includes.iter().rev() {
            if let Some(method) = self.module_method(included, name, visibility) {
                return Some(method);
            }
        }
        None
    }
}
