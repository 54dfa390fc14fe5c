use std::rc::Rc;

use super::Interpreter;
use crate::ast::{MethodParam, Node, RescueClause};
use crate::trace::trace_log;
use crate::value::{Method, NativeMethod, ObjRef, Payload, RuntimeError, UserMethod};

impl Interpreter {
    /// Walk a statement sequence against a context value, producing the value
    /// of the last node. An error from any sub-expression aborts the sequence
    /// immediately.
    pub(crate) fn execute_with_context(
        &mut self,
        context: ObjRef,
        nodes: &[Node],
    ) -> Result<ObjRef, RuntimeError> {
        let mut last = self.nil_ref;
        for node in nodes {
            last = self.eval_node(context, node)?;
        }
        Ok(last)
    }

    pub(crate) fn eval_node(
        &mut self,
        context: ObjRef,
        node: &Node,
    ) -> Result<ObjRef, RuntimeError> {
        match node {
            Node::If {
                condition,
                body,
                else_body,
            } => {
                // Literal-pattern condition evaluation: only a boolean
                // literal and the bare name `nil` are inspected. Any other
                // condition shape counts as truthy and is never evaluated,
                // so its side effects do not happen.
                if literal_condition_truthy(condition) {
                    self.execute_with_context(context, body)
                } else {
                    self.execute_with_context(context, else_body)
                }
            }
            Node::Alias { to, from } => self.eval_alias(context, to, from),
            Node::ModuleDecl { name, body } => self.eval_module_decl(context, name, body),
            Node::ClassDecl {
                name,
                superclass,
                body,
            } => self.eval_class_decl(context, name, superclass.as_deref(), body),
            Node::FuncDecl {
                on_self,
                name,
                params,
                body,
            } => self.eval_func_decl(context, *on_self, name, params, body),
            Node::SimpleString(s) | Node::InterpolatedString(s) => Ok(self.alloc_str(s.clone())),
            Node::Boolean(value) => Ok(self.bool_ref(*value)),
            Node::ConstantInt(n) => Ok(self.alloc_fixnum(*n)),
            Node::ConstantBignum(n) => Ok(self.alloc_bignum(n.clone())),
            Node::ConstantFloat(f) => Ok(self.alloc_float(*f)),
            Node::Symbol(name) => Ok(self.intern_symbol(name)),
            Node::GlobalVariable(name) => {
                Ok(self.globals.get(name).copied().unwrap_or(self.nil_ref))
            }
            Node::BareReference(name) => self.eval_bare_reference(context, name),
            Node::InstanceVariable(name) => Ok(self
                .heap
                .get(context)
                .ivars
                .get(name)
                .copied()
                .unwrap_or(self.nil_ref)),
            Node::Call { target, name, args } => {
                self.eval_call(context, target.as_deref(), name, args)
            }
            Node::Assignment { lhs, rhs } => self.eval_assignment(context, lhs, rhs),
            Node::FileNameConstReference => {
                let filename = self.filename.clone();
                Ok(self.alloc_str(filename))
            }
            Node::Begin { body, rescues } => self.eval_begin(context, body, rescues),
            Node::Array(items) => {
                let mut elements = Vec::with_capacity(items.len());
                for item in items {
                    elements.push(self.eval_node(context, item)?);
                }
                Ok(self.alloc_array(elements))
            }
            Node::Hash(pairs) => {
                let mut entries: Vec<(ObjRef, ObjRef)> = Vec::with_capacity(pairs.len());
                for (key_node, value_node) in pairs {
                    let key = self.eval_node(context, key_node)?;
                    let value = self.eval_node(context, value_node)?;
                    let existing = entries
                        .iter_mut()
                        .find(|(k, _)| self.heap.values_equal(*k, key));
                    match existing {
                        Some(entry) => entry.1 = value,
                        None => entries.push((key, value)),
                    }
                }
                Ok(self.alloc_hash(entries))
            }
        }
    }

    /// Bare names resolve in a strict order: current local scope, object
    /// space, class registry, module registry.
    fn eval_bare_reference(
        &mut self,
        context: ObjRef,
        name: &str,
    ) -> Result<ObjRef, RuntimeError> {
        if let Some(value) = self.locals.retrieve(name) {
            return Ok(value);
        }
        if let Some(&value) = self.object_space.get(name) {
            return Ok(value);
        }
        if let Some(&class) = self.classes.get(name) {
            return Ok(class);
        }
        if let Some(&module) = self.modules.get(name) {
            return Ok(module);
        }
        Err(RuntimeError::name_error(
            name,
            &self.heap.display(context),
            &self.heap.class_name(context),
            self.call_stack.render(),
        ))
    }

    /// The right-hand side is evaluated first; the left-hand side's shape
    /// picks the binding target. Any other shape is a runtime bug, not a
    /// language-level error.
    fn eval_assignment(
        &mut self,
        context: ObjRef,
        lhs: &Node,
        rhs: &Node,
    ) -> Result<ObjRef, RuntimeError> {
        let value = self.eval_node(context, rhs)?;
        match lhs {
            Node::BareReference(name) => {
                self.object_space.insert(name.clone(), value);
            }
            Node::GlobalVariable(name) => {
                self.globals.insert(name.clone(), value);
            }
            Node::InstanceVariable(name) => {
                self.heap.get_mut(context).ivars.insert(name.clone(), value);
            }
            other => panic!("malformed assignment target: {:?}", other),
        }
        Ok(value)
    }

    fn eval_alias(
        &mut self,
        context: ObjRef,
        to: &str,
        from: &str,
    ) -> Result<ObjRef, RuntimeError> {
        let original = match &self.heap.get(context).payload {
            Payload::Class(data) => data.instance_methods.get(from).cloned(),
            Payload::Module(data) => data.instance_methods.get(from).cloned(),
            other => panic!("alias outside of a class or module context: {:?}", other),
        };
        let Some(original) = original else {
            return Err(RuntimeError::name_error(
                from,
                &self.heap.display(context),
                &self.heap.class_name(context),
                self.call_stack.render(),
            ));
        };
        // The alias is a native wrapper forwarding to the resolved method;
        // the original still runs with its own fresh scope per call.
        let forwarded = original.clone();
        let wrapper = Method::Native(NativeMethod::new(to, move |vm, receiver, args| {
            vm.invoke_method(&forwarded, receiver, args)
        }));
        match &mut self.heap.get_mut(context).payload {
            Payload::Class(data) => {
                data.instance_methods.insert(to.to_string(), wrapper);
            }
            Payload::Module(data) => {
                data.instance_methods.insert(to.to_string(), wrapper);
            }
            _ => unreachable!("checked above"),
        }
        Ok(self.nil_ref)
    }

    /// Create (or reopen) the module, run its body with the module as the
    /// context, then register it — last write wins.
    fn eval_module_decl(
        &mut self,
        _context: ObjRef,
        name: &str,
        body: &[Node],
    ) -> Result<ObjRef, RuntimeError> {
        let module_ref = match self.modules.get(name).copied() {
            Some(existing) => existing,
            None => self.define_user_module(name),
        };
        trace_log!("eval", "module {} body", name);
        self.execute_with_context(module_ref, body)?;
        self.modules.insert(name.to_string(), module_ref);
        Ok(module_ref)
    }

    fn eval_class_decl(
        &mut self,
        context: ObjRef,
        name: &str,
        superclass: Option<&str>,
        body: &[Node],
    ) -> Result<ObjRef, RuntimeError> {
        let class_ref = match self.classes.get(name).copied() {
            Some(existing) => existing,
            None => {
                let parent = match superclass {
                    Some(parent_name) => match self.classes.get(parent_name).copied() {
                        Some(parent) => parent,
                        None => {
                            return Err(RuntimeError::name_error(
                                parent_name,
                                &self.heap.display(context),
                                &self.heap.class_name(context),
                                self.call_stack.render(),
                            ));
                        }
                    },
                    None => self.must_class("Object"),
                };
                self.define_user_class(name, parent)
            }
        };
        trace_log!("eval", "class {} body", name);
        self.execute_with_context(class_ref, body)?;
        self.classes.insert(name.to_string(), class_ref);
        Ok(class_ref)
    }

    /// Attach a freshly built user method to the table the context dictates:
    /// Kernel's private table for top-level definitions, the instance table
    /// for classes, and for modules either the owner's own table (module
    /// function, `def self.x`) or the instance table.
    fn eval_func_decl(
        &mut self,
        context: ObjRef,
        on_self: bool,
        name: &str,
        params: &[MethodParam],
        body: &[Node],
    ) -> Result<ObjRef, RuntimeError> {
        let method = Method::User(Rc::new(UserMethod {
            name: name.to_string(),
            params: params.to_vec(),
            body: body.to_vec(),
        }));
        if context == self.main_ref {
            let kernel = self.kernel_ref;
            self.module_data_mut_of(kernel)
                .private_instance_methods
                .insert(name.to_string(), method);
        } else {
            enum Placement {
                ClassInstance,
                ModuleInstance,
                OwnTable,
            }
            let placement = match &self.heap.get(context).payload {
                Payload::Class(_) => Placement::ClassInstance,
                Payload::Module(_) if on_self => Placement::OwnTable,
                Payload::Module(_) => Placement::ModuleInstance,
                other => panic!("unknown type of method-declaration context: {:?}", other),
            };
            match placement {
                Placement::ClassInstance => {
                    self.class_data_mut_of(context)
                        .instance_methods
                        .insert(name.to_string(), method);
                }
                Placement::ModuleInstance => {
                    self.module_data_mut_of(context)
                        .instance_methods
                        .insert(name.to_string(), method);
                }
                Placement::OwnTable => {
                    self.heap
                        .get_mut(context)
                        .methods
                        .insert(name.to_string(), method);
                }
            }
        }
        Ok(self.intern_symbol(name))
    }

    /// Begin/rescue state machine. The protected body's value is the result
    /// unless it raises; a matching rescue clause whose body succeeds makes
    /// its value the result. A failed recovery body does not change what the
    /// remaining clauses are matched against — they keep matching the
    /// original error — but its error is what propagates if nothing further
    /// handles the construct.
    fn eval_begin(
        &mut self,
        context: ObjRef,
        body: &[Node],
        rescues: &[RescueClause],
    ) -> Result<ObjRef, RuntimeError> {
        match self.execute_with_context(context, body) {
            Ok(value) => Ok(value),
            Err(first) => {
                let original_display = first.display_name();
                let mut err = first;
                for rescue in rescues {
                    for class_name in &rescue.classes {
                        if *class_name == original_display {
                            match self.execute_with_context(context, &rescue.body) {
                                Ok(value) => return Ok(value),
                                Err(replacement) => err = replacement,
                            }
                        }
                    }
                }
                Err(err)
            }
        }
    }
}

fn literal_condition_truthy(condition: &Node) -> bool {
    match condition {
        Node::Boolean(value) => *value,
        Node::BareReference(name) => name != "nil",
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_literals_decide_conditions() {
        assert!(literal_condition_truthy(&Node::Boolean(true)));
        assert!(!literal_condition_truthy(&Node::Boolean(false)));
    }

    #[test]
    fn only_the_nil_name_is_false() {
        assert!(!literal_condition_truthy(&Node::BareReference(
            "nil".to_string()
        )));
        assert!(literal_condition_truthy(&Node::BareReference(
            "anything".to_string()
        )));
    }

    #[test]
    fn other_condition_shapes_are_truthy_unevaluated() {
        assert!(literal_condition_truthy(&Node::ConstantInt(0)));
        assert!(literal_condition_truthy(&Node::Call {
            target: None,
            name: "boom".to_string(),
            args: vec![],
        }));
    }
}
