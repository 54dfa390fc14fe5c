use super::Interpreter;
use crate::ast::Node;
use crate::trace::trace_log;
use crate::value::{Method, ObjRef, RuntimeError};

impl Interpreter {
    /// Evaluate a call expression. The explicit target (if any) is evaluated
    /// first; a nil target short-circuits into a no-method error before any
    /// resolution happens. With no explicit target the current context is the
    /// receiver and the private tables become eligible, tried first.
    /// Arguments are evaluated left-to-right in the caller's context after
    /// resolution, and the frame naming the resolved method is pushed around
    /// the execution only.
    pub(crate) fn eval_call(
        &mut self,
        context: ObjRef,
        target: Option<&Node>,
        name: &str,
        args: &[Node],
    ) -> Result<ObjRef, RuntimeError> {
        let (receiver, implicit) = match target {
            Some(node) => (self.eval_node(context, node)?, false),
            None => (context, true),
        };

        if !implicit && receiver == self.nil_ref {
            return Err(self.no_method_error(name, self.nil_ref));
        }

        let resolved = if implicit {
            self.resolve_private(receiver, name)
                .or_else(|| self.resolve_public(receiver, name))
        } else {
            self.resolve_public(receiver, name)
        };
        let Some(method) = resolved else {
            return Err(self.no_method_error(name, receiver));
        };

        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.eval_node(context, arg)?);
        }

        trace_log!(
            "call",
            "dispatch {} on {}",
            name,
            self.heap.display(receiver)
        );
        let frame_name = method.name().to_string();
        self.with_frame(&frame_name, |vm| {
            vm.invoke_method(&method, receiver, &arg_values)
        })
    }

    /// Execute a resolved method. User-defined bodies always run under a
    /// fresh local scope with their parameters bound; missing arguments fall
    /// back to the declared default expression (evaluated against the
    /// receiver) or nil.
    pub(crate) fn invoke_method(
        &mut self,
        method: &Method,
        receiver: ObjRef,
        args: &[ObjRef],
    ) -> Result<ObjRef, RuntimeError> {
        match method {
            Method::Native(native) => {
                let func = native.func.clone();
                func(self, receiver, args)
            }
            Method::User(user) => {
                let user = user.clone();
                self.with_scope(|vm| {
                    for (index, param) in user.params.iter().enumerate() {
                        let value = match args.get(index) {
                            Some(&provided) => provided,
                            None => match &param.default {
                                Some(default) => vm.eval_node(receiver, default)?,
                                None => vm.nil_ref,
                            },
                        };
                        vm.locals.store(&param.name, value);
                    }
                    vm.execute_with_context(receiver, &user.body)
                })
            }
        }
    }

    /// Public-dispatch entry point used by native methods that re-enter the
    /// interpreter (Comparable driving `<=>`, for example).
    pub(crate) fn send(
        &mut self,
        receiver: ObjRef,
        name: &str,
        args: &[ObjRef],
    ) -> Result<ObjRef, RuntimeError> {
        let Some(method) = self.resolve_public(receiver, name) else {
            return Err(self.no_method_error(name, receiver));
        };
        let frame_name = method.name().to_string();
        self.with_frame(&frame_name, |vm| vm.invoke_method(&method, receiver, args))
    }

    pub(crate) fn no_method_error(&self, name: &str, receiver: ObjRef) -> RuntimeError {
        RuntimeError::no_method_error(
            name,
            &self.heap.display(receiver),
            &self.heap.class_name(receiver),
            self.call_stack.render(),
        )
    }
}
