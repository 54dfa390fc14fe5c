use std::collections::HashMap;

use crate::value::ObjRef;

/// One call-stack entry: the active method or context name and the filename
/// that was current when the frame was pushed.
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    pub name: String,
    pub filename: String,
}

impl Frame {
    pub fn new(name: &str, filename: &str) -> Self {
        Self {
            name: name.to_string(),
            filename: filename.to_string(),
        }
    }
}

/// The call stack used for error attribution. Pushes and pops are performed
/// only through `Interpreter::with_frame`, which releases on every exit path.
#[derive(Debug, Default)]
pub(crate) struct CallStack {
    frames: Vec<Frame>,
}

impl CallStack {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Most-recent-first rendering embedded into every raised error.
    pub fn render(&self) -> String {
        self.frames
            .iter()
            .rev()
            .map(|frame| format!("{} ({})", frame.name, frame.filename))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Stack of local-variable scopes. Lookup consults only the topmost scope:
/// there is no enclosing-scope capture, so nested calls never see their
/// caller's locals.
#[derive(Debug, Default)]
pub(crate) struct LocalVariableStack {
    scopes: Vec<HashMap<String, ObjRef>>,
}

impl LocalVariableStack {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn store(&mut self, name: &str, value: ObjRef) {
        self.scopes
            .last_mut()
            .expect("local variable store outside any scope")
            .insert(name.to_string(), value);
    }

    pub fn retrieve(&self, name: &str) -> Option<ObjRef> {
        self.scopes.last().and_then(|scope| scope.get(name).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_stack_renders_most_recent_first() {
        let mut stack = CallStack::new();
        stack.push(Frame::new("main", "a.ak"));
        stack.push(Frame::new("helper", "a.ak"));
        assert_eq!(stack.render(), "helper (a.ak)\nmain (a.ak)");
    }

    #[test]
    fn call_stack_balance() {
        let mut stack = CallStack::new();
        assert_eq!(stack.depth(), 0);
        stack.push(Frame::new("main", "a.ak"));
        assert_eq!(stack.depth(), 1);
        stack.pop();
        assert_eq!(stack.depth(), 0);
    }

    #[test]
    fn lookup_only_sees_the_top_scope() {
        let mut locals = LocalVariableStack::new();
        locals.push_scope();
        locals.store("x", ObjRef(1));
        locals.push_scope();
        assert_eq!(locals.retrieve("x"), None);
        locals.store("x", ObjRef(2));
        assert_eq!(locals.retrieve("x"), Some(ObjRef(2)));
        locals.pop_scope();
        assert_eq!(locals.retrieve("x"), Some(ObjRef(1)));
    }
}
