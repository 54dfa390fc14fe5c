use std::fs;
use std::path::Path;

use super::Interpreter;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::trace::trace_log;
use crate::value::{ObjRef, Payload, RuntimeError};

impl Interpreter {
    /// Parse and evaluate script text against the top-level main object.
    /// A parse failure aborts the run before any evaluation; the parser's
    /// trace buffer stays available for host-level reporting.
    pub fn run(&mut self, input: &str) -> Result<ObjRef, RuntimeError> {
        let tokens = Lexer::new(input).tokenize();
        let mut parser = Parser::new(tokens);
        let parsed = parser.parse_program();
        self.set_parse_trace(parser.take_trace());
        let nodes = parsed?;

        trace_log!(
            "run",
            "evaluating {} top-level statements from {}",
            nodes.len(),
            self.filename
        );
        let main = self.main_ref;
        self.with_frame("main", |vm| {
            vm.with_scope(|vm| vm.execute_with_context(main, &nodes))
        })
    }

    /// The `require` builtin: search every `$LOAD_PATH` entry for
    /// `<name>.ak`, evaluate the first match under its own filename, and
    /// answer true. The well-known name "rubygems" is a historical no-op.
    pub(crate) fn require_file(&mut self, name: &str) -> Result<ObjRef, RuntimeError> {
        if name == "rubygems" {
            return Ok(self.false_ref);
        }

        let mut dirs = Vec::new();
        if let Some(&load_path) = self.globals.get("LOAD_PATH")
            && let Payload::Array(entries) = &self.heap.get(load_path).payload
        {
            for &entry in entries {
                if let Payload::Str(dir) = &self.heap.get(entry).payload {
                    dirs.push(dir.clone());
                }
            }
        }

        for dir in dirs {
            let full_path = Path::new(&dir).join(format!("{}.ak", name));
            let Ok(contents) = fs::read_to_string(&full_path) else {
                continue;
            };
            trace_log!("require", "loading {}", full_path.display());
            // The loaded file becomes the current filename for the duration
            // of its evaluation, restored on success and error alike.
            let saved = std::mem::replace(&mut self.filename, full_path.display().to_string());
            let result = self.run(&contents);
            self.filename = saved;
            result?;
            return Ok(self.true_ref);
        }

        Err(RuntimeError::load_error(name, self.call_stack.render()))
    }
}
