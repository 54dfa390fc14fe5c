use std::path::PathBuf;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::Interpreter;

/// Check whether the input still has open blocks, brackets, or quotes,
/// suggesting more lines are needed before evaluating.
fn is_incomplete(input: &str) -> bool {
    let mut block_depth = 0i32;
    let mut paren_depth = 0i32;
    let mut bracket_depth = 0i32;
    let mut brace_depth = 0i32;
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut word = String::new();
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_single_quote {
            if ch == '\\' {
                chars.next();
            } else if ch == '\'' {
                in_single_quote = false;
            }
            continue;
        }
        if in_double_quote {
            if ch == '\\' {
                chars.next();
            } else if ch == '"' {
                in_double_quote = false;
            }
            continue;
        }
        if ch.is_ascii_alphanumeric() || ch == '_' {
            word.push(ch);
            continue;
        }
        match word.as_str() {
            "def" | "class" | "module" | "begin" | "if" => block_depth += 1,
            "end" => block_depth -= 1,
            _ => {}
        }
        word.clear();
        match ch {
            '\'' => in_single_quote = true,
            '"' => in_double_quote = true,
            '#' => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        break;
                    }
                }
            }
            '(' => paren_depth += 1,
            ')' => paren_depth -= 1,
            '[' => bracket_depth += 1,
            ']' => bracket_depth -= 1,
            '{' => brace_depth += 1,
            '}' => brace_depth -= 1,
            _ => {}
        }
    }
    match word.as_str() {
        "def" | "class" | "module" | "begin" | "if" => block_depth += 1,
        "end" => block_depth -= 1,
        _ => {}
    }

    block_depth > 0
        || paren_depth > 0
        || bracket_depth > 0
        || brace_depth > 0
        || in_single_quote
        || in_double_quote
}

enum LineResult {
    /// Need more input (incomplete expression).
    Continue,
    /// Line was processed; output may have been produced.
    Done,
}

/// Process one REPL line. This is the testable core of the loop — no I/O
/// beyond the interpreter's own output buffer.
fn process_line(
    interpreter: &mut Interpreter,
    accumulated: &mut String,
    line: &str,
) -> (LineResult, Option<String>) {
    if accumulated.is_empty() {
        *accumulated = line.to_string();
    } else {
        accumulated.push('\n');
        accumulated.push_str(line);
    }

    if is_incomplete(accumulated) {
        return (LineResult::Continue, None);
    }
    if accumulated.trim().is_empty() {
        accumulated.clear();
        return (LineResult::Done, None);
    }

    interpreter.clear_output();
    let display = match interpreter.run(accumulated) {
        Ok(value) => {
            let mut text = interpreter.output().to_string();
            text.push_str(&format!("=> {}\n", interpreter.inspect(value)));
            Some(text)
        }
        Err(err) => Some(format!("Error: {}\n", err)),
    };

    accumulated.clear();
    (LineResult::Done, display)
}

pub fn run_repl() {
    let mut rl = match DefaultEditor::new() {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("Failed to initialize line editor: {}", err);
            std::process::exit(1);
        }
    };

    let home = home_dir();
    let history_path = home.as_ref().map(|dir| dir.join("history"));
    if let Some(ref path) = history_path {
        let _ = rl.load_history(path);
    }

    let home_for_vm = home.unwrap_or_else(|| PathBuf::from("."));
    let mut interpreter = Interpreter::new(&home_for_vm, "<repl>");
    let mut accumulated = String::new();

    loop {
        let prompt = if accumulated.is_empty() { "> " } else { "* " };

        match rl.readline(prompt) {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                let (result, display) = process_line(&mut interpreter, &mut accumulated, &line);
                if let Some(text) = display {
                    print!("{}", text);
                }
                if matches!(result, LineResult::Continue) {
                    continue;
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C: cancel current input
                accumulated.clear();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D: exit
                break;
            }
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    if let Some(ref path) = history_path {
        let _ = rl.save_history(path);
    }
}

fn home_dir() -> Option<PathBuf> {
    let home = std::env::var("HOME").ok()?;
    let dir = PathBuf::from(home).join(".akane");
    let _ = std::fs::create_dir_all(&dir);
    Some(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    /// Feed lines into the REPL core and collect all display output.
    fn repl_session(lines: &[&str]) -> Vec<String> {
        let mut interpreter = Interpreter::new(Path::new("/nonexistent"), "<repl-test>");
        let mut accumulated = String::new();
        let mut outputs = Vec::new();

        for line in lines {
            let (_result, display) = process_line(&mut interpreter, &mut accumulated, line);
            if let Some(text) = display {
                outputs.push(text);
            }
        }
        outputs
    }

    #[test]
    fn test_puts_prints_once() {
        let out = repl_session(&["puts 'hello'"]);
        assert_eq!(out, vec!["hello\n=> nil\n"]);
    }

    #[test]
    fn test_expression_shows_value() {
        let out = repl_session(&["1 + 2"]);
        assert_eq!(out, vec!["=> 3\n"]);
    }

    #[test]
    fn test_multiline_class_definition() {
        let out = repl_session(&["class Foo", "  def bar", "    41", "  end", "end", "Foo.new.bar"]);
        assert_eq!(out.last().map(String::as_str), Some("=> 41\n"));
    }

    #[test]
    fn test_binding_persists_across_lines() {
        let out = repl_session(&["x = 41", "x + 1"]);
        assert_eq!(out, vec!["=> 41\n", "=> 42\n"]);
    }

    #[test]
    fn test_empty_line_produces_no_output() {
        let out = repl_session(&["", "   "]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_error_is_reported() {
        let out = repl_session(&["qux"]);
        assert_eq!(out.len(), 1);
        assert!(out[0].starts_with("Error: NameError"));
        assert!(out[0].contains("qux"));
    }

    #[test]
    fn incomplete_detection() {
        assert!(is_incomplete("def foo"));
        assert!(is_incomplete("class Foo\n  def bar\n  end"));
        assert!(is_incomplete("[1, 2,"));
        assert!(!is_incomplete("def foo\nend"));
        assert!(!is_incomplete("1 + 2"));
    }
}
