use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    Parse,
    Name,
    NoMethod,
    Load,
    Raised,
}

impl RuntimeErrorKind {
    pub fn is_parse(self) -> bool {
        matches!(self, RuntimeErrorKind::Parse)
    }

    fn display_name(self) -> &'static str {
        match self {
            RuntimeErrorKind::Parse => "ParseError",
            RuntimeErrorKind::Name => "NameError",
            RuntimeErrorKind::NoMethod => "NoMethodError",
            RuntimeErrorKind::Load => "LoadError",
            RuntimeErrorKind::Raised => "RuntimeError",
        }
    }
}

impl fmt::Display for RuntimeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// An error produced during evaluation. Errors travel as values through
/// `Result` returns; nothing unwinds. Every constructor that can fire after
/// the bootstrap captures the call-stack rendering of the moment it fired.
#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub message: String,
    pub backtrace: String,
}

impl RuntimeError {
    pub(crate) fn parse_error(message: impl Into<String>) -> Self {
        Self {
            kind: RuntimeErrorKind::Parse,
            message: message.into(),
            backtrace: String::new(),
        }
    }

    pub(crate) fn name_error(
        name: &str,
        context_display: &str,
        class_display: &str,
        backtrace: String,
    ) -> Self {
        Self {
            kind: RuntimeErrorKind::Name,
            message: format!(
                "undefined local variable or method '{}' for {}:{}",
                name, context_display, class_display
            ),
            backtrace,
        }
    }

    pub(crate) fn no_method_error(
        name: &str,
        receiver_display: &str,
        class_display: &str,
        backtrace: String,
    ) -> Self {
        Self {
            kind: RuntimeErrorKind::NoMethod,
            message: format!(
                "undefined method '{}' for {}:{}",
                name, receiver_display, class_display
            ),
            backtrace,
        }
    }

    pub(crate) fn load_error(file_name: &str, backtrace: String) -> Self {
        Self {
            kind: RuntimeErrorKind::Load,
            message: format!("cannot load such file -- {}", file_name),
            backtrace,
        }
    }

    pub(crate) fn raised(message: impl Into<String>, backtrace: String) -> Self {
        Self {
            kind: RuntimeErrorKind::Raised,
            message: message.into(),
            backtrace,
        }
    }

    /// The string rescue clauses match their declared class names against.
    /// For errors raised from user code this is the raised message itself;
    /// for runtime-produced errors it is the stable kind name.
    pub fn display_name(&self) -> String {
        match self.kind {
            RuntimeErrorKind::Raised => self.message.clone(),
            kind => kind.to_string(),
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            RuntimeErrorKind::Raised | RuntimeErrorKind::Parse => f.write_str(&self.message),
            kind => write!(f, "{}: {}", kind, self.message),
        }
    }
}
