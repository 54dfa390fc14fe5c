use num_bigint::BigInt;

/// A formal parameter of a user-defined method. The default expression, if
/// present, is evaluated against the receiver when the caller supplies no
/// argument for this position.
#[derive(Debug, Clone)]
pub struct MethodParam {
    pub name: String,
    pub default: Option<Node>,
}

#[derive(Debug, Clone)]
pub struct RescueClause {
    /// Exception class names, tried in source order against the raised
    /// error's display string.
    pub classes: Vec<String>,
    pub body: Vec<Node>,
}

/// A syntax-tree node. The enum is closed: every kind the evaluator handles
/// is listed here, and an unhandled kind is unrepresentable by construction.
#[derive(Debug, Clone)]
pub enum Node {
    SimpleString(String),
    InterpolatedString(String),
    Boolean(bool),
    ConstantInt(i64),
    ConstantBignum(BigInt),
    ConstantFloat(f64),
    Symbol(String),
    BareReference(String),
    GlobalVariable(String),
    InstanceVariable(String),
    FileNameConstReference,
    Call {
        target: Option<Box<Node>>,
        name: String,
        args: Vec<Node>,
    },
    Assignment {
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    FuncDecl {
        /// True for `def self.name`, which attaches a module-function when
        /// the surrounding context is a module.
        on_self: bool,
        name: String,
        params: Vec<MethodParam>,
        body: Vec<Node>,
    },
    ClassDecl {
        name: String,
        superclass: Option<String>,
        body: Vec<Node>,
    },
    ModuleDecl {
        name: String,
        body: Vec<Node>,
    },
    Alias {
        to: String,
        from: String,
    },
    If {
        condition: Box<Node>,
        body: Vec<Node>,
        else_body: Vec<Node>,
    },
    Begin {
        body: Vec<Node>,
        rescues: Vec<RescueClause>,
    },
    Array(Vec<Node>),
    Hash(Vec<(Node, Node)>),
}

impl Node {
    /// A one-line rendering used for the parser trace buffer.
    pub fn summary(&self) -> String {
        match self {
            Node::SimpleString(s) => format!("string '{}'", s),
            Node::InterpolatedString(s) => format!("string \"{}\"", s),
            Node::Boolean(b) => format!("boolean {}", b),
            Node::ConstantInt(n) => format!("integer {}", n),
            Node::ConstantBignum(n) => format!("integer {}", n),
            Node::ConstantFloat(f) => format!("float {}", f),
            Node::Symbol(name) => format!("symbol :{}", name),
            Node::BareReference(name) => format!("reference {}", name),
            Node::GlobalVariable(name) => format!("global ${}", name),
            Node::InstanceVariable(name) => format!("ivar @{}", name),
            Node::FileNameConstReference => "__FILE__".to_string(),
            Node::Call { target, name, args } => {
                if target.is_some() {
                    format!("call .{}/{}", name, args.len())
                } else {
                    format!("call {}/{}", name, args.len())
                }
            }
            Node::Assignment { lhs, .. } => format!("assignment to {}", lhs.summary()),
            Node::FuncDecl { name, params, .. } => format!("def {}/{}", name, params.len()),
            Node::ClassDecl { name, .. } => format!("class {}", name),
            Node::ModuleDecl { name, .. } => format!("module {}", name),
            Node::Alias { to, from } => format!("alias {} {}", to, from),
            Node::If { .. } => "if".to_string(),
            Node::Begin { rescues, .. } => format!("begin/{} rescues", rescues.len()),
            Node::Array(items) => format!("array literal/{}", items.len()),
            Node::Hash(pairs) => format!("hash literal/{}", pairs.len()),
        }
    }
}
