use crate::ast::{MethodParam, Node, RescueClause};
use crate::lexer::{Token, TokenKind};
use crate::value::RuntimeError;

/// Recursive-descent parser producing the statement list the evaluator walks.
/// Every successfully parsed statement is recorded in a trace buffer; on a
/// parse failure the host reports the tail of that buffer.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    trace: Vec<String>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            trace: Vec::new(),
        }
    }

    pub fn take_trace(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace)
    }

    pub fn parse_program(&mut self) -> Result<Vec<Node>, RuntimeError> {
        let body = self.parse_body(|kind| matches!(kind, TokenKind::Eof))?;
        self.expect(TokenKind::Eof, "end of input")?;
        Ok(body)
    }

    fn parse_body(
        &mut self,
        stop: fn(&TokenKind) -> bool,
    ) -> Result<Vec<Node>, RuntimeError> {
        let mut stmts = Vec::new();
        loop {
            self.skip_separators();
            if stop(self.peek_kind()) || matches!(self.peek_kind(), TokenKind::Eof) {
                break;
            }
            let stmt = self.parse_stmt()?;
            self.trace.push(stmt.summary());
            stmts.push(stmt);
        }
        Ok(stmts)
    }

    fn parse_stmt(&mut self) -> Result<Node, RuntimeError> {
        match self.peek_kind() {
            TokenKind::KwClass => self.parse_class_decl(),
            TokenKind::KwModule => self.parse_module_decl(),
            TokenKind::KwDef => self.parse_func_decl(),
            TokenKind::KwAlias => self.parse_alias(),
            TokenKind::KwIf => self.parse_if(),
            TokenKind::KwBegin => self.parse_begin(),
            _ => self.parse_expr(),
        }
    }

    fn parse_class_decl(&mut self) -> Result<Node, RuntimeError> {
        self.advance(); // class
        let name = self.expect_const("class name")?;
        let superclass = if self.match_kind(&TokenKind::Lt) {
            Some(self.expect_const("superclass name")?)
        } else {
            None
        };
        let body = self.parse_body(|kind| matches!(kind, TokenKind::KwEnd))?;
        self.expect(TokenKind::KwEnd, "'end' closing class body")?;
        Ok(Node::ClassDecl {
            name,
            superclass,
            body,
        })
    }

    fn parse_module_decl(&mut self) -> Result<Node, RuntimeError> {
        self.advance(); // module
        let name = self.expect_const("module name")?;
        let body = self.parse_body(|kind| matches!(kind, TokenKind::KwEnd))?;
        self.expect(TokenKind::KwEnd, "'end' closing module body")?;
        Ok(Node::ModuleDecl { name, body })
    }

    fn parse_func_decl(&mut self) -> Result<Node, RuntimeError> {
        self.advance(); // def
        let on_self = if matches!(self.peek_kind(), TokenKind::KwSelf)
            && matches!(self.peek_next_kind(), Some(TokenKind::Dot))
        {
            self.advance();
            self.advance();
            true
        } else {
            false
        };
        let name = self.method_name("method name after 'def'")?;
        let mut params = Vec::new();
        if self.match_kind(&TokenKind::LParen) {
            self.skip_newlines();
            while !matches!(self.peek_kind(), TokenKind::RParen | TokenKind::Eof) {
                let param_name = self.expect_ident("parameter name")?;
                let default = if self.match_kind(&TokenKind::Assign) {
                    Some(self.parse_expr()?)
                } else {
                    None
                };
                params.push(MethodParam {
                    name: param_name,
                    default,
                });
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
                self.skip_newlines();
            }
            self.expect(TokenKind::RParen, "')' closing parameter list")?;
        }
        let body = self.parse_body(|kind| matches!(kind, TokenKind::KwEnd))?;
        self.expect(TokenKind::KwEnd, "'end' closing method body")?;
        Ok(Node::FuncDecl {
            on_self,
            name,
            params,
            body,
        })
    }

    fn parse_alias(&mut self) -> Result<Node, RuntimeError> {
        self.advance(); // alias
        let to = self.method_name("alias target name")?;
        let from = self.method_name("alias source name")?;
        Ok(Node::Alias { to, from })
    }

    fn parse_if(&mut self) -> Result<Node, RuntimeError> {
        self.advance(); // if
        let condition = Box::new(self.parse_expr()?);
        self.match_kind(&TokenKind::KwThen);
        let body = self.parse_body(|kind| matches!(kind, TokenKind::KwElse | TokenKind::KwEnd))?;
        let else_body = if self.match_kind(&TokenKind::KwElse) {
            self.parse_body(|kind| matches!(kind, TokenKind::KwEnd))?
        } else {
            Vec::new()
        };
        self.expect(TokenKind::KwEnd, "'end' closing if")?;
        Ok(Node::If {
            condition,
            body,
            else_body,
        })
    }

    fn parse_begin(&mut self) -> Result<Node, RuntimeError> {
        self.advance(); // begin
        let body =
            self.parse_body(|kind| matches!(kind, TokenKind::KwRescue | TokenKind::KwEnd))?;
        let mut rescues = Vec::new();
        while self.match_kind(&TokenKind::KwRescue) {
            let mut classes = Vec::new();
            while let TokenKind::Const(name) = self.peek_kind() {
                classes.push(name.clone());
                self.advance();
                if !self.match_kind(&TokenKind::Comma) {
                    break;
                }
            }
            let rescue_body =
                self.parse_body(|kind| matches!(kind, TokenKind::KwRescue | TokenKind::KwEnd))?;
            rescues.push(RescueClause {
                classes,
                body: rescue_body,
            });
        }
        self.expect(TokenKind::KwEnd, "'end' closing begin")?;
        Ok(Node::Begin { body, rescues })
    }

    fn parse_expr(&mut self) -> Result<Node, RuntimeError> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Result<Node, RuntimeError> {
        let lhs = self.parse_boolean()?;
        if self.match_kind(&TokenKind::Assign) {
            let rhs = self.parse_assignment()?;
            return match lhs {
                // `h[k] = v` is sugar for the `[]=` method call.
                Node::Call {
                    target: Some(target),
                    name,
                    mut args,
                } if name == "[]" => {
                    args.push(rhs);
                    Ok(Node::Call {
                        target: Some(target),
                        name: "[]=".to_string(),
                        args,
                    })
                }
                Node::Call { .. } => Err(self.error_here("invalid assignment target")),
                other => Ok(Node::Assignment {
                    lhs: Box::new(other),
                    rhs: Box::new(rhs),
                }),
            };
        }
        Ok(lhs)
    }

    fn parse_boolean(&mut self) -> Result<Node, RuntimeError> {
        let mut expr = self.parse_equality()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Amp => "&",
                TokenKind::Pipe => "|",
                _ => break,
            };
            self.advance();
            let rhs = self.parse_equality()?;
            expr = binary_call(expr, op, rhs);
        }
        Ok(expr)
    }

    fn parse_equality(&mut self) -> Result<Node, RuntimeError> {
        let mut expr = self.parse_comparison()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEq => "==",
                TokenKind::Spaceship => "<=>",
                _ => break,
            };
            self.advance();
            let rhs = self.parse_comparison()?;
            expr = binary_call(expr, op, rhs);
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> Result<Node, RuntimeError> {
        let mut expr = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Lt => "<",
                TokenKind::Gt => ">",
                TokenKind::Le => "<=",
                TokenKind::Ge => ">=",
                _ => break,
            };
            self.advance();
            let rhs = self.parse_additive()?;
            expr = binary_call(expr, op, rhs);
        }
        Ok(expr)
    }

    fn parse_additive(&mut self) -> Result<Node, RuntimeError> {
        let mut expr = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => "+",
                TokenKind::Minus => "-",
                TokenKind::Shovel => "<<",
                _ => break,
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            expr = binary_call(expr, op, rhs);
        }
        Ok(expr)
    }

    fn parse_multiplicative(&mut self) -> Result<Node, RuntimeError> {
        let mut expr = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => "*",
                TokenKind::Slash => "/",
                TokenKind::Percent => "%",
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            expr = binary_call(expr, op, rhs);
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Node, RuntimeError> {
        if self.match_kind(&TokenKind::Minus) {
            let operand = self.parse_unary()?;
            return match operand {
                Node::ConstantInt(n) => Ok(Node::ConstantInt(-n)),
                Node::ConstantBignum(n) => Ok(Node::ConstantBignum(-n)),
                Node::ConstantFloat(f) => Ok(Node::ConstantFloat(-f)),
                _ => Err(self.error_here("unary minus is only supported on numeric literals")),
            };
        }
        let primary = self.parse_primary()?;
        self.parse_postfix(primary)
    }

    fn parse_postfix(&mut self, mut expr: Node) -> Result<Node, RuntimeError> {
        loop {
            if self.match_kind(&TokenKind::Dot) {
                let name = self.method_name("method name after '.'")?;
                let args = if self.match_kind(&TokenKind::LParen) {
                    self.parse_paren_args()?
                } else {
                    Vec::new()
                };
                expr = Node::Call {
                    target: Some(Box::new(expr)),
                    name,
                    args,
                };
                continue;
            }
            if self.match_kind(&TokenKind::LBracket) {
                let index = self.parse_expr()?;
                self.expect(TokenKind::RBracket, "']' closing index")?;
                expr = Node::Call {
                    target: Some(Box::new(expr)),
                    name: "[]".to_string(),
                    args: vec![index],
                };
                continue;
            }
            break;
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Node, RuntimeError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Int(n) => Ok(Node::ConstantInt(n)),
            TokenKind::BigIntLit(n) => Ok(Node::ConstantBignum(n)),
            TokenKind::FloatLit(f) => Ok(Node::ConstantFloat(f)),
            TokenKind::SimpleStr(s) => Ok(Node::SimpleString(s)),
            TokenKind::InterpStr(s) => Ok(Node::InterpolatedString(s)),
            TokenKind::SymbolLit(name) => Ok(Node::Symbol(name)),
            TokenKind::KwTrue => Ok(Node::Boolean(true)),
            TokenKind::KwFalse => Ok(Node::Boolean(false)),
            // `nil` evaluates through the bare-name path; the conditional
            // evaluator relies on seeing it as a reference named "nil".
            TokenKind::KwNil => Ok(Node::BareReference("nil".to_string())),
            TokenKind::KwFile => Ok(Node::FileNameConstReference),
            TokenKind::GlobalVar(name) => Ok(Node::GlobalVariable(name)),
            TokenKind::IVar(name) => Ok(Node::InstanceVariable(name)),
            TokenKind::Const(name) => Ok(Node::BareReference(name)),
            TokenKind::Ident(name) => {
                if self.match_kind(&TokenKind::LParen) {
                    let args = self.parse_paren_args()?;
                    return Ok(Node::Call {
                        target: None,
                        name,
                        args,
                    });
                }
                // `xs[0]` indexes; only a spaced bracket (`puts [1, 2]`)
                // starts a paren-less argument list.
                let unspaced_index =
                    matches!(self.peek_kind(), TokenKind::LBracket) && !self.peek_spaced();
                if !unspaced_index && starts_argument(self.peek_kind()) {
                    let mut args = vec![self.parse_expr()?];
                    while self.match_kind(&TokenKind::Comma) {
                        self.skip_newlines();
                        args.push(self.parse_expr()?);
                    }
                    return Ok(Node::Call {
                        target: None,
                        name,
                        args,
                    });
                }
                Ok(Node::BareReference(name))
            }
            TokenKind::LParen => {
                self.skip_newlines();
                let expr = self.parse_expr()?;
                self.skip_newlines();
                self.expect(TokenKind::RParen, "')' closing group")?;
                Ok(expr)
            }
            TokenKind::LBracket => {
                self.skip_newlines();
                let mut items = Vec::new();
                if !matches!(self.peek_kind(), TokenKind::RBracket) {
                    items.push(self.parse_expr()?);
                    while self.match_kind(&TokenKind::Comma) {
                        self.skip_newlines();
                        items.push(self.parse_expr()?);
                    }
                }
                self.skip_newlines();
                self.expect(TokenKind::RBracket, "']' closing array literal")?;
                Ok(Node::Array(items))
            }
            TokenKind::LBrace => {
                self.skip_newlines();
                let mut pairs = Vec::new();
                if !matches!(self.peek_kind(), TokenKind::RBrace) {
                    loop {
                        let key = self.parse_expr()?;
                        self.expect(TokenKind::FatArrow, "'=>' in hash literal")?;
                        let value = self.parse_expr()?;
                        pairs.push((key, value));
                        if !self.match_kind(&TokenKind::Comma) {
                            break;
                        }
                        self.skip_newlines();
                    }
                }
                self.skip_newlines();
                self.expect(TokenKind::RBrace, "'}' closing hash literal")?;
                Ok(Node::Hash(pairs))
            }
            other => Err(RuntimeError::parse_error(format!(
                "line {}: unexpected {:?} in expression",
                token.line, other
            ))),
        }
    }

    fn parse_paren_args(&mut self) -> Result<Vec<Node>, RuntimeError> {
        self.skip_newlines();
        let mut args = Vec::new();
        if !matches!(self.peek_kind(), TokenKind::RParen) {
            args.push(self.parse_expr()?);
            while self.match_kind(&TokenKind::Comma) {
                self.skip_newlines();
                args.push(self.parse_expr()?);
            }
        }
        self.skip_newlines();
        self.expect(TokenKind::RParen, "')' closing argument list")?;
        Ok(args)
    }

    fn method_name(&mut self, what: &str) -> Result<String, RuntimeError> {
        let token = self.advance();
        let name = match token.kind {
            TokenKind::Ident(name) => name,
            TokenKind::SymbolLit(name) => name,
            TokenKind::KwClass => "class".to_string(),
            TokenKind::Plus => "+".to_string(),
            TokenKind::Minus => "-".to_string(),
            TokenKind::Star => "*".to_string(),
            TokenKind::Slash => "/".to_string(),
            TokenKind::Percent => "%".to_string(),
            TokenKind::Lt => "<".to_string(),
            TokenKind::Gt => ">".to_string(),
            TokenKind::Le => "<=".to_string(),
            TokenKind::Ge => ">=".to_string(),
            TokenKind::EqEq => "==".to_string(),
            TokenKind::Spaceship => "<=>".to_string(),
            TokenKind::Shovel => "<<".to_string(),
            TokenKind::Amp => "&".to_string(),
            TokenKind::Pipe => "|".to_string(),
            other => {
                return Err(RuntimeError::parse_error(format!(
                    "line {}: expected {}, found {:?}",
                    token.line, what, other
                )));
            }
        };
        Ok(name)
    }

    fn expect_const(&mut self, what: &str) -> Result<String, RuntimeError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Const(name) => Ok(name),
            other => Err(RuntimeError::parse_error(format!(
                "line {}: expected {}, found {:?}",
                token.line, what, other
            ))),
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, RuntimeError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Ident(name) => Ok(name),
            other => Err(RuntimeError::parse_error(format!(
                "line {}: expected {}, found {:?}",
                token.line, what, other
            ))),
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), RuntimeError> {
        let token = self.advance();
        if token.kind == kind {
            Ok(())
        } else {
            Err(RuntimeError::parse_error(format!(
                "line {}: expected {}, found {:?}",
                token.line, what, token.kind
            )))
        }
    }

    fn error_here(&self, message: &str) -> RuntimeError {
        let line = self
            .tokens
            .get(self.pos.min(self.tokens.len().saturating_sub(1)))
            .map(|t| t.line)
            .unwrap_or(0);
        RuntimeError::parse_error(format!("line {}: {}", line, message))
    }

    fn skip_separators(&mut self) {
        while matches!(
            self.peek_kind(),
            TokenKind::Newline | TokenKind::Semicolon
        ) {
            self.advance();
        }
    }

    fn skip_newlines(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Newline) {
            self.advance();
        }
    }

    fn peek_kind(&self) -> &TokenKind {
        self.tokens
            .get(self.pos)
            .map(|t| &t.kind)
            .unwrap_or(&TokenKind::Eof)
    }

    fn peek_next_kind(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos + 1).map(|t| &t.kind)
    }

    fn peek_spaced(&self) -> bool {
        self.tokens.get(self.pos).map(|t| t.spaced).unwrap_or(false)
    }

    fn match_kind(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn advance(&mut self) -> Token {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .unwrap_or(Token {
                kind: TokenKind::Eof,
                line: 0,
                spaced: false,
            });
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }
}

fn binary_call(lhs: Node, op: &str, rhs: Node) -> Node {
    Node::Call {
        target: Some(Box::new(lhs)),
        name: op.to_string(),
        args: vec![rhs],
    }
}

/// Tokens that may begin a paren-less call argument. Operators are excluded
/// so `a - b` stays a binary expression rather than `a(-b)`.
fn starts_argument(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Int(_)
            | TokenKind::BigIntLit(_)
            | TokenKind::FloatLit(_)
            | TokenKind::SimpleStr(_)
            | TokenKind::InterpStr(_)
            | TokenKind::SymbolLit(_)
            | TokenKind::Const(_)
            | TokenKind::Ident(_)
            | TokenKind::GlobalVar(_)
            | TokenKind::IVar(_)
            | TokenKind::KwTrue
            | TokenKind::KwFalse
            | TokenKind::KwNil
            | TokenKind::KwFile
            | TokenKind::LBracket
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(input: &str) -> Vec<Node> {
        Parser::new(Lexer::new(input).tokenize())
            .parse_program()
            .expect("parse")
    }

    #[test]
    fn parses_class_with_method() {
        let nodes = parse("class Foo\n  def bar\n    1\n  end\nend");
        assert_eq!(nodes.len(), 1);
        match &nodes[0] {
            Node::ClassDecl { name, body, .. } => {
                assert_eq!(name, "Foo");
                assert_eq!(body.len(), 1);
                assert!(matches!(&body[0], Node::FuncDecl { name, .. } if name == "bar"));
            }
            other => panic!("expected class decl, got {:?}", other),
        }
    }

    #[test]
    fn parses_method_chain_as_nested_calls() {
        let nodes = parse("Foo.new.bar");
        match &nodes[0] {
            Node::Call { target, name, args } => {
                assert_eq!(name, "bar");
                assert!(args.is_empty());
                match target.as_deref() {
                    Some(Node::Call { target, name, .. }) => {
                        assert_eq!(name, "new");
                        assert!(matches!(
                            target.as_deref(),
                            Some(Node::BareReference(n)) if n == "Foo"
                        ));
                    }
                    other => panic!("expected inner call, got {:?}", other),
                }
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn parses_parenless_call_arguments() {
        let nodes = parse("puts \"hi\", 2");
        match &nodes[0] {
            Node::Call { target, name, args } => {
                assert!(target.is_none());
                assert_eq!(name, "puts");
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn bare_identifier_is_a_reference_not_a_call() {
        let nodes = parse("qux");
        assert!(matches!(&nodes[0], Node::BareReference(n) if n == "qux"));
    }

    #[test]
    fn binary_operators_become_method_calls() {
        let nodes = parse("1 + 2 * 3");
        match &nodes[0] {
            Node::Call { name, args, .. } => {
                assert_eq!(name, "+");
                assert!(matches!(&args[0], Node::Call { name, .. } if name == "*"));
            }
            other => panic!("expected call, got {:?}", other),
        }
    }

    #[test]
    fn parses_begin_rescue_clauses() {
        let nodes = parse("begin\n  raise \"Boom\"\nrescue Boom, Other\n  42\nrescue Last\n  7\nend");
        match &nodes[0] {
            Node::Begin { body, rescues } => {
                assert_eq!(body.len(), 1);
                assert_eq!(rescues.len(), 2);
                assert_eq!(rescues[0].classes, vec!["Boom", "Other"]);
                assert_eq!(rescues[1].classes, vec!["Last"]);
            }
            other => panic!("expected begin, got {:?}", other),
        }
    }

    #[test]
    fn parses_hash_literal() {
        let nodes = parse("{ :a => 1, \"b\" => 2 }");
        match &nodes[0] {
            Node::Hash(pairs) => assert_eq!(pairs.len(), 2),
            other => panic!("expected hash, got {:?}", other),
        }
    }

    #[test]
    fn unspaced_bracket_indexes_and_spaced_bracket_is_an_argument() {
        let nodes = parse("xs[0]");
        match &nodes[0] {
            Node::Call { target, name, .. } => {
                assert_eq!(name, "[]");
                assert!(matches!(
                    target.as_deref(),
                    Some(Node::BareReference(n)) if n == "xs"
                ));
            }
            other => panic!("expected index call, got {:?}", other),
        }

        let nodes = parse("puts [1, 2]");
        match &nodes[0] {
            Node::Call { target, name, args } => {
                assert!(target.is_none());
                assert_eq!(name, "puts");
                assert!(matches!(&args[0], Node::Array(items) if items.len() == 2));
            }
            other => panic!("expected parenless call, got {:?}", other),
        }
    }

    #[test]
    fn index_assignment_becomes_element_set_call() {
        let nodes = parse("h[1] = 2");
        match &nodes[0] {
            Node::Call { name, args, .. } => {
                assert_eq!(name, "[]=");
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected []= call, got {:?}", other),
        }
    }

    #[test]
    fn negative_literal_folds() {
        let nodes = parse("-5");
        assert!(matches!(&nodes[0], Node::ConstantInt(-5)));
    }

    #[test]
    fn def_self_marks_module_function() {
        let nodes = parse("module M\n  def self.pid\n    1\n  end\nend");
        match &nodes[0] {
            Node::ModuleDecl { body, .. } => {
                assert!(matches!(&body[0], Node::FuncDecl { on_self: true, .. }));
            }
            other => panic!("expected module decl, got {:?}", other),
        }
    }

    #[test]
    fn records_a_trace_entry_per_statement() {
        let mut parser = Parser::new(Lexer::new("1\n2\n3").tokenize());
        parser.parse_program().expect("parse");
        assert_eq!(parser.take_trace().len(), 3);
    }

    #[test]
    fn parse_error_on_unclosed_class() {
        let result = Parser::new(Lexer::new("class Foo\n def bar\n end").tokenize())
            .parse_program();
        assert!(result.is_err());
    }
}
