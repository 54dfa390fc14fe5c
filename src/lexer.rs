use num_bigint::BigInt;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Const(String),
    GlobalVar(String),
    IVar(String),
    SymbolLit(String),
    Int(i64),
    BigIntLit(BigInt),
    FloatLit(f64),
    SimpleStr(String),
    InterpStr(String),
    KwDef,
    KwEnd,
    KwClass,
    KwModule,
    KwIf,
    KwElse,
    KwThen,
    KwBegin,
    KwRescue,
    KwAlias,
    KwSelf,
    KwTrue,
    KwFalse,
    KwNil,
    KwFile,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Amp,
    Pipe,
    Lt,
    Gt,
    Le,
    Ge,
    EqEq,
    Spaceship,
    Shovel,
    Assign,
    FatArrow,
    Dot,
    Comma,
    Semicolon,
    Newline,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    /// Whether whitespace (or start of input) preceded this token. The parser
    /// uses it to tell indexing `xs[0]` from a paren-less array argument
    /// `puts [1, 2]`.
    pub spaced: bool,
}

pub struct Lexer {
    src: Vec<char>,
    pos: usize,
    line: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            src: input.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.kind == TokenKind::Eof;
            // Collapse runs of newlines into one separator.
            if token.kind == TokenKind::Newline
                && matches!(tokens.last().map(|t: &Token| &t.kind), Some(TokenKind::Newline))
            {
                if done {
                    break;
                }
                continue;
            }
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }

    fn next_token(&mut self) -> Token {
        let mut spaced = self.pos == 0;
        loop {
            let before = self.pos;
            self.skip_ws_and_comments();
            if self.pos > before {
                spaced = true;
            }
            let line = self.line;
            if self.pos >= self.src.len() {
                return Token {
                    kind: TokenKind::Eof,
                    line,
                    spaced,
                };
            }
            let ch = self.bump();
            let kind = match ch {
                '\n' => {
                    self.line += 1;
                    TokenKind::Newline
                }
                '0'..='9' => self.read_number(ch),
                '"' => TokenKind::InterpStr(self.read_double_quoted()),
                '\'' => TokenKind::SimpleStr(self.read_single_quoted()),
                '$' => {
                    if self.peek() == Some(':') {
                        self.pos += 1;
                        TokenKind::GlobalVar(":".to_string())
                    } else {
                        TokenKind::GlobalVar(self.read_ident())
                    }
                }
                '@' => TokenKind::IVar(self.read_ident()),
                ':' => {
                    if self
                        .peek()
                        .map(|c| c.is_ascii_alphabetic() || c == '_')
                        .unwrap_or(false)
                    {
                        TokenKind::SymbolLit(self.read_ident())
                    } else {
                        spaced = true;
                        continue;
                    }
                }
                '+' => TokenKind::Plus,
                '-' => TokenKind::Minus,
                '*' => TokenKind::Star,
                '/' => TokenKind::Slash,
                '%' => TokenKind::Percent,
                '&' => TokenKind::Amp,
                '|' => TokenKind::Pipe,
                '<' => {
                    if self.match_char('=') {
                        if self.match_char('>') {
                            TokenKind::Spaceship
                        } else {
                            TokenKind::Le
                        }
                    } else if self.match_char('<') {
                        TokenKind::Shovel
                    } else {
                        TokenKind::Lt
                    }
                }
                '>' => {
                    if self.match_char('=') {
                        TokenKind::Ge
                    } else {
                        TokenKind::Gt
                    }
                }
                '=' => {
                    if self.match_char('=') {
                        TokenKind::EqEq
                    } else if self.match_char('>') {
                        TokenKind::FatArrow
                    } else {
                        TokenKind::Assign
                    }
                }
                '.' => TokenKind::Dot,
                ',' => TokenKind::Comma,
                ';' => TokenKind::Semicolon,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '[' => TokenKind::LBracket,
                ']' => TokenKind::RBracket,
                '{' => TokenKind::LBrace,
                '}' => TokenKind::RBrace,
                _ => {
                    if ch.is_ascii_uppercase() {
                        let mut name = String::new();
                        name.push(ch);
                        name.push_str(&self.read_ident_plain());
                        TokenKind::Const(name)
                    } else if ch.is_ascii_alphabetic() || ch == '_' {
                        let mut name = String::new();
                        name.push(ch);
                        name.push_str(&self.read_ident());
                        match name.as_str() {
                            "def" => TokenKind::KwDef,
                            "end" => TokenKind::KwEnd,
                            "class" => TokenKind::KwClass,
                            "module" => TokenKind::KwModule,
                            "if" => TokenKind::KwIf,
                            "else" => TokenKind::KwElse,
                            "then" => TokenKind::KwThen,
                            "begin" => TokenKind::KwBegin,
                            "rescue" => TokenKind::KwRescue,
                            "alias" => TokenKind::KwAlias,
                            "self" => TokenKind::KwSelf,
                            "true" => TokenKind::KwTrue,
                            "false" => TokenKind::KwFalse,
                            "nil" => TokenKind::KwNil,
                            "__FILE__" => TokenKind::KwFile,
                            _ => TokenKind::Ident(name),
                        }
                    } else {
                        // Unknown characters are skipped rather than fatal;
                        // the parser reports the resulting shape mismatch.
                        spaced = true;
                        continue;
                    }
                }
            };
            return Token { kind, line, spaced };
        }
    }

    /// Identifier tail, allowing a trailing `?` or `!` (method-name style).
    fn read_ident(&mut self) -> String {
        let mut ident = self.read_ident_plain();
        if matches!(self.peek(), Some('?') | Some('!')) {
            ident.push(self.bump());
        }
        ident
    }

    fn read_ident_plain(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                ident.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        ident
    }

    fn read_number(&mut self, first: char) -> TokenKind {
        let mut digits = first.to_string();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                digits.push(c);
                self.pos += 1;
            } else if c == '_' {
                self.pos += 1;
            } else {
                break;
            }
        }
        // A dot starts a float only when a digit follows; `1.to_s` keeps the
        // dot as a method-call token.
        if self.peek() == Some('.')
            && self
                .peek_next()
                .map(|c| c.is_ascii_digit())
                .unwrap_or(false)
        {
            self.pos += 1;
            digits.push('.');
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    digits.push(c);
                    self.pos += 1;
                } else if c == '_' {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            return TokenKind::FloatLit(digits.parse::<f64>().unwrap_or(0.0));
        }
        match digits.parse::<i64>() {
            Ok(value) => TokenKind::Int(value),
            Err(_) => match digits.parse::<BigInt>() {
                Ok(big) => TokenKind::BigIntLit(big),
                Err(_) => TokenKind::Int(0),
            },
        }
    }

    fn read_double_quoted(&mut self) -> String {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            self.pos += 1;
            if c == '"' {
                break;
            }
            if c == '\n' {
                self.line += 1;
            }
            if c == '\\' {
                if let Some(n) = self.peek() {
                    self.pos += 1;
                    match n {
                        'n' => s.push('\n'),
                        't' => s.push('\t'),
                        '"' => s.push('"'),
                        '\\' => s.push('\\'),
                        _ => s.push(n),
                    }
                }
            } else {
                s.push(c);
            }
        }
        s
    }

    fn read_single_quoted(&mut self) -> String {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            self.pos += 1;
            if c == '\'' {
                break;
            }
            if c == '\n' {
                self.line += 1;
            }
            if c == '\\' {
                match self.peek() {
                    Some('\'') => {
                        self.pos += 1;
                        s.push('\'');
                    }
                    Some('\\') => {
                        self.pos += 1;
                        s.push('\\');
                    }
                    _ => s.push('\\'),
                }
            } else {
                s.push(c);
            }
        }
        s
    }

    fn skip_ws_and_comments(&mut self) {
        loop {
            while let Some(c) = self.peek() {
                if c.is_whitespace() && c != '\n' {
                    self.pos += 1;
                } else {
                    break;
                }
            }
            if self.peek() == Some('#') {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.pos += 1;
                }
                continue;
            }
            break;
        }
    }

    fn bump(&mut self) -> char {
        let c = self.src[self.pos];
        self.pos += 1;
        c
    }

    fn peek(&self) -> Option<char> {
        self.src.get(self.pos).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.src.get(self.pos + 1).copied()
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lexes_method_chain() {
        assert_eq!(
            kinds("Foo.new.bar"),
            vec![
                TokenKind::Const("Foo".to_string()),
                TokenKind::Dot,
                TokenKind::Ident("new".to_string()),
                TokenKind::Dot,
                TokenKind::Ident("bar".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_int_followed_by_method_call() {
        assert_eq!(
            kinds("1.to_s"),
            vec![
                TokenKind::Int(1),
                TokenKind::Dot,
                TokenKind::Ident("to_s".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_float_literal() {
        assert_eq!(
            kinds("3.25"),
            vec![TokenKind::FloatLit(3.25), TokenKind::Eof]
        );
    }

    #[test]
    fn promotes_huge_integer_literal() {
        let toks = kinds("123456789012345678901234567890");
        match &toks[0] {
            TokenKind::BigIntLit(n) => {
                assert_eq!(n.to_string(), "123456789012345678901234567890");
            }
            other => panic!("expected bignum literal, got {:?}", other),
        }
    }

    #[test]
    fn lexes_spaceship_and_shovel() {
        assert_eq!(
            kinds("a <=> b << c <= d"),
            vec![
                TokenKind::Ident("a".to_string()),
                TokenKind::Spaceship,
                TokenKind::Ident("b".to_string()),
                TokenKind::Shovel,
                TokenKind::Ident("c".to_string()),
                TokenKind::Le,
                TokenKind::Ident("d".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lexes_symbols_and_globals() {
        assert_eq!(
            kinds(":foo $LOAD_PATH $:"),
            vec![
                TokenKind::SymbolLit("foo".to_string()),
                TokenKind::GlobalVar("LOAD_PATH".to_string()),
                TokenKind::GlobalVar(":".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn question_mark_idents() {
        assert_eq!(
            kinds("empty? respond_to?"),
            vec![
                TokenKind::Ident("empty?".to_string()),
                TokenKind::Ident("respond_to?".to_string()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn comments_and_newlines_collapse() {
        assert_eq!(
            kinds("1 # one\n\n\n2"),
            vec![
                TokenKind::Int(1),
                TokenKind::Newline,
                TokenKind::Int(2),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(
            kinds(r#""a\nb" 'c\'d'"#),
            vec![
                TokenKind::InterpStr("a\nb".to_string()),
                TokenKind::SimpleStr("c'd".to_string()),
                TokenKind::Eof,
            ]
        );
    }
}
