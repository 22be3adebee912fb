use thiserror::Error;

use sunda_core::{Modifiers, TypeKind};

use crate::decl::{CompilationUnit, FieldDecl, ImportDecl, MethodDecl, TypeDecl, TypeUse};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message} at byte {position}")]
pub struct ParseError {
    message: String,
    position: usize,
}

impl ParseError {
    fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Package,
    Import,
    Class,
    Interface,
    Enum,
    Extends,
    Implements,
    Throws,
    Public,
    Protected,
    Private,
    Static,
    Final,
    Abstract,
    Native,
    Synchronized,
    Transient,
    Volatile,
    Strictfp,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Ident(String),
    Keyword(Keyword),
    /// String, character, or numeric literal. Lexed atomically so that
    /// brace matching in skipped bodies cannot be confused by literal text.
    Literal,
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Semi,
    Comma,
    Dot,
    Lt,
    Gt,
    At,
    Eq,
    Star,
    Other(u8),
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    kind: TokenKind,
    position: usize,
}

struct Lexer<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            input: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek2(&self) -> Option<u8> {
        self.input.get(self.pos + 1).copied()
    }

    fn skip_ws_and_comments(&mut self) -> Result<(), ParseError> {
        loop {
            while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r' | 0x0C)) {
                self.pos += 1;
            }

            if self.peek() == Some(b'/') && self.peek2() == Some(b'/') {
                self.pos += 2;
                while let Some(b) = self.peek() {
                    self.pos += 1;
                    if b == b'\n' {
                        break;
                    }
                }
                continue;
            }

            if self.peek() == Some(b'/') && self.peek2() == Some(b'*') {
                let start = self.pos;
                self.pos += 2;
                loop {
                    match (self.peek(), self.peek2()) {
                        (Some(b'*'), Some(b'/')) => {
                            self.pos += 2;
                            break;
                        }
                        (Some(_), _) => {
                            self.pos += 1;
                        }
                        (None, _) => {
                            return Err(ParseError::new("unterminated block comment", start));
                        }
                    }
                }
                continue;
            }

            return Ok(());
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_ws_and_comments()?;

        let position = self.pos;
        let Some(b) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                position,
            });
        };

        let kind = match b {
            b'{' => {
                self.pos += 1;
                TokenKind::LBrace
            }
            b'}' => {
                self.pos += 1;
                TokenKind::RBrace
            }
            b'(' => {
                self.pos += 1;
                TokenKind::LParen
            }
            b')' => {
                self.pos += 1;
                TokenKind::RParen
            }
            b'[' => {
                self.pos += 1;
                TokenKind::LBracket
            }
            b']' => {
                self.pos += 1;
                TokenKind::RBracket
            }
            b';' => {
                self.pos += 1;
                TokenKind::Semi
            }
            b',' => {
                self.pos += 1;
                TokenKind::Comma
            }
            b'.' => {
                self.pos += 1;
                TokenKind::Dot
            }
            b'<' => {
                self.pos += 1;
                TokenKind::Lt
            }
            b'>' => {
                self.pos += 1;
                TokenKind::Gt
            }
            b'@' => {
                self.pos += 1;
                TokenKind::At
            }
            b'=' => {
                self.pos += 1;
                TokenKind::Eq
            }
            b'*' => {
                self.pos += 1;
                TokenKind::Star
            }
            b'"' | b'\'' => {
                self.lex_quoted(b)?;
                TokenKind::Literal
            }
            b'0'..=b'9' => {
                self.lex_number();
                TokenKind::Literal
            }
            b if is_ident_start(b) => {
                let ident = self.lex_ident();
                match ident.as_str() {
                    "package" => TokenKind::Keyword(Keyword::Package),
                    "import" => TokenKind::Keyword(Keyword::Import),
                    "class" => TokenKind::Keyword(Keyword::Class),
                    "interface" => TokenKind::Keyword(Keyword::Interface),
                    "enum" => TokenKind::Keyword(Keyword::Enum),
                    "extends" => TokenKind::Keyword(Keyword::Extends),
                    "implements" => TokenKind::Keyword(Keyword::Implements),
                    "throws" => TokenKind::Keyword(Keyword::Throws),
                    "public" => TokenKind::Keyword(Keyword::Public),
                    "protected" => TokenKind::Keyword(Keyword::Protected),
                    "private" => TokenKind::Keyword(Keyword::Private),
                    "static" => TokenKind::Keyword(Keyword::Static),
                    "final" => TokenKind::Keyword(Keyword::Final),
                    "abstract" => TokenKind::Keyword(Keyword::Abstract),
                    "native" => TokenKind::Keyword(Keyword::Native),
                    "synchronized" => TokenKind::Keyword(Keyword::Synchronized),
                    "transient" => TokenKind::Keyword(Keyword::Transient),
                    "volatile" => TokenKind::Keyword(Keyword::Volatile),
                    "strictfp" => TokenKind::Keyword(Keyword::Strictfp),
                    "default" => TokenKind::Keyword(Keyword::Default),
                    _ => TokenKind::Ident(ident),
                }
            }
            other => {
                self.pos += 1;
                TokenKind::Other(other)
            }
        };

        Ok(Token { kind, position })
    }

    fn lex_ident(&mut self) -> String {
        let start = self.pos;
        self.pos += 1;
        while let Some(b) = self.peek() {
            if is_ident_part(b) {
                self.pos += 1;
            } else {
                break;
            }
        }
        // only ASCII bytes are consumed above, so this is always valid UTF-8
        String::from_utf8_lossy(&self.input[start..self.pos]).into_owned()
    }

    fn lex_quoted(&mut self, quote: u8) -> Result<(), ParseError> {
        let start = self.pos;
        self.pos += 1;
        while let Some(b) = self.peek() {
            self.pos += 1;
            if b == b'\\' {
                // escape: skip whatever follows, it can never close the literal
                if self.peek().is_some() {
                    self.pos += 1;
                }
                continue;
            }
            if b == quote {
                return Ok(());
            }
        }
        let what = if quote == b'"' {
            "unterminated string literal"
        } else {
            "unterminated character literal"
        };
        Err(ParseError::new(what, start))
    }

    fn lex_number(&mut self) {
        self.pos += 1;
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'.' | b'_' => self.pos += 1,
                // exponent sign, as in 1e-3
                b'+' | b'-' if matches!(self.input[self.pos - 1], b'e' | b'E' | b'p' | b'P') => {
                    self.pos += 1;
                }
                _ => break,
            }
        }
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_ident_part(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

fn modifier_flag(keyword: Keyword) -> Option<Modifiers> {
    Some(match keyword {
        Keyword::Public => Modifiers::PUBLIC,
        Keyword::Protected => Modifiers::PROTECTED,
        Keyword::Private => Modifiers::PRIVATE,
        Keyword::Static => Modifiers::STATIC,
        Keyword::Final => Modifiers::FINAL,
        Keyword::Abstract => Modifiers::ABSTRACT,
        Keyword::Native => Modifiers::NATIVE,
        Keyword::Synchronized => Modifiers::SYNCHRONIZED,
        Keyword::Transient => Modifiers::TRANSIENT,
        Keyword::Volatile => Modifiers::VOLATILE,
        Keyword::Strictfp => Modifiers::STRICTFP,
        Keyword::Default => Modifiers::DEFAULT,
        _ => return None,
    })
}

/// Nesting ceiling for type declarations. The parser recurses once per
/// level, so deeper input is rejected instead of exhausting the stack.
const MAX_TYPE_NESTING: usize = 128;

struct Parser<'a> {
    lexer: Lexer<'a>,
    cur: Token,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(src);
        let cur = lexer.next_token()?;
        Ok(Self { lexer, cur })
    }

    fn bump(&mut self) -> Result<(), ParseError> {
        self.cur = self.lexer.next_token()?;
        Ok(())
    }

    /// One-token lookahead without consuming anything.
    fn peek(&self) -> Result<Token, ParseError> {
        let mut lookahead = Lexer {
            input: self.lexer.input,
            pos: self.lexer.pos,
        };
        lookahead.next_token()
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.cur.position)
    }

    fn expect_punct(&mut self, expected: TokenKind) -> Result<(), ParseError> {
        if std::mem::discriminant(&self.cur.kind) == std::mem::discriminant(&expected) {
            self.bump()
        } else {
            Err(self.error(format!("expected {expected:?}")))
        }
    }

    fn expect_keyword(&mut self, expected: Keyword) -> Result<(), ParseError> {
        match &self.cur.kind {
            TokenKind::Keyword(k) if *k == expected => self.bump(),
            _ => Err(self.error(format!("expected keyword {expected:?}"))),
        }
    }

    fn expect_ident(&mut self) -> Result<String, ParseError> {
        match &self.cur.kind {
            TokenKind::Ident(id) => {
                let id = id.clone();
                self.bump()?;
                Ok(id)
            }
            _ => Err(self.error("expected identifier")),
        }
    }

    fn parse_dotted_name(&mut self) -> Result<String, ParseError> {
        let mut name = self.expect_ident()?;
        while matches!(self.cur.kind, TokenKind::Dot) {
            self.bump()?;
            let segment = self.expect_ident()?;
            name.push('.');
            name.push_str(&segment);
        }
        Ok(name)
    }

    fn parse_compilation_unit(&mut self) -> Result<CompilationUnit, ParseError> {
        let mut unit = CompilationUnit::default();

        // Annotations may precede the package declaration (package-info) or
        // the first type; either way they are skipped.
        while matches!(self.cur.kind, TokenKind::At) {
            if matches!(self.peek()?.kind, TokenKind::Keyword(Keyword::Interface)) {
                break;
            }
            self.skip_annotation()?;
        }

        if matches!(self.cur.kind, TokenKind::Keyword(Keyword::Package)) {
            self.bump()?;
            unit.package = Some(self.parse_dotted_name()?);
            self.expect_punct(TokenKind::Semi)?;
        }

        while matches!(self.cur.kind, TokenKind::Keyword(Keyword::Import)) {
            self.bump()?;
            let is_static = matches!(self.cur.kind, TokenKind::Keyword(Keyword::Static));
            if is_static {
                self.bump()?;
            }
            let import = self.parse_import_target()?;
            self.expect_punct(TokenKind::Semi)?;
            if !is_static {
                unit.imports.push(import);
            }
        }

        loop {
            match self.cur.kind {
                TokenKind::Eof => break,
                TokenKind::Semi => self.bump()?,
                _ => {
                    let modifiers = self.parse_modifiers()?;
                    unit.types.push(self.parse_type_decl(modifiers, 0)?);
                }
            }
        }

        Ok(unit)
    }

    fn parse_import_target(&mut self) -> Result<ImportDecl, ParseError> {
        let mut name = self.expect_ident()?;
        while matches!(self.cur.kind, TokenKind::Dot) {
            self.bump()?;
            match &self.cur.kind {
                TokenKind::Star => {
                    self.bump()?;
                    return Ok(ImportDecl::Wildcard(name));
                }
                TokenKind::Ident(segment) => {
                    let segment = segment.clone();
                    self.bump()?;
                    name.push('.');
                    name.push_str(&segment);
                }
                _ => return Err(self.error("expected identifier or `*` in import")),
            }
        }
        Ok(ImportDecl::Single(name))
    }

    /// Consumes modifier keywords and annotation uses in any order.
    /// Leaves `@` in place when it introduces an `@interface` declaration.
    fn parse_modifiers(&mut self) -> Result<Modifiers, ParseError> {
        let mut modifiers = Modifiers::empty();
        loop {
            match &self.cur.kind {
                TokenKind::Keyword(k) => {
                    let Some(flag) = modifier_flag(*k) else { break };
                    modifiers |= flag;
                    self.bump()?;
                }
                TokenKind::At => {
                    if matches!(self.peek()?.kind, TokenKind::Keyword(Keyword::Interface)) {
                        break;
                    }
                    self.skip_annotation()?;
                }
                _ => break,
            }
        }
        Ok(modifiers)
    }

    fn parse_type_decl(
        &mut self,
        modifiers: Modifiers,
        depth: usize,
    ) -> Result<TypeDecl, ParseError> {
        if depth >= MAX_TYPE_NESTING {
            return Err(self.error("type declarations nested too deeply"));
        }
        let kind = match self.cur.kind {
            TokenKind::Keyword(Keyword::Class) => {
                self.bump()?;
                TypeKind::Class
            }
            TokenKind::Keyword(Keyword::Interface) => {
                self.bump()?;
                TypeKind::Interface
            }
            TokenKind::Keyword(Keyword::Enum) => {
                self.bump()?;
                TypeKind::Enum
            }
            TokenKind::At => {
                self.bump()?;
                self.expect_keyword(Keyword::Interface)?;
                TypeKind::Annotation
            }
            _ => return Err(self.error("expected type declaration")),
        };

        let name = self.expect_ident()?;
        self.skip_type_arguments()?;

        let mut superclass = None;
        let mut interfaces = Vec::new();
        if matches!(self.cur.kind, TokenKind::Keyword(Keyword::Extends)) {
            self.bump()?;
            let first = self.parse_type_use()?;
            if kind.is_interface() {
                interfaces.push(first);
                while matches!(self.cur.kind, TokenKind::Comma) {
                    self.bump()?;
                    interfaces.push(self.parse_type_use()?);
                }
            } else {
                superclass = Some(first);
            }
        }
        if matches!(self.cur.kind, TokenKind::Keyword(Keyword::Implements)) {
            self.bump()?;
            interfaces.push(self.parse_type_use()?);
            while matches!(self.cur.kind, TokenKind::Comma) {
                self.bump()?;
                interfaces.push(self.parse_type_use()?);
            }
        }

        let mut decl = TypeDecl {
            kind,
            name,
            modifiers,
            superclass,
            interfaces,
            fields: Vec::new(),
            methods: Vec::new(),
            nested: Vec::new(),
        };

        self.expect_punct(TokenKind::LBrace)?;
        if kind == TypeKind::Enum {
            self.skip_enum_constants()?;
        }
        self.parse_members(&mut decl, depth)?;
        Ok(decl)
    }

    fn parse_members(&mut self, decl: &mut TypeDecl, depth: usize) -> Result<(), ParseError> {
        loop {
            match self.cur.kind {
                TokenKind::RBrace => {
                    self.bump()?;
                    return Ok(());
                }
                TokenKind::Eof => return Err(self.error("unexpected end of input in type body")),
                TokenKind::Semi => {
                    self.bump()?;
                    continue;
                }
                TokenKind::LBrace => {
                    // instance initializer
                    self.skip_brace_group()?;
                    continue;
                }
                _ => {}
            }

            let modifiers = self.parse_modifiers()?;

            // static initializer: `static { ... }`
            if matches!(self.cur.kind, TokenKind::LBrace) {
                self.skip_brace_group()?;
                continue;
            }

            if matches!(
                self.cur.kind,
                TokenKind::Keyword(Keyword::Class)
                    | TokenKind::Keyword(Keyword::Interface)
                    | TokenKind::Keyword(Keyword::Enum)
                    | TokenKind::At
            ) {
                decl.nested.push(self.parse_type_decl(modifiers, depth + 1)?);
                continue;
            }

            // type parameters of a generic method
            self.skip_type_arguments()?;

            let is_constructor = if let TokenKind::Ident(id) = &self.cur.kind {
                *id == decl.name && matches!(self.peek()?.kind, TokenKind::LParen)
            } else {
                false
            };
            if is_constructor {
                let name = self.expect_ident()?;
                let parameters = self.parse_parameter_list()?;
                self.finish_method()?;
                decl.methods.push(MethodDecl {
                    name,
                    modifiers,
                    return_type: None,
                    parameters,
                    is_constructor: true,
                });
                continue;
            }

            let ty = self.parse_type_use()?;
            let name = self.expect_ident()?;
            if matches!(self.cur.kind, TokenKind::LParen) {
                let parameters = self.parse_parameter_list()?;
                let extra_dims = self.finish_method()?;
                let mut return_type = ty;
                return_type.dims += extra_dims;
                decl.methods.push(MethodDecl {
                    name,
                    modifiers,
                    return_type: Some(return_type),
                    parameters,
                    is_constructor: false,
                });
            } else {
                self.finish_field(decl, ty, name, modifiers)?;
            }
        }
    }

    fn parse_parameter_list(&mut self) -> Result<Vec<TypeUse>, ParseError> {
        self.expect_punct(TokenKind::LParen)?;
        let mut parameters = Vec::new();
        if matches!(self.cur.kind, TokenKind::RParen) {
            self.bump()?;
            return Ok(parameters);
        }
        loop {
            loop {
                match &self.cur.kind {
                    TokenKind::Keyword(Keyword::Final) => self.bump()?,
                    TokenKind::At => self.skip_annotation()?,
                    _ => break,
                }
            }
            let mut ty = self.parse_type_use()?;
            if matches!(self.cur.kind, TokenKind::Dot) {
                // varargs: `...` adds one array dimension
                for _ in 0..3 {
                    self.expect_punct(TokenKind::Dot)?;
                }
                ty.dims += 1;
            }
            let _name = self.expect_ident()?;
            while matches!(self.cur.kind, TokenKind::LBracket) {
                self.bump()?;
                self.expect_punct(TokenKind::RBracket)?;
                ty.dims += 1;
            }
            parameters.push(ty);
            match self.cur.kind {
                TokenKind::Comma => self.bump()?,
                TokenKind::RParen => {
                    self.bump()?;
                    return Ok(parameters);
                }
                _ => return Err(self.error("expected `,` or `)` in parameter list")),
            }
        }
    }

    /// After the parameter list: archaic return-type dims, throws clause,
    /// annotation-member default, then the body or `;`. Returns the extra
    /// array dimensions to fold into the return type.
    fn finish_method(&mut self) -> Result<u32, ParseError> {
        let mut extra_dims = 0;
        while matches!(self.cur.kind, TokenKind::LBracket) {
            self.bump()?;
            self.expect_punct(TokenKind::RBracket)?;
            extra_dims += 1;
        }
        if matches!(self.cur.kind, TokenKind::Keyword(Keyword::Throws)) {
            self.bump()?;
            self.parse_dotted_name()?;
            while matches!(self.cur.kind, TokenKind::Comma) {
                self.bump()?;
                self.parse_dotted_name()?;
            }
        }
        if matches!(self.cur.kind, TokenKind::Keyword(Keyword::Default)) {
            self.skip_to_semi()?;
            return Ok(extra_dims);
        }
        match self.cur.kind {
            TokenKind::LBrace => self.skip_brace_group()?,
            TokenKind::Semi => self.bump()?,
            _ => return Err(self.error("expected method body or `;`")),
        }
        Ok(extra_dims)
    }

    fn finish_field(
        &mut self,
        decl: &mut TypeDecl,
        base: TypeUse,
        first_name: String,
        modifiers: Modifiers,
    ) -> Result<(), ParseError> {
        let mut name = first_name;
        loop {
            let mut ty = base.clone();
            while matches!(self.cur.kind, TokenKind::LBracket) {
                self.bump()?;
                self.expect_punct(TokenKind::RBracket)?;
                ty.dims += 1;
            }
            if matches!(self.cur.kind, TokenKind::Eq) {
                self.bump()?;
                self.skip_initializer()?;
            }
            decl.fields.push(FieldDecl {
                name,
                ty,
                modifiers,
            });
            match self.cur.kind {
                TokenKind::Comma => {
                    self.bump()?;
                    name = self.expect_ident()?;
                }
                TokenKind::Semi => {
                    self.bump()?;
                    return Ok(());
                }
                _ => return Err(self.error("expected `,` or `;` after field declaration")),
            }
        }
    }

    fn parse_type_use(&mut self) -> Result<TypeUse, ParseError> {
        let mut name = self.expect_ident()?;
        self.skip_type_arguments()?;
        while matches!(self.cur.kind, TokenKind::Dot) {
            if !matches!(self.peek()?.kind, TokenKind::Ident(_)) {
                break;
            }
            self.bump()?;
            let segment = self.expect_ident()?;
            name.push('.');
            name.push_str(&segment);
            self.skip_type_arguments()?;
        }
        let mut dims = 0;
        while matches!(self.cur.kind, TokenKind::LBracket) {
            self.bump()?;
            self.expect_punct(TokenKind::RBracket)?;
            dims += 1;
        }
        Ok(TypeUse { name, dims })
    }

    fn skip_annotation(&mut self) -> Result<(), ParseError> {
        self.expect_punct(TokenKind::At)?;
        self.parse_dotted_name()?;
        if matches!(self.cur.kind, TokenKind::LParen) {
            self.skip_paren_group()?;
        }
        Ok(())
    }

    fn skip_type_arguments(&mut self) -> Result<(), ParseError> {
        if !matches!(self.cur.kind, TokenKind::Lt) {
            return Ok(());
        }
        let start = self.cur.position;
        self.bump()?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.cur.kind {
                TokenKind::Lt => depth += 1,
                TokenKind::Gt => depth -= 1,
                TokenKind::Eof => return Err(ParseError::new("unbalanced type arguments", start)),
                _ => {}
            }
            self.bump()?;
        }
        Ok(())
    }

    fn skip_brace_group(&mut self) -> Result<(), ParseError> {
        let start = self.cur.position;
        self.expect_punct(TokenKind::LBrace)?;
        let mut depth = 1usize;
        loop {
            match self.cur.kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return self.bump();
                    }
                }
                TokenKind::Eof => return Err(ParseError::new("unbalanced braces", start)),
                _ => {}
            }
            self.bump()?;
        }
    }

    fn skip_paren_group(&mut self) -> Result<(), ParseError> {
        let start = self.cur.position;
        self.expect_punct(TokenKind::LParen)?;
        let mut depth = 1usize;
        loop {
            match self.cur.kind {
                TokenKind::LParen => depth += 1,
                TokenKind::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        return self.bump();
                    }
                }
                TokenKind::Eof => return Err(ParseError::new("unbalanced parentheses", start)),
                _ => {}
            }
            self.bump()?;
        }
    }

    fn skip_bracket_group(&mut self) -> Result<(), ParseError> {
        let start = self.cur.position;
        self.expect_punct(TokenKind::LBracket)?;
        let mut depth = 1usize;
        loop {
            match self.cur.kind {
                TokenKind::LBracket => depth += 1,
                TokenKind::RBracket => {
                    depth -= 1;
                    if depth == 0 {
                        return self.bump();
                    }
                }
                TokenKind::Eof => return Err(ParseError::new("unbalanced brackets", start)),
                _ => {}
            }
            self.bump()?;
        }
    }

    /// Skips a field initializer up to (not including) the `,` or `;` that
    /// ends the declarator. Commas inside generic arguments do not end it.
    /// A `<` with no matching `>` is a shift or comparison, not generics:
    /// the first comma seen under it is remembered, and the parser rewinds
    /// there once `;` arrives with the angles still open.
    fn skip_initializer(&mut self) -> Result<(), ParseError> {
        let start = self.cur.position;
        let mut angle_depth = 0usize;
        let mut comma_mark: Option<(usize, Token)> = None;
        loop {
            match self.cur.kind {
                TokenKind::Semi => {
                    if angle_depth > 0 {
                        if let Some((pos, token)) = comma_mark {
                            self.lexer.pos = pos;
                            self.cur = token;
                        }
                    }
                    return Ok(());
                }
                TokenKind::Comma if angle_depth == 0 => return Ok(()),
                TokenKind::Comma => {
                    if comma_mark.is_none() {
                        comma_mark = Some((self.lexer.pos, self.cur.clone()));
                    }
                    self.bump()?;
                }
                TokenKind::Lt => {
                    angle_depth += 1;
                    self.bump()?;
                }
                TokenKind::Gt => {
                    angle_depth = angle_depth.saturating_sub(1);
                    if angle_depth == 0 {
                        comma_mark = None;
                    }
                    self.bump()?;
                }
                TokenKind::LBrace => self.skip_brace_group()?,
                TokenKind::LParen => self.skip_paren_group()?,
                TokenKind::LBracket => self.skip_bracket_group()?,
                TokenKind::Eof => return Err(ParseError::new("unterminated field initializer", start)),
                _ => self.bump()?,
            }
        }
    }

    fn skip_to_semi(&mut self) -> Result<(), ParseError> {
        let start = self.cur.position;
        loop {
            match self.cur.kind {
                TokenKind::Semi => return self.bump(),
                TokenKind::LBrace => self.skip_brace_group()?,
                TokenKind::LParen => self.skip_paren_group()?,
                TokenKind::Eof => {
                    return Err(ParseError::new(
                        "unexpected end of input in member declaration",
                        start,
                    ))
                }
                _ => self.bump()?,
            }
        }
    }

    /// Consumes the enum constant section up to and including the `;` that
    /// separates it from ordinary members, or up to the closing brace.
    fn skip_enum_constants(&mut self) -> Result<(), ParseError> {
        loop {
            match &self.cur.kind {
                TokenKind::Semi => return self.bump(),
                TokenKind::RBrace => return Ok(()),
                TokenKind::Eof => return Err(self.error("unexpected end of input in enum body")),
                TokenKind::At => self.skip_annotation()?,
                TokenKind::Ident(_) => {
                    self.bump()?;
                    if matches!(self.cur.kind, TokenKind::LParen) {
                        self.skip_paren_group()?;
                    }
                    if matches!(self.cur.kind, TokenKind::LBrace) {
                        self.skip_brace_group()?;
                    }
                    if matches!(self.cur.kind, TokenKind::Comma) {
                        self.bump()?;
                    }
                }
                _ => return Err(self.error("unexpected token in enum constant list")),
            }
        }
    }
}

/// Parse one compilation unit into its declaration tree.
pub fn parse_unit(src: &str) -> Result<CompilationUnit, ParseError> {
    let mut parser = Parser::new(src)?;
    parser.parse_compilation_unit()
}
