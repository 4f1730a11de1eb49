//! AIDL parser
//!
//! A `Parser` handles one .aidl unit in two phases. `parse_source` builds
//! the document, registers each declared type in the shared `Typenames`
//! and queues every type specifier it creates. `resolve` then resolves the
//! queue against the complete symbol table, after the caller has parsed
//! whatever the unit imports.

mod io;

pub use io::*;

use std::collections::HashSet;
use std::path::Path;
use std::rc::Rc;

use aidl_ast::*;
use aidl_lexer::{Lexer, LineIndex, Span, SpannedToken, Token};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy)]
pub struct ParserOptions {
    /// Direction given to arguments written without one
    pub default_direction: Direction,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self { default_direction: Direction::In }
    }
}

#[derive(Debug, Clone)]
struct ParseError {
    message: String,
    span: Span,
}

type ParseResult<T> = Result<T, ParseError>;

/// A type specifier waiting for the resolution pass
#[derive(Debug)]
struct DeferredResolution {
    id: TypeSpecId,
    name: String,
    location: Location,
}

pub struct Parser {
    options: ParserOptions,
    filename: Rc<str>,
    package: Option<QualifiedName>,
    document: Option<Document>,
    imports: Vec<Import>,
    /// Package and imports, kept after `release_imports`
    scope: UnitScope,
    deferred: Vec<DeferredResolution>,
    diagnostics: Diagnostics,
    tokens: Vec<SpannedToken>,
    pos: usize,
    lines: LineIndex,
}

impl Parser {
    pub fn new(options: ParserOptions) -> Self {
        Self {
            options,
            filename: Rc::from(""),
            package: None,
            document: None,
            imports: Vec::new(),
            scope: UnitScope::default(),
            deferred: Vec::new(),
            diagnostics: Diagnostics::new(),
            tokens: Vec::new(),
            pos: 0,
            lines: LineIndex::new(""),
        }
    }

    /// Read and parse one file. Returns false if reading failed or any
    /// error was reported.
    pub fn parse_file(&mut self, io: &dyn IoDelegate, filename: &Path, typenames: &mut Typenames) -> bool {
        match io.read_file(filename) {
            Ok(source) => self.parse_source(&filename.display().to_string(), &source, typenames),
            Err(err) => {
                self.filename = Rc::from(filename.display().to_string());
                self.diagnostics.error(filename, format!("error while opening file for parsing: {}", err));
                false
            }
        }
    }

    pub fn parse_source(&mut self, filename: &str, source: &str, typenames: &mut Typenames) -> bool {
        debug!(file = filename, "parsing");
        self.filename = Rc::from(filename);
        self.lines = LineIndex::new(source);

        let (tokens, lex_errors) = Lexer::tokenize(source);
        for err in lex_errors {
            let location = self.location(err.span);
            self.diagnostics.error(&location, err.message);
        }
        self.tokens = tokens;
        self.pos = 0;

        self.parse_unit(typenames);
        self.tokens.clear();

        debug!(
            file = filename,
            types = self.document.as_ref().map_or(0, |d| d.defined_types().len()),
            imports = self.imports.len(),
            errors = self.error_count(),
            "parsed"
        );
        self.error_count() == 0
    }

    /// Resolve every queued type specifier against the names this unit can
    /// see. Unresolvable names are reported in the order they were queued.
    pub fn resolve(&mut self, typenames: &Typenames) -> bool {
        let pending: HashSet<TypeSpecId> = self.deferred.iter().map(|d| d.id).collect();
        let mut failed = HashSet::new();
        let mut visited = 0usize;

        let scope = &self.scope;
        if let Some(document) = &mut self.document {
            document.for_each_type_specifier_mut(&mut |ts| {
                if !pending.contains(&ts.id()) {
                    return;
                }
                visited += 1;
                if !ts.resolve(typenames, scope) {
                    failed.insert(ts.id());
                }
            });
        }

        if visited != pending.len() {
            trace!(
                file = %self.filename,
                queued = pending.len(),
                visited,
                "some queued type specifiers are no longer in the document"
            );
        }

        for deferred in &self.deferred {
            if failed.contains(&deferred.id) {
                self.diagnostics.error(&deferred.location, format!("Failed to resolve '{}'", deferred.name));
            }
        }

        debug!(file = %self.filename, queued = pending.len(), failed = failed.len(), "resolved");
        failed.is_empty()
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn package(&self) -> Option<&QualifiedName> {
        self.package.as_ref()
    }

    pub fn split_package(&self) -> Vec<String> {
        self.package.as_ref().map(|p| p.terms().to_vec()).unwrap_or_default()
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn release_document(&mut self) -> Option<Document> {
        self.document.take()
    }

    pub fn scope(&self) -> &UnitScope {
        &self.scope
    }

    pub fn imports(&self) -> &[Import] {
        &self.imports
    }

    pub fn imports_mut(&mut self) -> &mut [Import] {
        &mut self.imports
    }

    pub fn release_imports(&mut self) -> Vec<Import> {
        std::mem::take(&mut self.imports)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.error_count()
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn take_diagnostics(&mut self) -> Diagnostics {
        std::mem::take(&mut self.diagnostics)
    }

    // === Token Access ===

    fn current(&self) -> &SpannedToken {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.current().token
    }

    fn peek_span(&self) -> Span {
        self.current().span
    }

    fn prev_span(&self) -> Span {
        let prev = self.pos.saturating_sub(1).min(self.tokens.len() - 1);
        self.tokens[prev].span
    }

    fn advance(&mut self) -> &SpannedToken {
        let idx = self.pos.min(self.tokens.len() - 1);
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        &self.tokens[idx]
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    fn check(&self, token: &Token) -> bool {
        std::mem::discriminant(self.peek()) == std::mem::discriminant(token)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> ParseResult<Span> {
        if self.check(&expected) {
            Ok(self.advance().span)
        } else {
            Err(self.unexpected(&format!("'{}'", expected)))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<(String, Span)> {
        match self.peek().clone() {
            Token::Ident(name) => Ok((name, self.advance().span)),
            _ => Err(self.unexpected("identifier")),
        }
    }

    fn unexpected(&self, what: &str) -> ParseError {
        ParseError {
            message: format!("syntax error: expected {}, found '{}'", what, self.peek()),
            span: self.peek_span(),
        }
    }

    fn location(&self, span: Span) -> Location {
        let (begin_line, begin_col) = self.lines.line_col(span.start);
        let (end_line, end_col) = self.lines.line_col(span.end);
        Location::new(
            self.filename.clone(),
            Point::new(begin_line, begin_col),
            Point::new(end_line, end_col),
        )
    }

    fn report(&mut self, err: ParseError) {
        let location = self.location(err.span);
        self.diagnostics.error(&location, err.message);
    }

    /// Skip past the declaration that failed: to a `;` at depth zero or to
    /// the brace that closes the current body.
    fn synchronize(&mut self) {
        let mut depth = 0usize;
        while !self.is_at_end() {
            match self.advance().token {
                Token::Semi if depth == 0 => return,
                Token::LBrace => depth += 1,
                Token::RBrace => {
                    if depth <= 1 {
                        return;
                    }
                    depth -= 1;
                }
                _ => {}
            }
        }
    }

    /// Skip to the end of a member or field, leaving a closing brace in place
    fn recover_member(&mut self) {
        while !self.is_at_end() && !self.check(&Token::RBrace) {
            if matches!(self.advance().token, Token::Semi) {
                return;
            }
        }
    }

    fn defer(&mut self, ty: &TypeSpecifier) {
        self.deferred.push(DeferredResolution {
            id: ty.id(),
            name: ty.unresolved_name().to_string(),
            location: ty.location().clone(),
        });
    }

    // === Parsing ===

    fn parse_unit(&mut self, typenames: &mut Typenames) {
        let mut document = Document::new();
        let mut seen_item = false;

        while !self.is_at_end() {
            let result = match self.peek() {
                Token::Package => self.parse_package(seen_item),
                Token::Import => {
                    seen_item = true;
                    self.parse_import()
                }
                _ => {
                    seen_item = true;
                    self.parse_decl().map(|ty| self.register(ty, typenames, &mut document))
                }
            };
            if let Err(err) = result {
                self.report(err);
                self.synchronize();
            }
        }

        self.document = Some(document);
    }

    fn register(&mut self, ty: DefinedType, typenames: &mut Typenames, document: &mut Document) {
        trace!(name = %ty.canonical_name(), kind = %ty.kind(), "registering");
        if !typenames.add_defined_type(&ty) {
            self.diagnostics.error(ty.location(), format!("redefinition of '{}'", ty.canonical_name()));
        }
        document.add(ty);
    }

    /// `after_items` is set once an import or declaration was seen; the
    /// package must come first.
    fn parse_package(&mut self, after_items: bool) -> ParseResult<()> {
        let comments = self.current().comments.clone();
        self.expect(Token::Package)?;
        let name = self.parse_qualified_name(comments)?;
        self.expect(Token::Semi)?;

        if after_items {
            let message = format!("package '{}' must be declared before any import or type", name.dot_name());
            self.diagnostics.error(name.location(), message);
            return Ok(());
        }
        if let Some(previous) = &self.package {
            let message = format!("package '{}' already declared as '{}'", name.dot_name(), previous.dot_name());
            self.diagnostics.error(name.location(), message);
            return Ok(());
        }
        self.scope = UnitScope::new(name.dot_name());
        self.package = Some(name);
        Ok(())
    }

    fn parse_import(&mut self) -> ParseResult<()> {
        let start = self.expect(Token::Import)?;
        let name = self.parse_qualified_name(String::new())?;
        let end = self.expect(Token::Semi)?;
        trace!(class = %name.dot_name(), "import");
        self.scope.add_import(name.dot_name());
        self.imports.push(Import::new(self.location(start.to(end)), name.dot_name()));
        Ok(())
    }

    fn parse_qualified_name(&mut self, comments: String) -> ParseResult<QualifiedName> {
        let (first, start) = self.expect_ident()?;
        let mut terms = Vec::new();
        let mut end = start;
        while self.eat(&Token::Dot) {
            let (term, span) = self.expect_ident()?;
            terms.push(term);
            end = span;
        }

        let mut name = QualifiedName::new(self.location(start.to(end)), first, comments);
        for term in terms {
            name.add_term(term);
        }
        Ok(name)
    }

    /// Unknown names are reported and dropped; parsing continues.
    fn parse_annotations(&mut self) -> ParseResult<Vec<Annotation>> {
        let mut annotations = Vec::new();
        while self.check(&Token::At) {
            let at = self.advance().span;
            let (name, end) = self.expect_ident()?;
            let location = self.location(at.to(end));
            match Annotation::parse(location.clone(), &name) {
                Some(annotation) => annotations.push(annotation),
                None => {
                    let message = format!(
                        "'{}' is not a recognized annotation. It must be one of: {}",
                        name,
                        Annotation::recognized_names().join(", ")
                    );
                    self.diagnostics.error(&location, message);
                }
            }
        }
        Ok(annotations)
    }

    fn parse_decl(&mut self) -> ParseResult<DefinedType> {
        let start = self.peek_span();
        let comments = self.current().comments.clone();
        let annotations = self.parse_annotations()?;

        let mut ty = match self.peek() {
            Token::Parcelable => self.parse_parcelable(start, comments)?,
            Token::Oneway | Token::Interface => self.parse_interface(start, comments)?,
            _ => return Err(self.unexpected("'parcelable' or 'interface'")),
        };
        ty.annotate(annotations);
        Ok(ty)
    }

    fn parse_parcelable(&mut self, start: Span, comments: String) -> ParseResult<DefinedType> {
        self.expect(Token::Parcelable)?;
        let name = self.parse_qualified_name(comments)?;

        if self.eat(&Token::LBrace) {
            if name.terms().len() > 1 {
                let message = format!("structured parcelable '{}' must not use a qualified name", name.dot_name());
                self.diagnostics.error(name.location(), message);
            }
            let fields = self.parse_fields();
            let end = self.expect(Token::RBrace)?;
            let location = self.location(start.to(end));
            return Ok(DefinedType::structured_parcelable(location, name, self.split_package(), fields));
        }

        let cpp_header = if self.eat(&Token::CppHeader) {
            match self.peek().clone() {
                Token::StringLiteral(header) => {
                    self.advance();
                    Some(header)
                }
                _ => return Err(self.unexpected("a header path string")),
            }
        } else {
            None
        };
        let end = self.expect(Token::Semi)?;
        let location = self.location(start.to(end));
        Ok(DefinedType::parcelable(location, name, self.split_package(), cpp_header))
    }

    fn parse_fields(&mut self) -> Vec<VariableDeclaration> {
        let mut fields = Vec::new();
        while !self.check(&Token::RBrace) && !self.is_at_end() {
            match self.parse_field() {
                Ok(field) => fields.push(field),
                Err(err) => {
                    self.report(err);
                    self.recover_member();
                }
            }
        }
        fields
    }

    fn parse_field(&mut self) -> ParseResult<VariableDeclaration> {
        let start = self.peek_span();
        let ty = self.parse_type(Vec::new())?;
        let (name, _) = self.expect_ident()?;
        let default_value = if self.eat(&Token::Eq) { Some(self.parse_constant()?) } else { None };
        let end = self.expect(Token::Semi)?;
        Ok(VariableDeclaration::new(self.location(start.to(end)), ty, name, default_value))
    }

    fn parse_interface(&mut self, start: Span, comments: String) -> ParseResult<DefinedType> {
        let oneway = self.eat(&Token::Oneway);
        self.expect(Token::Interface)?;
        let (name, _) = self.expect_ident()?;
        self.expect(Token::LBrace)?;

        let mut members = Vec::new();
        while !self.check(&Token::RBrace) && !self.is_at_end() {
            match self.parse_member() {
                Ok(member) => members.push(member),
                Err(err) => {
                    self.report(err);
                    self.recover_member();
                }
            }
        }
        let end = self.expect(Token::RBrace)?;

        let location = self.location(start.to(end));
        Ok(DefinedType::interface(location, name, comments, oneway, members, self.split_package()))
    }

    fn parse_member(&mut self) -> ParseResult<Member> {
        let start = self.peek_span();
        let comments = self.current().comments.clone();

        if self.eat(&Token::Const) {
            let ty = self.parse_type(Vec::new())?;
            let (name, _) = self.expect_ident()?;
            self.expect(Token::Eq)?;
            let value = self.parse_constant()?;
            let end = self.expect(Token::Semi)?;
            let location = self.location(start.to(end));
            return Ok(Member::ConstantDeclaration(ConstantDeclaration::new(location, ty, name, value, comments)));
        }

        let annotations = self.parse_annotations()?;
        let oneway = self.eat(&Token::Oneway);
        let return_type = self.parse_type(annotations)?;
        let (name, _) = self.expect_ident()?;

        self.expect(Token::LParen)?;
        let mut arguments = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                arguments.push(self.parse_argument()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(Token::RParen)?;

        let id = if self.eat(&Token::Eq) { self.parse_method_id()? } else { None };
        let end = self.expect(Token::Semi)?;
        let location = self.location(start.to(end));
        Ok(Member::Method(Method::new(location, oneway, return_type, name, arguments, comments, id)))
    }

    fn parse_method_id(&mut self) -> ParseResult<Option<i32>> {
        let span = self.peek_span();
        let Token::IntLiteral(text) = self.peek().clone() else {
            return Err(self.unexpected("an integer method id"));
        };
        self.advance();
        match text.parse::<i32>() {
            Ok(id) => Ok(Some(id)),
            Err(_) => {
                let location = self.location(span);
                self.diagnostics.error(&location, format!("invalid method id '{}'", text));
                Ok(None)
            }
        }
    }

    fn parse_argument(&mut self) -> ParseResult<Argument> {
        let start = self.peek_span();
        let direction = match self.peek() {
            Token::In => Some(Direction::In),
            Token::Out => Some(Direction::Out),
            Token::InOut => Some(Direction::InOut),
            _ => None,
        };
        if direction.is_some() {
            self.advance();
        }

        let ty = self.parse_type(Vec::new())?;
        let (name, end) = self.expect_ident()?;
        let var = VariableDeclaration::new(self.location(start.to(end)), ty, name, None);
        Ok(match direction {
            Some(direction) => Argument::new(direction, var),
            None => Argument::with_default_direction(var, self.options.default_direction),
        })
    }

    /// `leading` holds annotations already consumed in front of the type
    fn parse_type(&mut self, leading: Vec<Annotation>) -> ParseResult<TypeSpecifier> {
        let mut annotations = leading;
        let comments = self.current().comments.clone();
        annotations.extend(self.parse_annotations()?);

        let start = self.peek_span();
        let name = self.parse_qualified_name(String::new())?;

        let type_params = if self.eat(&Token::Lt) {
            let mut params = vec![self.parse_type(Vec::new())?];
            while self.eat(&Token::Comma) {
                params.push(self.parse_type(Vec::new())?);
            }
            self.expect(Token::Gt)?;
            Some(params)
        } else {
            None
        };

        let is_array = if self.eat(&Token::LBracket) {
            self.expect(Token::RBracket)?;
            true
        } else {
            false
        };

        let location = self.location(start.to(self.prev_span()));
        let mut ty = TypeSpecifier::new(location, name.dot_name(), is_array, type_params, comments);
        ty.annotate(annotations);
        self.defer(&ty);
        Ok(ty)
    }

    fn parse_constant(&mut self) -> ParseResult<ConstantValue> {
        let location = self.location(self.peek_span());
        let value = match self.peek() {
            Token::IntLiteral(text) => ConstantValue::parse_int(location, text),
            Token::HexLiteral(text) => ConstantValue::parse_hex(location, text),
            Token::StringLiteral(text) => ConstantValue::parse_string(location, text),
            _ => return Err(self.unexpected("a constant value")),
        };
        self.advance();
        Ok(value)
    }
}
