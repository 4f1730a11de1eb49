use logos::Logos;

/// Span in source code (byte offsets)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn to(self, other: Span) -> Span {
        Span::new(self.start, other.end.max(self.start))
    }
}

/// A token with its span and the comments written right before it
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub span: Span,
    pub comments: String,
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    // === Keywords ===
    #[token("package")]
    Package,
    #[token("import")]
    Import,
    #[token("parcelable")]
    Parcelable,
    #[token("interface")]
    Interface,
    #[token("oneway")]
    Oneway,
    #[token("in")]
    In,
    #[token("out")]
    Out,
    #[token("inout")]
    InOut,
    #[token("const")]
    Const,
    #[token("cpp_header")]
    CppHeader,

    // === Literals ===
    /// Decimal integer, kept as written so range checks happen later
    #[regex(r"-?[0-9]+", |lex| lex.slice().to_string())]
    IntLiteral(String),

    #[regex(r"0[xX][0-9a-fA-F]+", |lex| lex.slice().to_string())]
    HexLiteral(String),

    /// String literal including its quotes
    #[regex(r#""[^"\n]*""#, |lex| lex.slice().to_string())]
    StringLiteral(String),

    // === Identifiers ===
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    // === Punctuation ===
    #[token(";")]
    Semi,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token("=")]
    Eq,
    #[token("@")]
    At,
    #[token(".")]
    Dot,

    // === Comments (folded into the next token by `Lexer`) ===
    #[regex(r"//[^\n]*", |lex| lex.slice().to_string())]
    LineComment(String),
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", |lex| lex.slice().to_string())]
    BlockComment(String),

    // === Special ===
    Eof,
}

impl Token {
    /// Source spelling of a keyword token, used by `Display`.
    pub fn keyword_text(&self) -> Option<&'static str> {
        match self {
            Token::Package => Some("package"),
            Token::Import => Some("import"),
            Token::Parcelable => Some("parcelable"),
            Token::Interface => Some("interface"),
            Token::Oneway => Some("oneway"),
            Token::In => Some("in"),
            Token::Out => Some("out"),
            Token::InOut => Some("inout"),
            Token::Const => Some("const"),
            Token::CppHeader => Some("cpp_header"),
            _ => None,
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::IntLiteral(s) | Token::HexLiteral(s) | Token::StringLiteral(s) => write!(f, "{}", s),
            Token::Ident(s) => write!(f, "{}", s),
            Token::LineComment(_) | Token::BlockComment(_) => write!(f, "comment"),
            Token::Semi => write!(f, ";"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Comma => write!(f, ","),
            Token::Eq => write!(f, "="),
            Token::At => write!(f, "@"),
            Token::Dot => write!(f, "."),
            Token::Eof => write!(f, "end of file"),
            keyword => write!(f, "{}", keyword.keyword_text().unwrap_or_default()),
        }
    }
}

/// Maps byte offsets to 1-based line and column numbers
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self { line_starts }
    }

    pub fn line_col(&self, offset: usize) -> (u32, u32) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let col = offset - self.line_starts[line];
        (line as u32 + 1, col as u32 + 1)
    }

    /// Inverse of `line_col`, clamped to the last known line
    pub fn offset(&self, line: u32, col: u32) -> usize {
        let line = (line.max(1) as usize - 1).min(self.line_starts.len() - 1);
        self.line_starts[line] + col.max(1) as usize - 1
    }
}

/// Lexer wrapper that produces SpannedTokens
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, Token>,
    finished: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            inner: Token::lexer(source),
            finished: false,
        }
    }

    /// Tokenize the entire source. Lexical errors are collected and the
    /// offending characters skipped, so the token stream always ends in `Eof`.
    pub fn tokenize(source: &str) -> (Vec<SpannedToken>, Vec<LexError>) {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        loop {
            match lexer.next_token() {
                Ok(spanned) => {
                    let is_eof = spanned.token == Token::Eof;
                    tokens.push(spanned);
                    if is_eof {
                        break;
                    }
                }
                Err(e) => errors.push(e),
            }
        }

        (tokens, errors)
    }

    pub fn next_token(&mut self) -> Result<SpannedToken, LexError> {
        let mut comments: Vec<String> = Vec::new();

        loop {
            if self.finished {
                let len = self.inner.source().len();
                return Ok(SpannedToken {
                    token: Token::Eof,
                    span: Span::new(len, len),
                    comments: comments.join("\n"),
                });
            }

            match self.inner.next() {
                Some(Ok(Token::LineComment(text))) | Some(Ok(Token::BlockComment(text))) => {
                    comments.push(text);
                }
                Some(Ok(token)) => {
                    let span = self.inner.span();
                    return Ok(SpannedToken {
                        token,
                        span: Span::new(span.start, span.end),
                        comments: comments.join("\n"),
                    });
                }
                Some(Err(())) => {
                    let span = self.inner.span();
                    let slice = self.inner.slice();
                    let message = if slice.starts_with('"') {
                        "unterminated string literal".to_string()
                    } else {
                        format!("unexpected character: '{}'", slice)
                    };
                    return Err(LexError {
                        message,
                        span: Span::new(span.start, span.end),
                    });
                }
                None => self.finished = true,
            }
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message} at {}..{}", span.start, span.end)]
pub struct LexError {
    pub message: String,
    pub span: Span,
}
