//! Template engine implementation

use crate::helpers::Helpers;
use crate::template::error::TemplateError;
use std::fmt;
use toml::Value;

/// Name under which the length parameter is exposed to templates
pub const LENGTH_KEY: &str = "Length";

/// Template context holding TOML data for rendering
#[derive(Debug, Clone)]
pub struct TemplateContext {
    data: Value,
}

impl TemplateContext {
    /// Create a new template context from TOML value
    pub fn new(data: Value) -> Self {
        Self { data }
    }

    /// Context exposing only `Length`
    pub fn with_length(length: u32) -> Self {
        let mut table = toml::map::Map::new();
        table.insert(LENGTH_KEY.to_string(), Value::Integer(i64::from(length)));
        Self::new(Value::Table(table))
    }

    /// Get the underlying TOML value
    pub fn data(&self) -> &Value {
        &self.data
    }
}

// ============================================================================
// Compiled representation
// ============================================================================

/// Expression inside `{{ ... }}`
#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    /// `key` or `nested.key`
    Key(String),
    /// Integer literal
    Int(i64),
    /// `Name(arg, ...)`
    Call { name: String, args: Vec<Expr> },
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Key(key) => write!(f, "{}", key),
            Expr::Int(i) => write!(f, "{}", i),
            Expr::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Text(String),
    Placeholder {
        expr: Expr,
        line: usize,
    },
    Each {
        source: Expr,
        var: String,
        body: Vec<Node>,
        line: usize,
    },
}

/// A parsed template, ready to be rendered any number of times
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    nodes: Vec<Node>,
}

/// Open `{{each}}` block while compiling
struct Frame {
    source: Expr,
    var: String,
    line: usize,
    nodes: Vec<Node>,
}

impl Template {
    /// Parse `source` into a template.
    ///
    /// Helper names are checked against `helpers` here; argument counts and
    /// types are checked at render time.
    pub fn compile(source: &str, helpers: &Helpers) -> Result<Self, TemplateError> {
        let mut root = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();
        let mut cursor = 0;
        let mut trim_newline = false;
        let mut stream = TokenStream::new(source);

        while let Some(token) = stream.next() {
            let text_end = token.start - token.backslash_count;
            let mut text = take_text(&source[cursor..text_end], trim_newline);
            trim_newline = false;

            // Backslash pairs collapse to one
            for _ in 0..(token.backslash_count / 2) {
                text.push('\\');
            }

            let token_end = token.start + token.length;
            cursor = token_end;

            if token.is_escaped() {
                text.push_str(&source[token.start..token_end]);
                push_text(current_nodes(&mut root, &mut stack), text);
                continue;
            }
            push_text(current_nodes(&mut root, &mut stack), text);

            match token.kind {
                TokenKind::Placeholder { content } => {
                    let expr = parse_expr(&content, token.line, helpers)?;
                    current_nodes(&mut root, &mut stack).push(Node::Placeholder {
                        expr,
                        line: token.line,
                    });
                }
                TokenKind::BlockStart { args, .. } => {
                    let (source_expr, var) = parse_each_args(&args, token.line, helpers)?;
                    stack.push(Frame {
                        source: source_expr,
                        var,
                        line: token.line,
                        nodes: Vec::new(),
                    });
                    trim_newline = true;
                }
                TokenKind::BlockEnd { keyword } => {
                    if keyword != "each" {
                        return Err(TemplateError::MalformedSyntax {
                            message: format!("Unknown closing tag '/{}'", keyword),
                            line: token.line,
                        });
                    }
                    let frame = stack.pop().ok_or_else(|| TemplateError::MalformedSyntax {
                        message: "Unexpected {{/each}} without matching {{each}}".to_string(),
                        line: token.line,
                    })?;
                    current_nodes(&mut root, &mut stack).push(Node::Each {
                        source: frame.source,
                        var: frame.var,
                        body: frame.nodes,
                        line: frame.line,
                    });
                    trim_newline = true;
                }
            }
        }

        if let Some(line) = stream.unclosed_line() {
            return Err(TemplateError::MalformedSyntax {
                message: "Unclosed placeholder or each loop".to_string(),
                line,
            });
        }

        let tail = take_text(&source[cursor..], trim_newline);
        push_text(current_nodes(&mut root, &mut stack), tail);

        if let Some(frame) = stack.pop() {
            return Err(TemplateError::MalformedSyntax {
                message: format!("Unclosed each loop for '{}'", frame.source),
                line: frame.line,
            });
        }

        Ok(Self { nodes: root })
    }

    /// Render the template against `context`, calling helpers from `helpers`
    pub fn render(
        &self,
        context: &TemplateContext,
        helpers: &Helpers,
    ) -> Result<String, TemplateError> {
        let mut output = String::new();
        render_nodes(&self.nodes, context.data(), helpers, &mut output)?;
        Ok(output)
    }
}

fn current_nodes<'a>(root: &'a mut Vec<Node>, stack: &'a mut [Frame]) -> &'a mut Vec<Node> {
    match stack.last_mut() {
        Some(frame) => &mut frame.nodes,
        None => root,
    }
}

fn push_text(nodes: &mut Vec<Node>, text: String) {
    if text.is_empty() {
        return;
    }
    if let Some(Node::Text(prev)) = nodes.last_mut() {
        prev.push_str(&text);
    } else {
        nodes.push(Node::Text(text));
    }
}

/// Copy literal text, dropping one leading newline after a block tag
fn take_text(text: &str, trim_newline: bool) -> String {
    let text = if trim_newline {
        text.strip_prefix("\r\n")
            .or_else(|| text.strip_prefix('\n'))
            .unwrap_or(text)
    } else {
        text
    };
    text.to_string()
}

// ============================================================================
// Tokenization
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    /// {{key}}, {{nested.key}} or {{Helper(arg)}}
    Placeholder { content: String },

    /// {{each source |var|}}
    BlockStart { keyword: String, args: String },

    /// {{/each}}
    BlockEnd { keyword: String },
}

/// A single {{...}} token with position and classification
#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    /// Absolute byte position of `{{` in template
    start: usize,
    /// Total length in bytes including {{ and }}
    length: usize,
    /// Number of backslashes before `{{`
    /// Odd count = escaped (literal), even = real (processed)
    backslash_count: usize,
    /// Line number where token starts (for error messages)
    line: usize,
}

impl Token {
    fn is_escaped(&self) -> bool {
        self.backslash_count % 2 == 1
    }
}

/// Tokenization state machine
///
/// ```text
/// Normal ──{───> SeenLBrace ──{───> InToken ──}───> SeenRBrace ──}───> [Yield Token] → Normal
///   │               │                  │                  │
///   │ (not {)       │ (not {)          │ (not })          │ (not })
///   └──────────────>└─────────────────>└─────────────────>└──────────> Normal / InToken
/// ```
///
/// Every byte is visited once; a byte that does not complete a `{{` or `}}`
/// pair is re-examined in the fallback state without advancing.
#[derive(Debug, Clone, PartialEq)]
enum ScanState {
    Normal {
        backslash_count: usize,
    },
    SeenLBrace {
        pos: usize,
        backslash_count: usize,
    },
    InToken {
        start: usize,
        content_start: usize,
        backslash_count: usize,
        start_line: usize,
    },
    SeenRBrace {
        start: usize,
        content_start: usize,
        rbrace_pos: usize,
        backslash_count: usize,
        start_line: usize,
    },
}

/// Iterator over `{{...}}` tokens in a template string
struct TokenStream<'a> {
    text: &'a str,
    pos: usize,
    state: ScanState,
    line: usize,
}

impl<'a> TokenStream<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            pos: 0,
            state: ScanState::Normal { backslash_count: 0 },
            line: 1,
        }
    }

    /// Line of a `{{` that was never closed, once the stream is exhausted
    fn unclosed_line(&self) -> Option<usize> {
        match self.state {
            ScanState::InToken { start_line, .. } | ScanState::SeenRBrace { start_line, .. } => {
                Some(start_line)
            }
            _ => None,
        }
    }

    /// Classify token content into TokenKind
    fn classify_content(content: &str) -> TokenKind {
        let trimmed = content.trim();

        if let Some(rest) = trimmed.strip_prefix("each ") {
            TokenKind::BlockStart {
                keyword: "each".to_string(),
                args: rest.to_string(),
            }
        } else if let Some(rest) = trimmed.strip_prefix('/') {
            TokenKind::BlockEnd {
                keyword: rest.trim().to_string(),
            }
        } else {
            TokenKind::Placeholder {
                content: trimmed.to_string(),
            }
        }
    }
}

impl Iterator for TokenStream<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let bytes = self.text.as_bytes();

        while self.pos < bytes.len() {
            let byte = bytes[self.pos];

            match self.state.clone() {
                ScanState::Normal { backslash_count } => {
                    if byte == b'\\' {
                        self.state = ScanState::Normal {
                            backslash_count: backslash_count + 1,
                        };
                    } else if byte == b'{' {
                        self.state = ScanState::SeenLBrace {
                            pos: self.pos,
                            backslash_count,
                        };
                    } else {
                        if byte == b'\n' {
                            self.line += 1;
                        }
                        self.state = ScanState::Normal { backslash_count: 0 };
                    }
                    self.pos += 1;
                }

                ScanState::SeenLBrace {
                    pos,
                    backslash_count,
                } => {
                    if byte == b'{' {
                        self.state = ScanState::InToken {
                            start: pos,
                            content_start: self.pos + 1,
                            backslash_count,
                            start_line: self.line,
                        };
                        self.pos += 1;
                    } else {
                        // Lone `{`; reprocess this byte as plain text
                        self.state = ScanState::Normal { backslash_count: 0 };
                    }
                }

                ScanState::InToken {
                    start,
                    content_start,
                    backslash_count,
                    start_line,
                } => {
                    if byte == b'}' {
                        self.state = ScanState::SeenRBrace {
                            start,
                            content_start,
                            rbrace_pos: self.pos,
                            backslash_count,
                            start_line,
                        };
                    } else if byte == b'\n' {
                        self.line += 1;
                    }
                    self.pos += 1;
                }

                ScanState::SeenRBrace {
                    start,
                    content_start,
                    rbrace_pos,
                    backslash_count,
                    start_line,
                } => {
                    if byte == b'}' {
                        let token = Token {
                            kind: Self::classify_content(&self.text[content_start..rbrace_pos]),
                            start,
                            length: self.pos + 1 - start,
                            backslash_count,
                            line: start_line,
                        };
                        self.state = ScanState::Normal { backslash_count: 0 };
                        self.pos += 1;
                        return Some(token);
                    }
                    // Lone `}` inside content; reprocess this byte
                    self.state = ScanState::InToken {
                        start,
                        content_start,
                        backslash_count,
                        start_line,
                    };
                }
            }
        }

        None
    }
}

// ============================================================================
// Expression parsing
// ============================================================================

/// Parse `source |var|` from an {{each}} tag
fn parse_each_args(
    args: &str,
    line: usize,
    helpers: &Helpers,
) -> Result<(Expr, String), TemplateError> {
    let malformed = |message: String| TemplateError::MalformedSyntax { message, line };

    let pipe_pos = args
        .find('|')
        .ok_or_else(|| malformed(format!("Invalid each syntax: expected |var| in 'each {}'", args)))?;
    let rest = &args[pipe_pos + 1..];
    let var_end = rest
        .find('|')
        .ok_or_else(|| malformed(format!("Invalid each syntax: unclosed |var| in 'each {}'", args)))?;

    let var = rest[..var_end].trim();
    if !is_identifier(var) {
        return Err(malformed(format!(
            "Invalid each syntax: '{}' is not a valid loop variable",
            var
        )));
    }
    if !rest[var_end + 1..].trim().is_empty() {
        return Err(malformed(format!(
            "Invalid each syntax: unexpected text after |{}|",
            var
        )));
    }

    let source = parse_expr(&args[..pipe_pos], line, helpers)?;
    Ok((source, var.to_string()))
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Parse the content of a placeholder into an expression
fn parse_expr(content: &str, line: usize, helpers: &Helpers) -> Result<Expr, TemplateError> {
    let mut parser = ExprParser {
        src: content,
        pos: 0,
        line,
        helpers,
    };
    parser.skip_whitespace();
    if parser.at_end() {
        return Err(parser.error("Empty placeholder".to_string()));
    }
    let expr = parser.expr()?;
    parser.skip_whitespace();
    if !parser.at_end() {
        return Err(parser.error(format!(
            "Unexpected '{}' in expression '{}'",
            &content[parser.pos..],
            content.trim()
        )));
    }
    Ok(expr)
}

/// Recursive-descent parser for `key`, `a.b`, `123` and `Name(arg, ...)`
struct ExprParser<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    helpers: &'a Helpers,
}

impl ExprParser<'_> {
    fn error(&self, message: String) -> TemplateError {
        TemplateError::MalformedSyntax {
            message,
            line: self.line,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.pos += c.len_utf8();
        }
        &self.src[start..self.pos]
    }

    fn expr(&mut self) -> Result<Expr, TemplateError> {
        self.skip_whitespace();
        match self.peek() {
            Some(c) if c.is_ascii_digit() || c == '-' => self.integer(),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => self.path_or_call(),
            Some(c) => Err(self.error(format!("Unexpected '{}' in expression '{}'", c, self.src.trim()))),
            None => Err(self.error(format!("Missing expression in '{}'", self.src.trim()))),
        }
    }

    fn integer(&mut self) -> Result<Expr, TemplateError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.pos += 1;
        }
        self.take_while(|c| c.is_ascii_digit());
        let literal = &self.src[start..self.pos];
        literal
            .parse::<i64>()
            .map(Expr::Int)
            .map_err(|_| self.error(format!("Invalid integer literal '{}'", literal)))
    }

    fn path_or_call(&mut self) -> Result<Expr, TemplateError> {
        let path = self
            .take_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
            .to_string();
        if path.ends_with('.') || path.contains("..") {
            return Err(self.error(format!("Invalid key '{}'", path)));
        }

        self.skip_whitespace();
        if self.peek() != Some('(') {
            return Ok(Expr::Key(path));
        }

        if !is_identifier(&path) {
            return Err(self.error(format!("Invalid helper name '{}'", path)));
        }
        if !self.helpers.contains(&path) {
            return Err(TemplateError::UnknownHelper {
                name: path,
                line: self.line,
            });
        }

        self.pos += 1; // (
        let mut args = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(')') {
            self.pos += 1;
            return Ok(Expr::Call { name: path, args });
        }
        loop {
            args.push(self.expr()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(')') => {
                    self.pos += 1;
                    return Ok(Expr::Call { name: path, args });
                }
                _ => {
                    return Err(self.error(format!("Unclosed call to '{}'", path)));
                }
            }
        }
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn render_nodes(
    nodes: &[Node],
    data: &Value,
    helpers: &Helpers,
    output: &mut String,
) -> Result<(), TemplateError> {
    for node in nodes {
        match node {
            Node::Text(text) => output.push_str(text),
            Node::Placeholder { expr, line } => {
                let value = eval(expr, data, helpers, *line)?;
                output.push_str(&stringify_value(&value, expr, *line)?);
            }
            Node::Each {
                source,
                var,
                body,
                line,
            } => {
                let items = match eval(source, data, helpers, *line)? {
                    Value::Array(items) => items,
                    _ => {
                        return Err(TemplateError::NotASequence {
                            expr: source.to_string(),
                            line: *line,
                        })
                    }
                };
                for item in items {
                    let scope = create_loop_scope(data, var, item);
                    render_nodes(body, &scope, helpers, output)?;
                }
            }
        }
    }
    Ok(())
}

fn eval(expr: &Expr, data: &Value, helpers: &Helpers, line: usize) -> Result<Value, TemplateError> {
    match expr {
        Expr::Key(key) => resolve_key(data, key)
            .cloned()
            .ok_or_else(|| TemplateError::UndefinedKey {
                key: key.clone(),
                line,
            }),
        Expr::Int(i) => Ok(Value::Integer(*i)),
        Expr::Call { name, args } => {
            let helper = helpers.get(name).ok_or_else(|| TemplateError::UnknownHelper {
                name: name.clone(),
                line,
            })?;
            let [arg] = args.as_slice() else {
                return Err(TemplateError::HelperArity {
                    name: name.clone(),
                    expected: 1,
                    found: args.len(),
                    line,
                });
            };
            let arg = eval(arg, data, helpers, line)?;
            let n = helper_argument(name, &arg, helper.max_argument(), line)?;
            Ok(helper.call(n))
        }
    }
}

fn helper_argument(name: &str, arg: &Value, max: u32, line: usize) -> Result<u32, TemplateError> {
    let invalid = |message: String| TemplateError::HelperArgument {
        name: name.to_string(),
        message,
        line,
    };
    match arg {
        Value::Integer(i) => u32::try_from(*i)
            .ok()
            .filter(|n| *n <= max)
            .ok_or_else(|| {
                invalid(format!(
                    "expected an integer between 0 and {}, got {}",
                    max, i
                ))
            }),
        other => Err(invalid(format!(
            "expected an integer, got {}",
            other.type_str()
        ))),
    }
}

/// Resolve a nested key from TOML data
fn resolve_key<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
    let mut current = data;
    for part in key.split('.') {
        current = match current {
            Value::Table(table) => table.get(part)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Stringify a TOML value for template output
fn stringify_value(value: &Value, expr: &Expr, line: usize) -> Result<String, TemplateError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Integer(i) => Ok(i.to_string()),
        Value::Float(f) => Ok(f.to_string()),
        Value::Boolean(b) => Ok(b.to_string()),
        Value::Datetime(dt) => Ok(dt.to_string()),
        Value::Array(_) => Err(TemplateError::SequenceInPlaceholder {
            expr: expr.to_string(),
            line,
        }),
        Value::Table(_) => Err(TemplateError::TableInPlaceholder {
            expr: expr.to_string(),
            line,
        }),
    }
}

/// Copy of `base_data` with the loop variable bound
fn create_loop_scope(base_data: &Value, var_name: &str, item: Value) -> Value {
    let mut table = if let Value::Table(t) = base_data {
        t.clone()
    } else {
        toml::map::Map::new()
    };
    table.insert(var_name.to_string(), item);
    Value::Table(table)
}

/// Compiles templates and renders them with one fixed helper set
#[derive(Debug, Clone, Default)]
pub struct TemplateEngine {
    helpers: Helpers,
}

impl TemplateEngine {
    pub fn new(helpers: Helpers) -> Self {
        Self { helpers }
    }

    pub fn helpers(&self) -> &Helpers {
        &self.helpers
    }

    pub fn compile(&self, source: &str) -> Result<Template, TemplateError> {
        Template::compile(source, &self.helpers)
    }

    pub fn render(
        &self,
        template: &Template,
        context: &TemplateContext,
    ) -> Result<String, TemplateError> {
        template.render(context, &self.helpers)
    }
}

/// Compile and render in one step
pub fn render(
    source: &str,
    context: &TemplateContext,
    helpers: &Helpers,
) -> Result<String, TemplateError> {
    Template::compile(source, helpers)?.render(context, helpers)
}
