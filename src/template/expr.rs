//! Template expressions: tree, recursive-descent parser and interpreter.
//!
//! The grammar covers what templates and inline handlers need: literals,
//! `this`, identifiers, member and index paths, `!`, unary `-`, `+`/`-`,
//! comparisons, `&&`/`||`/`??`, the conditional operator, and array and
//! object literals. Inline handlers add `this.prop = expr` and
//! `this.method()` statements.
//!
//! Expressions are evaluated against a [`Scope`], which resolves `this`,
//! properties of nodes and free variables such as `event`.

use std::collections::BTreeMap;
use std::fmt;

use logos::Logos;

use super::lexer::{unquote, Token};
use crate::dom::node::NodeId;
use crate::value::Value;

/// Errors from expression parsing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExprError {
    #[error("unexpected token at byte {position}: {message}")]
    UnexpectedToken { position: usize, message: String },
    #[error("unexpected end of expression: {0}")]
    UnexpectedEof(String),
    #[error("unrecognized character at byte {0}")]
    InvalidCharacter(usize),
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    StrictEq,
    StrictNe,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    And,
    Or,
    Nullish,
}

impl BinaryOp {
    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNe => "!==",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Nullish => "??",
        }
    }
}

/// An expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    /// The widget instance.
    This,
    /// A free variable, resolved through [`Scope::variable`].
    Ident(String),
    Member(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
    Array(Vec<Expr>),
    Object(Vec<(String, Expr)>),
    /// String concatenation of text segments and placeholders.
    Concat(Vec<Expr>),
}

/// A statement of an inline event handler.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `this.prop = value`
    Assign { property: String, value: Expr },
    /// `this.method()` or `this.method(event)`
    Call { method: String },
    Expr(Expr),
}

impl Expr {
    /// A string literal.
    pub fn string(s: impl Into<String>) -> Self {
        Expr::Literal(Value::String(s.into()))
    }

    /// `this.<name>`
    pub fn this_member(name: impl Into<String>) -> Self {
        Expr::Member(Box::new(Expr::This), name.into())
    }

    /// Replace the leftmost free identifier of a path with `this.<ident>`.
    ///
    /// `item.bar` becomes `this.item.bar`; other shapes are returned as-is.
    pub fn rooted_at_this(self) -> Self {
        match self {
            Expr::Ident(name) => Expr::this_member(name),
            Expr::Member(object, name) => Expr::Member(Box::new(object.rooted_at_this()), name),
            Expr::Index(object, index) => Expr::Index(Box::new(object.rooted_at_this()), index),
            other => other,
        }
    }

    /// The top-level property name of a path rooted at `this`.
    pub fn root_property(&self) -> Option<&str> {
        match self {
            Expr::Member(object, name) if **object == Expr::This => Some(name),
            Expr::Member(object, _) | Expr::Index(object, _) => object.root_property(),
            _ => None,
        }
    }

    /// Every `this.<name>` referenced, in source order, deduplicated.
    pub fn this_dependencies(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_dependencies(&mut out);
        out
    }

    fn collect_dependencies(&self, out: &mut Vec<String>) {
        match self {
            Expr::Member(object, name) => {
                if **object == Expr::This {
                    if !out.iter().any(|d| d == name) {
                        out.push(name.clone());
                    }
                } else {
                    object.collect_dependencies(out);
                }
            }
            Expr::Index(object, index) => {
                object.collect_dependencies(out);
                index.collect_dependencies(out);
            }
            Expr::Unary(_, operand) => operand.collect_dependencies(out),
            Expr::Binary(_, lhs, rhs) => {
                lhs.collect_dependencies(out);
                rhs.collect_dependencies(out);
            }
            Expr::Conditional(test, yes, no) => {
                test.collect_dependencies(out);
                yes.collect_dependencies(out);
                no.collect_dependencies(out);
            }
            Expr::Array(items) | Expr::Concat(items) => {
                for item in items {
                    item.collect_dependencies(out);
                }
            }
            Expr::Object(fields) => {
                for (_, value) in fields {
                    value.collect_dependencies(out);
                }
            }
            Expr::Literal(_) | Expr::This | Expr::Ident(_) => {}
        }
    }

    /// Whether this is a literal with no dependencies.
    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Expr::Literal(value) => Some(value),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Scope and evaluation
// ---------------------------------------------------------------------------

/// Resolves the names an expression refers to.
pub trait Scope {
    /// Value of `this`.
    fn this_value(&self) -> Value;

    /// A property of a document node.
    fn node_property(&self, node: NodeId, name: &str) -> Value;

    /// A free variable; `undefined` unless the scope provides it.
    fn variable(&self, _name: &str) -> Value {
        Value::Undefined
    }
}

/// A scope with no instance, for literal values.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyScope;

impl Scope for EmptyScope {
    fn this_value(&self) -> Value {
        Value::Undefined
    }

    fn node_property(&self, _node: NodeId, _name: &str) -> Value {
        Value::Undefined
    }
}

impl Expr {
    /// Evaluate against `scope`.
    pub fn evaluate<S: Scope + ?Sized>(&self, scope: &S) -> Value {
        match self {
            Expr::Literal(value) => value.clone(),
            Expr::This => scope.this_value(),
            Expr::Ident(name) => scope.variable(name),
            Expr::Member(object, name) => match object.evaluate(scope) {
                Value::Node(node) => scope.node_property(node, name),
                other => other.member(name),
            },
            Expr::Index(object, index) => {
                let index = index.evaluate(scope);
                match (object.evaluate(scope), &index) {
                    (Value::Node(node), Value::String(name)) => scope.node_property(node, name),
                    (other, _) => other.index(&index),
                }
            }
            Expr::Unary(UnaryOp::Not, operand) => Value::Bool(!operand.evaluate(scope).truthy()),
            Expr::Unary(UnaryOp::Neg, operand) => {
                Value::Number(-operand.evaluate(scope).to_number())
            }
            Expr::Binary(op, lhs, rhs) => evaluate_binary(*op, lhs, rhs, scope),
            Expr::Conditional(test, yes, no) => {
                if test.evaluate(scope).truthy() {
                    yes.evaluate(scope)
                } else {
                    no.evaluate(scope)
                }
            }
            Expr::Array(items) => Value::Array(items.iter().map(|e| e.evaluate(scope)).collect()),
            Expr::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, e)| (k.clone(), e.evaluate(scope)))
                    .collect::<BTreeMap<_, _>>(),
            ),
            Expr::Concat(parts) => {
                let mut out = String::new();
                for part in parts {
                    out.push_str(&part.evaluate(scope).to_string());
                }
                Value::String(out)
            }
        }
    }
}

fn evaluate_binary<S: Scope + ?Sized>(op: BinaryOp, lhs: &Expr, rhs: &Expr, scope: &S) -> Value {
    // Short-circuit operators evaluate the right side lazily.
    match op {
        BinaryOp::And => {
            let l = lhs.evaluate(scope);
            return if l.truthy() { rhs.evaluate(scope) } else { l };
        }
        BinaryOp::Or => {
            let l = lhs.evaluate(scope);
            return if l.truthy() { l } else { rhs.evaluate(scope) };
        }
        BinaryOp::Nullish => {
            let l = lhs.evaluate(scope);
            return if l.is_nullish() { rhs.evaluate(scope) } else { l };
        }
        _ => {}
    }

    let l = lhs.evaluate(scope);
    let r = rhs.evaluate(scope);
    match op {
        BinaryOp::StrictEq => Value::Bool(l.strict_eq(&r)),
        BinaryOp::StrictNe => Value::Bool(!l.strict_eq(&r)),
        BinaryOp::Eq => Value::Bool(l.loose_eq(&r)),
        BinaryOp::Ne => Value::Bool(!l.loose_eq(&r)),
        BinaryOp::Add => {
            let stringy = |v: &Value| {
                matches!(v, Value::String(_) | Value::Array(_) | Value::Object(_) | Value::Node(_))
            };
            if stringy(&l) || stringy(&r) {
                Value::String(format!("{l}{r}"))
            } else {
                Value::Number(l.to_number() + r.to_number())
            }
        }
        BinaryOp::Sub => Value::Number(l.to_number() - r.to_number()),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = match (&l, &r) {
                (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
                _ => l.to_number().partial_cmp(&r.to_number()),
            };
            let Some(ordering) = ordering else {
                return Value::Bool(false);
            };
            Value::Bool(match op {
                BinaryOp::Lt => ordering.is_lt(),
                BinaryOp::Le => ordering.is_le(),
                BinaryOp::Gt => ordering.is_gt(),
                _ => ordering.is_ge(),
            })
        }
        BinaryOp::And | BinaryOp::Or | BinaryOp::Nullish => Value::Undefined,
    }
}

// ---------------------------------------------------------------------------
// Source rendering
// ---------------------------------------------------------------------------

/// Quote a string literal with single quotes, escaping `'`, `\`, newline,
/// carriage return and tab.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

fn write_value(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match value {
        Value::String(s) => f.write_str(&quote(s)),
        Value::Array(items) => {
            f.write_str("[")?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_value(item, f)?;
            }
            f.write_str("]")
        }
        Value::Object(map) => {
            f.write_str("{")?;
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}: ", quote(key))?;
                write_value(item, f)?;
            }
            f.write_str("}")
        }
        other => write!(f, "{other}"),
    }
}

/// Operands that need parentheses when nested.
fn needs_parens(expr: &Expr) -> bool {
    matches!(expr, Expr::Binary(..) | Expr::Conditional(..) | Expr::Concat(_))
}

struct Operand<'a>(&'a Expr);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if needs_parens(self.0) {
            write!(f, "({})", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(value) => write_value(value, f),
            Expr::This => f.write_str("this"),
            Expr::Ident(name) => f.write_str(name),
            Expr::Member(object, name) => write!(f, "{}.{name}", Operand(object)),
            Expr::Index(object, index) => write!(f, "{}[{index}]", Operand(object)),
            Expr::Unary(UnaryOp::Not, operand) => write!(f, "!{}", Operand(operand)),
            Expr::Unary(UnaryOp::Neg, operand) => write!(f, "-{}", Operand(operand)),
            Expr::Binary(op, lhs, rhs) => {
                write!(f, "{} {} {}", Operand(lhs), op.symbol(), Operand(rhs))
            }
            Expr::Conditional(test, yes, no) => {
                write!(f, "{} ? {} : {}", Operand(test), Operand(yes), Operand(no))
            }
            Expr::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Expr::Object(fields) => {
                f.write_str("{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {value}", quote(key))?;
                }
                f.write_str("}")
            }
            Expr::Concat(parts) => {
                let first_is_string = matches!(parts.first(), Some(Expr::Literal(Value::String(_))));
                if !first_is_string {
                    f.write_str("'' + ")?;
                }
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" + ")?;
                    }
                    write!(f, "{}", Operand(part))?;
                }
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct PToken {
    token: Token,
    text: String,
    start: usize,
}

fn tokenize(input: &str) -> Result<Vec<PToken>, ExprError> {
    let mut tokens = Vec::new();
    for (result, span) in Token::lexer(input).spanned() {
        let token = result.map_err(|()| ExprError::InvalidCharacter(span.start))?;
        tokens.push(PToken {
            token,
            text: input[span.clone()].to_owned(),
            start: span.start,
        });
    }
    Ok(tokens)
}

/// Parse a single expression; the whole input must be consumed.
pub fn parse_expression(input: &str) -> Result<Expr, ExprError> {
    let mut parser = Parser {
        tokens: tokenize(input)?,
        cursor: 0,
    };
    let expr = parser.parse_conditional()?;
    parser.expect_end()?;
    Ok(expr)
}

/// Parse `;`-separated inline handler statements.
pub fn parse_statements(input: &str) -> Result<Vec<Stmt>, ExprError> {
    let mut parser = Parser {
        tokens: tokenize(input)?,
        cursor: 0,
    };
    let mut statements = Vec::new();
    while !parser.is_eof() {
        if parser.eat(&Token::Semicolon) {
            continue;
        }
        statements.push(parser.parse_statement()?);
        if !parser.is_eof() {
            parser.expect(&Token::Semicolon)?;
        }
    }
    Ok(statements)
}

/// Recursive descent parser state.
struct Parser {
    tokens: Vec<PToken>,
    cursor: usize,
}

impl Parser {
    fn is_eof(&self) -> bool {
        self.cursor >= self.tokens.len()
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor).map(|t| &t.token)
    }

    fn advance(&mut self) -> Option<PToken> {
        let tok = self.tokens.get(self.cursor).cloned();
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    fn unexpected(tok: &PToken, wanted: &str) -> ExprError {
        ExprError::UnexpectedToken {
            position: tok.start,
            message: format!("expected {wanted}, got '{}'", tok.text),
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<PToken, ExprError> {
        match self.advance() {
            Some(tok) if &tok.token == expected => Ok(tok),
            Some(tok) => Err(Self::unexpected(&tok, &format!("{expected:?}"))),
            None => Err(ExprError::UnexpectedEof(format!("expected {expected:?}"))),
        }
    }

    fn expect_end(&mut self) -> Result<(), ExprError> {
        match self.advance() {
            None => Ok(()),
            Some(tok) => Err(Self::unexpected(&tok, "end of expression")),
        }
    }

    fn parse_statement(&mut self) -> Result<Stmt, ExprError> {
        let start = self.tokens.get(self.cursor).map(|t| t.start).unwrap_or(0);
        let target = self.parse_conditional()?;
        let method_name = |expr: &Expr| match expr {
            Expr::Member(object, name) if **object == Expr::This => Some(name.clone()),
            _ => None,
        };

        if self.eat(&Token::Assign) {
            let property = method_name(&target).ok_or_else(|| ExprError::UnexpectedToken {
                position: start,
                message: "only `this.<property>` can be assigned".into(),
            })?;
            let value = self.parse_conditional()?;
            return Ok(Stmt::Assign { property, value });
        }

        if self.eat(&Token::ParenOpen) {
            let method = method_name(&target).ok_or_else(|| ExprError::UnexpectedToken {
                position: start,
                message: "only `this.<method>()` can be called".into(),
            })?;
            if let Some(tok) = self.tokens.get(self.cursor).cloned() {
                if tok.token == Token::Ident && tok.text == "event" {
                    self.cursor += 1;
                }
            }
            self.expect(&Token::ParenClose)?;
            return Ok(Stmt::Call { method });
        }

        Ok(Stmt::Expr(target))
    }

    fn parse_conditional(&mut self) -> Result<Expr, ExprError> {
        let test = self.parse_nullish()?;
        if !self.eat(&Token::Question) {
            return Ok(test);
        }
        let yes = self.parse_conditional()?;
        self.expect(&Token::Colon)?;
        let no = self.parse_conditional()?;
        Ok(Expr::Conditional(Box::new(test), Box::new(yes), Box::new(no)))
    }

    fn parse_nullish(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_or()?;
        while self.eat(&Token::Nullish) {
            let rhs = self.parse_or()?;
            lhs = Expr::Binary(BinaryOp::Nullish, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_or(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_and()?;
        while self.eat(&Token::Or) {
            let rhs = self.parse_and()?;
            lhs = Expr::Binary(BinaryOp::Or, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_equality()?;
        while self.eat(&Token::And) {
            let rhs = self.parse_equality()?;
            lhs = Expr::Binary(BinaryOp::And, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn parse_equality(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_relational()?;
        loop {
            let op = match self.peek() {
                Some(Token::StrictEq) => BinaryOp::StrictEq,
                Some(Token::StrictNe) => BinaryOp::StrictNe,
                Some(Token::Eq) => BinaryOp::Eq,
                Some(Token::Ne) => BinaryOp::Ne,
                _ => return Ok(lhs),
            };
            self.cursor += 1;
            let rhs = self.parse_relational()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_relational(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::Lt) => BinaryOp::Lt,
                Some(Token::Le) => BinaryOp::Le,
                Some(Token::Gt) => BinaryOp::Gt,
                Some(Token::Ge) => BinaryOp::Ge,
                _ => return Ok(lhs),
            };
            self.cursor += 1;
            let rhs = self.parse_additive()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_additive(&mut self) -> Result<Expr, ExprError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.cursor += 1;
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ExprError> {
        if self.eat(&Token::Bang) {
            return Ok(Expr::Unary(UnaryOp::Not, Box::new(self.parse_unary()?)));
        }
        if self.eat(&Token::Minus) {
            return Ok(Expr::Unary(UnaryOp::Neg, Box::new(self.parse_unary()?)));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, ExprError> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat(&Token::Dot) {
                let tok = self
                    .advance()
                    .ok_or_else(|| ExprError::UnexpectedEof("expected member name after '.'".into()))?;
                if !is_name(&tok.token) {
                    return Err(Self::unexpected(&tok, "member name"));
                }
                expr = Expr::Member(Box::new(expr), tok.text);
            } else if self.eat(&Token::BracketOpen) {
                let index = self.parse_conditional()?;
                self.expect(&Token::BracketClose)?;
                expr = Expr::Index(Box::new(expr), Box::new(index));
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expr, ExprError> {
        let tok = self
            .advance()
            .ok_or_else(|| ExprError::UnexpectedEof("expected a value".into()))?;
        match tok.token {
            Token::This => Ok(Expr::This),
            Token::True => Ok(Expr::Literal(Value::Bool(true))),
            Token::False => Ok(Expr::Literal(Value::Bool(false))),
            Token::Null => Ok(Expr::Literal(Value::Null)),
            Token::Undefined => Ok(Expr::Literal(Value::Undefined)),
            Token::Number => tok
                .text
                .parse::<f64>()
                .map(|n| Expr::Literal(Value::Number(n)))
                .map_err(|_| Self::unexpected(&tok, "number")),
            Token::SingleQuoted | Token::DoubleQuoted => Ok(Expr::string(unquote(&tok.text))),
            Token::Ident => Ok(Expr::Ident(tok.text)),
            Token::ParenOpen => {
                let inner = self.parse_conditional()?;
                self.expect(&Token::ParenClose)?;
                Ok(inner)
            }
            Token::BracketOpen => self.parse_array(),
            Token::BraceOpen => self.parse_object(),
            _ => Err(Self::unexpected(&tok, "a value")),
        }
    }

    fn parse_array(&mut self) -> Result<Expr, ExprError> {
        let mut items = Vec::new();
        while !self.eat(&Token::BracketClose) {
            items.push(self.parse_conditional()?);
            if !self.eat(&Token::Comma) {
                self.expect(&Token::BracketClose)?;
                break;
            }
        }
        Ok(Expr::Array(items))
    }

    fn parse_object(&mut self) -> Result<Expr, ExprError> {
        let mut fields = Vec::new();
        while !self.eat(&Token::BraceClose) {
            let tok = self
                .advance()
                .ok_or_else(|| ExprError::UnexpectedEof("expected object key".into()))?;
            let key = match tok.token {
                Token::SingleQuoted | Token::DoubleQuoted => unquote(&tok.text),
                ref t if is_name(t) || *t == Token::Number => tok.text.clone(),
                _ => return Err(Self::unexpected(&tok, "object key")),
            };
            self.expect(&Token::Colon)?;
            fields.push((key, self.parse_conditional()?));
            if !self.eat(&Token::Comma) {
                self.expect(&Token::BraceClose)?;
                break;
            }
        }
        Ok(Expr::Object(fields))
    }
}

/// Tokens usable as member names and object keys.
fn is_name(token: &Token) -> bool {
    matches!(
        token,
        Token::Ident | Token::This | Token::True | Token::False | Token::Null | Token::Undefined
    )
}

// ===========================================================================
// Tests
// ===========================================================================
