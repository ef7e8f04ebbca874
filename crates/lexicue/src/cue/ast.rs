//! Constructors for the emitted CUE expression tree.
//!
//! The tree is a plain owned value; each node has exactly one parent. Only
//! the syntax the lowering engine produces is modelled.

use smol_str::SmolStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// Disjunction `|`
    Or,
    /// Intersection `&`
    And,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Or => "|",
            Self::And => "&",
        }
    }

    /// Binding strength; disjunction binds loosest.
    pub fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    /// Marked default `*x`
    Default,
    /// Lower bound `>=x`
    GreaterEq,
    /// Upper bound `<=x`
    LessEq,
    /// Regex match `=~x`
    Match,
}

impl UnOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Default => "*",
            Self::GreaterEq => ">=",
            Self::LessEq => "<=",
            Self::Match => "=~",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Lit {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Ident(SmolStr),
    Lit(Lit),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
    },
    List {
        elts: Vec<Expr>,
        ellipsis: Option<Box<Expr>>,
    },
    Struct(StructLit),
    Selector {
        base: Box<Expr>,
        sel: SmolStr,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Label {
    Ident(SmolStr),
    Quoted(String),
}

/// The marker after a field label: none, `?`, or `!`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    Regular,
    Optional,
    Required,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub label: Label,
    pub constraint: Constraint,
    pub value: Expr,
    pub doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Field(Field),
    Embed(Expr),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructLit {
    pub elts: Vec<Decl>,
}

impl StructLit {
    pub fn is_empty(&self) -> bool {
        self.elts.is_empty()
    }

    /// Append a field, quoting the label if it is not a valid identifier.
    pub fn add_field(&mut self, name: &str, constraint: Constraint, value: Expr, doc: Option<&str>) {
        self.elts.push(Decl::Field(Field {
            label: label(name),
            constraint,
            value,
            doc: doc.map(str::to_owned),
        }));
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpec {
    /// The identifier the import binds to in this file.
    pub ident: SmolStr,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct File {
    /// Doc comment attached to the package clause.
    pub doc: Option<String>,
    pub package: SmolStr,
    pub imports: Vec<ImportSpec>,
    pub decls: Vec<Decl>,
}

pub fn ident(name: impl Into<SmolStr>) -> Expr {
    Expr::Ident(name.into())
}

pub fn string(s: impl Into<String>) -> Expr {
    Expr::Lit(Lit::Str(s.into()))
}

pub fn int(v: i64) -> Expr {
    Expr::Lit(Lit::Int(v))
}

pub fn float(v: f64) -> Expr {
    Expr::Lit(Lit::Float(v))
}

pub fn boolean(v: bool) -> Expr {
    Expr::Lit(Lit::Bool(v))
}

pub fn null() -> Expr {
    Expr::Lit(Lit::Null)
}

pub fn and(lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op: BinOp::And,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

pub fn or(lhs: Expr, rhs: Expr) -> Expr {
    Expr::Binary {
        op: BinOp::Or,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

pub fn unary(op: UnOp, operand: Expr) -> Expr {
    Expr::Unary {
        op,
        operand: Box::new(operand),
    }
}

/// Wrap a type with a marked default: `*default | e`.
pub fn with_default(e: Expr, default: Expr) -> Expr {
    or(unary(UnOp::Default, default), e)
}

/// An open list of `item`: `[...item]`.
pub fn list_of(item: Expr) -> Expr {
    Expr::List {
        elts: Vec::new(),
        ellipsis: Some(Box::new(item)),
    }
}

pub fn selector(base: Expr, sel: impl Into<SmolStr>) -> Expr {
    Expr::Selector {
        base: Box::new(base),
        sel: sel.into(),
    }
}

pub fn index(base: Expr, idx: Expr) -> Expr {
    Expr::Index {
        base: Box::new(base),
        index: Box::new(idx),
    }
}

pub fn call(func: Expr, args: Vec<Expr>) -> Expr {
    Expr::Call {
        func: Box::new(func),
        args,
    }
}

pub fn label(name: &str) -> Label {
    if is_valid_ident(name) {
        Label::Ident(SmolStr::new(name))
    } else {
        Label::Quoted(name.to_owned())
    }
}

/// Whether `s` can appear unquoted as a CUE identifier or field label.
/// Definitions (`#x`) and hidden definitions (`_#x`) count as identifiers.
pub fn is_valid_ident(s: &str) -> bool {
    let body = s
        .strip_prefix("_#")
        .or_else(|| s.strip_prefix('#'))
        .unwrap_or(s);
    let mut chars = body.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
