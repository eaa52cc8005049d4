//! AST node definitions.
//!
//! One variant per statement and expression kind, so every visitor
//! downstream (interpreter, type collector, C++ emitter) is an exhaustive
//! match. Child positions are fixed by construction: an `IfStmt` always
//! owns a then-block and an else-block (the else-block may be empty), a
//! `ForStmt` always owns a step expression (the parser substitutes the
//! literal `1` when the source omits it).
//!
//! The tree also serializes to the classic `{type, attrs, children}` JSON
//! shape, with the historical node-kind names (`BIN_OP`, `LITERAL`, ...).

use pscc_util::Span;
use serde_json::{json, Map, Value as Json};
use std::fmt;

/// A parsed program: the ordered list of top-level statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub body: Vec<Stmt>,
}

/// A statement sequence owned by a control structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

impl Block {
    /// An empty block (used for a missing `altfel` branch).
    pub fn empty() -> Self {
        Self { stmts: Vec::new() }
    }
}

/// An identifier occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

/// Statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign(AssignStmt),
    If(IfStmt),
    While(WhileStmt),
    DoWhile(DoWhileStmt),
    RepeatUntil(RepeatUntilStmt),
    For(ForStmt),
    Read(ReadStmt),
    Write(WriteStmt),
}

/// `nume <- expresie`
#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub target: Ident,
    pub value: Expr,
    pub span: Span,
}

/// `daca C atunci ... [altfel ...] sfarsit_daca`
///
/// The else-block is always present; it is empty when the source has no
/// `altfel` branch.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub cond: Expr,
    pub then_block: Block,
    pub else_block: Block,
    pub span: Span,
}

/// `cat timp C executa ... sfarsit_cat_timp`
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub cond: Expr,
    pub body: Block,
    pub span: Span,
}

/// `executa ... cat timp C` - body first, continues while C holds.
#[derive(Debug, Clone, PartialEq)]
pub struct DoWhileStmt {
    pub body: Block,
    pub cond: Expr,
    pub span: Span,
}

/// `repeta ... pana cand C` - body first, stops when C holds.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatUntilStmt {
    pub body: Block,
    pub cond: Expr,
    pub span: Span,
}

/// `pentru i <- a, b[, s] executa ... sfarsit_pentru`
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub iterator: Ident,
    pub start: Expr,
    pub stop: Expr,
    pub step: Expr,
    pub body: Block,
    pub span: Span,
}

/// `citeste id (, id)*`
#[derive(Debug, Clone, PartialEq)]
pub struct ReadStmt {
    pub targets: Vec<Ident>,
    pub span: Span,
}

/// `scrie expr (, expr)*`
#[derive(Debug, Clone, PartialEq)]
pub struct WriteStmt {
    pub values: Vec<Expr>,
    pub span: Span,
}

/// Expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    Var(Ident),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
}

/// Scalar literal. The raw lexeme text is kept as written; numeric
/// literals are coerced on demand by the interpreter.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub kind: LiteralKind,
    pub text: String,
    pub span: Span,
}

/// Inferred literal category, straight from the token shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    /// Digits without a decimal point.
    Int,
    /// Digits with a decimal point.
    Real,
    /// `adevarat` / `fals` (stored lowercase).
    Bool,
    /// Quoted string, quotes stripped, quote escapes resolved.
    Str,
}

impl LiteralKind {
    /// The historical `inferred_type` name used in the JSON tree.
    pub fn type_name(self) -> &'static str {
        match self {
            LiteralKind::Int => "int",
            LiteralKind::Real => "real",
            LiteralKind::Bool => "bool",
            LiteralKind::Str => "string",
        }
    }
}

/// Binary operation; exactly two operands by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
    pub span: Span,
}

/// Unary operation; exactly one operand by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnOp,
    pub operand: Box<Expr>,
    pub span: Span,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "^",
            BinOp::Eq => "=",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "AND",
            BinOp::Or => "OR",
        };
        f.write_str(symbol)
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    /// Logical negation.
    Not,
    /// Arithmetic negation.
    Neg,
    /// `sqrt(x)`
    Sqrt,
    /// `[x]` - integral part.
    Floor,
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnOp::Not => "NOT",
            UnOp::Neg => "MINUS",
            UnOp::Sqrt => "SQRT",
            UnOp::Floor => "FLOOR",
        };
        f.write_str(name)
    }
}

impl Expr {
    /// Construction helper for binary operations.
    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr, span: Span) -> Self {
        Expr::Binary(BinaryExpr {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            span,
        })
    }

    /// Construction helper for unary operations.
    pub fn unary(op: UnOp, operand: Expr, span: Span) -> Self {
        Expr::Unary(UnaryExpr {
            op,
            operand: Box::new(operand),
            span,
        })
    }

    /// Construction helper for literals.
    pub fn literal(kind: LiteralKind, text: impl Into<String>, span: Span) -> Self {
        Expr::Literal(Literal {
            kind,
            text: text.into(),
            span,
        })
    }

    /// Source position of the expression.
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(lit) => lit.span,
            Expr::Var(id) => id.span,
            Expr::Binary(bin) => bin.span,
            Expr::Unary(un) => un.span,
        }
    }

    /// Historical node-kind name (variables count as `LITERAL` of
    /// inferred type `var`).
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Literal(_) | Expr::Var(_) => "LITERAL",
            Expr::Binary(_) => "BIN_OP",
            Expr::Unary(_) => "UNARY_OP",
        }
    }

    /// Auxiliary attributes, as they appear in the JSON tree.
    pub fn attrs(&self) -> Map<String, Json> {
        let mut attrs = Map::new();
        match self {
            Expr::Literal(lit) => {
                attrs.insert("value".into(), json!(lit.text));
                attrs.insert("inferred_type".into(), json!(lit.kind.type_name()));
                attrs.insert("line".into(), json!(lit.span.line));
            }
            Expr::Var(id) => {
                attrs.insert("value".into(), json!(id.name));
                attrs.insert("inferred_type".into(), json!("var"));
                attrs.insert("line".into(), json!(id.span.line));
            }
            Expr::Binary(bin) => {
                attrs.insert("operator".into(), json!(bin.op.to_string()));
                attrs.insert("line".into(), json!(bin.span.line));
            }
            Expr::Unary(un) => {
                attrs.insert("operator".into(), json!(un.op.to_string()));
                attrs.insert("line".into(), json!(un.span.line));
            }
        }
        attrs
    }

    /// Serialize to the `{type, attrs, children}` tree.
    pub fn to_json(&self) -> Json {
        let children = match self {
            Expr::Literal(_) | Expr::Var(_) => Vec::new(),
            Expr::Binary(bin) => vec![bin.lhs.to_json(), bin.rhs.to_json()],
            Expr::Unary(un) => vec![un.operand.to_json()],
        };
        json!({
            "type": self.kind_name(),
            "attrs": self.attrs(),
            "children": children,
        })
    }
}

impl Stmt {
    /// Source position of the statement keyword.
    pub fn span(&self) -> Span {
        match self {
            Stmt::Assign(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::DoWhile(s) => s.span,
            Stmt::RepeatUntil(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::Read(s) => s.span,
            Stmt::Write(s) => s.span,
        }
    }

    /// Historical node-kind name.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Stmt::Assign(_) => "ASSIGNMENT",
            Stmt::If(_) => "IF",
            Stmt::While(_) => "WHILE",
            Stmt::DoWhile(_) => "DO_WHILE",
            Stmt::RepeatUntil(_) => "REPEAT_UNTIL",
            Stmt::For(_) => "FOR",
            Stmt::Read(_) => "READ",
            Stmt::Write(_) => "WRITE",
        }
    }

    /// Auxiliary attributes, as they appear in the JSON tree.
    pub fn attrs(&self) -> Map<String, Json> {
        let mut attrs = Map::new();
        attrs.insert("line".into(), json!(self.span().line));
        if let Stmt::For(for_stmt) = self {
            attrs.insert("iterator".into(), json!(for_stmt.iterator.name));
        }
        attrs
    }

    /// Serialize to the `{type, attrs, children}` tree, preserving the
    /// fixed child positions of each statement kind.
    pub fn to_json(&self) -> Json {
        let children = match self {
            Stmt::Assign(s) => vec![ident_to_json(&s.target), s.value.to_json()],
            Stmt::If(s) => vec![
                s.cond.to_json(),
                s.then_block.to_json(),
                s.else_block.to_json(),
            ],
            Stmt::While(s) => vec![s.cond.to_json(), s.body.to_json()],
            Stmt::DoWhile(s) => vec![s.body.to_json(), s.cond.to_json()],
            Stmt::RepeatUntil(s) => vec![s.body.to_json(), s.cond.to_json()],
            Stmt::For(s) => vec![
                s.start.to_json(),
                s.stop.to_json(),
                s.step.to_json(),
                s.body.to_json(),
            ],
            Stmt::Read(s) => s.targets.iter().map(ident_to_json).collect(),
            Stmt::Write(s) => s.values.iter().map(Expr::to_json).collect(),
        };
        json!({
            "type": self.kind_name(),
            "attrs": self.attrs(),
            "children": children,
        })
    }
}

impl Block {
    pub fn to_json(&self) -> Json {
        json!({
            "type": "BLOCK",
            "attrs": {},
            "children": self.stmts.iter().map(Stmt::to_json).collect::<Vec<_>>(),
        })
    }
}

impl Program {
    pub fn to_json(&self) -> Json {
        json!({
            "type": "PROGRAM",
            "attrs": {},
            "children": self.body.iter().map(Stmt::to_json).collect::<Vec<_>>(),
        })
    }
}

/// Identifier occurrences serialize as `LITERAL` nodes of inferred type
/// `var`, matching the shape produced for `Expr::Var`.
fn ident_to_json(id: &Ident) -> Json {
    json!({
        "type": "LITERAL",
        "attrs": {
            "value": id.name,
            "inferred_type": "var",
            "line": id.span.line,
        },
        "children": [],
    })
}
