//! Abstract Syntax Tree types for the expression language

use super::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

/// A parsed expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    Name(String),
    List(Vec<Expr>),
    /// `target.name`
    Member(Box<Expr>, String),
    /// `target[index]`
    Index(Box<Expr>, Box<Expr>),
    /// `callee(args)`; the callee is a function name or a `value.method`
    Call(Box<Expr>, Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
}

/// Postfix operations folded onto an atom while parsing
#[derive(Debug, Clone)]
pub(crate) enum Postfix {
    Member(String),
    Index(Expr),
    Call(Vec<Expr>),
}

impl Postfix {
    pub(crate) fn apply(self, target: Expr) -> Expr {
        match self {
            Postfix::Member(name) => Expr::Member(Box::new(target), name),
            Postfix::Index(index) => Expr::Index(Box::new(target), Box::new(index)),
            Postfix::Call(args) => Expr::Call(Box::new(target), args),
        }
    }
}
