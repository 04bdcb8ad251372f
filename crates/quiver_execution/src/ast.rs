//! SQL abstract syntax tree consumed by the logical planner.
//!
//! Parsing SQL text into this tree is an external concern. The shapes here
//! mirror the parser's tagged nodes: a restricted `SELECT` statement over a
//! single table, comparison and arithmetic operators carried as their SQL
//! token text, and identifiers possibly back-tick quoted.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Select(SelectStatement),
    /// Any statement kind the planner does not handle. Carries the parser's
    /// node tag for error reporting.
    Unsupported { tag: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectStatement {
    pub select_items: Vec<SelectExpr>,
    pub from: Option<Vec<TableReference>>,
    pub where_clause: Option<Expr>,
}

/// A single item in the SELECT list, with its optional `AS` alias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectExpr {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl SelectExpr {
    pub fn new(expr: Expr) -> Self {
        SelectExpr { expr, alias: None }
    }

    pub fn with_alias(expr: Expr, alias: impl Into<String>) -> Self {
        SelectExpr {
            expr,
            alias: Some(alias.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TableReference {
    Factor(TableFactor),
    LeftRightJoin {
        left: Box<TableReference>,
        right: Box<TableReference>,
    },
    InnerCrossJoin {
        left: Box<TableReference>,
        right: Box<TableReference>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TableFactor {
    /// A bare table name.
    Identifier(String),
    /// Subqueries and other factors the planner rejects.
    Unsupported { tag: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Column reference, possibly back-tick quoted (quotes retained by the
    /// parser, stripped by the planner).
    Identifier(String),
    /// Numeric literal, carried as the raw token text.
    Number(String),
    /// String literal, carried with its surrounding quote characters.
    String(String),
    FunctionCall {
        name: String,
        params: Vec<Expr>,
    },
    /// Arithmetic expression, operator one of `+ - * /`.
    Bit {
        operator: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Comparison, operator one of `= <> > >= < <=`.
    Comparison {
        operator: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    And {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Or {
        left: Box<Expr>,
        right: Box<Expr>,
    },
    IsNull {
        expr: Box<Expr>,
    },
}

impl Expr {
    pub fn comparison(operator: impl Into<String>, left: Expr, right: Expr) -> Self {
        Expr::Comparison {
            operator: operator.into(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn bit(operator: impl Into<String>, left: Expr, right: Expr) -> Self {
        Expr::Bit {
            operator: operator.into(),
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Expr::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Expr::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}
