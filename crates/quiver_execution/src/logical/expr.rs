use std::fmt;

use futures::future::BoxFuture;
use quiver_error::{QuiverError, Result};

use super::operator::LogicalPlan;
use crate::arrays::datatype::DataType;
use crate::arrays::field::Field;
use crate::arrays::scalar::ScalarValue;

/// A scalar expression within a logical plan.
///
/// Resolves to a `Field` (name plus inferred type) against the schema of the
/// plan it will execute over.
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalExpression {
    /// Reference to a column by name.
    Column(String),
    /// A constant value.
    Literal(ScalarValue),
    Binary {
        op: BinaryOperator,
        left: Box<LogicalExpression>,
        right: Box<LogicalExpression>,
    },
    Aggregate {
        func: AggregateFunction,
        input: Box<LogicalExpression>,
    },
    /// Renames the inner expression's derived field, keeping its type.
    Alias {
        alias: String,
        expr: Box<LogicalExpression>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Eq,
    NotEq,
    Gt,
    Lt,
    GtEq,
    LtEq,
    And,
    Or,
    IsNull,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOperator {
    /// Whether this operator produces a boolean result.
    pub const fn is_boolean(&self) -> bool {
        matches!(
            self,
            Self::Eq
                | Self::NotEq
                | Self::Gt
                | Self::Lt
                | Self::GtEq
                | Self::LtEq
                | Self::And
                | Self::Or
                | Self::IsNull
        )
    }

    /// The derived field name for boolean operators.
    fn boolean_field_name(&self) -> Option<&'static str> {
        Some(match self {
            Self::Eq => "equals",
            Self::NotEq => "not-equals",
            Self::Gt => "greater",
            Self::Lt => "lesser",
            Self::GtEq => "greater-than-equals",
            Self::LtEq => "less-than-equals",
            Self::And => "and",
            Self::Or => "or",
            Self::IsNull => "is-null",
            _ => return None,
        })
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Eq | Self::IsNull => "=",
            Self::NotEq => "<>",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::GtEq => ">=",
            Self::LtEq => "<=",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Sum,
    Min,
    Max,
    Avg,
    Count,
}

impl AggregateFunction {
    fn field_name(&self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Min => "min",
            Self::Max => "max",
            Self::Avg => "avg",
            Self::Count => "count",
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

impl LogicalExpression {
    pub fn column(name: impl Into<String>) -> Self {
        LogicalExpression::Column(name.into())
    }

    pub fn literal(value: impl Into<ScalarValue>) -> Self {
        LogicalExpression::Literal(value.into())
    }

    pub fn binary(op: BinaryOperator, left: LogicalExpression, right: LogicalExpression) -> Self {
        LogicalExpression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// IS NULL is modeled as a comparison against the null literal.
    pub fn is_null(expr: LogicalExpression) -> Self {
        Self::binary(
            BinaryOperator::IsNull,
            expr,
            LogicalExpression::Literal(ScalarValue::Null),
        )
    }

    pub fn alias(alias: impl Into<String>, expr: LogicalExpression) -> Self {
        LogicalExpression::Alias {
            alias: alias.into(),
            expr: Box::new(expr),
        }
    }

    /// Whether this expression produces a boolean result.
    pub fn is_boolean(&self) -> bool {
        match self {
            Self::Binary { op, .. } => op.is_boolean(),
            Self::Alias { expr, .. } => expr.is_boolean(),
            _ => false,
        }
    }

    /// Derive the field this expression produces against the given input
    /// plan's schema.
    ///
    /// Boolean operators always yield a `Boolean` field named after the
    /// operator. Arithmetic operators inherit the left operand's type.
    /// `Count` always yields `Number`; the other aggregates inherit the inner
    /// expression's type.
    pub fn to_field<'a>(&'a self, input: &'a LogicalPlan) -> BoxFuture<'a, Result<Field>> {
        Box::pin(async move {
            match self {
                Self::Column(name) => {
                    let schema = input.output_schema().await?;
                    let (_, field) = schema
                        .field_by_name(name)
                        .ok_or_else(|| QuiverError::sql(format!("No column named: {name}")))?;
                    Ok(field.clone())
                }
                Self::Literal(value) => Ok(Field::new(value.to_string(), value.datatype())),
                Self::Binary { op, left, .. } => match op.boolean_field_name() {
                    Some(name) => Ok(Field::new(name, DataType::Boolean)),
                    None => {
                        let left_field = left.to_field(input).await?;
                        Ok(Field::new(self.to_string(), left_field.datatype))
                    }
                },
                Self::Aggregate { func, input: expr } => {
                    let datatype = match func {
                        AggregateFunction::Count => DataType::Number,
                        _ => expr.to_field(input).await?.datatype,
                    };
                    Ok(Field::new(func.field_name(), datatype))
                }
                Self::Alias { alias, expr } => {
                    let inner = expr.to_field(input).await?;
                    Ok(Field::new(alias.clone(), inner.datatype))
                }
            }
        })
    }
}

impl fmt::Display for LogicalExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(name) => write!(f, "#{name}"),
            Self::Literal(value) => write!(f, "{value}"),
            Self::Binary { op, left, right } => write!(f, "{left} {op} {right}"),
            Self::Aggregate { func, input } => write!(f, "{func}({input})"),
            Self::Alias { alias, expr } => write!(f, "{expr} as {alias}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;
    use crate::arrays::field::Schema;
    use crate::test_util::memory_scan;

    fn sample_scan() -> LogicalPlan {
        memory_scan(
            "orders",
            Schema::new([
                Field::new("buyer_name", DataType::String),
                Field::new("amount", DataType::Number),
            ]),
        )
    }

    #[test]
    fn column_resolves_against_input() {
        let scan = sample_scan();
        let field = block_on(LogicalExpression::column("amount").to_field(&scan)).unwrap();
        assert_eq!(Field::new("amount", DataType::Number), field);
    }

    #[test]
    fn unknown_column_is_semantic_error() {
        let scan = sample_scan();
        let err = block_on(LogicalExpression::column("missing").to_field(&scan)).unwrap_err();
        assert!(err.to_string().contains("No column named: missing"), "{err}");
    }

    #[test]
    fn boolean_operator_field() {
        let scan = sample_scan();
        let expr = LogicalExpression::binary(
            BinaryOperator::Eq,
            LogicalExpression::column("buyer_name"),
            LogicalExpression::literal("Automatad Inc."),
        );
        let field = block_on(expr.to_field(&scan)).unwrap();
        assert_eq!(Field::new("equals", DataType::Boolean), field);
    }

    #[test]
    fn math_operator_inherits_left_type() {
        let scan = sample_scan();
        let expr = LogicalExpression::binary(
            BinaryOperator::Add,
            LogicalExpression::column("amount"),
            LogicalExpression::literal(1.0),
        );
        let field = block_on(expr.to_field(&scan)).unwrap();
        assert_eq!(Field::new("#amount + 1", DataType::Number), field);
    }

    #[test]
    fn count_always_number() {
        let scan = sample_scan();
        let expr = LogicalExpression::Aggregate {
            func: AggregateFunction::Count,
            input: Box::new(LogicalExpression::column("buyer_name")),
        };
        let field = block_on(expr.to_field(&scan)).unwrap();
        assert_eq!(Field::new("count", DataType::Number), field);
    }

    #[test]
    fn alias_renames_keeping_type() {
        let scan = sample_scan();
        let expr = LogicalExpression::alias("total", LogicalExpression::column("amount"));
        let field = block_on(expr.to_field(&scan)).unwrap();
        assert_eq!(Field::new("total", DataType::Number), field);
    }

    #[test]
    fn display_forms() {
        let expr = LogicalExpression::binary(
            BinaryOperator::Lt,
            LogicalExpression::column("amount"),
            LogicalExpression::literal(10.0),
        );
        assert_eq!("#amount < 10", expr.to_string());

        let is_null = LogicalExpression::is_null(LogicalExpression::column("amount"));
        assert_eq!("#amount = NULL", is_null.to_string());

        let agg = LogicalExpression::Aggregate {
            func: AggregateFunction::Sum,
            input: Box::new(LogicalExpression::column("amount")),
        };
        assert_eq!("sum(#amount)", agg.to_string());
    }
}
