//! Arithmetic and conversion operators

use serde_json::Value;

use crate::expression::{doc, Expression, Repr};

/// Binary arithmetic operator kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Mod,
}

impl ArithmeticOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "$add",
            ArithmeticOp::Subtract => "$subtract",
            ArithmeticOp::Multiply => "$multiply",
            ArithmeticOp::Divide => "$divide",
            ArithmeticOp::Mod => "$mod",
        }
    }
}

/// Binary arithmetic node: `{"$op": [lhs, rhs]}`
#[derive(Debug, Clone)]
pub struct Arithmetic {
    op: ArithmeticOp,
    operands: [Repr; 2],
}

impl Arithmetic {
    pub fn new(op: ArithmeticOp, lhs: impl Into<Repr>, rhs: impl Into<Repr>) -> Self {
        Self {
            op,
            operands: [lhs.into(), rhs.into()],
        }
    }

    pub fn op(&self) -> ArithmeticOp {
        self.op
    }
}

impl Expression for Arithmetic {
    fn to_representation(&self) -> Repr {
        Repr::keyed(self.op.as_str(), Repr::Array(self.operands.to_vec()))
    }
}

pub fn add(lhs: impl Into<Repr>, rhs: impl Into<Repr>) -> Arithmetic {
    Arithmetic::new(ArithmeticOp::Add, lhs, rhs)
}

pub fn subtract(lhs: impl Into<Repr>, rhs: impl Into<Repr>) -> Arithmetic {
    Arithmetic::new(ArithmeticOp::Subtract, lhs, rhs)
}

pub fn multiply(lhs: impl Into<Repr>, rhs: impl Into<Repr>) -> Arithmetic {
    Arithmetic::new(ArithmeticOp::Multiply, lhs, rhs)
}

pub fn divide(numerator: impl Into<Repr>, denominator: impl Into<Repr>) -> Arithmetic {
    Arithmetic::new(ArithmeticOp::Divide, numerator, denominator)
}

pub fn modulo(lhs: impl Into<Repr>, rhs: impl Into<Repr>) -> Arithmetic {
    Arithmetic::new(ArithmeticOp::Mod, lhs, rhs)
}

/// Absolute value: `{"$abs": x}`
#[derive(Debug, Clone)]
pub struct Abs(Repr);

impl Abs {
    pub fn new(input: impl Into<Repr>) -> Self {
        Self(input.into())
    }
}

impl Expression for Abs {
    fn to_representation(&self) -> Repr {
        Repr::keyed("$abs", self.0.clone())
    }
}

/// Null replacement: `{"$ifNull": [expr, replacement]}`
#[derive(Debug, Clone)]
pub struct IfNull {
    expr: Repr,
    replacement: Repr,
}

impl IfNull {
    pub fn new(expr: impl Into<Repr>, replacement: impl Into<Repr>) -> Self {
        Self {
            expr: expr.into(),
            replacement: replacement.into(),
        }
    }
}

impl Expression for IfNull {
    fn to_representation(&self) -> Repr {
        Repr::keyed(
            "$ifNull",
            Repr::Array(vec![self.expr.clone(), self.replacement.clone()]),
        )
    }
}

/// Defaults a null number to 0
pub fn sanitize_number(expr: impl Into<Repr>) -> IfNull {
    IfNull::new(expr, 0)
}

/// Target type of a `$convert`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertTarget {
    Double,
    Int,
    Long,
    Decimal,
    String,
    Bool,
    Date,
}

impl ConvertTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConvertTarget::Double => "double",
            ConvertTarget::Int => "int",
            ConvertTarget::Long => "long",
            ConvertTarget::Decimal => "decimal",
            ConvertTarget::String => "string",
            ConvertTarget::Bool => "bool",
            ConvertTarget::Date => "date",
        }
    }
}

/// Type conversion with null on error or null input
#[derive(Debug, Clone)]
pub struct Convert {
    input: Repr,
    to: ConvertTarget,
}

impl Convert {
    pub fn new(input: impl Into<Repr>, to: ConvertTarget) -> Self {
        Self {
            input: input.into(),
            to,
        }
    }
}

impl Expression for Convert {
    fn to_representation(&self) -> Repr {
        Repr::keyed(
            "$convert",
            doc([
                ("input", self.input.clone()),
                ("to", Repr::literal(self.to.as_str())),
                ("onError", Repr::Value(Value::Null)),
                ("onNull", Repr::Value(Value::Null)),
            ]),
        )
    }
}

pub fn to_double(expr: impl Into<Repr>) -> Convert {
    Convert::new(expr, ConvertTarget::Double)
}

pub fn to_int(expr: impl Into<Repr>) -> Convert {
    Convert::new(expr, ConvertTarget::Int)
}

impl_into_repr!(Arithmetic, Abs, IfNull, Convert);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::ResolutionContext;
    use serde_json::json;

    #[test]
    fn test_binary_shapes() {
        let ctx = ResolutionContext::new();
        assert_eq!(divide("a", "b").express(&ctx), json!({"$divide": ["$a", "$b"]}));
        assert_eq!(multiply("a", 2).express(&ctx), json!({"$multiply": ["$a", 2]}));
        assert_eq!(add(1, 2).express(&ctx), json!({"$add": [1, 2]}));
        assert_eq!(modulo("n", 7).express(&ctx), json!({"$mod": ["$n", 7]}));
    }

    #[test]
    fn test_nested_arithmetic() {
        let ctx = ResolutionContext::new().with_alias("price", "p");
        let expr = subtract(multiply("price", "qty"), sanitize_number("discount"));
        assert_eq!(
            expr.express(&ctx),
            json!({"$subtract": [
                {"$multiply": ["$p", "$qty"]},
                {"$ifNull": ["$discount", 0]}
            ]})
        );
    }

    #[test]
    fn test_convert_shape() {
        let ctx = ResolutionContext::new();
        assert_eq!(
            to_double("x").express(&ctx),
            json!({"$convert": {"input": "$x", "to": "double", "onError": null, "onNull": null}})
        );
        assert_eq!(to_int("x").express(&ctx)["$convert"]["to"], json!("int"));
    }

    #[test]
    fn test_abs_shape() {
        let ctx = ResolutionContext::new();
        assert_eq!(Abs::new("delta").express(&ctx), json!({"$abs": "$delta"}));
    }
}
