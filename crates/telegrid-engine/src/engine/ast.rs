//! Bounded expression tree for formula evaluation.
//!
//! The evaluator walks this tree directly; no code is generated or executed.
//! [`Constant`] and [`Function`] together are the entire ambient context a
//! formula can name - an identifier outside them is unrepresentable, which is
//! what makes the evaluation sandbox airtight.

use super::cell_ref::CellRef;
use crate::error::{FormulaError, FormulaResult};

/// A parsed formula expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(f64),
    Reference(CellRef),
    Constant(Constant),
    Negate(Box<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        function: Function,
        args: Vec<Expr>,
    },
}

/// Binary operators supported in formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

/// Allow-listed named constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn from_name(name: &str) -> Option<Constant> {
        match name {
            "PI" => Some(Constant::Pi),
            "E" => Some(Constant::E),
            _ => None,
        }
    }

    pub fn value(self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
        }
    }
}

/// Allow-listed math functions. Names are lowercase and case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Sqrt,
    Abs,
    Floor,
    Ceil,
    Round,
    Max,
    Min,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Function> {
        match name {
            "sin" => Some(Function::Sin),
            "cos" => Some(Function::Cos),
            "tan" => Some(Function::Tan),
            "sqrt" => Some(Function::Sqrt),
            "abs" => Some(Function::Abs),
            "floor" => Some(Function::Floor),
            "ceil" => Some(Function::Ceil),
            "round" => Some(Function::Round),
            "max" => Some(Function::Max),
            "min" => Some(Function::Min),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Sqrt => "sqrt",
            Function::Abs => "abs",
            Function::Floor => "floor",
            Function::Ceil => "ceil",
            Function::Round => "round",
            Function::Max => "max",
            Function::Min => "min",
        }
    }

    /// Apply the function to already-evaluated numeric arguments.
    /// `max`/`min` are variadic (at least one argument); the rest are unary.
    pub fn call(self, args: &[f64]) -> FormulaResult<f64> {
        match self {
            Function::Sin => Ok(self.unary(args)?.sin()),
            Function::Cos => Ok(self.unary(args)?.cos()),
            Function::Tan => Ok(self.unary(args)?.tan()),
            Function::Sqrt => Ok(self.unary(args)?.sqrt()),
            Function::Abs => Ok(self.unary(args)?.abs()),
            Function::Floor => Ok(self.unary(args)?.floor()),
            Function::Ceil => Ok(self.unary(args)?.ceil()),
            Function::Round => Ok(self.unary(args)?.round()),
            Function::Max => self
                .variadic(args)
                .map(|(first, rest)| rest.iter().fold(first, |acc, &x| acc.max(x))),
            Function::Min => self
                .variadic(args)
                .map(|(first, rest)| rest.iter().fold(first, |acc, &x| acc.min(x))),
        }
    }

    fn unary(self, args: &[f64]) -> FormulaResult<f64> {
        match args {
            [x] => Ok(*x),
            _ => Err(FormulaError::ArgumentCount {
                function: self.name().to_string(),
                expected: "1".to_string(),
                actual: args.len(),
            }),
        }
    }

    fn variadic(self, args: &[f64]) -> FormulaResult<(f64, &[f64])> {
        match args {
            [first, rest @ ..] => Ok((*first, rest)),
            [] => Err(FormulaError::ArgumentCount {
                function: self.name().to_string(),
                expected: "at least 1".to_string(),
                actual: 0,
            }),
        }
    }
}
