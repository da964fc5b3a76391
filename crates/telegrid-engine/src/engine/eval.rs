//! Pure formula evaluation against an injected cell resolver.
//!
//! Evaluation never touches a store directly: the caller supplies a resolver
//! from cell reference to current value, and gets back either a live-binding
//! marker or a concrete scalar. Every fault is folded into an in-value error;
//! nothing escapes as `Err` or a panic.

use std::collections::HashMap;

use super::ast::{BinaryOp, Expr};
use super::cell_ref::CellRef;
use super::deps::{extract_live_metric, extract_references};
use super::parse::parse_expression;
use super::value::CellValue;
use crate::error::{FormulaError, FormulaResult};

/// Outcome of evaluating a formula body.
#[derive(Debug, Clone, PartialEq)]
pub enum Evaluation {
    /// The formula is a live metric binding; its value arrives later over
    /// the streaming channel, never through this path.
    Live(String),
    /// A concrete result (possibly `Empty` or an error value).
    Value(CellValue),
}

/// Evaluate a formula body (the text after the `=` marker).
///
/// A live directive short-circuits everything else. Otherwise every
/// referenced cell is resolved up front; a reference with no current value
/// makes the whole expression `Empty` ("not yet computable") before any
/// parsing happens, mirroring substitute-then-evaluate semantics. Faults
/// become `Value(Error(..))`.
pub fn evaluate_formula<F>(body: &str, resolve: F) -> Evaluation
where
    F: Fn(&CellRef) -> Option<CellValue>,
{
    if let Some(metric) = extract_live_metric(body) {
        return Evaluation::Live(metric);
    }

    let mut scope = HashMap::new();
    for cell_ref in extract_references(body) {
        match resolve(&cell_ref) {
            Some(value) if !value.is_empty() => {
                scope.insert(cell_ref, value);
            }
            _ => return Evaluation::Value(CellValue::Empty),
        }
    }

    Evaluation::Value(match eval_body(body, &scope) {
        Ok(value) => value,
        Err(err) => CellValue::Error(err.to_string()),
    })
}

fn eval_body(body: &str, scope: &HashMap<CellRef, CellValue>) -> FormulaResult<CellValue> {
    let expr = parse_expression(body)?;
    eval_expr(&expr, scope)
}

fn eval_expr(expr: &Expr, scope: &HashMap<CellRef, CellValue>) -> FormulaResult<CellValue> {
    match expr {
        Expr::Number(n) => Ok(CellValue::Number(*n)),
        Expr::Constant(c) => Ok(CellValue::Number(c.value())),
        Expr::Reference(cell_ref) => match scope.get(cell_ref) {
            Some(CellValue::Error(_)) => Err(FormulaError::Eval(format!(
                "referenced cell {} holds an error",
                cell_ref
            ))),
            Some(value) => Ok(value.clone()),
            // Extraction and the parser agree on the reference grammar, so a
            // parsed reference is always in scope.
            None => Err(FormulaError::Eval(format!(
                "unresolved reference {}",
                cell_ref
            ))),
        },
        Expr::Negate(inner) => {
            let x = numeric(eval_expr(inner, scope)?)?;
            finite(-x)
        }
        Expr::Binary { op, lhs, rhs } => {
            let l = numeric(eval_expr(lhs, scope)?)?;
            let r = numeric(eval_expr(rhs, scope)?)?;
            finite(match op {
                BinaryOp::Add => l + r,
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                BinaryOp::Div => l / r,
                BinaryOp::Rem => l % r,
            })
        }
        Expr::Call { function, args } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(numeric(eval_expr(arg, scope)?)?);
            }
            finite(function.call(&values)?)
        }
    }
}

fn numeric(value: CellValue) -> FormulaResult<f64> {
    value
        .as_number()
        .ok_or_else(|| FormulaError::Eval(format!("expected a number, got '{}'", value)))
}

fn finite(x: f64) -> FormulaResult<CellValue> {
    if x.is_finite() {
        Ok(CellValue::Number(x))
    } else {
        Err(FormulaError::Eval("result is not a finite number".to_string()))
    }
}
