//! Tree-walking evaluator

use std::cmp::Ordering;

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::{EvalError, Namespace, Value};

/// Evaluate an expression against a namespace
pub fn eval(expr: &Expr, scope: &Namespace) -> Result<Value, EvalError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Name(name) => scope
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::NameNotFound(name.clone())),
        Expr::List(items) => items
            .iter()
            .map(|item| eval(item, scope))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        Expr::Member(target, name) => member(eval(target, scope)?, name),
        Expr::Index(target, index) => subscript(eval(target, scope)?, eval(index, scope)?),
        Expr::Call(callee, args) => {
            let mut values = Vec::with_capacity(args.len() + 1);
            let function = match callee.as_ref() {
                Expr::Name(name) => name,
                // `value.method(args)` calls `method(value, args)`
                Expr::Member(receiver, method) => {
                    values.push(eval(receiver, scope)?);
                    method
                }
                _ => return Err(EvalError::Type("expression is not callable".to_string())),
            };
            for arg in args {
                values.push(eval(arg, scope)?);
            }
            call(function, values)
        }
        Expr::Unary(op, operand) => unary(*op, eval(operand, scope)?),
        Expr::Binary(BinaryOp::And, lhs, rhs) => {
            let left = eval(lhs, scope)?;
            if left.is_truthy() {
                eval(rhs, scope)
            } else {
                Ok(left)
            }
        }
        Expr::Binary(BinaryOp::Or, lhs, rhs) => {
            let left = eval(lhs, scope)?;
            if left.is_truthy() {
                Ok(left)
            } else {
                eval(rhs, scope)
            }
        }
        Expr::Binary(op, lhs, rhs) => binary(*op, eval(lhs, scope)?, eval(rhs, scope)?),
    }
}

fn member(target: Value, name: &str) -> Result<Value, EvalError> {
    match target {
        Value::Map(mut map) => map
            .swap_remove(name)
            .ok_or_else(|| EvalError::KeyNotFound(name.to_string())),
        other => Err(EvalError::Type(format!(
            "{} has no member '{}'",
            other.type_name(),
            name
        ))),
    }
}

fn subscript(target: Value, index: Value) -> Result<Value, EvalError> {
    match (target, index) {
        (Value::List(mut items), Value::Int(i)) => {
            let at = resolve_index(i, items.len())?;
            Ok(items.swap_remove(at))
        }
        (Value::Str(s), Value::Int(i)) => {
            let chars: Vec<char> = s.chars().collect();
            let at = resolve_index(i, chars.len())?;
            Ok(Value::Str(chars[at].to_string()))
        }
        (Value::Map(mut map), Value::Str(key)) => map
            .swap_remove(&key)
            .ok_or(EvalError::KeyNotFound(key)),
        (target, index) => Err(EvalError::Type(format!(
            "cannot index {} with {}",
            target.type_name(),
            index.type_name()
        ))),
    }
}

/// Negative indexes count from the end
fn resolve_index(index: i64, len: usize) -> Result<usize, EvalError> {
    let resolved = if index < 0 {
        i64::try_from(len).ok().and_then(|n| n.checked_add(index))
    } else {
        Some(index)
    };
    resolved
        .and_then(|i| usize::try_from(i).ok())
        .filter(|&i| i < len)
        .ok_or(EvalError::IndexOutOfRange { index, len })
}

fn unary(op: UnaryOp, operand: Value) -> Result<Value, EvalError> {
    match (op, operand) {
        (UnaryOp::Not, value) => Ok(Value::Bool(!value.is_truthy())),
        (UnaryOp::Neg, Value::Int(n)) => n.checked_neg().map(Value::Int).ok_or_else(overflow),
        (UnaryOp::Neg, Value::Float(x)) => Ok(Value::Float(-x)),
        (UnaryOp::Neg, other) => Err(EvalError::Type(format!(
            "cannot negate {}",
            other.type_name()
        ))),
    }
}

/// Largest string, in bytes, that repetition may produce
const MAX_STRING_LEN: usize = 1 << 24;

fn overflow() -> EvalError {
    EvalError::Type("integer overflow".to_string())
}

fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Result<Value, EvalError> {
    use Value::{Int, List, Str};

    match (op, lhs, rhs) {
        (BinaryOp::Eq, a, b) => Ok(Value::Bool(values_equal(&a, &b))),
        (BinaryOp::Ne, a, b) => Ok(Value::Bool(!values_equal(&a, &b))),
        (BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge, a, b) => {
            let ordering = compare(&a, &b)?;
            Ok(Value::Bool(match op {
                BinaryOp::Lt => ordering == Ordering::Less,
                BinaryOp::Le => ordering != Ordering::Greater,
                BinaryOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            }))
        }

        (BinaryOp::Add, Int(a), Int(b)) => a.checked_add(b).map(Int).ok_or_else(overflow),
        (BinaryOp::Sub, Int(a), Int(b)) => a.checked_sub(b).map(Int).ok_or_else(overflow),
        (BinaryOp::Mul, Int(a), Int(b)) => a.checked_mul(b).map(Int).ok_or_else(overflow),
        (BinaryOp::Rem, Int(_), Int(0)) => Err(EvalError::DivisionByZero),
        (BinaryOp::Rem, Int(a), Int(b)) => Ok(Int(a.rem_euclid(b))),

        (BinaryOp::Add, Str(a), Str(b)) => Ok(Str(a + &b)),
        (BinaryOp::Add, List(mut a), List(b)) => {
            a.extend(b);
            Ok(List(a))
        }
        (BinaryOp::Mul, Str(s), Int(n)) | (BinaryOp::Mul, Int(n), Str(s)) => {
            let count = usize::try_from(n).unwrap_or(0);
            match s.len().checked_mul(count) {
                Some(len) if len <= MAX_STRING_LEN => Ok(Str(s.repeat(count))),
                _ => Err(EvalError::Type("string too long".to_string())),
            }
        }

        (op, a, b) => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => float_op(op, x, y),
            _ => Err(EvalError::Type(format!(
                "unsupported operand types for {:?}: {} and {}",
                op,
                a.type_name(),
                b.type_name()
            ))),
        },
    }
}

/// Mixed or float arithmetic; `/` always divides as floats
fn float_op(op: BinaryOp, x: f64, y: f64) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Add => Ok(Value::Float(x + y)),
        BinaryOp::Sub => Ok(Value::Float(x - y)),
        BinaryOp::Mul => Ok(Value::Float(x * y)),
        BinaryOp::Div | BinaryOp::Rem if y == 0.0 => Err(EvalError::DivisionByZero),
        BinaryOp::Div => Ok(Value::Float(x / y)),
        BinaryOp::Rem => Ok(Value::Float(x.rem_euclid(y))),
        other => Err(EvalError::Type(format!("unsupported operator {:?}", other))),
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Result<Ordering, EvalError> {
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x
            .partial_cmp(&y)
            .ok_or_else(|| EvalError::Type("cannot compare NaN".to_string()));
    }
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => Ok(x.cmp(y)),
        _ => Err(EvalError::Type(format!(
            "cannot compare {} with {}",
            a.type_name(),
            b.type_name()
        ))),
    }
}

fn expect_args(function: &str, args: &[Value], expected: usize) -> Result<(), EvalError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(EvalError::Arity {
            function: function.to_string(),
            expected,
            found: args.len(),
        })
    }
}

fn expect_str<'v>(function: &str, value: &'v Value) -> Result<&'v str, EvalError> {
    value.as_str().ok_or_else(|| {
        EvalError::Type(format!(
            "{}() expects a str, got {}",
            function,
            value.type_name()
        ))
    })
}

/// Builtin functions, callable as `f(x)` or `x.f()`
fn call(function: &str, args: Vec<Value>) -> Result<Value, EvalError> {
    match function {
        "len" => {
            expect_args(function, &args, 1)?;
            let len = match &args[0] {
                Value::Str(s) => s.chars().count(),
                Value::List(items) => items.len(),
                Value::Map(map) => map.len(),
                other => {
                    return Err(EvalError::Type(format!(
                        "{} has no length",
                        other.type_name()
                    )))
                }
            };
            i64::try_from(len).map(Value::Int).map_err(|_| overflow())
        }
        "upper" | "lower" | "trim" => {
            expect_args(function, &args, 1)?;
            let s = expect_str(function, &args[0])?;
            Ok(Value::Str(match function {
                "upper" => s.to_uppercase(),
                "lower" => s.to_lowercase(),
                _ => s.trim().to_string(),
            }))
        }
        "str" => {
            expect_args(function, &args, 1)?;
            Ok(Value::Str(args[0].to_string()))
        }
        "int" => {
            expect_args(function, &args, 1)?;
            match &args[0] {
                Value::Int(n) => Ok(Value::Int(*n)),
                Value::Float(x) if x.is_finite() => Ok(Value::Int(x.trunc() as i64)),
                Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
                Value::Str(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| EvalError::Type(format!("invalid int literal {:?}", s))),
                other => Err(EvalError::Type(format!(
                    "cannot convert {} to int",
                    other.type_name()
                ))),
            }
        }
        "join" => {
            expect_args(function, &args, 2)?;
            let separator = expect_str(function, &args[1])?;
            match &args[0] {
                Value::List(items) => Ok(Value::Str(
                    items
                        .iter()
                        .map(Value::to_string)
                        .collect::<Vec<_>>()
                        .join(separator),
                )),
                other => Err(EvalError::Type(format!(
                    "join() expects a list, got {}",
                    other.type_name()
                ))),
            }
        }
        _ => Err(EvalError::UnknownFunction(function.to_string())),
    }
}
