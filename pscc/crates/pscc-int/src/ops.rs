//! Operator semantics on runtime values.
//!
//! Kept apart from the visitor so the coercion rules are explicit,
//! exhaustively matched and testable on their own. The short-circuiting
//! operators (`si`, `sau`) never reach [`apply_binop`]; the interpreter
//! decides operand evaluation for those itself.

use pscc_par::{BinOp, UnOp};

use crate::error::ExecError;
use crate::value::Value;

/// Both operands widened to a common numeric representation.
enum NumPair {
    Ints(i64, i64),
    Reals(f64, f64),
}

fn numeric_pair(lhs: &Value, rhs: &Value) -> Option<NumPair> {
    match (lhs, rhs) {
        (Value::Int(l), Value::Int(r)) => Some(NumPair::Ints(*l, *r)),
        _ => Some(NumPair::Reals(lhs.as_real()?, rhs.as_real()?)),
    }
}

fn invalid(op: BinOp, line: u32) -> ExecError {
    ExecError::InvalidOperands {
        op: op.to_string(),
        line,
    }
}

/// Apply a non-short-circuiting binary operator.
pub(crate) fn apply_binop(
    op: BinOp,
    lhs: &Value,
    rhs: &Value,
    line: u32,
) -> Result<Value, ExecError> {
    match op {
        BinOp::Add => {
            if let (Value::Str(l), Value::Str(r)) = (lhs, rhs) {
                return Ok(Value::Str(format!("{l}{r}")));
            }
            match numeric_pair(lhs, rhs).ok_or_else(|| invalid(op, line))? {
                NumPair::Ints(l, r) => l
                    .checked_add(r)
                    .map(Value::Int)
                    .ok_or(ExecError::Overflow {
                        op: "+".into(),
                        line,
                    }),
                NumPair::Reals(l, r) => Ok(Value::Real(l + r)),
            }
        }
        BinOp::Sub => match numeric_pair(lhs, rhs).ok_or_else(|| invalid(op, line))? {
            NumPair::Ints(l, r) => l
                .checked_sub(r)
                .map(Value::Int)
                .ok_or(ExecError::Overflow {
                    op: "-".into(),
                    line,
                }),
            NumPair::Reals(l, r) => Ok(Value::Real(l - r)),
        },
        BinOp::Mul => match numeric_pair(lhs, rhs).ok_or_else(|| invalid(op, line))? {
            NumPair::Ints(l, r) => l
                .checked_mul(r)
                .map(Value::Int)
                .ok_or(ExecError::Overflow {
                    op: "*".into(),
                    line,
                }),
            NumPair::Reals(l, r) => Ok(Value::Real(l * r)),
        },
        // Real division, even for integer operands.
        BinOp::Div => {
            let (l, r) = match numeric_pair(lhs, rhs).ok_or_else(|| invalid(op, line))? {
                NumPair::Ints(l, r) => (l as f64, r as f64),
                NumPair::Reals(l, r) => (l, r),
            };
            if r == 0.0 {
                return Err(ExecError::DivisionByZero { line });
            }
            Ok(Value::Real(l / r))
        }
        BinOp::Mod => match numeric_pair(lhs, rhs).ok_or_else(|| invalid(op, line))? {
            NumPair::Ints(_, 0) => Err(ExecError::DivisionByZero { line }),
            NumPair::Ints(l, r) => l
                .checked_rem(r)
                .map(Value::Int)
                .ok_or(ExecError::Overflow {
                    op: "%".into(),
                    line,
                }),
            NumPair::Reals(_, r) if r == 0.0 => Err(ExecError::DivisionByZero { line }),
            NumPair::Reals(l, r) => Ok(Value::Real(l % r)),
        },
        BinOp::Pow => match numeric_pair(lhs, rhs).ok_or_else(|| invalid(op, line))? {
            NumPair::Ints(l, r) if r >= 0 => {
                let exponent = u32::try_from(r).map_err(|_| ExecError::Overflow {
                    op: "^".into(),
                    line,
                })?;
                l.checked_pow(exponent)
                    .map(Value::Int)
                    .ok_or(ExecError::Overflow {
                        op: "^".into(),
                        line,
                    })
            }
            NumPair::Ints(l, r) => Ok(Value::Real((l as f64).powf(r as f64))),
            NumPair::Reals(l, r) => Ok(Value::Real(l.powf(r))),
        },
        BinOp::Eq => Ok(Value::Bool(values_equal(lhs, rhs))),
        BinOp::Ne => Ok(Value::Bool(!values_equal(lhs, rhs))),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            let ordering = match (lhs, rhs) {
                (Value::Str(l), Value::Str(r)) => l.cmp(r),
                _ => {
                    let (l, r) = match numeric_pair(lhs, rhs).ok_or_else(|| invalid(op, line))? {
                        NumPair::Ints(l, r) => (l as f64, r as f64),
                        NumPair::Reals(l, r) => (l, r),
                    };
                    l.partial_cmp(&r).ok_or_else(|| invalid(op, line))?
                }
            };
            let holds = match op {
                BinOp::Lt => ordering.is_lt(),
                BinOp::Le => ordering.is_le(),
                BinOp::Gt => ordering.is_gt(),
                _ => ordering.is_ge(),
            };
            Ok(Value::Bool(holds))
        }
        // Short-circuiting; handled by the interpreter before operand
        // evaluation.
        BinOp::And | BinOp::Or => Err(invalid(op, line)),
    }
}

/// `=` / `!=` across all value kinds: numeric values compare by value,
/// other kinds must match exactly, mismatched kinds are unequal.
fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Str(l), Value::Str(r)) => l == r,
        (Value::Bool(l), Value::Bool(r)) => l == r,
        (Value::Str(_), _) | (_, Value::Str(_)) => false,
        (Value::Bool(_), _) | (_, Value::Bool(_)) => false,
        _ => match numeric_pair(lhs, rhs) {
            Some(NumPair::Ints(l, r)) => l == r,
            Some(NumPair::Reals(l, r)) => l == r,
            None => false,
        },
    }
}

/// Apply a unary operator. `NOT` accepts anything via truthiness; the
/// rest require numeric operands.
pub(crate) fn apply_unop(op: UnOp, operand: &Value, line: u32) -> Result<Value, ExecError> {
    match op {
        UnOp::Not => Ok(Value::Bool(!operand.is_truthy())),
        UnOp::Neg => match operand {
            Value::Int(i) => i.checked_neg().map(Value::Int).ok_or(ExecError::Overflow {
                op: "MINUS".into(),
                line,
            }),
            Value::Real(r) => Ok(Value::Real(-r)),
            _ => Err(ExecError::InvalidOperands {
                op: "MINUS".into(),
                line,
            }),
        },
        UnOp::Sqrt => {
            let x = operand.as_real().ok_or(ExecError::InvalidOperands {
                op: "SQRT".into(),
                line,
            })?;
            if x < 0.0 {
                return Err(ExecError::NegativeSqrt { line });
            }
            Ok(Value::Real(x.sqrt()))
        }
        UnOp::Floor => match operand {
            Value::Int(i) => Ok(Value::Int(*i)),
            Value::Real(r) => {
                let floored = r.floor();
                if floored < i64::MIN as f64 || floored > i64::MAX as f64 {
                    return Err(ExecError::Overflow {
                        op: "FLOOR".into(),
                        line,
                    });
                }
                Ok(Value::Int(floored as i64))
            }
            _ => Err(ExecError::InvalidOperands {
                op: "FLOOR".into(),
                line,
            }),
        },
    }
}
