//! Arithmetic, comparison and membership operators
//!
//! `&&` and `||` short-circuit and are handled by the expression evaluator;
//! everything else lands here with both operands evaluated.

use std::cmp::Ordering;

use super::values::Val;
use crate::interpreter::ast::{BinaryOp, UnaryOp};
use crate::interpreter::errors::{
    GuestError, OVERFLOW_ERROR, TYPE_ERROR, VALUE_ERROR, ZERO_DIVISION_ERROR,
};

pub type OpResult = Result<Val, GuestError>;

/// Apply a binary operator to two evaluated operands
pub fn binary(op: BinaryOp, left: Val, right: Val) -> OpResult {
    match op {
        BinaryOp::Eq => Ok(Val::Bool(left == right)),
        BinaryOp::Ne => Ok(Val::Bool(left != right)),
        BinaryOp::Lt => compare(op, &left, &right, |ord| ord == Ordering::Less),
        BinaryOp::Lte => compare(op, &left, &right, |ord| ord != Ordering::Greater),
        BinaryOp::Gt => compare(op, &left, &right, |ord| ord == Ordering::Greater),
        BinaryOp::Gte => compare(op, &left, &right, |ord| ord != Ordering::Less),
        BinaryOp::In => contains(&right, &left).map(Val::Bool),
        BinaryOp::Add => add(left, right),
        BinaryOp::Sub => arithmetic(op, left, right, i64::checked_sub, |a, b| a - b),
        BinaryOp::Mul => multiply(left, right),
        BinaryOp::Div => divide(left, right),
        BinaryOp::FloorDiv => floor_divide(left, right),
        BinaryOp::Mod => modulo(left, right),
        BinaryOp::Pow => power(left, right),
        // Short-circuit forms evaluated by the caller; this is the eager fallback
        BinaryOp::And => Ok(if left.is_truthy() { right } else { left }),
        BinaryOp::Or => Ok(if left.is_truthy() { left } else { right }),
    }
}

/// Apply a unary operator
pub fn unary(op: UnaryOp, operand: Val) -> OpResult {
    match op {
        UnaryOp::Not => Ok(Val::Bool(!operand.is_truthy())),
        UnaryOp::Neg => match operand {
            Val::Int(n) => n
                .checked_neg()
                .map(Val::Int)
                .ok_or_else(|| overflow("negation")),
            Val::Float(f) => Ok(Val::Float(-f)),
            Val::Bool(b) => Ok(Val::Int(-(b as i64))),
            other => Err(GuestError::new(
                TYPE_ERROR,
                format!("bad operand type for unary -: '{}'", other.type_name()),
            )),
        },
    }
}

/// Membership test backing `in` and `contains()`
pub fn contains(container: &Val, item: &Val) -> Result<bool, GuestError> {
    match (container, item) {
        (Val::Str(haystack), Val::Str(needle)) => Ok(haystack.contains(needle.as_str())),
        (Val::Str(_), other) => Err(GuestError::new(
            TYPE_ERROR,
            format!(
                "'in <string>' requires string as left operand, not {}",
                other.type_name()
            ),
        )),
        (Val::List(items), _) => Ok(items.iter().any(|v| v == item)),
        (Val::Dict(map), Val::Str(key)) => Ok(map.contains_key(key)),
        (Val::Dict(_), _) => Ok(false),
        (other, _) => Err(GuestError::new(
            TYPE_ERROR,
            format!("argument of type '{}' is not iterable", other.type_name()),
        )),
    }
}

/* ===================== Helpers ===================== */

fn unsupported(op: BinaryOp, left: &Val, right: &Val) -> GuestError {
    GuestError::new(
        TYPE_ERROR,
        format!(
            "unsupported operand type(s) for {}: '{}' and '{}'",
            op.symbol(),
            left.type_name(),
            right.type_name()
        ),
    )
}

fn overflow(what: &str) -> GuestError {
    GuestError::new(OVERFLOW_ERROR, format!("integer overflow in {}", what))
}

fn zero_division(what: &str) -> GuestError {
    GuestError::new(ZERO_DIVISION_ERROR, what.to_string())
}

fn is_number(val: &Val) -> bool {
    matches!(val, Val::Int(_) | Val::Float(_) | Val::Bool(_))
}

/// Integer view for int/bool operands
fn as_int(val: &Val) -> Option<i64> {
    match val {
        Val::Int(n) => Some(*n),
        Val::Bool(b) => Some(*b as i64),
        _ => None,
    }
}

fn compare(
    op: BinaryOp,
    left: &Val,
    right: &Val,
    test: impl Fn(Ordering) -> bool,
) -> OpResult {
    match left.compare(right) {
        Some(ord) => Ok(Val::Bool(test(ord))),
        // NaN compares false against everything
        None if is_number(left) && is_number(right) => Ok(Val::Bool(false)),
        None => Err(GuestError::new(
            TYPE_ERROR,
            format!(
                "'{}' not supported between instances of '{}' and '{}'",
                op.symbol(),
                left.type_name(),
                right.type_name()
            ),
        )),
    }
}

/// Int op int stays integral (checked); any float operand promotes to float
fn arithmetic(
    op: BinaryOp,
    left: Val,
    right: Val,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> OpResult {
    if let (Some(a), Some(b)) = (as_int(&left), as_int(&right)) {
        return int_op(a, b)
            .map(Val::Int)
            .ok_or_else(|| overflow(op.symbol()));
    }
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => Ok(Val::Float(float_op(a, b))),
        _ => Err(unsupported(op, &left, &right)),
    }
}

fn add(left: Val, right: Val) -> OpResult {
    match (left, right) {
        (Val::Str(mut a), Val::Str(b)) => {
            a.push_str(&b);
            Ok(Val::Str(a))
        }
        (Val::List(mut a), Val::List(b)) => {
            a.extend(b);
            Ok(Val::List(a))
        }
        (left, right) => arithmetic(BinaryOp::Add, left, right, i64::checked_add, |a, b| a + b),
    }
}

fn multiply(left: Val, right: Val) -> OpResult {
    match (left, right) {
        (Val::Str(s), Val::Int(n)) | (Val::Int(n), Val::Str(s)) => {
            Ok(Val::Str(s.repeat(repeat_count(n)?)))
        }
        (Val::List(items), Val::Int(n)) | (Val::Int(n), Val::List(items)) => {
            let count = repeat_count(n)?;
            let mut out = Vec::with_capacity(items.len().saturating_mul(count));
            for _ in 0..count {
                out.extend(items.iter().cloned());
            }
            Ok(Val::List(out))
        }
        (left, right) => arithmetic(BinaryOp::Mul, left, right, i64::checked_mul, |a, b| a * b),
    }
}

fn repeat_count(n: i64) -> Result<usize, GuestError> {
    // Negative counts repeat zero times
    usize::try_from(n.max(0)).map_err(|_| GuestError::new(OVERFLOW_ERROR, "repeat count too large"))
}

fn divide(left: Val, right: Val) -> OpResult {
    match (left.as_f64(), right.as_f64()) {
        (Some(_), Some(b)) if b == 0.0 => Err(zero_division("division by zero")),
        (Some(a), Some(b)) => Ok(Val::Float(a / b)),
        _ => Err(unsupported(BinaryOp::Div, &left, &right)),
    }
}

fn floor_divide(left: Val, right: Val) -> OpResult {
    if let (Some(a), Some(b)) = (as_int(&left), as_int(&right)) {
        if b == 0 {
            return Err(zero_division("integer division by zero"));
        }
        let quotient = a.checked_div(b).ok_or_else(|| overflow("//"))?;
        // Round toward negative infinity
        let adjust = if (a % b != 0) && ((a < 0) != (b < 0)) { 1 } else { 0 };
        return Ok(Val::Int(quotient - adjust));
    }
    match (left.as_f64(), right.as_f64()) {
        (Some(_), Some(b)) if b == 0.0 => Err(zero_division("float floor division by zero")),
        (Some(a), Some(b)) => Ok(Val::Float((a / b).floor())),
        _ => Err(unsupported(BinaryOp::FloorDiv, &left, &right)),
    }
}

fn modulo(left: Val, right: Val) -> OpResult {
    if let (Some(a), Some(b)) = (as_int(&left), as_int(&right)) {
        if b == 0 {
            return Err(zero_division("integer modulo by zero"));
        }
        let rem = a.checked_rem(b).ok_or_else(|| overflow("%"))?;
        // Result takes the sign of the divisor
        let rem = if rem != 0 && ((rem < 0) != (b < 0)) { rem + b } else { rem };
        return Ok(Val::Int(rem));
    }
    match (left.as_f64(), right.as_f64()) {
        (Some(_), Some(b)) if b == 0.0 => Err(zero_division("float modulo")),
        (Some(a), Some(b)) => {
            let rem = a % b;
            let rem = if rem != 0.0 && ((rem < 0.0) != (b < 0.0)) { rem + b } else { rem };
            Ok(Val::Float(rem))
        }
        _ => Err(unsupported(BinaryOp::Mod, &left, &right)),
    }
}

fn power(left: Val, right: Val) -> OpResult {
    if let (Some(base), Some(exp)) = (as_int(&left), as_int(&right)) {
        if exp >= 0 {
            let exp = u32::try_from(exp).map_err(|_| overflow("**"))?;
            return base
                .checked_pow(exp)
                .map(Val::Int)
                .ok_or_else(|| overflow("**"));
        }
        if base == 0 {
            return Err(zero_division("0 cannot be raised to a negative power"));
        }
    }
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => {
            let result = a.powf(b);
            if result.is_nan() && !a.is_nan() && !b.is_nan() {
                return Err(GuestError::new(
                    VALUE_ERROR,
                    "negative number cannot be raised to a fractional power",
                ));
            }
            Ok(Val::Float(result))
        }
        _ => Err(unsupported(BinaryOp::Pow, &left, &right)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i64) -> Val {
        Val::Int(n)
    }

    #[test]
    fn test_int_arithmetic_stays_integral() {
        assert_eq!(binary(BinaryOp::Add, int(2), int(2)).unwrap(), Val::Int(4));
        assert!(matches!(
            binary(BinaryOp::Mul, int(3), int(4)).unwrap(),
            Val::Int(12)
        ));
        assert!(matches!(
            binary(BinaryOp::Pow, int(2), int(10)).unwrap(),
            Val::Int(1024)
        ));
    }

    #[test]
    fn test_true_division_yields_float() {
        assert!(matches!(
            binary(BinaryOp::Div, int(10), int(2)).unwrap(),
            Val::Float(f) if f == 5.0
        ));
    }

    #[test]
    fn test_division_by_zero() {
        for op in [BinaryOp::Div, BinaryOp::FloorDiv, BinaryOp::Mod] {
            let err = binary(op, int(1), int(0)).unwrap_err();
            assert_eq!(err.kind(), ZERO_DIVISION_ERROR);
        }
        let err = binary(BinaryOp::Div, Val::Float(1.0), Val::Float(0.0)).unwrap_err();
        assert_eq!(err.kind(), ZERO_DIVISION_ERROR);
    }

    #[test]
    fn test_floor_division_and_modulo_round_down() {
        assert_eq!(binary(BinaryOp::FloorDiv, int(-7), int(2)).unwrap(), int(-4));
        assert_eq!(binary(BinaryOp::Mod, int(-7), int(2)).unwrap(), int(1));
        assert_eq!(binary(BinaryOp::Mod, int(7), int(-2)).unwrap(), int(-1));
    }

    #[test]
    fn test_overflow_is_reported() {
        let err = binary(BinaryOp::Add, int(i64::MAX), int(1)).unwrap_err();
        assert_eq!(err.kind(), OVERFLOW_ERROR);
        let err = binary(BinaryOp::Pow, int(10), int(40)).unwrap_err();
        assert_eq!(err.kind(), OVERFLOW_ERROR);
    }

    #[test]
    fn test_concatenation_and_repetition() {
        assert_eq!(
            binary(BinaryOp::Add, Val::from("ab"), Val::from("cd")).unwrap(),
            Val::from("abcd")
        );
        assert_eq!(
            binary(BinaryOp::Mul, Val::from("ab"), int(3)).unwrap(),
            Val::from("ababab")
        );
        assert_eq!(
            binary(BinaryOp::Mul, Val::List(vec![int(1)]), int(2)).unwrap(),
            Val::List(vec![int(1), int(1)])
        );
    }

    #[test]
    fn test_mixed_type_addition_is_type_error() {
        let err = binary(BinaryOp::Add, Val::from("a"), int(1)).unwrap_err();
        assert_eq!(err.kind(), TYPE_ERROR);
        assert!(err.message().contains("'str' and 'int'"));
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(binary(BinaryOp::Lt, int(1), Val::Float(1.5)).unwrap(), Val::Bool(true));
        assert_eq!(
            binary(BinaryOp::Gte, Val::from("b"), Val::from("a")).unwrap(),
            Val::Bool(true)
        );
        assert!(binary(BinaryOp::Lt, int(1), Val::from("a")).is_err());
        assert_eq!(binary(BinaryOp::Eq, int(1), Val::Float(1.0)).unwrap(), Val::Bool(true));
    }

    #[test]
    fn test_membership() {
        let list = Val::List(vec![int(1), int(2)]);
        assert_eq!(binary(BinaryOp::In, int(2), list).unwrap(), Val::Bool(true));
        assert_eq!(
            binary(BinaryOp::In, Val::from("ell"), Val::from("hello")).unwrap(),
            Val::Bool(true)
        );
        assert!(binary(BinaryOp::In, int(1), int(2)).is_err());
    }

    #[test]
    fn test_unary() {
        assert_eq!(unary(UnaryOp::Neg, int(3)).unwrap(), int(-3));
        assert_eq!(unary(UnaryOp::Not, Val::from("")).unwrap(), Val::Bool(true));
        assert_eq!(
            unary(UnaryOp::Neg, int(i64::MIN)).unwrap_err().kind(),
            OVERFLOW_ERROR
        );
    }
}
