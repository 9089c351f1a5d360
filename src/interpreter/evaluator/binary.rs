use crate::{
    ast::{BinaryOp, UnaryOp},
    error::RuntimeError,
    interpreter::{evaluator::core::EvalResult, value::Value},
};

/// Two floats compare equal when they differ by less than this.
const FLOAT_EQ_EPSILON: f64 = 1e-10;

/// Dispatches a binary operation over two evaluated operands.
pub fn eval_binary(op: BinaryOp, left: &Value, right: &Value, line: usize) -> EvalResult<Value> {
    match op {
        BinaryOp::Add => add(left, right, line),
        BinaryOp::Sub => sub(left, right, line),
        BinaryOp::Mul => mul(left, right, line),
        BinaryOp::Div => div(left, right, line),
        BinaryOp::Mod => modulo(left, right, line),
        BinaryOp::Pow => power(left, right, line),
        BinaryOp::MatMul => matmul(left, right, line),
        BinaryOp::Eq => Ok(Value::Bool(values_equal(left, right))),
        BinaryOp::Ne => Ok(Value::Bool(!values_equal(left, right))),
        BinaryOp::Lt => Ok(Value::Bool(less_than(left, right, line)?)),
        BinaryOp::Le => Ok(Value::Bool(less_equal(left, right, line)?)),
        BinaryOp::Gt => Ok(Value::Bool(!less_equal(left, right, line)?)),
        BinaryOp::Ge => Ok(Value::Bool(!less_than(left, right, line)?)),
        BinaryOp::And => Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        BinaryOp::Or => Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
    }
}

/// Dispatches a unary operation over an evaluated operand.
pub fn eval_unary(op: UnaryOp, operand: &Value, line: usize) -> EvalResult<Value> {
    match op {
        UnaryOp::Negate => negate(operand, line),
        UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
    }
}

/// Addition: integer, float, string concatenation, or element-wise matrix.
///
/// Two integers stay integer; any float promotes both sides.
fn add(left: &Value, right: &Value, line: usize) -> EvalResult<Value> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => {
            a.checked_add(*b)
             .map(Value::Integer)
             .ok_or(RuntimeError::Overflow { line })
        },
        _ if left.is_numeric() && right.is_numeric() => {
            Ok(Value::Float(left.to_float(line)? + right.to_float(line)?))
        },
        (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
        (Value::Matrix(a), Value::Matrix(b)) => Ok(Value::Matrix(a.add(b, line)?)),
        _ => Err(type_error("add", left, right, line)),
    }
}

/// Subtraction: integer, float, or element-wise matrix.
fn sub(left: &Value, right: &Value, line: usize) -> EvalResult<Value> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => {
            a.checked_sub(*b)
             .map(Value::Integer)
             .ok_or(RuntimeError::Overflow { line })
        },
        _ if left.is_numeric() && right.is_numeric() => {
            Ok(Value::Float(left.to_float(line)? - right.to_float(line)?))
        },
        (Value::Matrix(a), Value::Matrix(b)) => Ok(Value::Matrix(a.sub(b, line)?)),
        _ => Err(type_error("subtract", left, right, line)),
    }
}

/// Multiplication: numeric, or an element-wise matrix scale from either
/// side.
fn mul(left: &Value, right: &Value, line: usize) -> EvalResult<Value> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => {
            a.checked_mul(*b)
             .map(Value::Integer)
             .ok_or(RuntimeError::Overflow { line })
        },
        _ if left.is_numeric() && right.is_numeric() => {
            Ok(Value::Float(left.to_float(line)? * right.to_float(line)?))
        },
        (Value::Matrix(m), scalar) if scalar.is_numeric() => {
            Ok(Value::Matrix(m.scale(scalar.to_float(line)?)))
        },
        (scalar, Value::Matrix(m)) if scalar.is_numeric() => {
            Ok(Value::Matrix(m.scale(scalar.to_float(line)?)))
        },
        _ => Err(type_error("multiply", left, right, line)),
    }
}

/// Division always produces a float and rejects a zero divisor. A matrix may
/// be divided by a scalar element-wise.
fn div(left: &Value, right: &Value, line: usize) -> EvalResult<Value> {
    match (left, right) {
        _ if left.is_numeric() && right.is_numeric() => {
            let divisor = right.to_float(line)?;
            if divisor == 0.0 {
                return Err(RuntimeError::DivisionByZero { line });
            }
            Ok(Value::Float(left.to_float(line)? / divisor))
        },
        (Value::Matrix(m), scalar) if scalar.is_numeric() => {
            let divisor = scalar.to_float(line)?;
            if divisor == 0.0 {
                return Err(RuntimeError::DivisionByZero { line });
            }
            Ok(Value::Matrix(m.scale(1.0 / divisor)))
        },
        _ => Err(type_error("divide", left, right, line)),
    }
}

/// Modulo requires two integers and a non-zero divisor.
fn modulo(left: &Value, right: &Value, line: usize) -> EvalResult<Value> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => {
            if *b == 0 {
                return Err(RuntimeError::ModuloByZero { line });
            }
            Ok(Value::Integer(a.wrapping_rem(*b)))
        },
        _ => Err(RuntimeError::TypeMismatch { details:
                                                  "Modulo operation requires integer operands"
                                                                                              .to_string(),
                                              line }),
    }
}

/// Exponentiation always produces a float.
fn power(left: &Value, right: &Value, line: usize) -> EvalResult<Value> {
    if left.is_numeric() && right.is_numeric() {
        return Ok(Value::Float(left.to_float(line)?.powf(right.to_float(line)?)));
    }
    Err(RuntimeError::TypeMismatch { details: "Power operation requires numeric operands"
                                                                                         .to_string(),
                                     line })
}

/// Matrix multiplication via the `mult` operator.
fn matmul(left: &Value, right: &Value, line: usize) -> EvalResult<Value> {
    match (left, right) {
        (Value::Matrix(a), Value::Matrix(b)) => Ok(Value::Matrix(a.matmul(b, line)?)),
        _ => Err(RuntimeError::TypeMismatch { details:
                                                  "Matrix multiplication requires matrix operands"
                                                                                                  .to_string(),
                                              line }),
    }
}

/// Negation of numbers and matrices.
fn negate(operand: &Value, line: usize) -> EvalResult<Value> {
    match operand {
        Value::Integer(n) => {
            n.checked_neg()
             .map(Value::Integer)
             .ok_or(RuntimeError::Overflow { line })
        },
        Value::Float(r) => Ok(Value::Float(-r)),
        Value::Matrix(m) => Ok(Value::Matrix(m.negate())),
        _ => Err(RuntimeError::TypeMismatch { details: format!("Cannot negate {}",
                                                               operand.type_name()),
                                              line }),
    }
}

/// Structural equality.
///
/// Values of different variants are never equal — an integer does not equal
/// a float of the same magnitude. Floats compare within `±1e-10`; matrices
/// compare element-exact.
#[must_use]
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => a == b,
        (Value::Float(a), Value::Float(b)) => (a - b).abs() < FLOAT_EQ_EPSILON,
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Matrix(a), Value::Matrix(b)) => a == b,
        (Value::None, Value::None) => true,
        _ => false,
    }
}

/// Strict ordering: numerics via float promotion, strings lexicographically.
///
/// Every other combination is a type error.
fn less_than(left: &Value, right: &Value, line: usize) -> EvalResult<bool> {
    match (left, right) {
        _ if left.is_numeric() && right.is_numeric() => {
            Ok(left.to_float(line)? < right.to_float(line)?)
        },
        (Value::Str(a), Value::Str(b)) => Ok(a < b),
        _ => Err(RuntimeError::TypeMismatch { details: format!("Cannot compare {} with {}",
                                                               left.type_name(),
                                                               right.type_name()),
                                              line }),
    }
}

/// `<=` is `<` or `==`, exactly as the comparison model defines it.
fn less_equal(left: &Value, right: &Value, line: usize) -> EvalResult<bool> {
    Ok(less_than(left, right, line)? || values_equal(left, right))
}

fn type_error(operation: &str, left: &Value, right: &Value, line: usize) -> RuntimeError {
    RuntimeError::TypeMismatch { details: format!("Cannot {operation} {} and {}",
                                                  left.type_name(),
                                                  right.type_name()),
                                 line }
}
