use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        value::{Matrix, Value},
    },
};

/// Converts a builtin argument to `f64`, with a function-specific message.
fn numeric_argument(value: &Value, function: &str, line: usize) -> EvalResult<f64> {
    if !value.is_numeric() {
        return Err(RuntimeError::InvalidArgument { details: format!("{function}() argument must be numeric"),
                                                   line });
    }
    value.to_float(line)
}

/// Defines a one-argument builtin that applies an `f64` method.
///
/// Integers are promoted to floats before the operation; the result is
/// always a float.
macro_rules! float_builtin {
    ($(#[$doc:meta])* $fname:ident) => {
        $(#[$doc])*
        pub fn $fname(args: &[Value], line: usize) -> EvalResult<Value> {
            let value = numeric_argument(&args[0], stringify!($fname), line)?;
            Ok(Value::Float(value.$fname()))
        }
    };
}

float_builtin! {
    /// `sqrt(x)`: the square root, always a float.
    sqrt
}
float_builtin! {
    /// `sin(x)`: the sine of `x` radians.
    sin
}
float_builtin! {
    /// `cos(x)`: the cosine of `x` radians.
    cos
}
float_builtin! {
    /// `tan(x)`: the tangent of `x` radians.
    tan
}

/// `len(x)`: string length in bytes, or matrix row count.
#[allow(clippy::cast_possible_wrap)]
pub fn len(args: &[Value], line: usize) -> EvalResult<Value> {
    match &args[0] {
        Value::Str(s) => Ok(Value::Integer(s.len() as i64)),
        Value::Matrix(m) => Ok(Value::Integer(m.rows() as i64)),
        _ => Err(RuntimeError::InvalidArgument { details:
                                                     "len() argument must be a string or matrix"
                                                                                                .to_string(),
                                                 line }),
    }
}

/// `abs(x)`: absolute value, preserving the numeric type.
pub fn abs(args: &[Value], line: usize) -> EvalResult<Value> {
    match &args[0] {
        Value::Integer(n) => {
            n.checked_abs()
             .map(Value::Integer)
             .ok_or(RuntimeError::Overflow { line })
        },
        Value::Float(r) => Ok(Value::Float(r.abs())),
        _ => Err(RuntimeError::InvalidArgument { details: "abs() argument must be numeric"
                                                                                          .to_string(),
                                                 line }),
    }
}

/// `pow(base, exponent)`: always a float.
pub fn pow(args: &[Value], line: usize) -> EvalResult<Value> {
    let base = numeric_argument(&args[0], "pow", line)?;
    let exponent = numeric_argument(&args[1], "pow", line)?;
    Ok(Value::Float(base.powf(exponent)))
}

/// `floor`, `ceil` and `round`, selected by name; the result is a float.
pub fn unary_round(name: &str, args: &[Value], line: usize) -> EvalResult<Value> {
    let op = match name {
        "floor" => f64::floor,
        "ceil" => f64::ceil,
        _ => f64::round,
    };
    Ok(Value::Float(op(numeric_argument(&args[0], name, line)?)))
}

/// Validates the `(rows, cols)` argument pair of a matrix constructor.
#[allow(clippy::cast_sign_loss)]
fn matrix_dimensions(args: &[Value], function: &str, line: usize) -> EvalResult<(usize, usize)> {
    let (Value::Integer(rows), Value::Integer(cols)) = (&args[0], &args[1]) else {
        return Err(RuntimeError::InvalidArgument { details: format!("{function}() arguments must be integers"),
                                                   line });
    };

    if *rows < 0 || *cols < 0 {
        return Err(RuntimeError::InvalidArgument { details:
                                                       "Matrix dimensions must be non-negative"
                                                                                               .to_string(),
                                                   line });
    }

    Ok((*rows as usize, *cols as usize))
}

/// `zeros(rows, cols)`: a dense matrix of zeros.
pub fn zeros(args: &[Value], line: usize) -> EvalResult<Value> {
    let (rows, cols) = matrix_dimensions(args, "zeros", line)?;
    Ok(Value::Matrix(Matrix::filled(rows, cols, 0.0)))
}

/// `ones(rows, cols)`: a dense matrix of ones.
pub fn ones(args: &[Value], line: usize) -> EvalResult<Value> {
    let (rows, cols) = matrix_dimensions(args, "ones", line)?;
    Ok(Value::Matrix(Matrix::filled(rows, cols, 1.0)))
}

/// `eye(n)`: the identity matrix of size `n`.
#[allow(clippy::cast_sign_loss)]
pub fn eye(args: &[Value], line: usize) -> EvalResult<Value> {
    let Value::Integer(size) = &args[0] else {
        return Err(RuntimeError::InvalidArgument { details: "eye() argument must be an integer"
                                                                                               .to_string(),
                                                   line });
    };

    if *size < 0 {
        return Err(RuntimeError::InvalidArgument { details: "Matrix size must be non-negative"
                                                                                              .to_string(),
                                                   line });
    }

    Ok(Value::Matrix(Matrix::identity(*size as usize)))
}

/// `transpose(m)`: function form of `m.T`.
pub fn transpose(args: &[Value], line: usize) -> EvalResult<Value> {
    match &args[0] {
        Value::Matrix(m) => Ok(Value::Matrix(m.transpose())),
        _ => Err(RuntimeError::TypeMismatch { details: "Transpose operation requires a matrix"
                                                                                              .to_string(),
                                              line }),
    }
}

/// `determinant(m)`: function form of `m.d`.
pub fn determinant(args: &[Value], line: usize) -> EvalResult<Value> {
    match &args[0] {
        Value::Matrix(m) => Ok(Value::Float(m.determinant(line)?)),
        _ => Err(RuntimeError::TypeMismatch { details: "Determinant operation requires a matrix"
                                                                                                .to_string(),
                                              line }),
    }
}

/// `inverse(m)`: function form of `m.I`.
pub fn inverse(args: &[Value], line: usize) -> EvalResult<Value> {
    match &args[0] {
        Value::Matrix(m) => Ok(Value::Matrix(m.inverse(line)?)),
        _ => Err(RuntimeError::TypeMismatch { details: "Inverse operation requires a matrix"
                                                                                            .to_string(),
                                              line }),
    }
}

/// `range(n)`, `range(a, b)`, `range(a, b, step)`.
///
/// Produces an `n×1` matrix of integer-valued rows, so `for` loops unwrap
/// each row back to an integer scalar. The step must be non-zero; a negative
/// step counts down.
#[allow(clippy::cast_precision_loss)]
pub fn range(args: &[Value], line: usize) -> EvalResult<Value> {
    let mut bounds = [0i64; 3];
    for (slot, value) in bounds.iter_mut().zip(args) {
        let Value::Integer(n) = value else {
            return Err(RuntimeError::InvalidArgument { details:
                                                           "range() arguments must be integers"
                                                                                               .to_string(),
                                                       line });
        };
        *slot = *n;
    }

    let (start, end, step) = match args.len() {
        1 => (0, bounds[0], 1),
        2 => (bounds[0], bounds[1], 1),
        _ => (bounds[0], bounds[1], bounds[2]),
    };

    if step == 0 {
        return Err(RuntimeError::InvalidArgument { details: "range() step must not be zero"
                                                                                           .to_string(),
                                                   line });
    }

    let mut values = Vec::new();
    let mut current = start;
    while (step > 0 && current < end) || (step < 0 && current > end) {
        values.push(current as f64);
        match current.checked_add(step) {
            Some(next) => current = next,
            None => break,
        }
    }

    Ok(Value::Matrix(Matrix::from_column(values)))
}
