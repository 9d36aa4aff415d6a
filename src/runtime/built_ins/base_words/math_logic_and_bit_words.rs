use crate::{
    add_native_word,
    runtime::{
        data_structures::value::{ToValue, Value},
        error::{self, script_error, script_error_str},
        interpreter::Interpreter,
    },
};
use std::cmp::Ordering;

/// Pop the two operands of a binary word, checking that both are there first so that an underflow
/// leaves the stack untouched.
fn pop_pair(interpreter: &mut dyn Interpreter) -> error::Result<(Value, Value)> {
    interpreter.require_depth(2)?;

    let b = interpreter.pop()?;
    let a = interpreter.pop()?;

    Ok((a, b))
}

/// Fail unless both operands are numbers.
fn check_numeric(interpreter: &dyn Interpreter, a: &Value, b: &Value) -> error::Result<()> {
    if !Value::both_are_numeric(a, b) {
        script_error(
            interpreter,
            format!(
                "Values {} and {} are incompatible with numeric op.",
                a.repr(),
                b.repr()
            ),
        )?;
    }

    Ok(())
}

/// Helper function to handle math operations.  Handlers for int or floating point operations are
/// passed in as arguments.  The stack operations and value conversions are handled here.  Integer
/// handlers return None on overflow.
fn math_op(
    interpreter: &mut dyn Interpreter,
    fop: fn(f64, f64) -> f64,
    iop: fn(i64, i64) -> Option<i64>,
) -> error::Result<()> {
    let (a, b) = pop_pair(interpreter)?;

    check_numeric(interpreter, &a, &b)?;

    let result = if Value::either_is_float(&a, &b) {
        fop(a.get_float_val(), b.get_float_val()).to_value()
    } else {
        match iop(a.get_int_val(), b.get_int_val()) {
            Some(result) => result.to_value(),
            None => return script_error_str(interpreter, "Integer overflow."),
        }
    };

    interpreter.push(result);

    Ok(())
}

/// Helper function to handle bit logic operations.  The actual bit operation is passed in as an
/// argument.  The stack operations and value conversions are handled here.
fn logic_bit_op(
    interpreter: &mut dyn Interpreter,
    bop: fn(i64, i64) -> Option<i64>,
) -> error::Result<()> {
    let (a, b) = pop_pair(interpreter)?;

    if !Value::both_are_numeric(&a, &b) || Value::either_is_float(&a, &b) {
        script_error_str(
            interpreter,
            "Both bit logic operation values must be integers.",
        )?;
    }

    match bop(a.get_int_val(), b.get_int_val()) {
        Some(result) => interpreter.push(result.to_value()),
        None => script_error_str(interpreter, "Bit operation out of range.")?,
    }

    Ok(())
}

/// Order two values, failing if they can't be compared.
fn compare_values(interpreter: &dyn Interpreter, a: &Value, b: &Value) -> error::Result<Ordering> {
    match a.partial_cmp(b) {
        Some(ordering) => Ok(ordering),
        None => script_error(
            interpreter,
            format!("Can not compare {} with {}.", a.repr(), b.repr()),
        ),
    }
}

/// Helper for the ordering words.  The test decides which orderings count as true.
fn compare_op(interpreter: &mut dyn Interpreter, test: fn(Ordering) -> bool) -> error::Result<()> {
    let (a, b) = pop_pair(interpreter)?;
    let ordering = compare_values(interpreter, &a, &b)?;

    interpreter.push(test(ordering).to_value());
    Ok(())
}

/// Division where a zero divisor is an error rather than a panic or infinity.
fn check_divisor(interpreter: &dyn Interpreter, divisor: &Value) -> error::Result<()> {
    if divisor.get_float_val() == 0.0 {
        script_error_str(interpreter, "Division by zero.")?;
    }

    Ok(())
}

/// Integer remainder with the sign of the divisor.
fn floored_mod(a: i64, b: i64) -> Option<i64> {
    let remainder = a.checked_rem(b)?;

    if remainder != 0 && ((remainder < 0) != (b < 0)) {
        Some(remainder + b)
    } else {
        Some(remainder)
    }
}

/// Floating point remainder with the sign of the divisor.
fn floored_mod_float(a: f64, b: f64) -> f64 {
    a - b * (a / b).floor()
}

/// Add 2 numbers or strings together.
///
/// Signature: `a b -- result`
fn word_add(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let is_concat = {
        let stack = interpreter.stack();
        stack.len() >= 2 && stack[stack.len() - 1].is_string() && stack[stack.len() - 2].is_string()
    };

    if is_concat {
        let b = interpreter.pop_as_string()?;
        let a = interpreter.pop_as_string()?;

        interpreter.push((a + &b).to_value());
        return Ok(());
    }

    math_op(interpreter, |a, b| a + b, |a, b| a.checked_add(b))
}

/// Subtract 2 numbers.
///
/// Signature: `a b -- result`
fn word_subtract(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    math_op(interpreter, |a, b| a - b, |a, b| a.checked_sub(b))
}

/// Multiply 2 numbers.
///
/// Signature: `a b -- result`
fn word_multiply(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    math_op(interpreter, |a, b| a * b, |a, b| a.checked_mul(b))
}

/// Divide 2 numbers.  The result is always a real number.
///
/// Signature: `a b -- result`
fn word_divide(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let (a, b) = pop_pair(interpreter)?;

    check_numeric(interpreter, &a, &b)?;
    check_divisor(interpreter, &b)?;

    interpreter.push((a.get_float_val() / b.get_float_val()).to_value());
    Ok(())
}

/// Remainder of a floored division.
///
/// Signature: `a b -- remainder`
fn word_mod(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let (a, b) = pop_pair(interpreter)?;

    check_numeric(interpreter, &a, &b)?;
    check_divisor(interpreter, &b)?;

    interpreter.push(a);
    interpreter.push(b);

    math_op(interpreter, floored_mod_float, floored_mod)
}

/// Floored division giving both the remainder and the quotient.
///
/// Signature: `a b -- remainder quotient`
fn word_div_mod(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let (a, b) = pop_pair(interpreter)?;

    check_numeric(interpreter, &a, &b)?;
    check_divisor(interpreter, &b)?;

    if Value::either_is_float(&a, &b) {
        let (a, b) = (a.get_float_val(), b.get_float_val());

        interpreter.push(floored_mod_float(a, b).to_value());
        interpreter.push((a / b).floor().to_value());
    } else {
        let (a, b) = (a.get_int_val(), b.get_int_val());

        match (floored_mod(a, b), a.checked_div(b)) {
            (Some(remainder), Some(quotient)) => {
                let quotient = if remainder != 0 && ((a % b) != remainder) {
                    quotient - 1
                } else {
                    quotient
                };

                interpreter.push(remainder.to_value());
                interpreter.push(quotient.to_value());
            }

            _ => script_error_str(interpreter, "Integer overflow.")?,
        }
    }

    Ok(())
}

/// Raise a number to a power.  Integers with a negative exponent give a real result.
///
/// Signature: `base exponent -- result`
fn word_power(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let (a, b) = pop_pair(interpreter)?;

    check_numeric(interpreter, &a, &b)?;

    if Value::either_is_float(&a, &b) || b.get_int_val() < 0 {
        interpreter.push(a.get_float_val().powf(b.get_float_val()).to_value());
        return Ok(());
    }

    let exponent = match u32::try_from(b.get_int_val()) {
        Ok(exponent) => exponent,
        Err(_) => return script_error_str(interpreter, "Exponent too large."),
    };

    match a.get_int_val().checked_pow(exponent) {
        Some(result) => interpreter.push(result.to_value()),
        None => script_error_str(interpreter, "Integer overflow.")?,
    }

    Ok(())
}

/// Modular exponentiation on integers.
///
/// Signature: `base exponent modulus -- result`
fn word_power_mod(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require_depth(3)?;

    let modulus = interpreter.pop_as_int()?;
    let exponent = interpreter.pop_as_int()?;
    let base = interpreter.pop_as_int()?;

    if modulus == 0 {
        return script_error_str(interpreter, "Division by zero.");
    }

    if exponent < 0 {
        return script_error_str(interpreter, "Negative exponent in modular power.");
    }

    let modulus = modulus as i128;
    let mut base = (base as i128).rem_euclid(modulus.abs());
    let mut exponent = exponent;
    let mut result: i128 = 1 % modulus.abs();

    while exponent > 0 {
        if exponent & 1 == 1 {
            result = (result * base) % modulus.abs();
        }

        base = (base * base) % modulus.abs();
        exponent >>= 1;
    }

    // Give the result the sign of the modulus.
    if modulus < 0 && result != 0 {
        result += modulus;
    }

    interpreter.push((result as i64).to_value());
    Ok(())
}

/// Absolute value of a number.
///
/// Signature: `a -- |a|`
fn word_abs(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let value = interpreter.pop()?;

    match value {
        Value::Float(value) => interpreter.push(value.abs().to_value()),
        Value::Int(_) | Value::Bool(_) => match value.get_int_val().checked_abs() {
            Some(result) => interpreter.push(result.to_value()),
            None => script_error_str(interpreter, "Integer overflow.")?,
        },
        _ => script_error(interpreter, format!("Can not take abs of {}.", value.repr()))?,
    }

    Ok(())
}

/// Negate a number.
///
/// Signature: `a -- -a`
fn word_negate(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let value = interpreter.pop()?;

    match value {
        Value::Float(value) => interpreter.push((-value).to_value()),
        Value::Int(_) | Value::Bool(_) => match value.get_int_val().checked_neg() {
            Some(result) => interpreter.push(result.to_value()),
            None => script_error_str(interpreter, "Integer overflow.")?,
        },
        _ => script_error(interpreter, format!("Can not negate {}.", value.repr()))?,
    }

    Ok(())
}

/// Numbers are returned unchanged, anything else is an error.
///
/// Signature: `a -- a`
fn word_positive(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let value = interpreter.pop()?;

    match value {
        Value::Bool(_) => interpreter.push(value.get_int_val().to_value()),
        Value::Int(_) | Value::Float(_) => interpreter.push(value),
        _ => script_error(interpreter, format!("{} is not a number.", value.repr()))?,
    }

    Ok(())
}

/// The larger of 2 values.
///
/// Signature: `a b -- max`
fn word_max(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let (a, b) = pop_pair(interpreter)?;
    let ordering = compare_values(interpreter, &a, &b)?;

    interpreter.push(if ordering == Ordering::Less { b } else { a });
    Ok(())
}

/// The smaller of 2 values.
///
/// Signature: `a b -- min`
fn word_min(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let (a, b) = pop_pair(interpreter)?;
    let ordering = compare_values(interpreter, &a, &b)?;

    interpreter.push(if ordering == Ordering::Greater { b } else { a });
    Ok(())
}

/// If a is false it's the result, otherwise b is.
///
/// Signature: `a b -- result`
fn word_logic_and(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let (a, b) = pop_pair(interpreter)?;

    interpreter.push(if a.get_bool_val() { b } else { a });
    Ok(())
}

/// If a is true it's the result, otherwise b is.
///
/// Signature: `a b -- result`
fn word_logic_or(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let (a, b) = pop_pair(interpreter)?;

    interpreter.push(if a.get_bool_val() { a } else { b });
    Ok(())
}

/// Logically invert a value.
///
/// Signature: `a -- bool`
fn word_logic_not(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let a = interpreter.pop_as_bool()?;

    interpreter.push((!a).to_value());
    Ok(())
}

/// Convert a value to a boolean by it's truthiness.
///
/// Signature: `a -- bool`
fn word_bool(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let a = interpreter.pop_as_bool()?;

    interpreter.push(a.to_value());
    Ok(())
}

/// Is a value within an inclusive range?
///
/// Signature: `value low high -- bool`
fn word_between(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.require_depth(3)?;

    let high = interpreter.pop()?;
    let low = interpreter.pop()?;
    let value = interpreter.pop()?;

    let above = compare_values(interpreter, &low, &value)? != Ordering::Greater;
    let below = compare_values(interpreter, &value, &high)? != Ordering::Greater;

    interpreter.push((above && below).to_value());
    Ok(())
}

/// Bitwise NOT a number.
///
/// Signature: `a -- !a`
fn word_bit_not(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let a = interpreter.pop_as_int()?;

    interpreter.push((!a).to_value());
    Ok(())
}

/// Are 2 values equal?
///
/// Signature: `a b -- boolean`
fn word_equal(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let (a, b) = pop_pair(interpreter)?;

    interpreter.push((a == b).to_value());
    Ok(())
}

/// Are 2 values different?
///
/// Signature: `a b -- boolean`
fn word_not_equal(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let (a, b) = pop_pair(interpreter)?;

    interpreter.push((a != b).to_value());
    Ok(())
}

/// Register all of the math, logic, bit, and equality words.
pub fn register_math_logic_and_bit_words(interpreter: &mut dyn Interpreter) {
    // Math ops.
    add_native_word!(
        interpreter,
        "+",
        word_add,
        "Add 2 numbers or strings together.",
        "a b -- result"
    );

    add_native_word!(
        interpreter,
        "-",
        word_subtract,
        "Subtract 2 numbers.",
        "a b -- result"
    );

    add_native_word!(
        interpreter,
        "*",
        word_multiply,
        "Multiply 2 numbers.",
        "a b -- result"
    );

    add_native_word!(
        interpreter,
        "/",
        word_divide,
        "Divide 2 numbers giving a real result.",
        "a b -- result"
    );

    add_native_word!(
        interpreter,
        "mod",
        word_mod,
        "Remainder of floored division.",
        "a b -- remainder"
    );

    add_native_word!(
        interpreter,
        "/mod",
        word_div_mod,
        "Floored division giving remainder and quotient.",
        "a b -- remainder quotient"
    );

    add_native_word!(
        interpreter,
        "**",
        word_power,
        "Raise a number to a power.",
        "base exponent -- result"
    );

    add_native_word!(
        interpreter,
        "**mod",
        word_power_mod,
        "Raise an integer to a power modulo another.",
        "base exponent modulus -- result"
    );

    add_native_word!(
        interpreter,
        "abs",
        word_abs,
        "Absolute value of a number.",
        "a -- |a|"
    );

    add_native_word!(
        interpreter,
        "negate",
        word_negate,
        "Negate a number.",
        "a -- -a"
    );

    add_native_word!(
        interpreter,
        "positive",
        word_positive,
        "Check that a value is a number, leaving it as is.",
        "a -- a"
    );

    add_native_word!(
        interpreter,
        "max",
        word_max,
        "The larger of 2 values.",
        "a b -- max"
    );

    add_native_word!(
        interpreter,
        "min",
        word_min,
        "The smaller of 2 values.",
        "a b -- min"
    );

    // Logical words.
    add_native_word!(
        interpreter,
        "and",
        word_logic_and,
        "a if it's false, otherwise b.",
        "a b -- result"
    );

    add_native_word!(
        interpreter,
        "or",
        word_logic_or,
        "a if it's true, otherwise b.",
        "a b -- result"
    );

    add_native_word!(
        interpreter,
        "not",
        word_logic_not,
        "Logically invert a value.",
        "a -- bool"
    );

    add_native_word!(
        interpreter,
        "bool",
        word_bool,
        "Convert a value to a boolean.",
        "a -- bool"
    );

    add_native_word!(
        interpreter,
        "between",
        word_between,
        "Is a value within an inclusive range?",
        "value low high -- bool"
    );

    // Bitwise operator words.
    add_native_word!(
        interpreter,
        "&",
        |interpreter| logic_bit_op(interpreter, |a, b| Some(a & b)),
        "Bitwise AND two numbers together.",
        "a b -- result"
    );

    add_native_word!(
        interpreter,
        "|",
        |interpreter| logic_bit_op(interpreter, |a, b| Some(a | b)),
        "Bitwise OR two numbers together.",
        "a b -- result"
    );

    add_native_word!(
        interpreter,
        "^",
        |interpreter| logic_bit_op(interpreter, |a, b| Some(a ^ b)),
        "Bitwise XOR two numbers together.",
        "a b -- result"
    );

    add_native_word!(
        interpreter,
        "invert",
        word_bit_not,
        "Bitwise NOT a number.",
        "number -- result"
    );

    add_native_word!(
        interpreter,
        "<<",
        |interpreter| {
            logic_bit_op(interpreter, |value, amount| {
                value.checked_shl(u32::try_from(amount).ok()?)
            })
        },
        "Shift a numbers bits to the left.",
        "value amount -- result"
    );

    add_native_word!(
        interpreter,
        ">>",
        |interpreter| {
            logic_bit_op(interpreter, |value, amount| {
                value.checked_shr(u32::try_from(amount).ok()?)
            })
        },
        "Shift a numbers bits to the right.",
        "value amount -- result"
    );

    // Equality words.
    add_native_word!(
        interpreter,
        "=",
        word_equal,
        "Are 2 values equal?",
        "a b -- bool"
    );

    add_native_word!(
        interpreter,
        "!=",
        word_not_equal,
        "Are 2 values different?",
        "a b -- bool"
    );

    add_native_word!(
        interpreter,
        ">=",
        |interpreter| compare_op(interpreter, |ordering| ordering != Ordering::Less),
        "Is one value greater or equal to another?",
        "a b -- bool"
    );

    add_native_word!(
        interpreter,
        "<=",
        |interpreter| compare_op(interpreter, |ordering| ordering != Ordering::Greater),
        "Is one value less than or equal to another?",
        "a b -- bool"
    );

    add_native_word!(
        interpreter,
        ">",
        |interpreter| compare_op(interpreter, |ordering| ordering == Ordering::Greater),
        "Is one value greater than another?",
        "a b -- bool"
    );

    add_native_word!(
        interpreter,
        "<",
        |interpreter| compare_op(interpreter, |ordering| ordering == Ordering::Less),
        "Is one value less than another?",
        "a b -- bool"
    );
}
