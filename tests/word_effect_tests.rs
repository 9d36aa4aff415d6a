// Stack effects of the native words and the standard library, one case per line.

mod common;

use common::session;
use test_case::test_case;
use wordsmith::{
    runtime::{data_structures::value::Value, error::Result},
    CodeManagement, ErrorKind, InterpreterStack,
};

fn eval_ints(source: &str, init_stack: &[i64]) -> Result<Vec<i64>> {
    let (mut interpreter, _) = session();

    for &value in init_stack {
        interpreter.push(Value::from(value));
    }

    interpreter.evaluate("<test>", source)?;
    Ok(interpreter.stack().iter().map(Value::get_int_val).collect())
}

fn eval_values(source: &str) -> Result<Vec<Value>> {
    let (mut interpreter, _) = session();

    interpreter.evaluate("<test>", source)?;
    Ok(interpreter.stack().clone())
}

#[test_case("dup", &[1], &[1, 1]; "dup")]
#[test_case("drop", &[1, 2], &[1]; "drop")]
#[test_case("swap", &[1, 2], &[2, 1]; "swap")]
#[test_case("2swap", &[1, 2, 3, 4], &[3, 4, 1, 2]; "two swap")]
#[test_case("over", &[1, 2], &[1, 2, 1]; "over")]
#[test_case("rot", &[1, 2, 3], &[2, 3, 1]; "rot")]
#[test_case("-rot", &[1, 2, 3], &[3, 1, 2]; "reverse rot")]
#[test_case("nip", &[1, 2], &[2]; "nip")]
#[test_case("2dup", &[1, 2], &[1, 2, 1, 2]; "two dup")]
#[test_case("depth", &[7, 7, 7], &[7, 7, 7, 3]; "depth")]
#[test_case("clear", &[1, 2, 3], &[]; "clear")]
#[test_case("0 @", &[9, 8], &[9, 8, 9]; "fetch from the bottom")]
#[test_case("5 0 !", &[9, 8], &[5, 8]; "store from the bottom")]
fn stack_words(source: &str, init_stack: &[i64], expected: &[i64]) {
    assert_eq!(eval_ints(source, init_stack).unwrap(), expected);
}

#[test_case("+", &[2, 2], &[4]; "add")]
#[test_case("-", &[5, 2], &[3]; "subtract")]
#[test_case("*", &[3, 4], &[12]; "multiply")]
#[test_case("mod", &[13, 5], &[3]; "mod")]
#[test_case("mod", &[-7, 2], &[1]; "mod floors")]
#[test_case("/mod", &[13, 5], &[3, 2]; "div mod")]
#[test_case("/mod", &[-7, 2], &[1, -4]; "div mod floors")]
#[test_case("**", &[2, 10], &[1024]; "power")]
#[test_case("**mod", &[4, 13, 497], &[445]; "modular power")]
#[test_case("abs", &[-42], &[42]; "abs")]
#[test_case("negate", &[9], &[-9]; "negate")]
#[test_case("invert", &[0], &[-1]; "invert")]
#[test_case("&", &[12, 10], &[8]; "bit and")]
#[test_case("|", &[12, 10], &[14]; "bit or")]
#[test_case("^", &[12, 10], &[6]; "bit xor")]
#[test_case("<<", &[1, 4], &[16]; "shift left")]
#[test_case(">>", &[16, 2], &[4]; "shift right")]
#[test_case("max", &[3, 8], &[8]; "max")]
#[test_case("min", &[3, 8], &[3]; "min")]
#[test_case("and", &[0, 5], &[0]; "and gives the false operand")]
#[test_case("and", &[3, 5], &[5]; "and gives the last operand")]
#[test_case("or", &[0, 5], &[5]; "or gives the true operand")]
#[test_case("or", &[3, 5], &[3]; "or gives the first operand")]
#[test_case("=", &[3, 3], &[1]; "equal")]
#[test_case("!=", &[3, 3], &[0]; "not equal")]
#[test_case("<", &[2, 3], &[1]; "less than")]
#[test_case(">=", &[2, 3], &[0]; "greater or equal")]
#[test_case("between", &[5, 1, 5], &[1]; "between is inclusive")]
#[test_case("between", &[6, 1, 5], &[0]; "between outside")]
fn math_words(source: &str, init_stack: &[i64], expected: &[i64]) {
    assert_eq!(eval_ints(source, init_stack).unwrap(), expected);
}

#[test_case("1+", &[41], &[42]; "add one")]
#[test_case("1-", &[43], &[42]; "subtract one")]
#[test_case("2*", &[7], &[14]; "times two")]
#[test_case("square", &[9], &[81]; "square")]
#[test_case("cube", &[3], &[27]; "cube")]
#[test_case("tuck", &[1, 2], &[2, 1, 2]; "tuck")]
#[test_case("2drop", &[1, 2, 3], &[1]; "two drop")]
#[test_case("0=", &[0], &[1]; "zero equal")]
#[test_case("0<", &[-3], &[1]; "zero less")]
#[test_case("0>", &[-3], &[0]; "zero greater")]
#[test_case("<>", &[1, 2], &[1]; "different")]
#[test_case("?dup", &[4], &[4, 4]; "question dup true")]
#[test_case("?dup", &[0], &[0]; "question dup false")]
fn standard_library_words(source: &str, init_stack: &[i64], expected: &[i64]) {
    assert_eq!(eval_ints(source, init_stack).unwrap(), expected);
}

#[test]
fn division_is_real() {
    assert_eq!(eval_values("7 2 /").unwrap(), vec![Value::Float(3.5)]);
    assert!(eval_values("6 3 /").unwrap()[0].is_float());
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    let error = eval_values("1 0 /").unwrap_err();
    assert!(matches!(error.kind(), ErrorKind::Runtime(_)));

    let error = eval_values("1 0 mod").unwrap_err();
    assert!(matches!(error.kind(), ErrorKind::Runtime(_)));
}

#[test]
fn comparisons_push_booleans() {
    assert_eq!(eval_values("1 2 <").unwrap(), vec![Value::Bool(true)]);
    assert!(eval_values("1 1 =").unwrap()[0].is_bool());
}

#[test]
fn negative_powers_are_real() {
    assert_eq!(eval_values("2 -1 **").unwrap(), vec![Value::Float(0.5)]);
}

#[test]
fn truthiness() {
    assert_eq!(
        eval_values("0 bool 0.0 bool none bool 3 bool").unwrap(),
        vec![
            Value::Bool(false),
            Value::Bool(false),
            Value::Bool(false),
            Value::Bool(true)
        ]
    );

    assert_eq!(eval_values("word x bool not").unwrap(), vec![Value::Bool(false)]);
}

#[test]
fn strings_concatenate() {
    assert_eq!(
        eval_values("word foo word bar +").unwrap(),
        vec![Value::String("foobar".to_string())]
    );
}

#[test]
fn constants() {
    assert_eq!(
        eval_values("true false none").unwrap(),
        vec![Value::Bool(true), Value::Bool(false), Value::None]
    );
}

#[test]
fn integer_overflow_is_reported() {
    let error = eval_values("9223372036854775807 1 +").unwrap_err();
    assert!(matches!(error.kind(), ErrorKind::Runtime(_)));
}
