// The foreign-call bridge, driven through host functions registered by the test.

mod common;

use common::{int_stack, session};
use std::rc::Rc;
use wordsmith::{
    runtime::{
        data_structures::value::Value,
        error::{self, ErrorKind, ScriptError},
        interpreter::Ffi,
    },
    CodeManagement, InterpreterStack, WordsmithInterpreter,
};

fn with_host_functions() -> WordsmithInterpreter {
    let (mut interpreter, _) = session();

    interpreter.register_host_function(
        "sum",
        Rc::new(|args: &[Value]| -> error::Result<Value> {
            Ok(Value::Int(args.iter().map(Value::get_int_val).sum()))
        }),
    );

    interpreter.register_host_function(
        "first",
        Rc::new(|args: &[Value]| -> error::Result<Value> {
            Ok(args.first().cloned().unwrap_or_default())
        }),
    );

    interpreter.register_host_function(
        "fail",
        Rc::new(|_: &[Value]| -> error::Result<Value> {
            ScriptError::new_as_result(None, ErrorKind::Runtime("host said no".to_string()), None)
        }),
    );

    interpreter
}

#[test]
fn calls_a_host_function() {
    let mut interpreter = with_host_functions();

    interpreter
        .evaluate("<test>", "1 2 3 word sum ffi::host 3 ffi::call")
        .unwrap();

    assert_eq!(int_stack(&interpreter), vec![6]);
}

#[test]
fn arguments_arrive_in_push_order() {
    let mut interpreter = with_host_functions();

    interpreter
        .evaluate("<test>", "10 20 30 word first ffi::host 3 ffi::call")
        .unwrap();

    assert_eq!(int_stack(&interpreter), vec![10]);
}

#[test]
fn zero_arguments() {
    let mut interpreter = with_host_functions();

    interpreter
        .evaluate("<test>", "5 word sum ffi::host 0 ffi::call")
        .unwrap();

    assert_eq!(int_stack(&interpreter), vec![5, 0]);
}

#[test]
fn host_functions_work_inside_definitions() {
    let mut interpreter = with_host_functions();

    interpreter
        .evaluate("<test>", ": add3 word sum ffi::host 3 ffi::call ; 1 1 1 add3")
        .unwrap();

    assert_eq!(int_stack(&interpreter), vec![3]);
}

#[test]
fn too_few_arguments_leaves_the_stack_alone() {
    let mut interpreter = with_host_functions();

    interpreter.evaluate("<test>", "1 word sum ffi::host").unwrap();

    let error = interpreter.evaluate("<test>", "3 ffi::call").unwrap_err();

    assert_eq!(error.kind(), &ErrorKind::StackUnderflow);
    assert_eq!(interpreter.stack().len(), 3);
}

#[test]
fn host_errors_get_the_call_location() {
    let mut interpreter = with_host_functions();

    let error = interpreter
        .evaluate("<test>", "word fail ffi::host 0 ffi::call")
        .unwrap_err();

    assert_eq!(error.kind(), &ErrorKind::Runtime("host said no".to_string()));
    assert_eq!(error.location().as_ref().map(|location| location.column()), Some(22));
}

#[test]
fn unknown_host_function() {
    let mut interpreter = with_host_functions();

    let error = interpreter
        .evaluate("<test>", "word nothing ffi::host")
        .unwrap_err();

    assert!(matches!(error.kind(), ErrorKind::Runtime(_)));
}

#[test]
fn missing_library() {
    let (mut interpreter, _) = session();

    let error = interpreter
        .evaluate("<test>", "word /no/such/library.so word lib ffi::open")
        .unwrap_err();

    assert!(matches!(error.kind(), ErrorKind::Runtime(_)));
    assert!(!interpreter.ffi().has_library("lib"));

    let error = interpreter
        .evaluate("<test>", "word lib word cos word f64 ffi::fn")
        .unwrap_err();

    assert!(matches!(error.kind(), ErrorKind::Runtime(_)));
}

#[test]
fn foreign_handles_print_their_name() {
    let (mut interpreter, output) = session();

    interpreter.register_host_function(
        "sum",
        Rc::new(|_: &[Value]| -> error::Result<Value> { Ok(Value::None) }),
    );
    interpreter
        .evaluate("<test>", "word sum ffi::host .")
        .unwrap();

    assert_eq!(output.contents(), "<foreign sum>\n");
}
