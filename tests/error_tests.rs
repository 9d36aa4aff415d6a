// Malformed programs: unmatched closers, underflow, unknown words and recovery.

mod common;

use common::{int_stack, run, session};
use test_case::test_case;
use wordsmith::{CodeManagement, ErrorKind, Interpreter, InterpreterStack, WordManagement};

fn last_error_kind(source: &str) -> (ErrorKind, Vec<i64>, usize) {
    let (interpreter, _) = run(source);

    let kind = interpreter
        .last_error()
        .as_ref()
        .map(|error| error.kind().clone())
        .unwrap();

    (kind, int_stack(&interpreter), interpreter.control_stack().len())
}

#[test_case("1 2 ;", ";"; "semicolon without colon")]
#[test_case("1 2 then", "then"; "then without if")]
#[test_case("1 2 else", "else"; "else without if")]
#[test_case("1 2 ]", "]"; "close bracket without open")]
#[test_case("1 2 )", ")"; "close paren without open")]
fn unmatched_closers(source: &str, closer: &str) {
    let (kind, stack, control_depth) = last_error_kind(source);

    match kind {
        ErrorKind::InvalidWordUsage { word, .. } => assert_eq!(word, closer),
        other => panic!("unexpected error {:?}", other),
    }

    assert_eq!(stack, vec![1, 2]);
    assert_eq!(control_depth, 0);
}

#[test]
fn mismatched_closer_leaves_constructs_open() {
    let (mut interpreter, _) = session();

    interpreter.process_source("<test>", ": foo [ ;").unwrap();

    let error = interpreter.last_error().clone().unwrap();
    assert!(matches!(error.kind(), ErrorKind::InvalidWordUsage { .. }));
    assert_eq!(interpreter.control_stack().len(), 2);
    assert_eq!(interpreter.compile_depth(), 2);

    interpreter.process_source("<test>", "] 1 ; foo").unwrap();
    assert_eq!(int_stack(&interpreter), vec![1]);
}

#[test]
fn until_without_begin() {
    let (kind, _, _) = last_error_kind(": foo 1 until ;");
    assert!(matches!(kind, ErrorKind::InvalidWordUsage { word, .. } if word == "until"));
}

#[test_case("begin"; "begin")]
#[test_case("0 branch"; "branch")]
#[test_case("true 0 0branch"; "zero branch")]
#[test_case("0 jmp"; "jmp")]
#[test_case("exit"; "exit")]
fn control_words_need_a_definition(source: &str) {
    let (kind, _, _) = last_error_kind(source);
    assert!(matches!(kind, ErrorKind::InvalidWordUsage { .. }), "{:?}", kind);
}

#[test]
fn branch_outside_definition_leaves_stack() {
    let (_, stack, _) = last_error_kind("7 branch");
    assert_eq!(stack, vec![7]);
}

#[test_case("swap", &[1]; "swap")]
#[test_case("over", &[1]; "over")]
#[test_case("rot", &[1, 2]; "rot")]
#[test_case("-rot", &[1, 2]; "reverse rot")]
#[test_case("2swap", &[1, 2, 3]; "two swap")]
#[test_case("2dup", &[1]; "two dup")]
#[test_case("nip", &[1]; "nip")]
#[test_case("+", &[1]; "add")]
#[test_case("/mod", &[1]; "div mod")]
#[test_case("**mod", &[1, 2]; "modular power")]
#[test_case("between", &[1, 2]; "between")]
#[test_case("=", &[1]; "equal")]
#[test_case("and", &[1]; "and")]
#[test_case("!", &[1]; "store")]
#[test_case("@", &[]; "fetch")]
#[test_case("dup", &[]; "dup")]
fn underflow_leaves_the_stack_unchanged(word: &str, init_stack: &[i64]) {
    let source = init_stack
        .iter()
        .map(|value| value.to_string())
        .chain(std::iter::once(word.to_string()))
        .collect::<Vec<_>>()
        .join(" ");

    let (kind, stack, _) = last_error_kind(&source);

    assert_eq!(kind, ErrorKind::StackUnderflow);
    assert_eq!(stack, init_stack);
}

#[test]
fn recovery_continues_with_the_next_token() {
    let (interpreter, output) = run("1 nosuch 2 drop drop drop 3");

    assert_eq!(int_stack(&interpreter), vec![3]);
    assert!(output.contains("UnknownWord: <test>:1:2: unknown word 'nosuch'"), "{}", output);
    assert!(output.contains("StackUnderflow:"), "{}", output);
}

#[test]
fn unknown_word_in_definition_fails_at_semicolon() {
    let (interpreter, output) = run(": broken 1 nosuch ;");

    assert!(output.contains("unknown word 'nosuch'"), "{}", output);

    let error = interpreter.last_error().clone().unwrap();
    let location = error.location().clone().unwrap();
    assert_eq!(location.column(), 18);

    assert!(interpreter.dictionary().try_get("broken").is_none());
    assert!(interpreter.stack().is_empty());
    assert!(interpreter.control_stack().is_empty());
    assert!(!interpreter.is_compiling());
}

#[test]
fn errors_carry_the_closer_location() {
    let (interpreter, _) = run("1 2\n   ;");

    let error = interpreter.last_error().clone().unwrap();
    let location = error.location().clone().unwrap();

    assert_eq!(location.path(), "<test>");
    assert_eq!(location.line(), 2);
    assert_eq!(location.column(), 3);
}

#[test]
fn errors_in_definitions_carry_the_call_stack() {
    let (interpreter, output) = run(": inner 1 0 / ; : outer inner ; outer 5");

    let error = interpreter.last_error().clone().unwrap();
    let call_stack = error.call_stack().clone().unwrap();

    let names: Vec<&String> = call_stack.iter().map(|item| item.word()).collect();
    assert_eq!(names, vec!["outer", "inner"]);

    assert!(output.contains("Call stack"), "{}", output);
    assert!(interpreter.call_stack().is_empty());
    assert_eq!(int_stack(&interpreter), vec![5]);
}

#[test]
fn strict_evaluation_stops_at_the_first_error() {
    let (mut interpreter, _) = session();

    let error = interpreter.evaluate("<test>", "1 nosuch 2").unwrap_err();

    assert_eq!(error.kind(), &ErrorKind::UnknownWord("nosuch".to_string()));
    assert_eq!(int_stack(&interpreter), vec![1]);
}

#[test]
fn immediate_without_a_definition() {
    let (mut interpreter, _) = common::bare_session();

    let error = interpreter.evaluate("<test>", "immediate").unwrap_err();
    assert!(matches!(error.kind(), ErrorKind::Runtime(_)));
}

#[test]
fn import_of_a_missing_file() {
    let (kind, _, _) = last_error_kind("import no-such-file.f");
    assert!(matches!(kind, ErrorKind::Io(_)), "{:?}", kind);
}

#[test]
fn reset_clears_the_session_state() {
    let (mut interpreter, _) = session();

    interpreter.process_source("<test>", "1 2 : unfinished 3").unwrap();
    assert!(interpreter.is_compiling());

    interpreter.reset();

    assert!(interpreter.stack().is_empty());
    assert!(interpreter.control_stack().is_empty());
    assert!(!interpreter.is_compiling());
}

#[test_case("_7"; "leading separator")]
#[test_case("1_"; "trailing separator")]
#[test_case("1__0"; "doubled separator")]
fn misplaced_separators_are_not_numbers(text: &str) {
    let (kind, stack, _) = last_error_kind(text);

    assert_eq!(kind, ErrorKind::UnknownWord(text.to_string()));
    assert!(stack.is_empty());
}
