// Definitions, control flow and the other compile time words, driven through the outer loop.

mod common;

use common::{int_stack, run, session};
use pretty_assertions::assert_eq;
use wordsmith::{
    runtime::data_structures::value::Value, CodeManagement, ErrorKind, Interpreter,
    InterpreterStack, WordManagement,
};

#[test]
fn defined_word_doubles() {
    let (interpreter, output) = run(": double 2 * ; 5 double .");

    assert_eq!(output, "10\n");
    assert!(interpreter.stack().is_empty());
}

#[test]
fn adds_and_prints() {
    let (_, output) = run("3 4 + .");
    assert_eq!(output, "7\n");
}

#[test]
fn true_if_runs_its_body() {
    let (interpreter, output) = run("true if 1 . then");

    assert_eq!(output, "1\n");
    assert!(interpreter.stack().is_empty());
    assert!(interpreter.control_stack().is_empty());
}

#[test]
fn false_if_skips_its_body() {
    let (interpreter, output) = run("false if 1 . 2 3 then");

    assert_eq!(output, "");
    assert!(interpreter.stack().is_empty());
    assert!(interpreter.control_stack().is_empty());
    assert!(!interpreter.is_compiling());
}

#[test]
fn top_level_else() {
    let (_, output) = run("false if 1 . else 2 . then true if 3 . else 4 . then");
    assert_eq!(output, "2\n3\n");
}

#[test]
fn nested_skipped_conditionals() {
    let (interpreter, output) = run("false if true if 1 . then 2 . then 3 .");

    assert_eq!(output, "3\n");
    assert!(interpreter.stack().is_empty());
}

#[test]
fn compiled_conditionals() {
    let (interpreter, _) = run(
        ": sign  dup 0 < if drop -1 else 0 > if 1 else 0 then then ;
         -5 sign 7 sign 0 sign",
    );

    assert_eq!(int_stack(&interpreter), vec![-1, 1, 0]);
}

#[test]
fn compiled_if_without_else() {
    let (_, output) = run(": check  if 1 . then 2 . ; true check false check");
    assert_eq!(output, "1\n2\n2\n");
}

#[test]
fn begin_until_loop() {
    let (interpreter, output) = run(": countdown  begin dup . 1 - dup 0 = until drop ; 3 countdown");

    assert_eq!(output, "3\n2\n1\n");
    assert!(interpreter.stack().is_empty());
}

#[test]
fn begin_again_with_exit() {
    let (interpreter, _) = run(": find-ten  begin 1 + dup 10 = if exit then again ; 0 find-ten");
    assert_eq!(int_stack(&interpreter), vec![10]);
}

#[test]
fn redefinition_keeps_earlier_bindings() {
    let (interpreter, _) = run(": foo 1 ; : bar foo ; : foo 2 ; bar foo");
    assert_eq!(int_stack(&interpreter), vec![1, 2]);
}

#[test]
fn names_are_case_insensitive() {
    let (interpreter, _) = run(": Hello 5 ; HELLO hello");
    assert_eq!(int_stack(&interpreter), vec![5, 5]);
}

#[test]
fn definitions_nest_calls() {
    let (interpreter, _) = run(": a 1 ; : b a a + ; : c b b * ; c");
    assert_eq!(int_stack(&interpreter), vec![4]);
}

#[test]
fn comments_are_discarded() {
    let (interpreter, output) = run("( just a comment . ) 1 \\ and a line comment 2\n3");

    assert_eq!(output, "");
    assert_eq!(int_stack(&interpreter), vec![1, 3]);
}

#[test]
fn comments_document_definitions() {
    let (_, output) = run(": inc ( n -- n+1 ) 1 + ; see inc");

    assert!(output.starts_with(": inc ( n -- n+1 )"), "{}", output);
    assert!(output.contains("+"));
    assert!(output.trim_end().ends_with(';'));
}

#[test]
fn tick_and_execute() {
    let (interpreter, _) = run("3 ' dup execute");
    assert_eq!(int_stack(&interpreter), vec![3, 3]);

    let (interpreter, _) = run(": twice ' dup execute ; 4 twice");
    assert_eq!(int_stack(&interpreter), vec![4, 4]);
}

#[test]
fn tick_pushes_a_reference() {
    let (interpreter, _) = run("' swap");

    let entry = interpreter.dictionary().try_get("swap").cloned().unwrap();
    assert_eq!(interpreter.stack().clone(), vec![Value::Word(entry)]);
}

#[test]
fn constants_bind_values() {
    let (interpreter, _) = run("42 constant answer answer answer +");
    assert_eq!(int_stack(&interpreter), vec![84]);
}

#[test]
fn immediate_words_run_while_compiling() {
    let (mut interpreter, output) = session();

    interpreter
        .evaluate("<test>", ": seven 7 ; immediate : uses-seven seven ;")
        .unwrap();
    assert!(interpreter.stack().is_empty());

    interpreter.evaluate("<test>", "uses-seven .").unwrap();
    assert_eq!(output.contents(), "7\n");
}

#[test]
fn brackets_nest_the_mode() {
    let (mut interpreter, _) = session();

    interpreter.evaluate("<test>", "[").unwrap();
    assert!(interpreter.is_compiling());

    interpreter.evaluate("<test>", "[ ]").unwrap();
    assert!(interpreter.is_compiling());

    interpreter.evaluate("<test>", "]").unwrap();
    assert!(!interpreter.is_compiling());
    assert!(interpreter.control_stack().is_empty());
}

#[test]
fn word_reads_the_next_token() {
    let (interpreter, _) = run(": greeting word hello ; greeting word World");

    assert_eq!(
        interpreter.stack().clone(),
        vec![
            Value::String("hello".to_string()),
            Value::String("World".to_string())
        ]
    );
}

#[test]
fn numeric_fallback() {
    let (interpreter, _) = run("42 3.5 0x10 -0b101 1_000");

    assert_eq!(
        interpreter.stack().clone(),
        vec![
            Value::Int(42),
            Value::Float(3.5),
            Value::Int(16),
            Value::Int(-5),
            Value::Int(1000)
        ]
    );
    assert!(interpreter.stack()[1].is_float());

    let (interpreter, output) = run("abc");

    assert!(interpreter.stack().is_empty());
    assert!(output.starts_with("UnknownWord:"), "{}", output);
}

#[test]
fn print_stack_shows_reprs() {
    let (interpreter, output) = run("1 word a 2.5 .s");

    assert_eq!(output, "<3> 1 \"a\" 2.5\n");
    assert_eq!(interpreter.stack().len(), 3);
}

#[test]
fn emit_and_cr() {
    let (_, output) = run("72 emit 105 emit cr");
    assert_eq!(output, "Hi\n");
}

#[test]
fn words_lists_definitions() {
    let (_, output) = run(": double 2 * ; words");

    assert!(output.contains("double"));
    assert!(output.contains("immediate"));
}

#[test]
fn see_shows_native_words() {
    let (_, output) = run("see swap");
    assert!(output.starts_with("swap ( a b -- b a )  native"), "{}", output);
}

#[test]
fn bye_ends_the_session() {
    let (mut interpreter, output) = session();

    let error = interpreter.process_source("<test>", "1 . bye 2 .").unwrap_err();

    assert_eq!(error.kind(), &ErrorKind::EndOfSession);
    assert_eq!(output.contents(), "1\n");
}

#[test]
fn execute_word_named_from_host_code() {
    let (mut interpreter, _) = session();

    interpreter.evaluate("<test>", ": five 5 ;").unwrap();
    interpreter.execute_word_named("FIVE").unwrap();

    assert_eq!(int_stack(&interpreter), vec![5]);
}

#[test]
fn last_word_tracks_definitions() {
    let (interpreter, _) = run(": first 1 ; : second 2 ;");

    let last = interpreter.last_word().clone().unwrap();
    assert_eq!(last.name(), "second");
}
