// Whole script files run the same way the command line runs them.

mod common;

use common::session;
use pretty_assertions::assert_eq;
use std::path::Path;
use wordsmith::{CodeManagement, ErrorKind, Interpreter, InterpreterStack};

fn script_path(name: &str) -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("scripts")
        .join(name)
        .to_string_lossy()
        .to_string()
}

fn run_script(name: &str) -> String {
    let (mut interpreter, output) = session();

    interpreter.process_source_file(&script_path(name)).unwrap();

    assert!(interpreter.control_stack().is_empty());
    output.contents()
}

#[test]
fn control_flow_script() {
    assert_eq!(
        run_script("control_flow.f"),
        "negative\nzero\npositive\n120\n1\n1\n2\n3\n"
    );
}

#[test]
fn import_resolves_against_the_importing_file() {
    assert_eq!(run_script("uses_import.f"), "25\n");
}

#[test]
fn search_paths_are_restored_after_import() {
    let (mut interpreter, _) = session();
    let before = interpreter.search_paths().len();

    interpreter
        .process_source_file(&script_path("uses_import.f"))
        .unwrap();

    assert_eq!(interpreter.search_paths().len(), before);
    assert!(interpreter.stack().is_empty());
}

#[test]
fn scripts_recover_from_errors() {
    let output = run_script("errors.f");

    assert!(output.contains("InvalidWordUsage:"), "{}", output);
    assert!(output.contains("UnknownWord:"), "{}", output);
    assert!(output.contains("StackUnderflow:"), "{}", output);
    assert!(output.ends_with("42\n"), "{}", output);
}

#[test]
fn error_locations_name_the_script() {
    let (mut interpreter, _) = session();

    interpreter
        .process_source_file(&script_path("errors.f"))
        .unwrap();

    let error = interpreter.last_error().clone().unwrap();
    let location = error.location().clone().unwrap();

    assert!(location.path().ends_with("errors.f"));
    assert_eq!(location.line(), 5);
}

#[test]
fn import_word_inside_a_session() {
    let (mut interpreter, output) = session();

    let source = format!("import {} 1 2 sum-of-squares .", script_path("square_lib.f"));
    interpreter.process_source("<test>", &source).unwrap();

    assert_eq!(output.contents(), "5\n");
}

#[test]
fn self_import_is_refused() {
    let (mut interpreter, output) = session();

    interpreter
        .process_source_file(&script_path("self_import.f"))
        .unwrap();

    let output = output.contents();
    assert!(output.starts_with("IoError:"), "{}", output);
    assert!(output.ends_with("7\n"), "{}", output);

    let error = interpreter.last_error().clone().unwrap();
    assert!(matches!(error.kind(), ErrorKind::Io(message) if message.contains("self_import.f")));

    let location = error.location().clone().unwrap();
    assert!(location.path().ends_with("self_import.f"));
    assert_eq!(location.line(), 2);

    assert!(interpreter.search_paths().is_empty());
}

#[test]
fn import_cycles_are_refused() {
    let output = run_script("cycle_a.f");

    assert!(output.contains("imports can not form a cycle"), "{}", output);
    assert!(output.ends_with("2\n1\n"), "{}", output);
}

#[test]
fn a_file_can_be_imported_again_once_finished() {
    let (mut interpreter, output) = session();
    let path = script_path("square_lib.f");

    let source = format!("import {} import {} 1 1 sum-of-squares .", path, path);
    interpreter.process_source("<test>", &source).unwrap();

    assert_eq!(output.contents(), "2\n");
}

#[test]
fn location_is_restored_after_import() {
    let (mut interpreter, _) = session();

    let source = format!("import {}\n  nosuch", script_path("square_lib.f"));
    interpreter.process_source("<outer>", &source).unwrap();

    let error = interpreter.last_error().clone().unwrap();
    assert_eq!(error.kind(), &ErrorKind::UnknownWord("nosuch".to_string()));

    let location = error.location().clone().unwrap();
    assert_eq!(location.path(), "<outer>");
    assert_eq!(location.line(), 2);
    assert_eq!(location.column(), 2);
}

#[test]
fn location_is_restored_after_import_inside_a_file() {
    let (mut interpreter, _) = session();

    interpreter
        .process_source_file(&script_path("uses_import.f"))
        .unwrap();
    interpreter.process_source("<after>", "nosuch").unwrap();

    let location = interpreter
        .last_error()
        .clone()
        .and_then(|error| error.location().clone())
        .unwrap();

    assert_eq!(location.path(), "<after>");
    assert_eq!(location.line(), 1);
}
