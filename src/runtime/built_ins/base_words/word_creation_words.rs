use crate::{
    add_native_immediate_word, add_native_word,
    lang::code::Entry,
    runtime::{
        data_structures::{control_stack::ControlMarker, value::Value},
        error::{self, invalid_usage, script_error_str, unknown_word},
        interpreter::Interpreter,
    },
};
use tracing::debug;

/// Describe what a closer found on top of the control stack, for error messages.
fn found_text(interpreter: &dyn Interpreter) -> String {
    match interpreter.control_stack().top() {
        Some(marker) => format!("found '{}' instead", marker.opener()),
        None => "nothing is open".to_string(),
    }
}

/// How a collected value reads when folded into a documentation string.
fn doc_text(value: &Value) -> String {
    match value {
        Value::Word(entry) => entry.name().clone(),
        Value::Token(token) => token.text().clone(),
        _ => value.to_string(),
    }
}

/// Start the creation of a new word.  Pull the name of the word from the next token in the token
/// stream.
///
/// Signature: ` -- `
fn word_start_word(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let (location, name) = interpreter.next_token()?.into_parts();
    let depth = interpreter.stack().len();

    interpreter.control_stack_mut().push(ControlMarker::Colon {
        name,
        location,
        depth,
    });

    interpreter.begin_compiling();
    interpreter.set_last_doc(None);

    Ok(())
}

/// End the creation of a new word, resolve it's body and register it with the interpreter.
///
/// Signature: ` -- `
fn word_end_word(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let (name, location, depth) = match interpreter.control_stack().top() {
        Some(ControlMarker::Colon {
            name,
            location,
            depth,
        }) => (name.clone(), location.clone(), *depth),

        _ => {
            let message = format!("';' used without a matching ':', {}", found_text(interpreter));
            return invalid_usage(interpreter, ";", &message);
        }
    };

    let _ = interpreter.control_stack_mut().pop();
    interpreter.end_compiling();

    let depth = depth.min(interpreter.stack().len());
    let collected = interpreter.stack()[depth..].to_vec();
    interpreter.truncate_stack(depth);

    let mut body = Vec::with_capacity(collected.len());

    for value in collected {
        match value {
            Value::Word(entry) => body.push(entry),
            Value::Token(token) => {
                debug!(word = %name, token = %token.text(), "abandoning definition");
                return unknown_word(interpreter, token.text());
            }
            value => body.push(Entry::anonymous_literal(value)),
        }
    }

    let doc = interpreter.take_last_doc();
    let entry = Entry::compiled(&name, location, body, doc);

    interpreter.define_word(&name, entry.clone());
    interpreter.set_last_word(entry);

    Ok(())
}

/// Suspend the current mode and start compiling.
///
/// Signature: ` -- `
fn word_open_bracket(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.control_stack_mut().push(ControlMarker::Bracket);
    interpreter.begin_compiling();

    Ok(())
}

/// Close a `[`.
///
/// Signature: ` -- `
fn word_close_bracket(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    if !matches!(interpreter.control_stack().top(), Some(ControlMarker::Bracket)) {
        let message = format!("']' used without a matching '[', {}", found_text(interpreter));
        return invalid_usage(interpreter, "]", &message);
    }

    let _ = interpreter.control_stack_mut().pop();
    interpreter.end_compiling();

    Ok(())
}

/// Start a comment.  Everything up to the matching `)` is collected rather than executed.
///
/// Signature: ` -- `
fn word_open_paren(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let depth = interpreter.stack().len();

    interpreter
        .control_stack_mut()
        .push(ControlMarker::Paren { depth });
    interpreter.begin_compiling();

    Ok(())
}

/// Close a comment, keeping it's text as the documentation for the next definition.
///
/// Signature: ` -- `
fn word_close_paren(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let depth = match interpreter.control_stack().top() {
        Some(ControlMarker::Paren { depth }) => *depth,
        _ => {
            let message = format!("')' used without a matching '(', {}", found_text(interpreter));
            return invalid_usage(interpreter, ")", &message);
        }
    };

    let _ = interpreter.control_stack_mut().pop();
    interpreter.end_compiling();

    let depth = depth.min(interpreter.stack().len());
    let text = interpreter.stack()[depth..]
        .iter()
        .map(doc_text)
        .collect::<Vec<String>>()
        .join(" ");

    interpreter.truncate_stack(depth);
    interpreter.set_last_doc(Some(format!("( {} )", text)));

    Ok(())
}

/// Bind the top value of the stack to the next name in the token stream.
///
/// Signature: `value -- `
fn word_constant(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let (_, name) = interpreter.next_token()?.into_parts();
    let value = interpreter.pop()?;

    interpreter.define_word(&name, Entry::literal(&name, value));
    Ok(())
}

/// Mark the most recently defined word as immediate.
///
/// Signature: ` -- `
fn word_immediate(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    match interpreter.last_word() {
        Some(entry) => {
            if !entry.make_immediate() {
                script_error_str(interpreter, "The last word can not be made immediate.")?;
            }

            Ok(())
        }

        None => script_error_str(interpreter, "No word has been defined yet."),
    }
}

/// Register the word creation words with the interpreter.
pub fn register_word_creation_words(interpreter: &mut dyn Interpreter) {
    add_native_word!(
        interpreter,
        ":",
        word_start_word,
        "Start a new word definition.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        ";",
        word_end_word,
        "End the definition of the newly created word.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        "[",
        word_open_bracket,
        "Start compiling.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        "]",
        word_close_bracket,
        "Stop compiling.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        "(",
        word_open_paren,
        "Start a comment.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        ")",
        word_close_paren,
        "End a comment, keeping it as documentation.",
        " -- "
    );

    add_native_immediate_word!(
        interpreter,
        "constant",
        word_constant,
        "Name the value on top of the stack.",
        "value -- "
    );

    add_native_word!(
        interpreter,
        "immediate",
        word_immediate,
        "Mark the last defined word as immediate.",
        " -- "
    );
}
