use crate::{
    add_native_immediate_word, add_native_word,
    runtime::{
        error::{self, error_at, script_error, ErrorKind},
        interpreter::Interpreter,
    },
};
use tracing::debug;

/// Print the top value of the stack followed by a newline.
///
/// Signature: `value -- `
fn word_print(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let value = interpreter.pop()?;

    writeln!(interpreter.output(), "{}", value)?;
    Ok(())
}

/// Print the depth of the stack and every value on it, bottom first, without changing it.
///
/// Signature: ` -- `
fn word_print_stack(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let mut line = format!("<{}>", interpreter.stack().len());

    for value in interpreter.stack().iter() {
        line.push(' ');
        line.push_str(&value.repr());
    }

    writeln!(interpreter.output(), "{}", line)?;
    Ok(())
}

/// Print a newline.
///
/// Signature: ` -- `
fn word_cr(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    writeln!(interpreter.output())?;
    Ok(())
}

/// Print the character with the given code point.
///
/// Signature: `code -- `
fn word_emit(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let code = interpreter.pop_as_int()?;

    let character = match u32::try_from(code).ok().and_then(char::from_u32) {
        Some(character) => character,
        None => return script_error(interpreter, format!("{} is not a valid character.", code)),
    };

    write!(interpreter.output(), "{}", character)?;
    Ok(())
}

/// Include and execute another file at compile time.  The file to include is expected to be the
/// next token in the input stream.
///
/// Signature: ` -- `
fn word_import(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let token = interpreter.next_token()?;

    debug!(path = %token.text(), "importing");
    interpreter.process_source_file(token.text())
}

/// End the session.
///
/// Signature: ` -- `
fn word_bye(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    interpreter.output().flush()?;
    error_at(interpreter, ErrorKind::EndOfSession)
}

/// Register the output and session words.
pub fn register_io_words(interpreter: &mut dyn Interpreter) {
    add_native_word!(
        interpreter,
        ".",
        word_print,
        "Print the top value of the stack.",
        "value -- "
    );

    add_native_word!(
        interpreter,
        ".s",
        word_print_stack,
        "Print the whole stack without changing it.",
        " -- "
    );

    add_native_word!(interpreter, "cr", word_cr, "Print a newline.", " -- ");

    add_native_word!(
        interpreter,
        "emit",
        word_emit,
        "Print a character given it's code point.",
        "code -- "
    );

    add_native_immediate_word!(
        interpreter,
        "import",
        word_import,
        "Run the source file named by the next token.",
        " -- "
    );

    add_native_word!(interpreter, "bye", word_bye, "End the session.", " -- ");
}
