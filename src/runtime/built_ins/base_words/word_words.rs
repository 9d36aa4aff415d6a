use crate::{
    add_native_immediate_word, add_native_word,
    lang::code::{pretty_print_entry, Entry},
    runtime::{data_structures::value::Value, error, interpreter::Interpreter},
};

/// Push a value now, or if compiling, compile a literal that pushes it when the definition runs.
fn push_or_compile(interpreter: &mut dyn Interpreter, value: Value) {
    if interpreter.is_compiling() {
        interpreter.push(Value::Word(Entry::anonymous_literal(value)));
    } else {
        interpreter.push(value);
    }
}

/// Read the next word from the token stream and push a reference to it's dictionary entry.
///
/// Signature: ` -- word`
fn word_tick(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let token = interpreter.next_token()?;
    let entry = interpreter.find_word(token.text())?;

    push_or_compile(interpreter, Value::Word(entry));
    Ok(())
}

/// Run a word reference taken from the stack.
///
/// Signature: `word -- ???`
fn word_execute(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let entry = interpreter.pop_as_word()?;

    interpreter.execute_entry(&entry)
}

/// Intended to be called at compile type, this will pull the next word from the token stream and
/// push it onto the data stack as a string.
///
/// Signature: ` -- next-word`
fn word_word(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let token = interpreter.next_token()?;
    let (_, text) = token.into_parts();

    push_or_compile(interpreter, Value::String(text));
    Ok(())
}

/// Print out a decompiled view of the next word in the token stream.
///
/// Signature: ` -- `
fn word_see(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let token = interpreter.next_token()?;
    let entry = interpreter.find_word(token.text())?;

    writeln!(interpreter.output(), "{}", pretty_print_entry(&entry))?;
    Ok(())
}

/// Print out every word known to the interpreter.
///
/// Signature: ` -- `
fn word_words(interpreter: &mut dyn Interpreter) -> error::Result<()> {
    let listing = interpreter.dictionary().to_string();

    write!(interpreter.output(), "{}", listing)?;
    Ok(())
}

pub fn register_word_words(interpreter: &mut dyn Interpreter) {
    add_native_immediate_word!(
        interpreter,
        "'",
        word_tick,
        "Get a reference to the next word in the token stream.",
        " -- word"
    );

    add_native_word!(
        interpreter,
        "execute",
        word_execute,
        "Execute a word reference.",
        "word -- ???"
    );

    add_native_immediate_word!(
        interpreter,
        "word",
        word_word,
        "Get the next word in the token stream as a string.",
        " -- next-word"
    );

    add_native_immediate_word!(
        interpreter,
        "see",
        word_see,
        "Show the definition of the next word in the token stream.",
        " -- "
    );

    add_native_word!(
        interpreter,
        "words",
        word_words,
        "List every word in the dictionary.",
        " -- "
    );
}
