use crate::{
    lang::code::Entry,
    runtime::{data_structures::value::Value, interpreter::Interpreter},
};

/// Register the built in constants.  These are plain literals, exactly like the ones `constant`
/// creates.
pub fn register_constant_words(interpreter: &mut dyn Interpreter) {
    let constants = [
        ("none", Value::None),
        ("true", Value::Bool(true)),
        ("false", Value::Bool(false)),
    ];

    for (name, value) in constants {
        interpreter.define_word(name, Entry::literal(name, value));
    }
}
