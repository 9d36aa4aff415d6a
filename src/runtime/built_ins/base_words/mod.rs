/// Words that manipulate the data stack.
mod stack_words;

/// Simple constants.
mod constant_words;

/// Words that work with words.
mod word_words;

/// Words that create new words.
mod word_creation_words;

/// Conditionals, loops and the branch primitives they compile to.
mod control_flow_words;

/// Words that work with math, logic, bit manipulation and Value equality.
mod math_logic_and_bit_words;

use crate::runtime::{
    built_ins::base_words::{
        constant_words::register_constant_words, control_flow_words::register_control_flow_words,
        math_logic_and_bit_words::register_math_logic_and_bit_words,
        stack_words::register_stack_words, word_creation_words::register_word_creation_words,
        word_words::register_word_words,
    },
    interpreter::Interpreter,
};

/// Called to register all of the core words of the language.
pub fn register_base_words(interpreter: &mut dyn Interpreter) {
    register_stack_words(interpreter);
    register_constant_words(interpreter);
    register_word_words(interpreter);
    register_word_creation_words(interpreter);
    register_control_flow_words(interpreter);
    register_math_logic_and_bit_words(interpreter);
}
