use crate::runtime::interpreter::Interpreter;

/// The core words of the language.
pub mod base_words;

/// Words that produce output or control the session.
pub mod io_words;

/// Words that interface with foreign functions.
pub mod ffi_words;

/// Register every native word the interpreter ships with.
pub fn register_builtin_words(interpreter: &mut dyn Interpreter) {
    base_words::register_base_words(interpreter);
    io_words::register_io_words(interpreter);
    ffi_words::register_ffi_words(interpreter);
}
