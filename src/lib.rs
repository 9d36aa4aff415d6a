//! An extensible stack language with a self hosting compiler.
//!
//! Source text is read a token at a time by the outer loop, which either runs each word or, while
//! a definition is open, collects it into the body of a new word.  Compiled bodies are lists of
//! already resolved dictionary entries run by the inner executor.

/// Module for the managing source code, tokens, and the entries words are made of.
#[macro_use]
pub mod lang;

/// Module for the runtime and the data structures used by the interpreter.  As well as the
/// interpreter itself.
#[macro_use]
pub mod runtime;

pub use runtime::{
    error::{ErrorKind, ScriptError},
    interpreter::{
        wordsmith_interpreter::WordsmithInterpreter, CodeManagement, Interpreter,
        InterpreterConfig, InterpreterStack, WordManagement,
    },
};
