/// All of the core data structures used by the interpreter.
pub mod data_structures;

/// Module for defining the built-in native words that are available to scripts.
pub mod built_ins;

/// Module for defining the error reporting of the interpreter.
pub mod error;

/// Module for defining the core functionality of the interpreter.  This includes the outer loop,
/// the inner executor, and tools for managing and examining the interpreter's state.
pub mod interpreter;
