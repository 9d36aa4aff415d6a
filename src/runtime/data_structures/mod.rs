/// Module contains the Value enumeration and it's implementation.  The value is one of the core
/// data structures of the interpreter.  It is used to represent all data types that the interpreter
/// and underlying Forth code can understand and manage.
pub mod value;

/// The dictionary module provides the word dictionary used by the interpreter.
pub mod dictionary;

/// The compiler's book-keeping for open definitions, comments and control structures.
pub mod control_stack;
