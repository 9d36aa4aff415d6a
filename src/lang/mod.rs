/// Module for managing the original source code.
pub mod source_buffer;

/// Module for turning source code into a stream of tokens for the outer loop.
pub mod tokenizing;

/// The dictionary entries that words are made of: native words, literals and compiled
/// definitions.
pub mod code;
