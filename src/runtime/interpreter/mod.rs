use crate::{
    lang::{
        code::{Entry, WordHandler},
        source_buffer::SourceLocation,
        tokenizing::{Token, TokenStream},
    },
    runtime::{
        built_ins::ffi_words::{FfiInterface, ForeignFunctionPtr},
        data_structures::{control_stack::ControlStack, dictionary::Dictionary, value::Value},
        error::{self, ScriptError},
    },
};
use std::{
    fmt::{self, Display, Formatter},
    io::Write,
    rc::Rc,
};

pub mod wordsmith_interpreter;

/// A call stack item is a record of the executing word's name and the location within the original
/// source code from which it was called.  This items are read-only and the fields are accessed by
/// member functions.
#[derive(Clone, PartialEq, Debug)]
pub struct CallItem {
    location: SourceLocation,
    word: String,
}

impl CallItem {
    /// Create a new call stack item.
    pub fn new(word: String, location: SourceLocation) -> CallItem {
        CallItem { location, word }
    }

    /// Where in the source code was the execution of this word found?
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    // The name of the word being executed.
    pub fn word(&self) -> &String {
        &self.word
    }
}

/// Make sure that this word can be nicely displayed to the user in event of an error.
impl Display for CallItem {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.word)
    }
}

/// Type to represent a call stack.  This is a stack of call items currently being executed by the
/// interpreter.  This is used to help track errors and provide a scripts stack trace to the user.
pub type CallStack = Vec<CallItem>;

/// The data stack of values managed by the interpreter.
pub type ValueStack = Vec<Value>;

/// Startup options for an interpreter session.
#[derive(Clone, Debug)]
pub struct InterpreterConfig {
    /// Initial capacity reserved for the data stack.  The stack still grows past this.
    pub stack_capacity: usize,

    /// Load the bundled standard library when the session starts.
    pub load_stdlib: bool,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            stack_capacity: 64,
            load_stdlib: true,
        }
    }
}

/// Trait for managing the interpreter's data stack.  Intended to be called by immediate/normal
/// words, both native and scripted.
pub trait InterpreterStack {
    /// Use to examine the full data stack when required.  One example is for the stack dump command
    /// `.s` in the repl.
    fn stack(&self) -> &ValueStack;

    /// Direct access to the stack, used by words that address it by index and by the compiler to
    /// patch branch targets.
    fn stack_mut(&mut self) -> &mut ValueStack;

    /// Push a script value onto the stack.  This is the primary way of sending values to words.
    fn push(&mut self, value: Value);

    /// Pop a value from the stack.  If the stack is empty a stack underflow error is returned.
    fn pop(&mut self) -> error::Result<Value>;

    /// Fail with a stack underflow unless at least count values are on the stack.  Words that take
    /// more than one value check this first so that a failure doesn't leave the stack half
    /// consumed.
    fn require_depth(&self, count: usize) -> error::Result<()>;

    /// Pop the top value and attempt to convert it to an integer.  If the value can not be
    /// converted an error is returned.  We also fail if the stack is empty.
    fn pop_as_int(&mut self) -> error::Result<i64>;

    /// Pop the top value and interpret it as a truth value.
    fn pop_as_bool(&mut self) -> error::Result<bool>;

    /// Pop the top value, which must be a string.
    fn pop_as_string(&mut self) -> error::Result<String>;

    /// Pop the top value, which must be a reference to a dictionary entry.
    fn pop_as_word(&mut self) -> error::Result<Entry>;

    /// Pop the top value, which must be a foreign function handle.
    fn pop_as_foreign(&mut self) -> error::Result<ForeignFunctionPtr>;

    /// Drop everything above the given depth.
    fn truncate_stack(&mut self, depth: usize);
}

/// Trait for the compiler side of the interpreter: the incoming token stream, the mode counter,
/// the control stack and the execution of sources.
pub trait CodeManagement {
    /// Get the next raw token from the current source, bypassing the dictionary.  Words like `:`
    /// and `constant` use this to read the name that follows them.
    fn next_token(&mut self) -> error::Result<Token>;

    /// How many compile levels are open.  Zero means the interpreter is interpreting.
    fn compile_depth(&self) -> usize;

    /// Is the outer loop appending words instead of running them?
    fn is_compiling(&self) -> bool {
        self.compile_depth() > 0
    }

    /// Open one more compile level.
    fn begin_compiling(&mut self);

    /// Close one compile level.
    fn end_compiling(&mut self);

    /// The stack of open constructs.
    fn control_stack(&self) -> &ControlStack;

    fn control_stack_mut(&mut self) -> &mut ControlStack;

    /// The documentation collected by the last `)`, consumed by `;`.
    fn take_last_doc(&mut self) -> Option<String>;

    fn set_last_doc(&mut self, doc: Option<String>);

    /// The word most recently defined by `;`.
    fn last_word(&self) -> &Option<Entry>;

    fn set_last_word(&mut self, entry: Entry);

    /// Move execution of the current compiled body to the given step.  Targets outside of the body
    /// end it.  Fails if we're not running a compiled body.
    fn jump_to(&mut self, word: &str, index: i64) -> error::Result<()>;

    /// Is a compiled body currently running?
    fn is_executing_body(&self) -> bool;

    /// Leave the current compiled body.
    fn exit_body(&mut self, word: &str) -> error::Result<()>;

    /// Run the outer loop over a token stream.  Errors are reported to the output and reading
    /// continues with the next token, only the end of the session stops it early.
    fn process_stream(&mut self, stream: TokenStream) -> error::Result<()>;

    /// Run the outer loop over an in memory source.  The path parameter is used to represent the
    /// source code in things like call stacks and error reporting.  For example, the repl uses a
    /// path of "\<stdin\>" to represent source code entered by the user.
    fn process_source(&mut self, path: &str, source: &str) -> error::Result<()>;

    /// Find a file in the search paths and run it through the outer loop.
    fn process_source_file(&mut self, path: &str) -> error::Result<()>;

    /// Run an in memory source, stopping at and returning the first error.
    fn evaluate(&mut self, path: &str, source: &str) -> error::Result<()>;
}

/// Simplify registering a native regular word with the interpreter.
///
/// Required parameters are, the interpreter instance to register with.  The name of the word to
/// register.  The word function handler to execute for the word.  A simple description of the word.
/// As well as the word's stack signature.
#[macro_export]
macro_rules! add_native_word {
    (
        $interpreter:expr ,
        $name:expr ,
        $function:expr ,
        $description:expr ,
        $signature:expr
    ) => {{
        use std::rc::Rc;

        // Register the word while recording where in the source code the word was registered
        // from.
        $interpreter.add_word(
            file!(), // Original source location that this
            line!() as usize, //  word was registered from.
            column!() as usize,
            &$name.to_string(),        // Name.
            Rc::new($function),        // Function handler.
            &$description.to_string(), // Word description.
            &$signature.to_string(),   // Word signature.
            false,                     // The word runs when interpreted or compiled into a body.
        );
    }};
}

/// Simplify registering a native immediate word with the interpreter.  That is, this word is
/// executed even while compiling.
///
/// Required parameters are, the interpreter instance to register with.  The name of the word to
/// register.  The word function handler to execute for the word.  A simple description of the word.
/// As well as the word's stack signature.
#[macro_export]
macro_rules! add_native_immediate_word {
    (
        $interpreter:expr ,
        $name:literal ,
        $function:expr ,
        $description:literal ,
        $signature:literal
    ) => {{
        use std::rc::Rc;

        $interpreter.add_word(
            file!(),
            line!() as usize,
            column!() as usize,
            $name,
            Rc::new($function),
            $description,
            $signature,
            true, // The word runs at compile time.
        );
    }};
}

/// Trait for managing and executing words known to the interpreter.
pub trait WordManagement {
    /// If currently set, this represents the location of the token the outer loop is processing.
    fn current_location(&self) -> &Option<SourceLocation>;

    /// Register a native word with the interpreter's dictionary.
    #[allow(clippy::too_many_arguments)]
    fn add_word(
        &mut self,
        file: &str,
        line: usize,
        column: usize,
        name: &str,
        handler: Rc<WordHandler>,
        description: &str,
        signature: &str,
        immediate: bool,
    );

    /// Bind an entry under a name, replacing any previous binding.
    fn define_word(&mut self, name: &str, entry: Entry);

    /// Resolve a name against the dictionary, falling back to a numeric literal.  Fails with an
    /// unknown word error if neither works.
    fn find_word(&self, name: &str) -> error::Result<Entry>;

    /// Run an entry.  Native words call their handler, literals push their value, and compiled
    /// words run their body.
    fn execute_entry(&mut self, entry: &Entry) -> error::Result<()>;

    /// Find and execute a word by name.  Handy for calling into script from host code.
    fn execute_word_named(&mut self, name: &str) -> error::Result<()>;

    /// The current script execution call stack.
    fn call_stack(&self) -> &CallStack;

    /// Push a new name and location onto the call stack.  This information is used to help track
    /// errors reported by the interpreter.
    fn call_stack_push(&mut self, name: String, location: SourceLocation);
}

/// Trait for managing the ffi context.
pub trait Ffi {
    fn ffi(&self) -> &FfiInterface;
    fn ffi_mut(&mut self) -> &mut FfiInterface;
}

/// Core interpreter trait.
///
/// This trait defines and brings together the traits that define the core functionality of the
/// interpreter: the data stack, the compiler state and outer loop, the dictionary and the inner
/// executor, and the foreign function interface.
pub trait Interpreter: InterpreterStack + CodeManagement + WordManagement + Ffi {
    /// Add a new path to the search path list.  This path will be checked to make sure that it
    /// exists.
    fn add_search_path(&mut self, path: &str) -> error::Result<()>;

    /// Add the parent directory for a file to the search paths.  This way if a file includes other
    /// files within it's directory, they'll be found.
    fn add_search_path_for_file(&mut self, file_path: &str) -> error::Result<()>;

    /// Drop the last added path from the search path list.  It is in this way, the search path list
    /// acts like a stack.
    fn drop_search_path(&mut self) -> error::Result<()>;

    /// Return a list of paths that the interpreter will search when finding files.
    fn search_paths(&self) -> &Vec<String>;

    /// Find a file in the current list of search paths.  If the file is found return the fully
    /// qualified path to the file.
    fn find_file(&self, path: &str) -> error::Result<String>;

    /// The current word dictionary of words known to the interpreter.
    fn dictionary(&self) -> &Dictionary;

    /// Where words like `.` and the error reporter write to.
    fn output(&mut self) -> &mut dyn Write;

    /// The most recent error the outer loop recovered from.
    fn last_error(&self) -> &Option<ScriptError>;

    /// Clear the data and control stacks and leave compile mode.  The dictionary is kept.
    fn reset(&mut self);
}
