
use std::{ error::Error,
           process::Termination,
           fmt::{ self, Debug, Display, Formatter }, process::ExitCode };
use crate::{ runtime::interpreter::CallStack,
             lang::source_buffer::SourceLocation };

use super::interpreter::Interpreter;



pub type Result<T> = std::result::Result<T, ScriptError>;



/// The kinds of failure a running script can produce.  The first three are the errors a malformed
/// program raises, the rest come from the host environment or the session itself.
#[derive(Clone, PartialEq, Debug, thiserror::Error)]
pub enum ErrorKind
{
    /// A token was neither a known word nor a valid numeric literal.
    #[error("unknown word '{0}'")]
    UnknownWord(String),

    /// A word needed more values than the data stack holds.
    #[error("stack underflow")]
    StackUnderflow,

    /// A word was used where it makes no sense, for example a closer with no matching opener.
    #[error("invalid usage of '{word}': {message}")]
    InvalidWordUsage { word: String, message: String },

    /// Any other failure raised by a word at runtime.
    #[error("{0}")]
    Runtime(String),

    /// Reading source or loading a library failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// Raised by `bye`.  Not really an error, it unwinds every pending outer loop.
    #[error("end of session")]
    EndOfSession
}


impl ErrorKind
{
    /// Short name of the error kind used when reporting recovered errors.
    pub fn name(&self) -> &'static str
    {
        match self
        {
            ErrorKind::UnknownWord(_)             => "UnknownWord",
            ErrorKind::StackUnderflow             => "StackUnderflow",
            ErrorKind::InvalidWordUsage { .. }    => "InvalidWordUsage",
            ErrorKind::Runtime(_)                 => "RuntimeError",
            ErrorKind::Io(_)                      => "IoError",
            ErrorKind::EndOfSession               => "EndOfSession"
        }
    }
}



/// Any error that occurs during the execution of a script.
#[derive(Clone)]
pub struct ScriptError
{
    /// The location in the source code the error occurred, if available.
    location: Option<SourceLocation>,

    /// What went wrong.
    kind: ErrorKind,

    /// The script's call stack at the time of the error, if available.
    call_stack: Option<CallStack>
}


impl Error for ScriptError
{
}


/// When returned from main, convert the error result to an operating system exit code.
impl Termination for ScriptError
{
    /// Because this type represents an error, the exit code is always FAILURE.
    fn report(self) -> ExitCode
    {
        eprintln!("Error: {}", self);
        ExitCode::FAILURE
    }
}


/// Pretty print the ScriptError, location first, followed by the call stack if there is one.
impl Display for ScriptError
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        match &self.location
        {
            Some(location) => write!(f, "{}: {}", location, self.kind)?,
            None => write!(f, "{}", self.kind)?
        }

        if let Some(call_stack) = &self.call_stack
        {
            if !call_stack.is_empty()
            {
                write!(f, "\n\nCall stack\n")?;

                for item in call_stack.iter().rev()
                {
                    writeln!(f, "  {}", item)?;
                }
            }
        }

        Ok(())
    }
}


impl Debug for ScriptError
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result
    {
        write!(f, "{}", self)
    }
}


impl ScriptError
{
    /// Create a new ScriptError.
    pub fn new(location: Option<SourceLocation>,
               kind: ErrorKind,
               call_stack: Option<CallStack>) -> ScriptError
    {
        ScriptError
            {
                location,
                kind,
                call_stack
            }
    }

    /// Create a new Script Error and wrap it in a Result::Err.
    pub fn new_as_result<T>(location: Option<SourceLocation>,
                            kind: ErrorKind,
                            call_stack: Option<CallStack>) -> Result<T>
    {
        Err(ScriptError::new(location, kind, call_stack))
    }

    /// If available, the location in the source code the error occurred.
    pub fn location(&self) -> &Option<SourceLocation>
    {
        &self.location
    }

    /// The kind of error.
    pub fn kind(&self) -> &ErrorKind
    {
        &self.kind
    }

    /// If available, the script's call stack at the time of the error.
    pub fn call_stack(&self) -> &Option<CallStack>
    {
        &self.call_stack
    }

    /// Does this error end the session rather than just the current command?
    pub fn is_end_of_session(&self) -> bool
    {
        self.kind == ErrorKind::EndOfSession
    }
}


/// Allow for the conversion of a std::io::Error into a ScriptError.
impl From<std::io::Error> for ScriptError
{
    fn from(error: std::io::Error) -> ScriptError
    {
        ScriptError::new(None, ErrorKind::Io(error.to_string()), None)
    }
}



/// Build an error of the given kind at the interpreter's current location, capturing the call
/// stack.
pub fn error_at<T>(interpreter: &dyn Interpreter, kind: ErrorKind) -> Result<T>
{
    let location = interpreter.current_location().clone();
    let call_stack = interpreter.call_stack().clone();

    ScriptError::new_as_result(location, kind, Some(call_stack))
}


/// A convenience function for creating a runtime ScriptError and wrapping in in a Result::Err using
/// the interpreter's current location and call stack.
pub fn script_error<T>(interpreter: &dyn Interpreter, message: String) -> Result<T>
{
    error_at(interpreter, ErrorKind::Runtime(message))
}



pub fn script_error_str<T>(interpreter: &dyn Interpreter, message: &str) -> Result<T>
{
    script_error(interpreter, message.to_string())
}


pub fn unknown_word<T>(interpreter: &dyn Interpreter, name: &str) -> Result<T>
{
    error_at(interpreter, ErrorKind::UnknownWord(name.to_string()))
}


pub fn stack_underflow<T>(interpreter: &dyn Interpreter) -> Result<T>
{
    error_at(interpreter, ErrorKind::StackUnderflow)
}


/// Report a word being used somewhere it can't be, such as a closer without an opener.
pub fn invalid_usage<T>(interpreter: &dyn Interpreter, word: &str, message: &str) -> Result<T>
{
    error_at(interpreter,
             ErrorKind::InvalidWordUsage { word: word.to_string(), message: message.to_string() })
}
