use std::{ fs::{ metadata, canonicalize },
           io::{ self as std_io, Write },
           mem,
           path::{ Path,
                   PathBuf },
           rc::Rc };
use tracing::{ debug, trace, warn };
use crate::{ lang::{ code::{ CompiledWord,
                             Entry,
                             WordHandler },
                     source_buffer::SourceLocation,
                     tokenizing::{ Token,
                                   TokenStream } },
             runtime::{ built_ins::{ ffi_words::{ FfiInterface,
                                                  ForeignFunctionPtr,
                                                  HostFunction },
                                     register_builtin_words },
                        data_structures::{ control_stack::ControlStack,
                                           dictionary::Dictionary,
                                           value::Value },
                        error::{ self,
                                 error_at,
                                 invalid_usage,
                                 ErrorKind,
                                 script_error,
                                 script_error_str,
                                 stack_underflow,
                                 unknown_word,
                                 ScriptError },
                        interpreter::{ CallItem,
                                       CallStack,
                                       CodeManagement,
                                       Interpreter,
                                       InterpreterConfig,
                                       InterpreterStack,
                                       ValueStack,
                                       WordManagement,
                                       Ffi } } };



/// The search paths used to find script files.
pub type SearchPaths = Vec<String>;


/// The standard library, written in the language itself.
const STANDARD_LIBRARY: &str = include_str!("../../../std/std.f");



/// Where execution is within the compiled body currently being run.
#[derive(Clone, Copy, Default)]
struct Frame
{
    /// Index of the step being executed.
    index: i64,

    /// Set when the current step moved the index itself.
    jumped: bool
}



/// The core interpreter implementation.
pub struct WordsmithInterpreter
{
    /// The search paths used to find script files.
    search_paths: SearchPaths,

    /// Full paths of the files currently being run, outermost first.
    active_files: Vec<String>,

    /// The data stack used by the interpreter.  While compiling, the words of the definition being
    /// built are collected here too.
    stack: ValueStack,

    /// Book-keeping for the constructs that are currently open.
    control_stack: ControlStack,

    /// Number of open compile levels, zero when interpreting.
    compile_depth: usize,

    /// The word most recently defined by `;`.
    last_word: Option<Entry>,

    /// Documentation gathered by the last `)`.
    last_doc: Option<String>,


    /// The location of the token the outer loop is processing.
    current_location: Option<SourceLocation>,

    /// The position within the compiled body being executed, if any.
    frame: Option<Frame>,

    /// The call stack used to keep track of the current execution context.
    call_stack: CallStack,


    /// The dictionary of words known by the interpreter.
    dictionary: Dictionary,

    /// The token stream the outer loop is reading from.
    source: Option<TokenStream>,

    /// Should the outer loop report errors and carry on, or stop at the first one?
    recovering: bool,

    /// Where output from scripts goes.
    output: Box<dyn Write>,

    /// The last error the outer loop recovered from.
    last_error: Option<ScriptError>,


    /// The FFI interface used by the interpreter.
    ffi: FfiInterface
}


impl Interpreter for WordsmithInterpreter
{
    fn add_search_path(&mut self, path: &str) -> error::Result<()> {
        if let Err(err) = metadata(path) {
            script_error(self, format!("Could not append search path {}: {}.", path, err))?;
        }
        self.search_paths.push(path.to_string());
        Ok(())
    }

    fn add_search_path_for_file(&mut self, file_path: &str) -> error::Result<()> {
        match Path::new(file_path).parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                let parent_str = parent.to_string_lossy();
                self.add_search_path(&parent_str)
            }
            _ => self.add_search_path("."),
        }
    }

    fn drop_search_path(&mut self) -> error::Result<()>
    {
        if self.search_paths.is_empty()
        {
            script_error_str(self, "Search path stack underflow.")?;
        }

        let _ = self.search_paths.pop();
        Ok(())
    }

    fn search_paths(&self) -> &Vec<String>
    {
        &self.search_paths
    }

    fn find_file(&self, path: &str) -> error::Result<String> {
        if Path::new(path).exists() {
            let canonical = canonicalize(path)?;
            if let Some(canonical) = canonical.to_str() {
                Ok(canonical.to_string())
            } else {
                script_error_str(self, "Path contains invalid characters.")
            }
        } else {
            for directory in self.search_paths.iter().rev() {
                let full_path = PathBuf::from(directory).join(path);
                if full_path.exists() {
                    let canonical = canonicalize(full_path)?;
                    if let Some(canonical) = canonical.to_str() {
                        return Ok(canonical.to_string());
                    } else {
                        return script_error_str(self, "Path contains invalid characters.");
                    }
                }
            }
            error::error_at(self, error::ErrorKind::Io(format!("File {} not found.", path)))
        }
    }

    fn dictionary(&self) -> &Dictionary
    {
        &self.dictionary
    }

    fn output(&mut self) -> &mut dyn Write
    {
        self.output.as_mut()
    }

    fn last_error(&self) -> &Option<ScriptError>
    {
        &self.last_error
    }

    fn reset(&mut self)
    {
        self.stack.clear();
        self.control_stack.truncate(0);
        self.compile_depth = 0;
        self.last_doc = None;
        self.frame = None;
        self.call_stack.clear();
    }
}


impl InterpreterStack for WordsmithInterpreter
{
    fn stack(&self) -> &ValueStack
    {
        &self.stack
    }

    fn stack_mut(&mut self) -> &mut ValueStack
    {
        &mut self.stack
    }

    fn push(&mut self, value: Value)
    {
        self.stack.push(value);
    }

    fn pop(&mut self) -> error::Result<Value>
    {
        match self.stack.pop()
        {
            Some(value) => Ok(value),
            None        => stack_underflow(self)
        }
    }

    fn require_depth(&self, count: usize) -> error::Result<()>
    {
        if self.stack.len() < count
        {
            stack_underflow(self)?;
        }

        Ok(())
    }

    fn pop_as_int(&mut self) -> error::Result<i64>
    {
        let value = self.pop()?;

        if !value.is_numeric()
        {
            script_error(self, format!("Expected numeric value, found {}.", value.repr()))?;
        }

        Ok(value.get_int_val())
    }

    fn pop_as_bool(&mut self) -> error::Result<bool>
    {
        Ok(self.pop()?.get_bool_val())
    }

    fn pop_as_string(&mut self) -> error::Result<String>
    {
        match self.pop()?
        {
            Value::String(value) => Ok(value),
            Value::Token(token)  => Ok(token.text().clone()),
            value                => script_error(self, format!("Expected a string value, found {}.",
                                                               value.repr()))
        }
    }

    fn pop_as_word(&mut self) -> error::Result<Entry>
    {
        let value = self.pop()?;
        Ok(value.as_word(self)?.clone())
    }

    fn pop_as_foreign(&mut self) -> error::Result<ForeignFunctionPtr>
    {
        let value = self.pop()?;
        Ok(value.as_foreign(self)?.clone())
    }

    fn truncate_stack(&mut self, depth: usize)
    {
        self.stack.truncate(depth);
    }
}


// The outer loop.
impl WordsmithInterpreter
{
    /// Read the next token from whatever source is current.
    fn read_token(&mut self) -> error::Result<Option<Token>>
    {
        match self.source.as_mut()
        {
            Some(source) => source.next_token(),
            None         => Ok(None)
        }
    }

    /// Resolve a single token and either run it or add it to the body being compiled.
    fn process_token(&mut self, token: Token) -> error::Result<()>
    {
        self.current_location = Some(token.location().clone());

        let compiling = self.is_compiling();

        match self.dictionary.lookup(token.text())
        {
            Some(entry) =>
                {
                    trace!(word = %entry.name(), compiling, "dispatching token");

                    if !compiling || entry.is_immediate()
                    {
                        self.execute_entry(&entry)
                    }
                    else
                    {
                        self.push(Value::Word(entry));
                        Ok(())
                    }
                },

            // While compiling the token is kept as is.  If it's still there when the definition
            // is closed, `;` reports it.
            None if compiling =>
                {
                    self.push(Value::Token(token));
                    Ok(())
                },

            None => unknown_word(self, token.text())
        }
    }

    /// Write a recovered error to the session's output and remember it.
    fn report_error(&mut self, error: ScriptError) -> error::Result<()>
    {
        debug!(%error, "recovered from script error");

        writeln!(self.output, "{}: {}", error.kind().name(), error)?;
        self.last_error = Some(error);

        Ok(())
    }

    /// Pull tokens from the current source until it runs dry.
    fn outer_loop(&mut self) -> error::Result<()>
    {
        while let Some(token) = self.read_token()?
        {
            if let Err(error) = self.process_token(token)
            {
                if !self.recovering || error.is_end_of_session()
                {
                    return Err(error);
                }

                self.report_error(error)?;
            }

            self.output.flush()?;
        }

        Ok(())
    }

    /// Run the outer loop over a new source.  The current source and position are saved and
    /// restored afterwards so nested sources don't disturb the one that included them.
    fn run_stream(&mut self, stream: TokenStream, recovering: bool) -> error::Result<()>
    {
        let path = stream.path().clone();
        let control_depth = self.control_stack.len();

        let previous_source = mem::replace(&mut self.source, Some(stream));
        let previous_location = self.current_location.take();
        let previous_recovering = mem::replace(&mut self.recovering, recovering);
        let previous_frame = self.frame.take();

        let result = self.outer_loop();

        self.frame = previous_frame;
        self.source = previous_source;
        self.current_location = previous_location;
        self.recovering = previous_recovering;

        if result.is_ok() && self.control_stack.len() > control_depth
        {
            if let Some(marker) = self.control_stack.top()
            {
                warn!(%path, open = %marker, "input ended inside an open construct");
            }
        }

        result
    }
}


// The inner executor.
impl WordsmithInterpreter
{
    /// Run a compiled definition's body in a fresh frame.
    fn execute_compiled(&mut self, word: &Rc<CompiledWord>) -> error::Result<()>
    {
        let location = match &self.current_location
            {
                Some(location) => location.clone(),
                None           => word.location().clone()
            };

        self.call_stack_push(word.name().clone(), location);

        let saved_frame = self.frame.replace(Frame::default());
        let result = self.run_body(word.body());

        self.frame = saved_frame;
        let _ = self.call_stack.pop();

        result
    }

    /// Step through a body until the index leaves it.
    fn run_body(&mut self, body: &[Entry]) -> error::Result<()>
    {
        loop
        {
            let index = match self.frame
                {
                    Some(frame) => frame.index,
                    None        => break
                };

            if index < 0 || index as usize >= body.len()
            {
                break;
            }

            if let Some(frame) = self.frame.as_mut()
            {
                frame.jumped = false;
            }

            self.execute_entry(&body[index as usize])?;

            if let Some(frame) = self.frame.as_mut()
            {
                if !frame.jumped
                {
                    frame.index += 1;
                }
            }
        }

        Ok(())
    }
}


impl CodeManagement for WordsmithInterpreter
{
    fn next_token(&mut self) -> error::Result<Token>
    {
        match self.read_token()?
        {
            Some(token) => Ok(token),
            None        => script_error_str(self, "Reading past end of token stream.")
        }
    }

    fn compile_depth(&self) -> usize
    {
        self.compile_depth
    }

    fn begin_compiling(&mut self)
    {
        self.compile_depth += 1;
    }

    fn end_compiling(&mut self)
    {
        self.compile_depth = self.compile_depth.saturating_sub(1);
    }

    fn control_stack(&self) -> &ControlStack
    {
        &self.control_stack
    }

    fn control_stack_mut(&mut self) -> &mut ControlStack
    {
        &mut self.control_stack
    }

    fn take_last_doc(&mut self) -> Option<String>
    {
        self.last_doc.take()
    }

    fn set_last_doc(&mut self, doc: Option<String>)
    {
        self.last_doc = doc;
    }

    fn last_word(&self) -> &Option<Entry>
    {
        &self.last_word
    }

    fn set_last_word(&mut self, entry: Entry)
    {
        self.last_word = Some(entry);
    }

    fn jump_to(&mut self, word: &str, index: i64) -> error::Result<()>
    {
        match self.frame.as_mut()
        {
            Some(frame) =>
                {
                    frame.index = index;
                    frame.jumped = true;
                    Ok(())
                },

            None => invalid_usage(self, word, "only usable inside a compiled definition")
        }
    }

    fn is_executing_body(&self) -> bool
    {
        self.frame.is_some()
    }

    fn exit_body(&mut self, word: &str) -> error::Result<()>
    {
        self.jump_to(word, -1)
    }

    fn process_stream(&mut self, stream: TokenStream) -> error::Result<()>
    {
        self.run_stream(stream, true)
    }

    fn process_source(&mut self, path: &str, source: &str) -> error::Result<()>
    {
        self.run_stream(TokenStream::from_source(path, source), true)
    }

    fn process_source_file(&mut self, path: &str) -> error::Result<()>
    {
        let full_path = self.find_file(path)?;

        if self.active_files.contains(&full_path)
        {
            let message = format!("File {} is already being run, imports can not form a cycle.",
                                  full_path);

            return error_at(self, ErrorKind::Io(message));
        }

        let stream = TokenStream::from_file(&full_path)?;

        debug!(path = %full_path, depth = self.active_files.len(), "processing source file");

        self.add_search_path_for_file(&full_path)?;
        self.active_files.push(full_path);

        let result = self.run_stream(stream, self.recovering);

        let _ = self.active_files.pop();
        self.drop_search_path()?;

        result
    }

    fn evaluate(&mut self, path: &str, source: &str) -> error::Result<()>
    {
        self.run_stream(TokenStream::from_source(path, source), false)
    }
}


impl WordManagement for WordsmithInterpreter
{
    fn current_location(&self) -> &Option<SourceLocation>
    {
        &self.current_location
    }

    fn add_word(&mut self,
                file: &str,
                line: usize,
                column: usize,
                name: &str,
                handler: Rc<WordHandler>,
                description: &str,
                signature: &str,
                immediate: bool)
    {
        let location = SourceLocation::new_from_info(file, line, column);
        let entry = Entry::native(name, location, handler, immediate, description, signature);

        self.dictionary.define(name, entry);
    }

    fn define_word(&mut self, name: &str, entry: Entry)
    {
        debug!(name, kind = entry.kind(), "defining word");
        self.dictionary.define(name, entry);
    }

    fn find_word(&self, name: &str) -> error::Result<Entry>
    {
        match self.dictionary.lookup(name)
        {
            Some(entry) => Ok(entry),
            None        => unknown_word(self, name)
        }
    }

    fn execute_entry(&mut self, entry: &Entry) -> error::Result<()>
    {
        match entry
        {
            Entry::Native(word) =>
                {
                    let handler = word.handler();
                    (*handler)(self)
                },

            Entry::Literal(word) =>
                {
                    self.push(word.value().clone());
                    Ok(())
                },

            Entry::Compiled(word) => self.execute_compiled(word)
        }
    }

    fn execute_word_named(&mut self, name: &str) -> error::Result<()>
    {
        let entry = self.find_word(name)?;
        self.execute_entry(&entry)
    }

    fn call_stack(&self) -> &CallStack
    {
        &self.call_stack
    }

    fn call_stack_push(&mut self, name: String, location: SourceLocation)
    {
        self.call_stack.push(CallItem::new(name, location));
    }
}


impl Ffi for WordsmithInterpreter
{
    fn ffi(&self) -> &FfiInterface
    {
        &self.ffi
    }

    fn ffi_mut(&mut self) -> &mut FfiInterface
    {
        &mut self.ffi
    }
}


impl WordsmithInterpreter
{
    /// Create an interpreter with all of the native words registered, writing to stdout.  The
    /// standard library is not loaded.
    pub fn new() -> WordsmithInterpreter
    {
        WordsmithInterpreter::with_capacity(InterpreterConfig::default().stack_capacity)
    }

    /// Create an interpreter set up according to the configuration, loading the standard library
    /// if asked to.
    pub fn with_config(config: &InterpreterConfig) -> error::Result<WordsmithInterpreter>
    {
        let mut interpreter = WordsmithInterpreter::with_capacity(config.stack_capacity);

        if config.load_stdlib
        {
            interpreter.load_standard_library()?;
        }

        Ok(interpreter)
    }

    fn with_capacity(stack_capacity: usize) -> WordsmithInterpreter
    {
        let mut interpreter = WordsmithInterpreter
            {
                search_paths: Vec::new(),
                active_files: Vec::new(),

                stack: Vec::with_capacity(stack_capacity),
                control_stack: ControlStack::new(),
                compile_depth: 0,
                last_word: None,
                last_doc: None,

                current_location: None,
                frame: None,
                call_stack: CallStack::with_capacity(40),

                dictionary: Dictionary::new(),
                source: None,
                recovering: true,
                output: Box::new(std_io::stdout()),
                last_error: None,

                ffi: FfiInterface::new()
            };

        register_builtin_words(&mut interpreter);
        interpreter
    }

    /// Send script output somewhere other than stdout.
    pub fn set_output(&mut self, output: Box<dyn Write>)
    {
        self.output = output;
    }

    /// Run the bundled standard library.
    pub fn load_standard_library(&mut self) -> error::Result<()>
    {
        self.evaluate("<std>", STANDARD_LIBRARY)?;

        debug!(words = self.dictionary.len(), "standard library loaded");
        Ok(())
    }

    /// Make a host function available to scripts through `ffi::host`.
    pub fn register_host_function(&mut self, name: &str, function: Rc<HostFunction>)
    {
        self.ffi.register_host_function(name, function);
    }
}


impl Default for WordsmithInterpreter {
    fn default() -> Self {
        Self::new()
    }
}
