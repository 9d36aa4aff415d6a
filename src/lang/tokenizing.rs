use crate::{
    lang::source_buffer::{SourceBuffer, SourceLocation},
    runtime::error::{self, ErrorKind, ScriptError},
};
use rustyline::{error::ReadlineError, DefaultEditor};
use std::{
    collections::VecDeque,
    fmt::{self, Debug, Display, Formatter},
    fs::File,
    io::{BufRead, BufReader},
};

/// A number literal can be either an integer or a floating point value.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum NumberType {
    /// We're holding an integer value.
    Int(i64),

    /// We're holding a floating point value.
    Float(f64),
}

/// Print the value of the held number.
impl Display for NumberType {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            NumberType::Int(num) => write!(f, "{}", num),
            NumberType::Float(num) => write!(f, "{:?}", num),
        }
    }
}

/// A token is a single whitespace delimited word read from the source, along with the location in
/// the original source where it was found.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token {
    location: SourceLocation,
    text: String,
}

/// A list of tokens found in the source code.
pub type TokenList = Vec<Token>;

/// Make sure that the tokens are nicely printable.
impl Display for Token {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Include the original location for debugging purposes.
impl Debug for Token {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.text)
    }
}

impl Token {
    pub fn new(location: SourceLocation, text: String) -> Token {
        Token { location, text }
    }

    /// Get the token's location in the original source text.
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    /// The raw text of the token, exactly as it appeared in the source.
    pub fn text(&self) -> &String {
        &self.text
    }

    /// Split the token into it's location and text.
    pub fn into_parts(self) -> (SourceLocation, String) {
        (self.location, self.text)
    }
}

/// Source of physical lines for a token stream.  Lines are pulled one at a time, so an interactive
/// reader only blocks when the interpreter actually needs another word.
pub trait LineReader {
    /// Read the next line, without it's line terminator.  Returns None at the end of input.
    fn read_line(&mut self) -> error::Result<Option<String>>;
}

/// Lines from an in-memory block of source code.
pub struct StringLines {
    lines: VecDeque<String>,
}

impl StringLines {
    pub fn new(source: &str) -> StringLines {
        StringLines {
            lines: source.lines().map(str::to_string).collect(),
        }
    }
}

impl LineReader for StringLines {
    fn read_line(&mut self) -> error::Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

/// Lines read lazily from a file, or any other buffered reader.
pub struct FileLines<R: BufRead> {
    reader: R,
}

impl FileLines<BufReader<File>> {
    /// Open the file at the given path for reading.
    pub fn open(path: &str) -> error::Result<Self> {
        match File::open(path) {
            Ok(file) => Ok(FileLines::new(BufReader::new(file))),
            Err(err) => ScriptError::new_as_result(
                None,
                ErrorKind::Io(format!("Could not read file {}: {}", path, err)),
                None,
            ),
        }
    }
}

impl<R: BufRead> FileLines<R> {
    pub fn new(reader: R) -> Self {
        FileLines { reader }
    }
}

impl<R: BufRead> LineReader for FileLines<R> {
    fn read_line(&mut self) -> error::Result<Option<String>> {
        let mut line = String::new();

        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        // Strip the line terminator, including a Windows style \r.
        while line.ends_with('\n') || line.ends_with('\r') {
            let _ = line.pop();
        }

        Ok(Some(line))
    }
}

/// Lines typed by the user at an interactive prompt.  Each line is added to the editor's history.
pub struct EditorLines {
    editor: DefaultEditor,
    prompt: String,
}

impl EditorLines {
    pub fn new(prompt: &str) -> error::Result<EditorLines> {
        match DefaultEditor::new() {
            Ok(editor) => Ok(EditorLines {
                editor,
                prompt: prompt.to_string(),
            }),
            Err(err) => ScriptError::new_as_result(
                None,
                ErrorKind::Io(format!("Could not start the line editor: {}", err)),
                None,
            ),
        }
    }
}

impl LineReader for EditorLines {
    fn read_line(&mut self) -> error::Result<Option<String>> {
        match self.editor.readline(&self.prompt) {
            Ok(line) => {
                let _ = self.editor.add_history_entry(line.as_str());
                Ok(Some(line))
            }

            // Both ctrl-d and ctrl-c end the session.
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(None),

            Err(err) => ScriptError::new_as_result(
                None,
                ErrorKind::Io(format!("Failed to read input: {}", err)),
                None,
            ),
        }
    }
}

/// A lazy, forward only stream of tokens.  Lines are pulled from the underlying reader as they are
/// needed and split on whitespace.  A standalone `\` starts a comment that runs to the end of the
/// physical line.
pub struct TokenStream {
    path: String,
    reader: Box<dyn LineReader>,
    line_number: usize,
    pending: VecDeque<Token>,
}

impl TokenStream {
    /// Create a token stream over a reader, using path as the name of the source in diagnostics.
    pub fn new(path: &str, reader: Box<dyn LineReader>) -> TokenStream {
        TokenStream {
            path: path.to_string(),
            reader,
            line_number: 0,
            pending: VecDeque::new(),
        }
    }

    /// Stream over an in-memory block of code.
    pub fn from_source(path: &str, source: &str) -> TokenStream {
        TokenStream::new(path, Box::new(StringLines::new(source)))
    }

    /// Stream over the contents of a file.
    pub fn from_file(path: &str) -> error::Result<TokenStream> {
        Ok(TokenStream::new(path, Box::new(FileLines::open(path)?)))
    }

    /// The name of the source being read.
    pub fn path(&self) -> &String {
        &self.path
    }

    /// Get the next token, reading more lines as needed.  Returns None at the end of input.
    pub fn next_token(&mut self) -> error::Result<Option<Token>> {
        while self.pending.is_empty() {
            match self.reader.read_line()? {
                Some(line) => {
                    self.line_number += 1;
                    self.pending = tokenize_line(&self.path, self.line_number, &line);
                }

                None => return Ok(None),
            }
        }

        Ok(self.pending.pop_front())
    }
}

/// Check if the given character is considered whitespace.
fn is_whitespace(next: &char) -> bool {
    next.is_whitespace()
}

/// Skip over whitespace in the text.  Stopping only at either the end of the buffer or the next
/// non-whitespace character.
fn skip_whitespace(buffer: &mut SourceBuffer) {
    while let Some(next) = buffer.peek_next() {
        if !is_whitespace(&next) {
            break;
        }

        let _ = buffer.next_char();
    }
}

/// Pull text out of the buffer until we hit a whitespace character.  Words can contain any
/// character except whitespace.
fn process_until_whitespace(buffer: &mut SourceBuffer) -> (SourceLocation, String) {
    let location = buffer.location().clone();
    let mut text = String::new();

    while let Some(next) = buffer.peek_next() {
        if is_whitespace(&next) {
            break;
        }

        if let Some(next) = buffer.next_char() {
            text.push(next);
        }
    }

    (location, text)
}

/// Split one physical line into tokens, dropping everything after a standalone `\`.
fn tokenize_line(path: &str, line_number: usize, line: &str) -> VecDeque<Token> {
    let mut buffer = SourceBuffer::new(path, line_number, line);
    let mut tokens = VecDeque::new();

    loop {
        skip_whitespace(&mut buffer);

        if buffer.peek_next().is_none() {
            break;
        }

        let (location, text) = process_until_whitespace(&mut buffer);

        if text == "\\" {
            break;
        }

        tokens.push_back(Token::new(location, text));
    }

    tokens
}

/// Drop the _ separators from a number.  A separator is only allowed between two digits, so
/// None is returned for text like `_7`, `1_` or `1__0`.
fn remove_separators(text: &str) -> Option<String> {
    let characters: Vec<char> = text.chars().collect();
    let mut cleaned = String::with_capacity(text.len());

    for (index, character) in characters.iter().enumerate() {
        if *character != '_' {
            cleaned.push(*character);
            continue;
        }

        let before = index.checked_sub(1).and_then(|before| characters.get(before));
        let after = characters.get(index + 1);

        match (before, after) {
            (Some(before), Some(after)) if before.is_ascii_hexdigit() && after.is_ascii_hexdigit() => {}
            _ => return None,
        }
    }

    Some(cleaned)
}

/// Attempt to convert the text into a numeric literal.  Integers are tried first, then floating
/// point.  We also support hexadecimal and binary literals, and using _ as a separator for
/// readability.
pub fn to_numeric(text: &str) -> Option<NumberType> {
    let cleaned = remove_separators(text)?;

    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(stripped) => (true, stripped),
        None => (false, cleaned.as_str()),
    };

    let radix_value = if let Some(stripped) = digits.strip_prefix("0x") {
        Some(i64::from_str_radix(stripped, 16))
    } else if let Some(stripped) = digits.strip_prefix("0b") {
        Some(i64::from_str_radix(stripped, 2))
    } else {
        None
    };

    match radix_value {
        Some(Ok(value)) => Some(NumberType::Int(if negative { -value } else { value })),
        Some(Err(_)) => None,
        None => {
            if let Ok(value) = cleaned.parse::<i64>() {
                Some(NumberType::Int(value))
            } else if let Ok(value) = cleaned.parse::<f64>() {
                Some(NumberType::Float(value))
            } else {
                None
            }
        }
    }
}

/// Tokenize a complete in-memory source.
pub fn tokenize_from_source(path: &str, source: &str) -> error::Result<TokenList> {
    let mut stream = TokenStream::from_source(path, source);
    let mut token_list = TokenList::new();

    while let Some(token) = stream.next_token()? {
        token_list.push(token);
    }

    Ok(token_list)
}
