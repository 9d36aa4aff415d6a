use core::str::Chars;
use std::{ fmt::{ self,
                  Display,
                  Formatter },
           hash::{ Hash,
                   Hasher } };



/// The location in the source code where a token was found.  This structure is used all over the
/// interpreter to keep track where important things are found in the source code.  This is used
/// extensively in the error reporting.
///
/// This is a read-only structure.  Use the field accessor methods to get the values.
#[derive(Clone, PartialEq, PartialOrd, Eq, Debug)]
pub struct SourceLocation
{
    /// Either the path to the file or a description of the source code.  For example code entered
    /// in the REPL will have a tag of "\<stdin\>".
    path: String,

    /// The 1 based line number in the source code where the token was found.
    line: usize,

    /// The 0 based character offset of the token within its line.
    column: usize
}


impl Default for SourceLocation {
    fn default() -> Self {
        Self::new()
    }
}


impl Hash for SourceLocation
{
    fn hash<H: Hasher>(&self, state: &mut H)
    {
        self.path.hash(state);
        self.line.hash(state);
        self.column.hash(state);
    }
}


/// Used for error reporting to show where in the source code an error originated.
impl Display for SourceLocation
{
    fn fmt(&self, formatter: &mut Formatter<'_>) -> Result<(), fmt::Error>
    {
        write!(formatter, "{}:{}:{}", self.path, self.line, self.column)
    }
}


impl SourceLocation
{
    /// Crate a new SourceLocation with default values.
    pub fn new() -> SourceLocation
    {
        SourceLocation { path: "unspecified".to_string(), line: 1, column: 0 }
    }

    /// Create a new SourceLocation with all of the needed information.  This is useful in
    /// conjunction with the location_here! macro.
    pub fn new_from_info(path: &str, line: usize, column: usize) -> Self {
        SourceLocation { path: path.to_owned(), line, column }
    }

    /// The path to the source code or a meaningful description of the source code.
    pub fn path(&self) -> &String
    {
        &self.path
    }

    /// The 1 based line number in the source code.
    pub fn line(&self) -> usize
    {
        self.line
    }

    /// The 0 based column in the source line.
    pub fn column(&self) -> usize
    {
        self.column
    }
}



/// Helper macro to get the location of the macro invocation.  This is useful for error reporting
/// that includes locations within the Rust code where important operations are occurring.
#[macro_export]
macro_rules! location_here
{
    () =>
    {
        $crate::lang::source_buffer::SourceLocation::new_from_info(file!(),
                                      line!() as usize,
                                      column!() as usize)
    };
}



/// A buffer for walking a single physical line of source code.  The tokenizer uses it to pull
/// whitespace separated words out of the line while keeping track of the column each word starts
/// at.
///
/// The SourceBuffer only holds a reference to the line, the text is not copied.
pub struct SourceBuffer<'a>
{
    /// An iterator over the line being processed.
    chars: Chars<'a>,

    /// The logical location of the cursor in the source code.
    location: SourceLocation,

    /// The current character being processed.  This is used to peek at the next character without
    /// consuming it.
    current: Option<char>
}


impl<'a> SourceBuffer<'a>
{
    /// Create a new SourceBuffer for the given line of a source.  The line number is the 1 based
    /// number of the physical line within that source.
    pub fn new(path: &str, line: usize, text: &'a str) -> Self {
        SourceBuffer {
            chars: text.chars(),
            location: SourceLocation::new_from_info(path, line, 0),
            current: None
        }
    }

    /// The location the cursor is at in the source code being processed.
    pub fn location(&self) -> &SourceLocation
    {
        &self.location
    }

    /// Take a peek at the next character in the line without consuming it.
    pub fn peek_next(&mut self) -> Option<char>
    {
        match self.current
        {
            Some(_) => self.current,
            None =>
                {
                    let next = self.chars.next();

                    self.current = next;
                    next
                }
        }
    }

    /// Get and consume the next character in the line.
    pub fn next_char(&mut self) -> Option<char>
    {
        let next = match self.current.take()
            {
                Some(current) => Some(current),
                None => self.chars.next()
            };

        if next.is_some()
        {
            self.location.column += 1;
        }

        next
    }
}
