use crate::{
    lang::source_buffer::SourceLocation,
    runtime::{data_structures::value::Value, error, interpreter::Interpreter},
};
use std::{
    cell::Cell,
    fmt::{self, Debug, Display, Formatter},
    rc::Rc,
};

/// Definition of a native word's handler function.  Can be a lambda, a callable object or a Rust
/// function.
pub type WordHandler = dyn Fn(&mut dyn Interpreter) -> error::Result<()>;

/// A word implemented in Rust.
pub struct NativeWord {
    name: String,
    location: SourceLocation,
    handler: Rc<WordHandler>,
    immediate: Cell<bool>,
    description: String,
    signature: String,
}

impl NativeWord {
    /// The name the word was registered under.
    pub fn name(&self) -> &String {
        &self.name
    }

    /// Where in the Rust source the word was registered.
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn handler(&self) -> Rc<WordHandler> {
        self.handler.clone()
    }

    pub fn description(&self) -> &String {
        &self.description
    }

    /// The word's stack signature, for example `a b -- sum`.
    pub fn signature(&self) -> &String {
        &self.signature
    }
}

/// A constant value.  Executing it pushes a copy of the value.
pub struct LiteralWord {
    name: String,
    value: Value,
}

impl LiteralWord {
    pub fn name(&self) -> &String {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// A word defined in script.  The body holds the entries that were found when the definition was
/// closed, so redefining one of them later doesn't change this word.
pub struct CompiledWord {
    name: String,
    location: SourceLocation,
    body: Vec<Entry>,
    doc: Option<String>,
    immediate: Cell<bool>,
}

impl CompiledWord {
    pub fn name(&self) -> &String {
        &self.name
    }

    /// Where the definition was opened.
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn body(&self) -> &Vec<Entry> {
        &self.body
    }

    /// The stack comment that was written inside the definition, if any.
    pub fn doc(&self) -> &Option<String> {
        &self.doc
    }
}

/// A dictionary entry.  Entries are reference counted so that the same entry can live in the
/// dictionary, in any number of compiled bodies, and on the data stack at once.
#[derive(Clone)]
pub enum Entry {
    Native(Rc<NativeWord>),
    Literal(Rc<LiteralWord>),
    Compiled(Rc<CompiledWord>),
}

impl Entry {
    /// Create a new native word entry.
    pub fn native(
        name: &str,
        location: SourceLocation,
        handler: Rc<WordHandler>,
        immediate: bool,
        description: &str,
        signature: &str,
    ) -> Entry {
        Entry::Native(Rc::new(NativeWord {
            name: name.to_string(),
            location,
            handler,
            immediate: Cell::new(immediate),
            description: description.to_string(),
            signature: signature.to_string(),
        }))
    }

    /// Create a named constant.
    pub fn literal(name: &str, value: Value) -> Entry {
        Entry::Literal(Rc::new(LiteralWord {
            name: name.to_string(),
            value,
        }))
    }

    /// Create a literal named after it's own value, as produced by the numeric fallback and when
    /// compiling plain values into a body.
    pub fn anonymous_literal(value: Value) -> Entry {
        let name = value.repr();
        Entry::literal(&name, value)
    }

    /// Create a new compiled definition.
    pub fn compiled(
        name: &str,
        location: SourceLocation,
        body: Vec<Entry>,
        doc: Option<String>,
    ) -> Entry {
        Entry::Compiled(Rc::new(CompiledWord {
            name: name.to_string(),
            location,
            body,
            doc,
            immediate: Cell::new(false),
        }))
    }

    pub fn name(&self) -> &String {
        match self {
            Entry::Native(word) => &word.name,
            Entry::Literal(word) => &word.name,
            Entry::Compiled(word) => &word.name,
        }
    }

    /// A short description of the kind of entry for word listings.
    pub fn kind(&self) -> &'static str {
        match self {
            Entry::Native(_) => "native",
            Entry::Literal(_) => "literal",
            Entry::Compiled(_) => "compiled",
        }
    }

    /// Should this entry run even while compiling?  Literals never do.
    pub fn is_immediate(&self) -> bool {
        match self {
            Entry::Native(word) => word.immediate.get(),
            Entry::Literal(_) => false,
            Entry::Compiled(word) => word.immediate.get(),
        }
    }

    /// Mark the entry as immediate.  Returns false if the entry can't be made immediate.
    pub fn make_immediate(&self) -> bool {
        match self {
            Entry::Native(word) => {
                word.immediate.set(true);
                true
            }

            Entry::Literal(_) => false,

            Entry::Compiled(word) => {
                word.immediate.set(true);
                true
            }
        }
    }

    /// Do both handles refer to the very same entry?
    pub fn same_as(&self, other: &Entry) -> bool {
        match (self, other) {
            (Entry::Native(a), Entry::Native(b)) => Rc::ptr_eq(a, b),
            (Entry::Literal(a), Entry::Literal(b)) => Rc::ptr_eq(a, b),
            (Entry::Compiled(a), Entry::Compiled(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Entry) -> bool {
        self.same_as(other)
    }
}

impl Display for Entry {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Debug for Entry {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "<{} {}>", self.kind(), self.name())
    }
}

/// Render an entry back into source form for `see`.  Compiled words are shown as a complete
/// definition with numbered steps so branch targets can be followed.
pub fn pretty_print_entry(entry: &Entry) -> String {
    match entry {
        Entry::Native(word) => {
            let mut result = format!("{} ( {} )  native", word.name, word.signature);

            if word.immediate.get() {
                result.push_str(" immediate");
            }

            if !word.description.is_empty() {
                result.push_str(&format!("\n    {}", word.description));
            }

            result
        }

        Entry::Literal(word) => format!("{} constant {}", word.value.repr(), word.name),

        Entry::Compiled(word) => {
            let mut result = format!(": {}", word.name);

            if let Some(doc) = &word.doc {
                result.push(' ');
                result.push_str(doc);
            }

            result.push('\n');

            for (index, step) in word.body.iter().enumerate() {
                result.push_str(&format!("{:6}  {}\n", index, step_text(step)));
            }

            result.push(';');

            if word.immediate.get() {
                result.push_str(" immediate");
            }

            result
        }
    }
}

/// How a single step of a body reads in a listing.
fn step_text(step: &Entry) -> String {
    match step {
        Entry::Literal(literal) => match literal.value() {
            Value::Word(entry) => format!("' {}", entry.name()),
            _ => literal.name.clone(),
        },

        _ => step.name().clone(),
    }
}
