use crate::{
    lang::{code::Entry, tokenizing::to_numeric},
    runtime::data_structures::value::ToValue,
};
use std::{
    collections::HashMap,
    fmt::{self, Display, Formatter},
};

/// The word dictionary used by the interpreter.  Names are case-insensitive and are stored lower
/// cased.  Defining a name that already exists replaces the entry, but anything already compiled
/// against the old entry keeps it.
pub struct Dictionary {
    words: HashMap<String, Entry>,
}

/// Pretty print the dictionary.  Words are listed sorted by name along with their kind and if they
/// are immediate.
impl Display for Dictionary {
    fn fmt(&self, formatter: &mut Formatter) -> fmt::Result {
        let max_size = self.words.keys().map(|name| name.len()).max().unwrap_or(0);

        let mut string_result = format!("{} words defined.\n\n", self.words.len());

        let mut keys: Vec<&String> = self.words.keys().collect();
        keys.sort();

        for key in keys.iter() {
            let entry = &self.words[*key];

            string_result = string_result + &format!("{:width$}  {:8}", key, entry.kind(), width = max_size);

            string_result += {
                if entry.is_immediate() {
                    "  immediate"
                } else {
                    ""
                }
            };

            string_result.push('\n');
        }

        write!(formatter, "{}", string_result)
    }
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl Dictionary {
    /// Create a new empty dictionary.
    pub fn new() -> Dictionary {
        Dictionary {
            words: HashMap::new(),
        }
    }

    /// Insert or replace a word in the dictionary.
    pub fn define(&mut self, name: &str, entry: Entry) {
        let _ = self.words.insert(name.to_lowercase(), entry);
    }

    /// Look for a word by name only, no numeric fallback.
    pub fn try_get(&self, name: &str) -> Option<&Entry> {
        self.words.get(&name.to_lowercase())
    }

    /// Resolve a name to an entry.  If the name isn't defined we try to read it as a number, in
    /// which case a fresh literal is returned.  None means the name is neither.
    pub fn lookup(&self, name: &str) -> Option<Entry> {
        if let Some(entry) = self.try_get(name) {
            return Some(entry.clone());
        }

        to_numeric(name).map(|number| Entry::anonymous_literal(number.to_value()))
    }

    /// Number of words defined.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// All of the defined names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.words.keys().cloned().collect();

        names.sort();
        names
    }
}
