use crate::lang::source_buffer::SourceLocation;
use std::fmt::{self, Display, Formatter};

/// Book-keeping left by an opening word for it's matching closer.  The control stack is never
/// visible to scripts, only to the words that build definitions and control structures.
#[derive(Clone, PartialEq, Debug)]
pub enum ControlMarker {
    /// Left by `[`.
    Bracket,

    /// Left by `(`, or by an interpreted `if`/`else` that is collecting dead code.  The depth is
    /// the size of the data stack when the comment was opened.
    Paren { depth: usize },

    /// Left by `:`, the name being defined, where the definition started, and the data stack size
    /// at that point.
    Colon {
        name: String,
        location: SourceLocation,
        depth: usize,
    },

    /// An interpreted `if` and the condition it consumed.
    If { condition: bool },

    /// An interpreted `else` and the condition of it's `if`.
    Else { condition: bool },

    /// A compiled `if`, patch is the stack slot of the branch target to fill in.
    CompiledIf { patch: usize },

    /// A compiled `else`, patch is the stack slot of the branch target to fill in.
    CompiledElse { patch: usize },

    /// A compiled `begin` and the body offset loops jump back to.
    Begin { target: usize },
}

impl ControlMarker {
    /// The word that left this marker.
    pub fn opener(&self) -> &'static str {
        match self {
            ControlMarker::Bracket => "[",
            ControlMarker::Paren { .. } => "(",
            ControlMarker::Colon { .. } => ":",
            ControlMarker::If { .. } | ControlMarker::CompiledIf { .. } => "if",
            ControlMarker::Else { .. } | ControlMarker::CompiledElse { .. } => "else",
            ControlMarker::Begin { .. } => "begin",
        }
    }
}

impl Display for ControlMarker {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            ControlMarker::Colon { name, location, .. } => write!(f, ": {} at {}", name, location),
            _ => write!(f, "{}", self.opener()),
        }
    }
}

/// The stack of open constructs.
#[derive(Default)]
pub struct ControlStack {
    markers: Vec<ControlMarker>,
}

impl ControlStack {
    pub fn new() -> ControlStack {
        ControlStack {
            markers: Vec::new(),
        }
    }

    pub fn push(&mut self, marker: ControlMarker) {
        self.markers.push(marker);
    }

    pub fn pop(&mut self) -> Option<ControlMarker> {
        self.markers.pop()
    }

    /// Peek at the most recently opened construct.
    pub fn top(&self) -> Option<&ControlMarker> {
        self.markers.last()
    }

    /// The construct opened just before the most recent one.
    pub fn below_top(&self) -> Option<&ControlMarker> {
        self.markers.iter().rev().nth(1)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Drop everything above the given depth.
    pub fn truncate(&mut self, depth: usize) {
        self.markers.truncate(depth);
    }

    /// The data stack depth where the innermost body under construction starts, either a
    /// definition or a block of collected dead code.  Branch targets are relative to this.
    pub fn body_base(&self) -> Option<usize> {
        self.markers.iter().rev().find_map(|marker| match marker {
            ControlMarker::Colon { depth, .. } | ControlMarker::Paren { depth } => Some(*depth),
            _ => None,
        })
    }
}
