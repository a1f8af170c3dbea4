/// Options for one tree rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeOptions {
    /// Deepest line printed; the root line is depth 0.
    pub max_depth: usize,
    /// Keep names starting with `_` and items the adapter reports as hidden.
    pub include_private: bool,
    /// Append the first doc line to classes, functions and methods.
    pub show_doc: bool,
}

impl TreeOptions {
    pub const DEFAULT_DEPTH: usize = 2;

    pub fn new() -> Self {
        Self {
            max_depth: Self::DEFAULT_DEPTH,
            include_private: false,
            show_doc: false,
        }
    }

    pub fn with_depth(&self, max_depth: usize) -> Self {
        Self {
            max_depth,
            ..self.clone()
        }
    }

    pub fn with_private(&self, include_private: bool) -> Self {
        Self {
            include_private,
            ..self.clone()
        }
    }

    pub fn with_docs(&self, show_doc: bool) -> Self {
        Self {
            show_doc,
            ..self.clone()
        }
    }
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// One printed line below the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderEvent {
    /// Number of levels below the root, starting at 1.
    pub depth: usize,
    /// Last sibling at its level: drawn with a corner, and its descendants get
    /// a blank continuation instead of a bar.
    pub is_last: bool,
    pub text: String,
}
