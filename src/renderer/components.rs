/// Connector before a sibling that has siblings after it.
pub const TREE_BRANCH: &str = "├── ";
/// Connector before the last sibling.
pub const TREE_LAST: &str = "└── ";
/// Continuation under an ancestor that has later siblings.
pub const TREE_PIPE: &str = "│   ";
/// Continuation under an ancestor that was the last sibling.
pub const TREE_SPACE: &str = "    ";

/// Connector state of the ancestors of the line being drawn.
#[derive(Debug, Default, Clone)]
pub struct PrefixStack {
    last_flags: Vec<bool>,
}

impl PrefixStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the full prefix for a line at `depth` and records it as the
    /// nearest ancestor for whatever follows.
    pub fn line(&mut self, depth: usize, is_last: bool) -> String {
        let level = depth.saturating_sub(1);
        self.last_flags.truncate(level);
        // A jump of more than one level has no recorded ancestor; draw blanks.
        while self.last_flags.len() < level {
            self.last_flags.push(true);
        }

        let mut prefix = String::with_capacity((level + 1) * TREE_BRANCH.len());
        for &last in &self.last_flags {
            prefix.push_str(if last { TREE_SPACE } else { TREE_PIPE });
        }
        prefix.push_str(if is_last { TREE_LAST } else { TREE_BRANCH });

        self.last_flags.push(is_last);
        prefix
    }
}
