pub mod rustdoc;
pub mod table;
pub mod traits;

pub use rustdoc::*;
pub use table::*;
pub use traits::*;

/// Splits `a::b.c` into `a`, `b`, `c`.
pub fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split("::")
        .flat_map(|part| part.split('.'))
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
}

/// First non-blank line of a doc string, trimmed.
pub fn first_line(docs: &str) -> Option<String> {
    docs.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}
