//! # symtree
//!
//! Prints the module tree of a symbol graph: submodules, types, functions
//! and constants, drawn with box-drawing connectors.
//!
//! The graph is reached through the [`Reflect`] trait. [`RustdocAdapter`]
//! reads rustdoc JSON; [`TableAdapter`] is a hand-built table.
//!
//! ```
//! use symtree::{render_tree, TableAdapter, TreeOptions};
//!
//! let mut table = TableAdapter::new();
//! let pkg = table.module(None, "pkg");
//! let sub = table.module(Some(pkg), "sub");
//! table.function(sub, "f");
//! table.constant(pkg, "X", "42");
//!
//! let tree = render_tree(&table, pkg, "pkg", &TreeOptions::default());
//! assert_eq!(tree, "pkg\n├── sub\n│   └── f\n└── X = 42\n");
//! ```

pub mod loader;
pub mod reflect;
pub mod renderer;
pub mod walker;

#[cfg(test)]
mod tests;

pub use loader::{CrateSource, Loader};
pub use reflect::{
    preview_value, Child, EntityId, EntityKind, Member, Reflect, RustdocAdapter, TableAdapter,
};
pub use renderer::{render_tree, RenderEvent, TreeOptions, TreeRenderer};
pub use walker::{Walker, ALREADY_VISITED};
