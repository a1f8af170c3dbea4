use std::fmt;

/// Longest constant preview, marker included.
pub const PREVIEW_LIMIT: usize = 60;

/// Appended to a preview that had to be cut.
pub const ELLIPSIS: &str = "...";

/// Identity of one node in the symbol graph.
///
/// Two entities are the same node only if their ids are equal; names may
/// collide freely across kinds and modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The closed set of symbol categories the tree knows how to show.
///
/// Variant order is the bucket order used when listing a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Submodule,
    Class,
    Function,
    Constant,
}

/// One entry reported by an adapter when enumerating a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Child {
    pub name: String,
    pub kind: EntityKind,
    /// `None` for values that carry nothing but a preview.
    pub entity: Option<EntityId>,
    /// Declaring scope of the entity, when the adapter knows it.
    pub owner: Option<EntityId>,
    /// Raw textual value for constants.
    pub preview: Option<String>,
    /// Not public in the underlying graph, even if the name looks public.
    pub hidden: bool,
}

impl Child {
    pub fn new(name: impl Into<String>, kind: EntityKind, entity: Option<EntityId>) -> Self {
        Self {
            name: name.into(),
            kind,
            entity,
            owner: None,
            preview: None,
            hidden: false,
        }
    }

    pub fn owned_by(mut self, owner: EntityId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_preview(mut self, preview: impl Into<String>) -> Self {
        self.preview = Some(preview.into());
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }
}

/// A callable declared directly on a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub entity: EntityId,
    pub hidden: bool,
}

impl Member {
    pub fn new(name: impl Into<String>, entity: EntityId) -> Self {
        Self {
            name: name.into(),
            entity,
            hidden: false,
        }
    }
}

/// Reflection over a symbol graph.
///
/// Implementations must be deterministic and must never fail: anything that
/// cannot be enumerated is reported as an empty list.
pub trait Reflect {
    fn classify(&self, entity: EntityId) -> EntityKind;

    /// Submodules of a module. Only requested when they may be descended into.
    fn submodules(&self, module: EntityId) -> Vec<Child>;

    /// Classes, functions and constants of a module or class.
    fn members(&self, module: EntityId) -> Vec<Child>;

    /// Callables declared on the class itself, inherited ones excluded.
    fn own_members(&self, class: EntityId) -> Vec<Member>;

    fn first_doc_line(&self, entity: EntityId) -> Option<String>;

    fn children(&self, entity: EntityId) -> Vec<Child> {
        match self.classify(entity) {
            EntityKind::Submodule => {
                let mut all = self.submodules(entity);
                all.extend(self.members(entity));
                all
            }
            EntityKind::Class => self.members(entity),
            EntityKind::Function | EntityKind::Constant => Vec::new(),
        }
    }

    fn preview_value(&self, raw: &str) -> String {
        preview_value(raw)
    }
}

/// Joins multi-line values onto one line and cuts the result to
/// [`PREVIEW_LIMIT`] characters, ending with [`ELLIPSIS`] when cut.
pub fn preview_value(raw: &str) -> String {
    let flat = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if flat.chars().count() <= PREVIEW_LIMIT {
        return flat;
    }
    let keep = PREVIEW_LIMIT - ELLIPSIS.chars().count();
    let mut cut: String = flat.chars().take(keep).collect();
    cut.push_str(ELLIPSIS);
    cut
}
