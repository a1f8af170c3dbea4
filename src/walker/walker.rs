use std::collections::HashSet;

use tracing::{debug, trace};

use crate::reflect::{Child, EntityId, EntityKind, Reflect};
use crate::renderer::{RenderEvent, TreeOptions};
use crate::walker::policy;

/// Text of the leaf emitted in place of a subtree that was already expanded.
pub const ALREADY_VISITED: &str = "(already visited)";

/// Entities expanded so far in one walk. Never reset between branches.
#[derive(Debug, Default)]
struct VisitedSet {
    seen: HashSet<EntityId>,
}

impl VisitedSet {
    /// Returns `false` if `entity` was already present.
    fn insert(&mut self, entity: EntityId) -> bool {
        self.seen.insert(entity)
    }

    fn len(&self) -> usize {
        self.seen.len()
    }
}

/// Depth-first walk over a symbol graph, producing one event per line below
/// the root.
///
/// A walker is consumed by [`Walker::walk`]; each root gets a fresh one.
pub struct Walker<'a, R: Reflect + ?Sized> {
    adapter: &'a R,
    options: &'a TreeOptions,
    visited: VisitedSet,
    events: Vec<RenderEvent>,
}

impl<'a, R: Reflect + ?Sized> Walker<'a, R> {
    pub fn new(adapter: &'a R, options: &'a TreeOptions) -> Self {
        Self {
            adapter,
            options,
            visited: VisitedSet::default(),
            events: Vec::new(),
        }
    }

    pub fn walk(mut self, root: EntityId) -> Vec<RenderEvent> {
        debug!(
            "walking {} (max depth {}, private {}, docs {})",
            root, self.options.max_depth, self.options.include_private, self.options.show_doc
        );
        self.visit(root, 0);
        debug!(
            "walk of {} done: {} lines, {} entities expanded",
            root,
            self.events.len(),
            self.visited.len()
        );
        self.events
    }

    /// Lists the children of `entity`, whose own line sits at `depth`.
    fn visit(&mut self, entity: EntityId, depth: usize) {
        if !self.visited.insert(entity) {
            trace!("{} already expanded", entity);
            self.emit(depth + 1, true, ALREADY_VISITED.to_string());
            return;
        }
        if depth >= self.options.max_depth {
            return;
        }

        let items = policy::order_children(
            entity,
            self.adapter.children(entity),
            self.options.include_private,
        );
        let expand = depth + 1 < self.options.max_depth;
        let count = items.len();

        for (i, item) in items.into_iter().enumerate() {
            let is_last = i + 1 == count;
            let text = self.label(&item);
            self.emit(depth + 1, is_last, text);

            match (item.kind, item.entity) {
                (EntityKind::Class, Some(class)) if expand => self.list_members(class, depth + 2),
                (EntityKind::Submodule, Some(module)) if expand => self.visit(module, depth + 1),
                _ => {}
            }
        }
    }

    /// One extra level of methods under a class. Members are leaves and do
    /// not enter the visited set.
    fn list_members(&mut self, class: EntityId, depth: usize) {
        let members = policy::order_members(
            self.adapter.own_members(class),
            self.options.include_private,
        );
        let count = members.len();
        for (i, member) in members.into_iter().enumerate() {
            let text = format!("{}{}", member.name, self.doc_suffix(member.entity));
            self.emit(depth, i + 1 == count, text);
        }
    }

    fn label(&self, item: &Child) -> String {
        match item.kind {
            EntityKind::Constant => match &item.preview {
                Some(raw) => format!("{} = {}", item.name, self.adapter.preview_value(raw)),
                None => item.name.clone(),
            },
            EntityKind::Class | EntityKind::Function => {
                let doc = item
                    .entity
                    .map(|entity| self.doc_suffix(entity))
                    .unwrap_or_default();
                format!("{}{}", item.name, doc)
            }
            EntityKind::Submodule => item.name.clone(),
        }
    }

    fn doc_suffix(&self, entity: EntityId) -> String {
        if !self.options.show_doc {
            return String::new();
        }
        match self.adapter.first_doc_line(entity) {
            Some(line) => format!(" — {}", line),
            None => String::new(),
        }
    }

    fn emit(&mut self, depth: usize, is_last: bool, text: String) {
        self.events.push(RenderEvent {
            depth,
            is_last,
            text,
        });
    }
}
