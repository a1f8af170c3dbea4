//! A reflection adapter over a hand-built metadata table.
//!
//! Useful where no rustdoc output is available, and as a deterministic graph
//! for exercising the walker.

use std::collections::{HashMap, HashSet};

use anyhow::{bail, Result};
use tracing::debug;

use crate::reflect::traits::*;
use crate::reflect::{first_line, split_path};

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    kind: EntityKind,
    owner: Option<EntityId>,
    docs: Option<String>,
    value: Option<String>,
    hidden: bool,
    slots: Vec<Slot>,
    methods: Vec<EntityId>,
}

#[derive(Debug, Clone)]
enum Slot {
    Declared(EntityId),
    Reexport { name: String, target: EntityId },
}

#[derive(Debug, Default, Clone)]
pub struct TableAdapter {
    entries: HashMap<EntityId, Entry>,
    roots: Vec<EntityId>,
    failing: HashSet<EntityId>,
    next_id: u64,
}

impl TableAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, name: &str, kind: EntityKind, owner: Option<EntityId>) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entries.insert(
            id,
            Entry {
                name: name.to_string(),
                kind,
                owner,
                docs: None,
                value: None,
                hidden: false,
                slots: Vec::new(),
                methods: Vec::new(),
            },
        );
        id
    }

    fn declare(&mut self, module: EntityId, name: &str, kind: EntityKind) -> EntityId {
        let id = self.insert(name, kind, Some(module));
        if let Some(parent) = self.entries.get_mut(&module) {
            parent.slots.push(Slot::Declared(id));
        }
        id
    }

    /// Adds a module. With no parent it becomes a resolvable root.
    pub fn module(&mut self, parent: Option<EntityId>, name: &str) -> EntityId {
        match parent {
            Some(parent) => self.declare(parent, name, EntityKind::Submodule),
            None => {
                let id = self.insert(name, EntityKind::Submodule, None);
                self.roots.push(id);
                id
            }
        }
    }

    pub fn class(&mut self, module: EntityId, name: &str) -> EntityId {
        self.declare(module, name, EntityKind::Class)
    }

    pub fn function(&mut self, module: EntityId, name: &str) -> EntityId {
        self.declare(module, name, EntityKind::Function)
    }

    pub fn constant(&mut self, module: EntityId, name: &str, value: &str) -> EntityId {
        let id = self.declare(module, name, EntityKind::Constant);
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.value = Some(value.to_string());
        }
        id
    }

    /// Declares a method directly on `class`.
    pub fn method(&mut self, class: EntityId, name: &str) -> EntityId {
        let id = self.insert(name, EntityKind::Function, Some(class));
        if let Some(entry) = self.entries.get_mut(&class) {
            entry.methods.push(id);
        }
        id
    }

    /// Lists an existing entity under `module` as `name` without changing
    /// where it was declared.
    pub fn reexport(&mut self, module: EntityId, name: &str, target: EntityId) {
        if let Some(entry) = self.entries.get_mut(&module) {
            entry.slots.push(Slot::Reexport {
                name: name.to_string(),
                target,
            });
        }
    }

    /// Makes `child` reachable as a submodule of `parent`. Cycles are allowed.
    pub fn link_submodule(&mut self, parent: EntityId, name: &str, child: EntityId) {
        self.reexport(parent, name, child);
    }

    pub fn document(&mut self, entity: EntityId, docs: &str) {
        if let Some(entry) = self.entries.get_mut(&entity) {
            entry.docs = Some(docs.to_string());
        }
    }

    pub fn hide(&mut self, entity: EntityId) {
        if let Some(entry) = self.entries.get_mut(&entity) {
            entry.hidden = true;
        }
    }

    /// Makes submodule enumeration of `module` fail, as an unavailable
    /// optional dependency would.
    pub fn fail_enumeration(&mut self, module: EntityId) {
        self.failing.insert(module);
    }

    /// Resolves `root` or `root.sub.sub` (`::` works too) to a module.
    pub fn resolve(&self, path: &str) -> Result<EntityId> {
        let mut segments = split_path(path);
        let Some(first) = segments.next() else {
            bail!("empty module path");
        };
        let Some(mut current) = self
            .roots
            .iter()
            .copied()
            .find(|id| self.entries[id].name == first)
        else {
            bail!("no module named `{}`", first);
        };
        for segment in segments {
            let next = self
                .try_slots(current)?
                .into_iter()
                .find(|(name, id)| {
                    name == segment && self.entries[id].kind == EntityKind::Submodule
                });
            match next {
                Some((_, id)) => current = id,
                None => bail!("no submodule `{}` in `{}`", segment, self.entries[&current].name),
            }
        }
        Ok(current)
    }

    fn try_slots(&self, module: EntityId) -> Result<Vec<(String, EntityId)>> {
        let Some(entry) = self.entries.get(&module) else {
            bail!("unknown entity {}", module);
        };
        Ok(entry
            .slots
            .iter()
            .filter_map(|slot| match slot {
                Slot::Declared(id) => self.entries.get(id).map(|e| (e.name.clone(), *id)),
                Slot::Reexport { name, target } => {
                    self.entries.contains_key(target).then(|| (name.clone(), *target))
                }
            })
            .collect())
    }

    fn try_submodules(&self, module: EntityId) -> Result<Vec<Child>> {
        if self.failing.contains(&module) {
            bail!("submodules of {} cannot be loaded", module);
        }
        Ok(self
            .try_slots(module)?
            .into_iter()
            .filter(|(_, id)| self.entries[id].kind == EntityKind::Submodule)
            .map(|(name, id)| self.child(name, id))
            .collect())
    }

    fn child(&self, name: String, id: EntityId) -> Child {
        let entry = &self.entries[&id];
        let mut child = Child::new(name, entry.kind, Some(id)).hidden(entry.hidden);
        if let Some(owner) = entry.owner {
            child = child.owned_by(owner);
        }
        if let Some(value) = &entry.value {
            child = child.with_preview(value.clone());
        }
        child
    }
}

impl Reflect for TableAdapter {
    fn classify(&self, entity: EntityId) -> EntityKind {
        self.entries
            .get(&entity)
            .map(|e| e.kind)
            .unwrap_or(EntityKind::Constant)
    }

    fn submodules(&self, module: EntityId) -> Vec<Child> {
        self.try_submodules(module).unwrap_or_else(|err| {
            debug!("treating {} as having no submodules: {:#}", module, err);
            Vec::new()
        })
    }

    fn members(&self, module: EntityId) -> Vec<Child> {
        if self.classify(module) != EntityKind::Submodule {
            return Vec::new();
        }
        match self.try_slots(module) {
            Ok(slots) => slots
                .into_iter()
                .filter(|(_, id)| self.entries[id].kind != EntityKind::Submodule)
                .map(|(name, id)| self.child(name, id))
                .collect(),
            Err(err) => {
                debug!("treating {} as empty: {:#}", module, err);
                Vec::new()
            }
        }
    }

    fn own_members(&self, class: EntityId) -> Vec<Member> {
        let Some(entry) = self.entries.get(&class) else {
            return Vec::new();
        };
        entry
            .methods
            .iter()
            .filter_map(|id| {
                self.entries.get(id).map(|m| Member {
                    name: m.name.clone(),
                    entity: *id,
                    hidden: m.hidden,
                })
            })
            .collect()
    }

    fn first_doc_line(&self, entity: EntityId) -> Option<String> {
        self.entries
            .get(&entity)
            .and_then(|e| e.docs.as_deref())
            .and_then(first_line)
    }
}
