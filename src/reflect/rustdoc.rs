//! Reflection over rustdoc's JSON output.

use std::collections::HashMap;

use anyhow::{anyhow, bail, Result};
use rustdoc_types::{Crate, Id, Item, ItemEnum, Module, Use, Visibility};
use tracing::{debug, trace};

use crate::reflect::traits::*;
use crate::reflect::{first_line, split_path};

/// One resolved entry of a module listing, before it is turned into a [`Child`].
struct Entry<'a> {
    name: String,
    id: Id,
    item: &'a Item,
    owner: Option<Id>,
    hidden: bool,
}

pub struct RustdocAdapter {
    crate_data: Crate,
    /// Item id -> id of the module that declares it directly.
    owners: HashMap<Id, Id>,
}

impl RustdocAdapter {
    pub fn new(crate_data: Crate) -> Self {
        let mut owners = HashMap::new();
        for (module_id, item) in &crate_data.index {
            let ItemEnum::Module(module) = &item.inner else {
                continue;
            };
            for child_id in &module.items {
                let declared = crate_data
                    .index
                    .get(child_id)
                    .is_some_and(|child| !matches!(child.inner, ItemEnum::Use(_)));
                if declared {
                    owners.insert(*child_id, *module_id);
                }
            }
        }
        Self { crate_data, owners }
    }

    pub fn crate_name(&self) -> Option<&str> {
        self.crate_data
            .index
            .get(&self.crate_data.root)
            .and_then(|item| item.name.as_deref())
    }

    pub fn root(&self) -> EntityId {
        entity_of(self.crate_data.root)
    }

    /// Resolves `krate::a::b` (or `krate.a.b`) to a module of this crate.
    pub fn resolve(&self, path: &str) -> Result<EntityId> {
        let mut segments = split_path(path);
        let first = segments
            .next()
            .ok_or_else(|| anyhow!("empty module path `{}`", path))?;
        let crate_name = self
            .crate_name()
            .ok_or_else(|| anyhow!("crate root item is missing from the index"))?;
        if normalize(first) != normalize(crate_name) {
            bail!("`{}` is not part of crate `{}`", path, crate_name);
        }

        let mut current = self.crate_data.root;
        let mut walked = crate_name.to_string();
        for segment in segments {
            let next = self
                .entries(current)?
                .into_iter()
                .find(|entry| {
                    entry.name == segment && matches!(entry.item.inner, ItemEnum::Module(_))
                })
                .map(|entry| entry.id);
            match next {
                Some(id) => current = id,
                None => bail!("no module `{}` in `{}`", segment, walked),
            }
            walked.push_str("::");
            walked.push_str(segment);
        }
        Ok(entity_of(current))
    }

    fn item(&self, entity: EntityId) -> Option<&Item> {
        id_of(entity).and_then(|id| self.crate_data.index.get(&id))
    }

    fn module(&self, id: Id) -> Result<&Module> {
        let item = self
            .crate_data
            .index
            .get(&id)
            .ok_or_else(|| anyhow!("item {:?} is not in the index", id))?;
        match &item.inner {
            ItemEnum::Module(module) => Ok(module),
            _ => bail!("item {:?} is not a module", id),
        }
    }

    /// Everything a module lists, with re-exports resolved to their targets.
    fn entries(&self, module_id: Id) -> Result<Vec<Entry<'_>>> {
        self.collect_entries(module_id, &mut vec![module_id])
    }

    /// `globbing` holds the modules whose glob imports are being expanded.
    fn collect_entries(&self, module_id: Id, globbing: &mut Vec<Id>) -> Result<Vec<Entry<'_>>> {
        let module = self.module(module_id)?;
        let mut entries = Vec::with_capacity(module.items.len());
        let mut globbed = Vec::new();

        for id in &module.items {
            let Some(item) = self.crate_data.index.get(id) else {
                trace!("skipping {:?}: not in the index", id);
                continue;
            };

            match &item.inner {
                ItemEnum::Use(import) => {
                    let Some(target_id) = import.id else {
                        trace!("skipping unresolved re-export of {}", import.source);
                        continue;
                    };
                    let Some(target) = self.crate_data.index.get(&target_id) else {
                        trace!("skipping external re-export of {}", import.source);
                        continue;
                    };
                    if import.is_glob {
                        let imported = self.glob_entries(import, item, target_id, target, globbing);
                        globbed.extend(imported);
                        continue;
                    }
                    entries.push(Entry {
                        name: import.name.clone(),
                        id: target_id,
                        item: target,
                        owner: self.owners.get(&target_id).copied(),
                        hidden: is_hidden(item) || is_hidden(target),
                    });
                }
                _ => {
                    let Some(name) = &item.name else {
                        continue;
                    };
                    entries.push(Entry {
                        name: name.clone(),
                        id: *id,
                        item,
                        owner: Some(module_id),
                        hidden: is_hidden(item),
                    });
                }
            }
        }

        // Names declared or imported by name shadow glob imports.
        for entry in globbed {
            if !entries.iter().any(|seen| seen.name == entry.name) {
                entries.push(entry);
            }
        }
        Ok(entries)
    }

    /// Public entries of a module brought in by `pub use module::*`.
    fn glob_entries<'a>(
        &'a self,
        import: &Use,
        item: &Item,
        target_id: Id,
        target: &Item,
        globbing: &mut Vec<Id>,
    ) -> Vec<Entry<'a>> {
        if !matches!(target.inner, ItemEnum::Module(_)) {
            trace!("skipping glob import of non-module {}", import.source);
            return Vec::new();
        }
        if globbing.contains(&target_id) {
            trace!("skipping cyclic glob import of {}", import.source);
            return Vec::new();
        }

        globbing.push(target_id);
        let imported = self.collect_entries(target_id, globbing);
        globbing.pop();

        match imported {
            Ok(imported) => imported
                .into_iter()
                .filter(|entry| matches!(entry.item.visibility, Visibility::Public))
                .map(|mut entry| {
                    entry.hidden |= is_hidden(item);
                    entry
                })
                .collect(),
            Err(err) => {
                debug!("glob import of {} failed: {:#}", import.source, err);
                Vec::new()
            }
        }
    }

    fn listing(&self, module: EntityId, submodules: bool) -> Result<Vec<Child>> {
        let id = id_of(module).ok_or_else(|| anyhow!("{} is not a rustdoc id", module))?;
        let mut children = Vec::new();
        for entry in self.entries(id)? {
            if !is_listed(entry.item) {
                continue;
            }
            let kind = kind_of(entry.item);
            if (kind == EntityKind::Submodule) != submodules {
                continue;
            }
            let mut child = Child::new(entry.name, kind, Some(entity_of(entry.id)))
                .hidden(entry.hidden);
            if let Some(owner) = entry.owner {
                child = child.owned_by(entity_of(owner));
            }
            if let Some(raw) = raw_value(entry.item) {
                child = child.with_preview(raw);
            }
            children.push(child);
        }
        Ok(children)
    }

    /// Function ids declared on a type or trait, trait impls excluded.
    fn declared_methods(&self, item: &Item) -> Vec<Id> {
        let impls = match &item.inner {
            ItemEnum::Trait(trait_data) => return trait_data.items.clone(),
            ItemEnum::Struct(struct_data) => &struct_data.impls,
            ItemEnum::Enum(enum_data) => &enum_data.impls,
            ItemEnum::Union(union_data) => &union_data.impls,
            _ => return Vec::new(),
        };

        let mut methods = Vec::new();
        for impl_id in impls {
            let Some(impl_item) = self.crate_data.index.get(impl_id) else {
                continue;
            };
            let ItemEnum::Impl(impl_data) = &impl_item.inner else {
                continue;
            };
            if impl_data.trait_.is_some()
                || impl_data.is_synthetic
                || impl_data.blanket_impl.is_some()
            {
                continue;
            }
            methods.extend(impl_data.items.iter().copied());
        }
        methods
    }
}

impl Reflect for RustdocAdapter {
    fn classify(&self, entity: EntityId) -> EntityKind {
        self.item(entity)
            .map(kind_of)
            .unwrap_or(EntityKind::Constant)
    }

    fn submodules(&self, module: EntityId) -> Vec<Child> {
        self.listing(module, true).unwrap_or_else(|err| {
            debug!("no submodules for {}: {:#}", module, err);
            Vec::new()
        })
    }

    fn members(&self, module: EntityId) -> Vec<Child> {
        if self.classify(module) != EntityKind::Submodule {
            return Vec::new();
        }
        self.listing(module, false).unwrap_or_else(|err| {
            debug!("no members for {}: {:#}", module, err);
            Vec::new()
        })
    }

    fn own_members(&self, class: EntityId) -> Vec<Member> {
        let Some(item) = self.item(class) else {
            return Vec::new();
        };
        let in_trait = matches!(item.inner, ItemEnum::Trait(_));

        self.declared_methods(item)
            .into_iter()
            .filter_map(|id| {
                let method = self.crate_data.index.get(&id)?;
                if !matches!(method.inner, ItemEnum::Function(_)) {
                    return None;
                }
                // Trait items carry default visibility even though they are public.
                let hidden = if in_trait {
                    is_doc_hidden(method)
                } else {
                    is_hidden(method)
                };
                Some(Member {
                    name: method.name.clone()?,
                    entity: entity_of(id),
                    hidden,
                })
            })
            .collect()
    }

    fn first_doc_line(&self, entity: EntityId) -> Option<String> {
        self.item(entity)
            .and_then(|item| item.docs.as_deref())
            .and_then(first_line)
    }
}

fn entity_of(id: Id) -> EntityId {
    EntityId(u64::from(id.0))
}

fn id_of(entity: EntityId) -> Option<Id> {
    u32::try_from(entity.0).ok().map(Id)
}

fn normalize(name: &str) -> String {
    name.replace('-', "_")
}

fn kind_of(item: &Item) -> EntityKind {
    match &item.inner {
        ItemEnum::Module(_) => EntityKind::Submodule,
        ItemEnum::Struct(_)
        | ItemEnum::Enum(_)
        | ItemEnum::Union(_)
        | ItemEnum::Trait(_)
        | ItemEnum::TraitAlias(_)
        | ItemEnum::TypeAlias(_) => EntityKind::Class,
        ItemEnum::Function(_) | ItemEnum::Macro(_) | ItemEnum::ProcMacro(_) => {
            EntityKind::Function
        }
        _ => EntityKind::Constant,
    }
}

/// Impls, fields, variants and associated items belong to another item.
fn is_listed(item: &Item) -> bool {
    !matches!(
        item.inner,
        ItemEnum::Use(_)
            | ItemEnum::Impl(_)
            | ItemEnum::StructField(_)
            | ItemEnum::Variant(_)
            | ItemEnum::AssocConst { .. }
            | ItemEnum::AssocType { .. }
    )
}

/// Source text of a constant-like item, preferring the written expression.
fn raw_value(item: &Item) -> Option<String> {
    match &item.inner {
        ItemEnum::Constant { const_, .. } => {
            let expr = const_.expr.trim();
            if !expr.is_empty() && expr != "_" {
                Some(expr.to_string())
            } else {
                const_.value.clone().or_else(|| Some(expr.to_string()))
            }
        }
        ItemEnum::Static(static_data) => Some(static_data.expr.clone()),
        ItemEnum::ExternCrate { name, .. } => Some(name.clone()),
        _ => None,
    }
}

fn is_doc_hidden(item: &Item) -> bool {
    item.attrs.iter().any(|attr| attr.contains("doc(hidden)"))
}

fn is_hidden(item: &Item) -> bool {
    !matches!(item.visibility, Visibility::Public) || is_doc_hidden(item)
}
