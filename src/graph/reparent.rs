// Reparenting passes
//
// Five ordered passes nest entities into namespaces, classes, and
// directories, inferred purely from qualified-name structure. Owner
// lookups go through a name index built per pass rather than scanning
// the buckets repeatedly.

use super::{entity_order, ApiGraph, EntityId};
use crate::error::{Error, Result};
use std::collections::HashMap;

impl ApiGraph {
    /// Run all five passes in order: unions, class-like, directories,
    /// namespace qualification, namespaces.
    pub fn reparent_all(&mut self) -> Result<()> {
        self.reparent_unions()?;
        self.reparent_class_like()?;
        self.reparent_directories()?;
        self.qualify_namespace_members();
        self.reparent_namespaces()?;
        Ok(())
    }

    /// Full qualified name -> id, first sighting wins
    fn name_index(&self, ids: &[EntityId]) -> HashMap<String, EntityId> {
        let mut map = HashMap::new();
        for &id in ids {
            map.entry(self.entity(id).name.clone()).or_insert(id);
        }
        map
    }

    /// Unions nest into the class or namespace their name is scoped in.
    /// Class-owned unions leave the flat union bucket (they have no page
    /// of their own); namespace-owned unions stay enumerable.
    fn reparent_unions(&mut self) -> Result<()> {
        let classes = self.name_index(&self.class_like);
        let namespaces = self.name_index(&self.namespaces);

        let unions = self.unions.clone();
        let mut removals = Vec::new();
        for &u in &unions {
            let name = self.entity(u).name.clone();
            let parts: Vec<&str> = name.split("::").collect();
            if parts.len() < 2 {
                continue;
            }

            if parts.len() > 2 {
                let namespace_name = parts[..parts.len() - 2].join("::");
                let potential_class = parts[parts.len() - 2];

                if let Some(&class) = classes.get(potential_class) {
                    self.adopt(class, u)?;
                    removals.push(u);
                    continue;
                }

                // prefer the most specific namespace prefix
                let alternate = format!("{}::{}", namespace_name, potential_class);
                let owner = namespaces
                    .get(alternate.as_str())
                    .or_else(|| namespaces.get(namespace_name.as_str()));
                if let Some(&namespace) = owner {
                    self.adopt(namespace, u)?;
                }
            } else {
                let owner_name = parts[0];

                if let Some(&class) = classes.get(owner_name) {
                    self.adopt(class, u)?;
                    removals.push(u);
                    continue;
                }

                if let Some(&namespace) = namespaces.get(owner_name) {
                    self.adopt(namespace, u)?;
                }
            }
        }

        self.unions.retain(|id| !removals.contains(id));
        Ok(())
    }

    /// Classes and structs nest into the namespace matching all but the
    /// last name component; they stay independently indexable in the flat
    /// bucket. An unresolvable owner aborts the run: continuing would
    /// produce a silently incomplete tree.
    fn reparent_class_like(&mut self) -> Result<()> {
        let namespaces = self.name_index(&self.namespaces);

        let class_like = self.class_like.clone();
        for &class in &class_like {
            let name = self.entity(class).name.clone();
            let parts: Vec<&str> = name.split("::").collect();
            if parts.len() < 2 {
                continue;
            }

            let namespace_name = parts[..parts.len() - 1].join("::");
            match namespaces.get(namespace_name.as_str()) {
                Some(&namespace) => self.adopt(namespace, class)?,
                None => {
                    return Err(Error::structure(format!(
                        "no namespace `{}` found to own `{}`",
                        namespace_name, name
                    )))
                }
            }
        }
        Ok(())
    }

    fn reparent_directories(&mut self) -> Result<()> {
        let ids = self.dirs.clone();
        let removals = self.nest_by_segments(&ids, "/")?;
        self.dirs.retain(|id| !removals.contains(id));
        Ok(())
    }

    fn reparent_namespaces(&mut self) -> Result<()> {
        let ids = self.namespaces.clone();
        let removals = self.nest_by_segments(&ids, "::")?;
        self.namespaces.retain(|id| !removals.contains(id));
        Ok(())
    }

    /// Deepest-first nesting for path-like names: rank entities by
    /// segment count, walk from deepest to shallowest, and attach each
    /// one to the entity whose name is its own minus the last segment.
    /// Returns the ids that found a parent and must leave the flat
    /// bucket. Walking deepest-first resolves a child's parent before any
    /// of the parent's own nesting is considered.
    fn nest_by_segments(&mut self, ids: &[EntityId], separator: &str) -> Result<Vec<EntityId>> {
        let index = self.name_index(ids);

        let mut ranked: Vec<(usize, EntityId)> = ids
            .iter()
            .map(|&id| (self.entity(id).name.split(separator).count(), id))
            .collect();
        ranked.sort_by(|a, b| {
            a.0.cmp(&b.0)
                .then_with(|| entity_order(self.entity(a.1), self.entity(b.1)))
        });

        let mut removals = Vec::new();
        for &(rank, id) in ranked.iter().rev() {
            // rank one means top level
            if rank < 2 {
                break;
            }
            let name = self.entity(id).name.clone();
            let Some(split_at) = name.rfind(separator) else { continue };
            let parent_name = &name[..split_at];
            if let Some(&parent) = index.get(parent_name) {
                self.adopt(parent, id)?;
                removals.push(id);
            }
        }
        Ok(removals)
    }

    /// The upstream tool reports unqualified names for namespace members;
    /// prepend the namespace prefix before namespaces nest into each
    /// other.
    fn qualify_namespace_members(&mut self) {
        let namespaces = self.namespaces.clone();
        for &namespace in &namespaces {
            let prefix = format!("{}::", self.entity(namespace).name);
            let children = self.entity(namespace).children.clone();
            for child in children {
                if !self.entity(child).name.contains(&prefix) {
                    let qualified = format!("{}{}", prefix, self.entity(child).name);
                    self.entity_mut(child).name = qualified;
                }
            }
        }
    }
}
