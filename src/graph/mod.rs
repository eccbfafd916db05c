// API graph: discovery and bookkeeping for every documented entity
//
// The arena owns every entity; the kind buckets and the refid map hold
// ids into it. Discovery fills the arena from the index compound list,
// the reparenting passes nest entities by name structure, and the
// cross-reference resolver fills in what only the per-compound detail
// documents know.

pub mod entity;
mod reparent;
mod xref;

pub use entity::{entity_order, Entity, EntityId, EntityKind, FileData};

use crate::doxygen::{Compound, DoxygenIndex};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::Path;

/// The full entity graph, partitioned by kind
#[derive(Debug, Default)]
pub struct ApiGraph {
    nodes: Vec<Entity>,
    by_refid: HashMap<String, EntityId>,
    /// Classes and structs
    pub class_like: Vec<EntityId>,
    pub namespaces: Vec<EntityId>,
    pub enums: Vec<EntityId>,
    pub functions: Vec<EntityId>,
    pub typedefs: Vec<EntityId>,
    pub variables: Vec<EntityId>,
    pub defines: Vec<EntityId>,
    pub unions: Vec<EntityId>,
    pub files: Vec<EntityId>,
    pub dirs: Vec<EntityId>,
    pub groups: Vec<EntityId>,
}

/// Counts over the discovered entity set
#[derive(Debug, Clone)]
pub struct GraphStats {
    pub entities: usize,
    pub class_like: usize,
    pub namespaces: usize,
    pub enums: usize,
    pub functions: usize,
    pub files: usize,
    pub dirs: usize,
}

impl ApiGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the full graph: discovery, reparenting, cross-reference
    /// resolution against the detail documents in `xml_dir`, and the
    /// final deterministic sort.
    pub fn build(index: &DoxygenIndex, xml_dir: &Path) -> Result<Self> {
        let mut graph = Self::new();
        graph.discover(index);
        graph.reparent_all()?;
        graph.resolve_file_refs(xml_dir);
        graph.attach_files_to_directories()?;
        graph.sort_internals();
        Ok(graph)
    }

    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.nodes[id.0]
    }

    pub fn entity_mut(&mut self, id: EntityId) -> &mut Entity {
        &mut self.nodes[id.0]
    }

    /// Total number of entities in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up an entity by its upstream refid
    pub fn by_refid(&self, refid: &str) -> Option<EntityId> {
        self.by_refid.get(refid).copied()
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            entities: self.nodes.len(),
            class_like: self.class_like.len(),
            namespaces: self.namespaces.len(),
            enums: self.enums.len(),
            functions: self.functions.len(),
            files: self.files.len(),
            dirs: self.dirs.len(),
        }
    }

    fn insert(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.nodes.len());
        self.by_refid.insert(entity.refid.clone(), id);
        self.nodes.push(entity);
        id
    }

    /// Make `child` an owned member of `parent`. Appending a child the
    /// parent already owns is a no-op; a second distinct owner is a
    /// structural error.
    pub fn adopt(&mut self, parent: EntityId, child: EntityId) -> Result<()> {
        match self.nodes[child.0].parent {
            Some(existing) if existing == parent => Ok(()),
            Some(existing) => Err(Error::structure(format!(
                "`{}` cannot move under `{}`: already owned by `{}`",
                self.nodes[child.0].name,
                self.nodes[parent.0].name,
                self.nodes[existing.0].name
            ))),
            None => {
                self.nodes[child.0].parent = Some(parent);
                self.nodes[parent.0].children.push(child);
                Ok(())
            }
        }
    }

    /// Stack-based traversal of the index compound list. Compounds are
    /// interned by refid, so running discovery twice over the same index
    /// yields the same entity set.
    pub fn discover(&mut self, index: &DoxygenIndex) {
        let mut stack: Vec<(EntityId, &Compound)> = Vec::new();
        for compound in index.compounds() {
            if let Some(id) = self.intern(compound) {
                stack.push((id, compound));
            }
        }

        while let Some((id, compound)) = stack.pop() {
            self.bucket(id);
            self.discover_members(id, compound, &mut stack);
        }
    }

    fn intern(&mut self, compound: &Compound) -> Option<EntityId> {
        let kind = EntityKind::parse(&compound.kind)?;
        if self.by_refid.contains_key(&compound.refid) {
            return None;
        }
        Some(self.insert(Entity::new(kind, &compound.name, &compound.refid)))
    }

    fn discover_members<'a>(
        &mut self,
        id: EntityId,
        compound: &'a Compound,
        stack: &mut Vec<(EntityId, &'a Compound)>,
    ) {
        // members of class-like compounds are recorded but never traversed,
        // so their own members are not separately discovered
        let skip_traversal = matches!(
            self.nodes[id.0].kind,
            EntityKind::Class | EntityKind::Struct | EntityKind::Union
        );

        for member in &compound.members {
            let Some(child) = self.intern(member) else { continue };
            // enum values stay owned by whichever compound listed them
            if !skip_traversal && self.nodes[child.0].kind != EntityKind::EnumValue {
                stack.push((child, member));
            }
            self.nodes[child.0].parent = Some(id);
            self.nodes[id.0].children.push(child);
        }
    }

    fn bucket(&mut self, id: EntityId) {
        match self.nodes[id.0].kind {
            EntityKind::Class | EntityKind::Struct => self.class_like.push(id),
            EntityKind::Namespace => self.namespaces.push(id),
            EntityKind::Enum => self.enums.push(id),
            EntityKind::Define => self.defines.push(id),
            EntityKind::File => self.files.push(id),
            EntityKind::Dir => self.dirs.push(id),
            EntityKind::Function => self.functions.push(id),
            EntityKind::Variable => self.variables.push(id),
            EntityKind::Group => self.groups.push(id),
            EntityKind::Typedef => self.typedefs.push(id),
            EntityKind::Union => self.unions.push(id),
            // never pushed onto the stack, so never bucketed
            EntityKind::EnumValue => {}
        }
    }

    /// Lazy pre-order walk over descendants of `id` (including itself)
    /// that match `kind`; used to expand namespaces and directories.
    pub fn nested(&self, id: EntityId, kind: EntityKind) -> NestedKind<'_> {
        NestedKind {
            graph: self,
            kind,
            stack: vec![id],
        }
    }

    pub(crate) fn sort_ids(&self, ids: &mut [EntityId]) {
        ids.sort_by(|a, b| entity_order(&self.nodes[a.0], &self.nodes[b.0]));
    }

    pub(crate) fn sorted(&self, ids: &[EntityId]) -> Vec<EntityId> {
        let mut out = ids.to_vec();
        self.sort_ids(&mut out);
        out
    }

    fn sort_children(&mut self, id: EntityId) {
        let mut kids = std::mem::take(&mut self.nodes[id.0].children);
        self.sort_ids(&mut kids);
        self.nodes[id.0].children = kids;
    }

    fn sort_taken(&mut self, mut ids: Vec<EntityId>, deep: bool) -> Vec<EntityId> {
        self.sort_ids(&mut ids);
        if deep {
            // each member orders its own children; depth beyond one level
            // already holds because every node sorted its list on the way up
            for &id in &ids {
                self.sort_children(id);
            }
        }
        ids
    }

    /// Deterministic ordering for every rendered listing. Leaf buckets
    /// sort themselves; hierarchical buckets also sort their members'
    /// children.
    pub fn sort_internals(&mut self) {
        let ids = std::mem::take(&mut self.defines);
        self.defines = self.sort_taken(ids, false);
        let ids = std::mem::take(&mut self.functions);
        self.functions = self.sort_taken(ids, false);
        let ids = std::mem::take(&mut self.files);
        self.files = self.sort_taken(ids, false);
        let ids = std::mem::take(&mut self.enums);
        self.enums = self.sort_taken(ids, false);
        let ids = std::mem::take(&mut self.groups);
        self.groups = self.sort_taken(ids, false);
        let ids = std::mem::take(&mut self.typedefs);
        self.typedefs = self.sort_taken(ids, false);
        let ids = std::mem::take(&mut self.variables);
        self.variables = self.sort_taken(ids, false);

        let ids = std::mem::take(&mut self.class_like);
        self.class_like = self.sort_taken(ids, true);
        let ids = std::mem::take(&mut self.namespaces);
        self.namespaces = self.sort_taken(ids, true);
        let ids = std::mem::take(&mut self.unions);
        self.unions = self.sort_taken(ids, true);
    }
}

/// Pre-order iterator over same-kind descendants, see [`ApiGraph::nested`]
pub struct NestedKind<'a> {
    graph: &'a ApiGraph,
    kind: EntityKind,
    stack: Vec<EntityId>,
}

impl Iterator for NestedKind<'_> {
    type Item = EntityId;

    fn next(&mut self) -> Option<EntityId> {
        while let Some(id) = self.stack.pop() {
            let entity = self.graph.entity(id);
            for &child in entity.children.iter().rev() {
                self.stack.push(child);
            }
            if entity.kind == self.kind {
                return Some(id);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compound(kind: &str, name: &str, refid: &str) -> Compound {
        Compound::new(kind, name, refid)
    }

    fn index_of(compounds: Vec<Compound>) -> DoxygenIndex {
        DoxygenIndex { compounds }
    }

    #[test]
    fn test_discover_buckets_by_kind() {
        let mut graph = ApiGraph::new();
        graph.discover(&index_of(vec![
            compound("class", "Widget", "class_widget"),
            compound("struct", "Anchor", "struct_anchor"),
            compound("namespace", "arbitrary", "ns_arbitrary"),
            compound("union", "SupremeUnion", "union_supreme"),
            compound("file", "common.h", "file_common"),
            compound("dir", "include", "dir_include"),
        ]));

        assert_eq!(graph.len(), 6);
        assert_eq!(graph.class_like.len(), 2);
        assert_eq!(graph.namespaces.len(), 1);
        assert_eq!(graph.unions.len(), 1);
        assert_eq!(graph.files.len(), 1);
        assert_eq!(graph.dirs.len(), 1);
    }

    #[test]
    fn test_discover_is_idempotent() {
        let index = index_of(vec![
            compound("class", "Widget", "class_widget"),
            compound("namespace", "arbitrary", "ns_arbitrary"),
        ]);

        let mut graph = ApiGraph::new();
        graph.discover(&index);
        let first = graph.len();
        graph.discover(&index);
        assert_eq!(graph.len(), first);
        assert_eq!(graph.class_like.len(), 1);
        assert_eq!(graph.namespaces.len(), 1);
    }

    #[test]
    fn test_discover_dedups_repeated_members() {
        // the enum is listed by both its namespace and its file; only the
        // first sighting wires it as a child
        let index = index_of(vec![
            Compound::with_members(
                "namespace",
                "arbitrary",
                "ns_arbitrary",
                vec![compound("enum", "CAMERA_STATES", "enum_camera")],
            ),
            Compound::with_members(
                "file",
                "common.h",
                "file_common",
                vec![compound("enum", "CAMERA_STATES", "enum_camera")],
            ),
        ]);

        let mut graph = ApiGraph::new();
        graph.discover(&index);

        assert_eq!(graph.enums.len(), 1);
        let enum_id = graph.by_refid("enum_camera").unwrap();
        let owners: Vec<EntityId> = (0..graph.len())
            .map(EntityId)
            .filter(|&id| graph.entity(id).children.contains(&enum_id))
            .collect();
        assert_eq!(owners.len(), 1);
        assert_eq!(graph.entity(enum_id).parent, Some(owners[0]));
    }

    #[test]
    fn test_class_members_are_children_but_not_tracked() {
        let index = index_of(vec![Compound::with_members(
            "class",
            "Widget",
            "class_widget",
            vec![compound("function", "render", "func_render")],
        )]);

        let mut graph = ApiGraph::new();
        graph.discover(&index);

        let widget = graph.by_refid("class_widget").unwrap();
        assert_eq!(graph.entity(widget).children.len(), 1);
        // the member was never pushed, so it reaches no flat bucket
        assert!(graph.functions.is_empty());
    }

    #[test]
    fn test_enum_values_never_reach_flat_buckets() {
        let index = index_of(vec![Compound::with_members(
            "namespace",
            "arbitrary",
            "ns_arbitrary",
            vec![
                compound("enum", "CAMERA_STATES", "enum_camera"),
                compound("enumvalue", "PLAYING", "enumvalue_playing"),
            ],
        )]);

        let mut graph = ApiGraph::new();
        graph.discover(&index);

        let ns = graph.by_refid("ns_arbitrary").unwrap();
        assert_eq!(graph.entity(ns).children.len(), 2);
        assert_eq!(graph.enums.len(), 1);
        // the enum value is a child only
        let value = graph.by_refid("enumvalue_playing").unwrap();
        assert_eq!(graph.entity(value).kind, EntityKind::EnumValue);
    }

    #[test]
    fn test_discover_skips_unknown_kinds() {
        let mut graph = ApiGraph::new();
        graph.discover(&index_of(vec![
            compound("page", "indexpage", "page_index"),
            compound("class", "Widget", "class_widget"),
        ]));
        assert_eq!(graph.len(), 1);
        assert!(graph.by_refid("page_index").is_none());
    }

    #[test]
    fn test_adopt_rejects_second_owner() {
        let mut graph = ApiGraph::new();
        let a = graph.insert(Entity::new(EntityKind::Namespace, "a", "ns_a"));
        let b = graph.insert(Entity::new(EntityKind::Namespace, "b", "ns_b"));
        let child = graph.insert(Entity::new(EntityKind::Class, "a::Widget", "class_widget"));

        graph.adopt(a, child).unwrap();
        // same owner again is a no-op
        graph.adopt(a, child).unwrap();
        assert_eq!(graph.entity(a).children.len(), 1);

        let err = graph.adopt(b, child).unwrap_err();
        assert!(err.to_string().contains("a::Widget"));
    }

    #[test]
    fn test_nested_walk_is_preorder() {
        let mut graph = ApiGraph::new();
        let outer = graph.insert(Entity::new(EntityKind::Namespace, "a", "ns_a"));
        let class = graph.insert(Entity::new(EntityKind::Class, "a::Widget", "class_widget"));
        let inner = graph.insert(Entity::new(EntityKind::Namespace, "a::b", "ns_ab"));
        let deepest = graph.insert(Entity::new(EntityKind::Namespace, "a::b::c", "ns_abc"));
        graph.adopt(outer, class).unwrap();
        graph.adopt(outer, inner).unwrap();
        graph.adopt(inner, deepest).unwrap();

        let found: Vec<EntityId> = graph.nested(outer, EntityKind::Namespace).collect();
        assert_eq!(found, vec![outer, inner, deepest]);
    }

    #[test]
    fn test_sort_internals_orders_buckets_and_children() {
        let mut graph = ApiGraph::new();
        let ns = graph.insert(Entity::new(EntityKind::Namespace, "arbitrary", "ns_arbitrary"));
        let widget = graph.insert(Entity::new(
            EntityKind::Class,
            "arbitrary::Widget",
            "class_widget",
        ));
        let anchor = graph.insert(Entity::new(
            EntityKind::Struct,
            "arbitrary::Anchor",
            "struct_anchor",
        ));
        graph.namespaces.push(ns);
        graph.class_like.push(widget);
        graph.class_like.push(anchor);
        graph.adopt(ns, widget).unwrap();
        graph.adopt(ns, anchor).unwrap();

        graph.sort_internals();

        assert_eq!(graph.class_like, vec![anchor, widget]);
        assert_eq!(graph.entity(ns).children, vec![anchor, widget]);
    }

    #[test]
    fn test_stats_counts() {
        let mut graph = ApiGraph::new();
        graph.discover(&index_of(vec![
            compound("class", "Widget", "class_widget"),
            compound("file", "common.h", "file_common"),
        ]));
        let stats = graph.stats();
        assert_eq!(stats.entities, 2);
        assert_eq!(stats.class_like, 1);
        assert_eq!(stats.files, 1);
    }
}
