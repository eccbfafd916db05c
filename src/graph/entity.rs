// Entity model: the documented units and their ordering

use std::cmp::Ordering;

/// Index of an entity in the `ApiGraph` arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub usize);

/// Kind of a documented compound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Class,
    Struct,
    Union,
    Enum,
    EnumValue,
    Function,
    Variable,
    Typedef,
    Define,
    Namespace,
    File,
    Dir,
    Group,
}

impl EntityKind {
    /// Parse the upstream kind string. Kinds this tool does not document
    /// (friend, property, page, ...) yield `None`.
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "class" => Some(Self::Class),
            "struct" => Some(Self::Struct),
            "union" => Some(Self::Union),
            "enum" => Some(Self::Enum),
            "enumvalue" => Some(Self::EnumValue),
            "function" => Some(Self::Function),
            "variable" => Some(Self::Variable),
            "typedef" => Some(Self::Typedef),
            "define" => Some(Self::Define),
            "namespace" => Some(Self::Namespace),
            "file" => Some(Self::File),
            "dir" => Some(Self::Dir),
            "group" => Some(Self::Group),
            _ => None,
        }
    }

    /// The upstream spelling, used in generated file names
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Struct => "struct",
            Self::Union => "union",
            Self::Enum => "enum",
            Self::EnumValue => "enumvalue",
            Self::Function => "function",
            Self::Variable => "variable",
            Self::Typedef => "typedef",
            Self::Define => "define",
            Self::Namespace => "namespace",
            Self::File => "file",
            Self::Dir => "dir",
            Self::Group => "group",
        }
    }

    /// Display label used in titles and link slugs
    pub fn qualifier(self) -> &'static str {
        match self {
            Self::Class => "Class",
            Self::Struct => "Struct",
            Self::Union => "Union",
            Self::Enum => "Enum",
            Self::EnumValue => "Enumvalue",
            Self::Function => "Function",
            Self::Variable => "Variable",
            Self::Typedef => "Typedef",
            Self::Define => "Define",
            Self::Namespace => "Namespace",
            Self::File => "File",
            Self::Dir => "Directory",
            Self::Group => "Group",
        }
    }

    /// The downstream markup directive documenting this kind. Directories
    /// have no directive of their own.
    pub fn directive(self) -> &'static str {
        match self {
            Self::Class => "doxygenclass",
            Self::Struct => "doxygenstruct",
            Self::Union => "doxygenunion",
            Self::Enum => "doxygenenum",
            Self::EnumValue => "doxygenenumvalue",
            Self::Function => "doxygenfunction",
            Self::Variable => "doxygenvariable",
            Self::Typedef => "doxygentypedef",
            Self::Define => "doxygendefine",
            Self::Namespace => "doxygennamespace",
            Self::File => "doxygenfile",
            Self::Group => "doxygengroup",
            Self::Dir => "",
        }
    }

    /// Extra directive options. Must keep the three-space indent and the
    /// newline between options; no leading or trailing newline.
    pub fn specifications(self) -> &'static str {
        match self {
            Self::Class | Self::Struct => {
                "   :members:\n   :protected-members:\n   :undoc-members:"
            }
            _ => "",
        }
    }

    /// Classes and structs order and render as one family
    pub fn is_class_like(self) -> bool {
        matches!(self, Self::Class | Self::Struct)
    }
}

/// Extra state carried only by file entities
#[derive(Debug, Clone, Default)]
pub struct FileData {
    /// Namespaces referenced by this file; never owned by it
    pub namespaces_used: Vec<EntityId>,
    /// Paths this file includes
    pub includes: Vec<String>,
    /// (refid, name) of files that include this one
    pub included_by: Vec<(String, String)>,
    /// Source path from the detail document's location tag
    pub location: String,
    /// Raw program-listing lines, consumed by the listing page
    pub listing: Vec<String>,
    pub listing_file: String,
    pub listing_link: String,
}

/// One documented unit, stored in the `ApiGraph` arena
#[derive(Debug, Clone)]
pub struct Entity {
    pub kind: EntityKind,
    /// Qualified name; namespace children may gain their prefix during
    /// reparenting
    pub name: String,
    /// Stable upstream identifier, the only cross-document key
    pub refid: String,
    /// Owner after reparenting; `None` for top-level entities
    pub parent: Option<EntityId>,
    /// Owned members, plus symbols declared in this file for file kinds
    pub children: Vec<EntityId>,
    /// Present only for file entities
    pub file: Option<FileData>,
    pub file_name: String,
    pub link_name: String,
    pub title: String,
    pub in_class_view: bool,
    pub in_directory_view: bool,
}

impl Entity {
    pub fn new(kind: EntityKind, name: impl Into<String>, refid: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            refid: refid.into(),
            parent: None,
            children: Vec::new(),
            file: (kind == EntityKind::File).then(FileData::default),
            file_name: String::new(),
            link_name: String::new(),
            title: String::new(),
            in_class_view: false,
            in_directory_view: false,
        }
    }
}

/// Total order used for every rendered listing: class-like entities sort
/// before all other kinds and interleave alphabetically regardless of
/// which of class/struct each is; everything else groups by kind name,
/// then case-insensitive name. Remaining ties break on kind and refid so
/// the order is connected and deterministic.
pub fn entity_order(a: &Entity, b: &Entity) -> Ordering {
    let group = |e: &Entity| u8::from(!e.kind.is_class_like());
    group(a).cmp(&group(b)).then_with(|| {
        let by_name = || a.name.to_lowercase().cmp(&b.name.to_lowercase());
        let by_kind = || a.kind.as_str().cmp(b.kind.as_str());
        if a.kind.is_class_like() {
            by_name().then_with(by_kind)
        } else {
            by_kind().then_with(by_name)
        }
        .then_with(|| a.refid.cmp(&b.refid))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(kind: EntityKind, name: &str) -> Entity {
        Entity::new(kind, name, format!("{}{}", kind.as_str(), name))
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            EntityKind::Class,
            EntityKind::Struct,
            EntityKind::Union,
            EntityKind::Enum,
            EntityKind::EnumValue,
            EntityKind::Function,
            EntityKind::Variable,
            EntityKind::Typedef,
            EntityKind::Define,
            EntityKind::Namespace,
            EntityKind::File,
            EntityKind::Dir,
            EntityKind::Group,
        ] {
            assert_eq!(EntityKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_kind_parse_unknown() {
        assert_eq!(EntityKind::parse("friend"), None);
        assert_eq!(EntityKind::parse("page"), None);
        assert_eq!(EntityKind::parse(""), None);
    }

    #[test]
    fn test_kind_qualifier() {
        assert_eq!(EntityKind::Class.qualifier(), "Class");
        assert_eq!(EntityKind::Dir.qualifier(), "Directory");
    }

    #[test]
    fn test_kind_directive() {
        assert_eq!(EntityKind::Struct.directive(), "doxygenstruct");
        assert_eq!(EntityKind::Dir.directive(), "");
    }

    #[test]
    fn test_specifications_only_for_class_like() {
        assert!(EntityKind::Class.specifications().contains(":members:"));
        assert!(EntityKind::Struct.specifications().contains(":undoc-members:"));
        assert_eq!(EntityKind::Function.specifications(), "");
        assert_eq!(EntityKind::Namespace.specifications(), "");
    }

    #[test]
    fn test_file_entities_carry_file_data() {
        let file = entity(EntityKind::File, "common.h");
        assert!(file.file.is_some());
        let class = entity(EntityKind::Class, "Widget");
        assert!(class.file.is_none());
    }

    #[test]
    fn test_same_kind_sorts_case_insensitively() {
        let a = entity(EntityKind::Function, "alpha");
        let b = entity(EntityKind::Function, "Beta");
        assert_eq!(entity_order(&a, &b), Ordering::Less);
        assert_eq!(entity_order(&b, &a), Ordering::Greater);
    }

    #[test]
    fn test_struct_and_class_interleave_alphabetically() {
        let anchor = entity(EntityKind::Struct, "Anchor");
        let widget = entity(EntityKind::Class, "Widget");
        let zed = entity(EntityKind::Struct, "zed");
        // alphabetical across both kinds, not struct-grouped
        assert_eq!(entity_order(&anchor, &widget), Ordering::Less);
        assert_eq!(entity_order(&widget, &zed), Ordering::Less);
    }

    #[test]
    fn test_class_like_sorts_before_other_kinds() {
        let class = entity(EntityKind::Class, "zzz");
        let namespace = entity(EntityKind::Namespace, "aaa");
        assert_eq!(entity_order(&class, &namespace), Ordering::Less);
    }

    #[test]
    fn test_other_kinds_group_by_kind_name() {
        let e = entity(EntityKind::Enum, "zzz");
        let f = entity(EntityKind::Function, "aaa");
        // "enum" < "function" lexically
        assert_eq!(entity_order(&e, &f), Ordering::Less);
    }

    #[test]
    fn test_order_is_transitive() {
        let items = [
            entity(EntityKind::Struct, "Anchor"),
            entity(EntityKind::Class, "widget"),
            entity(EntityKind::Enum, "CAMERA_STATES"),
            entity(EntityKind::Function, "apply"),
            entity(EntityKind::Namespace, "arbitrary"),
        ];
        for a in &items {
            for b in &items {
                for c in &items {
                    if entity_order(a, b) == Ordering::Less
                        && entity_order(b, c) == Ordering::Less
                    {
                        assert_eq!(entity_order(a, c), Ordering::Less);
                    }
                }
            }
        }
    }

    #[test]
    fn test_order_is_connected() {
        let a = entity(EntityKind::Class, "Same");
        let mut b = entity(EntityKind::Class, "Same");
        b.refid = "different".to_string();
        assert_ne!(entity_order(&a, &b), Ordering::Equal);
    }
}
