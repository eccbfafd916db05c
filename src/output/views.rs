// View hierarchies over the entity tree
//
// Three alternate groupings of the same tree: the class hierarchy walks
// namespaces, the directory hierarchy walks directories and files, and
// the unabridged index flattens every bucket. The first two come in a
// plain nested-list flavor and a collapsible-list flavor where the last
// child at every level is marked for visual closure.

use crate::graph::{ApiGraph, EntityId, EntityKind};

/// Build the class hierarchy body. `tree_view` selects collapsible-list
/// markup over plain nested lists.
pub fn class_hierarchy(graph: &mut ApiGraph, tree_view: bool) -> String {
    let mut out = String::new();
    let namespaces = graph.namespaces.clone();
    for &namespace in &namespaces {
        class_view_node(graph, namespace, 0, &mut out, tree_view, false);
    }

    // everything that never landed under a namespace
    let mut missing = Vec::new();
    for id in graph.sorted(&graph.class_like) {
        if !graph.entity(id).in_class_view {
            missing.push(id);
        }
    }
    for id in graph.sorted(&graph.enums) {
        if !graph.entity(id).in_class_view {
            missing.push(id);
        }
    }
    for id in graph.sorted(&graph.unions) {
        if !graph.entity(id).in_class_view {
            missing.push(id);
        }
    }

    if !missing.is_empty() {
        let last = missing.len() - 1;
        for (idx, &id) in missing.iter().enumerate() {
            class_view_node(graph, id, 0, &mut out, tree_view, idx == last);
        }
    } else if tree_view {
        // restart so the final namespace carries the last-child marker
        out.clear();
        let last = namespaces.len().saturating_sub(1);
        for (idx, &namespace) in namespaces.iter().enumerate() {
            class_view_node(graph, namespace, 0, &mut out, tree_view, idx == last);
        }
    }

    if tree_view {
        wrap_tree_view(&out)
    } else {
        out
    }
}

/// A namespace belongs in the class view iff it or a descendant holds a
/// class, struct, enum, or union. Asking marks non-namespace entities as
/// placed.
fn mark_class_view(graph: &mut ApiGraph, id: EntityId) -> bool {
    if graph.entity(id).kind == EntityKind::Namespace {
        let children = graph.entity(id).children.clone();
        for child in children {
            if mark_class_view(graph, child) {
                return true;
            }
        }
        false
    } else {
        graph.entity_mut(id).in_class_view = true;
        matches!(
            graph.entity(id).kind,
            EntityKind::Struct | EntityKind::Class | EntityKind::Enum | EntityKind::Union
        )
    }
}

fn class_view_node(
    graph: &mut ApiGraph,
    id: EntityId,
    level: usize,
    out: &mut String,
    tree_view: bool,
    last_child: bool,
) {
    if !mark_class_view(graph, id) {
        return;
    }

    write_view_entry(graph, id, level, out, tree_view, last_child, EntityKind::Namespace);

    if graph.entity(id).kind == EntityKind::Namespace {
        let children = graph.entity(id).children.clone();
        let mut members = Vec::new();
        let mut namespaces = Vec::new();
        for child in children {
            if mark_class_view(graph, child) {
                if graph.entity(child).kind == EntityKind::Namespace {
                    namespaces.push(child);
                } else {
                    members.push(child);
                }
            }
        }
        // nested namespaces always come last
        graph.sort_ids(&mut members);
        graph.sort_ids(&mut namespaces);

        let total = members.len() + namespaces.len();
        for (idx, child) in members.iter().chain(namespaces.iter()).enumerate() {
            class_view_node(graph, *child, level + 1, out, tree_view, idx + 1 == total);
        }

        if tree_view {
            let indent = "  ".repeat(level * 2);
            out.push_str(&format!("  {}</ul>\n{}</li>\n", indent, indent));
        }
    }
}

/// Build the directory hierarchy body, the same algorithm as the class
/// view with directories for namespaces and files for class-like members.
pub fn directory_hierarchy(graph: &mut ApiGraph, tree_view: bool) -> String {
    let mut out = String::new();
    let dirs = graph.dirs.clone();
    for &dir in &dirs {
        directory_view_node(graph, dir, 0, &mut out, tree_view, false);
    }

    // files no directory claimed
    let mut missing = Vec::new();
    for id in graph.sorted(&graph.files) {
        if !graph.entity(id).in_directory_view {
            missing.push(id);
        }
    }

    if !missing.is_empty() {
        let last = missing.len() - 1;
        for (idx, &id) in missing.iter().enumerate() {
            directory_view_node(graph, id, 0, &mut out, tree_view, idx == last);
        }
    } else if tree_view {
        // restart so the final directory carries the last-child marker
        out.clear();
        let last = dirs.len().saturating_sub(1);
        for (idx, &dir) in dirs.iter().enumerate() {
            directory_view_node(graph, dir, 0, &mut out, tree_view, idx == last);
        }
    }

    if tree_view {
        wrap_tree_view(&out)
    } else {
        out
    }
}

fn mark_directory_view(graph: &mut ApiGraph, id: EntityId) -> bool {
    match graph.entity(id).kind {
        EntityKind::File => {
            graph.entity_mut(id).in_directory_view = true;
            true
        }
        EntityKind::Dir => {
            let children = graph.entity(id).children.clone();
            for child in children {
                if mark_directory_view(graph, child) {
                    return true;
                }
            }
            false
        }
        _ => false,
    }
}

fn directory_view_node(
    graph: &mut ApiGraph,
    id: EntityId,
    level: usize,
    out: &mut String,
    tree_view: bool,
    last_child: bool,
) {
    if !mark_directory_view(graph, id) {
        return;
    }

    write_view_entry(graph, id, level, out, tree_view, last_child, EntityKind::Dir);

    if graph.entity(id).kind == EntityKind::Dir {
        let children = graph.entity(id).children.clone();
        let mut files = Vec::new();
        let mut dirs = Vec::new();
        for child in children {
            if mark_directory_view(graph, child) {
                match graph.entity(child).kind {
                    EntityKind::Dir => dirs.push(child),
                    EntityKind::File => files.push(child),
                    _ => {}
                }
            }
        }
        // nested directories always come last
        graph.sort_ids(&mut files);
        graph.sort_ids(&mut dirs);

        let total = files.len() + dirs.len();
        for (idx, child) in files.iter().chain(dirs.iter()).enumerate() {
            directory_view_node(graph, *child, level + 1, out, tree_view, idx + 1 == total);
        }

        if tree_view {
            let indent = "  ".repeat(level * 2);
            out.push_str(&format!("  {}</ul>\n{}</li>\n", indent, indent));
        }
    }
}

/// One line of a view: a plain link-list item, or a collapsible-list
/// `<li>` whose anchor carries the entity's page and link slug.
fn write_view_entry(
    graph: &ApiGraph,
    id: EntityId,
    level: usize,
    out: &mut String,
    tree_view: bool,
    last_child: bool,
    branch_kind: EntityKind,
) {
    let entity = graph.entity(id);

    if !tree_view {
        out.push_str(&format!(
            "{}- :ref:`{}`\n",
            "    ".repeat(level),
            entity.link_name
        ));
        return;
    }

    let indent = "  ".repeat(level * 2);
    let opening = if last_child {
        "<li class=\"lastChild\">"
    } else {
        "<li>"
    };
    // collapse double underscores, then turn underscores into hyphens to
    // match the anchors the downstream html build derives from link names
    let anchor = entity.link_name.replace("__", "_").replace('_', "-");
    let (qualifier, rest) = entity
        .title
        .split_once(' ')
        .unwrap_or((entity.title.as_str(), ""));
    let page = entity.file_name.trim_end_matches(".rst");
    let link = format!("{} <a href=\"{}.html#{}\">{}</a>", qualifier, page, anchor, rest);

    if entity.kind == branch_kind {
        out.push_str(&format!(
            "{}{}\n{}  {}\n{}  <ul>\n",
            indent, opening, indent, link, indent
        ));
    } else {
        out.push_str(&format!("{}{}{}</li>\n", indent, opening, link));
    }
}

fn wrap_tree_view(body: &str) -> String {
    let indented: String = body
        .lines()
        .map(|line| {
            if line.is_empty() {
                "\n".to_string()
            } else {
                format!("        {}\n", line)
            }
        })
        .collect();
    format!(
        ".. raw:: html\n\n\
         \x20  <ul class=\"treeView\">\n\
         \x20    <li>\n\
         \x20      <ul class=\"collapsibleList\">\n\
         {}\
         \x20      </ul><!-- collapsibleList -->\n\
         \x20    </li><!-- only tree view element -->\n\
         \x20  </ul><!-- treeView -->\n",
        indented
    )
}

/// Build the unabridged index body: every bucket (namespaces and
/// directories expanded through nesting) as toctree entries under a
/// kind-titled heading; empty buckets are omitted.
pub fn unabridged_index(graph: &ApiGraph, max_depth: usize) -> String {
    let mut out = String::new();

    let mut all_namespaces = Vec::new();
    for &namespace in &graph.namespaces {
        all_namespaces.extend(graph.nested(namespace, EntityKind::Namespace));
    }
    toctree_section(graph, "Namespaces", &all_namespaces, max_depth, &mut out);
    toctree_section(graph, "Classes and Structs", &graph.class_like, max_depth, &mut out);
    toctree_section(graph, "Enums", &graph.enums, max_depth, &mut out);
    toctree_section(graph, "Unions", &graph.unions, max_depth, &mut out);
    toctree_section(graph, "Functions", &graph.functions, max_depth, &mut out);
    toctree_section(graph, "Variables", &graph.variables, max_depth, &mut out);
    toctree_section(graph, "Defines", &graph.defines, max_depth, &mut out);
    toctree_section(graph, "Typedefs", &graph.typedefs, max_depth, &mut out);

    let mut all_dirs = Vec::new();
    for &dir in &graph.dirs {
        all_dirs.extend(graph.nested(dir, EntityKind::Dir));
    }
    toctree_section(graph, "Directories", &all_dirs, max_depth, &mut out);
    toctree_section(graph, "Files", &graph.files, max_depth, &mut out);

    out
}

fn toctree_section(
    graph: &ApiGraph,
    title: &str,
    ids: &[EntityId],
    max_depth: usize,
    out: &mut String,
) {
    if ids.is_empty() {
        return;
    }
    out.push_str(&format!("{}\n{}\n\n", title, "*".repeat(88)));
    for id in graph.sorted(ids) {
        out.push_str(&format!(
            ".. toctree::\n   :maxdepth: {}\n\n   {}\n\n",
            max_depth,
            graph.entity(id).file_name
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doxygen::{Compound, DoxygenIndex};
    use crate::output::pages::assign_names;

    fn graph_from(compounds: Vec<Compound>) -> ApiGraph {
        let mut graph = ApiGraph::new();
        graph.discover(&DoxygenIndex { compounds });
        graph.reparent_all().unwrap();
        graph.sort_internals();
        assign_names(&mut graph);
        graph
    }

    fn class_fixture() -> ApiGraph {
        graph_from(vec![
            Compound::new("namespace", "arbitrary", "ns_arbitrary"),
            Compound::new("namespace", "arbitrary::nested", "ns_nested"),
            Compound::new("class", "arbitrary::BaseClass", "class_base"),
            Compound::new("struct", "arbitrary::nested::int2", "struct_int2"),
            Compound::new("class", "SomeOuterClass", "class_outer"),
        ])
    }

    #[test]
    fn test_plain_class_view_nests_by_namespace() {
        let mut graph = class_fixture();
        let view = class_hierarchy(&mut graph, false);

        let lines: Vec<&str> = view.lines().collect();
        assert_eq!(lines[0], "- :ref:`namespace_arbitrary`");
        assert!(lines.contains(&"    - :ref:`class_arbitrary__BaseClass`"));
        assert!(lines.contains(&"    - :ref:`namespace_arbitrary__nested`"));
        assert!(lines.contains(&"        - :ref:`struct_arbitrary__nested__int2`"));
        // the orphan class lands at top level, after the namespaces
        assert_eq!(lines.last(), Some(&"- :ref:`class_SomeOuterClass`"));
    }

    #[test]
    fn test_plain_class_view_puts_members_before_nested_namespaces() {
        let mut graph = class_fixture();
        let view = class_hierarchy(&mut graph, false);

        let class_pos = view.find("class_arbitrary__BaseClass").unwrap();
        let nested_pos = view.find("namespace_arbitrary__nested").unwrap();
        assert!(class_pos < nested_pos);
    }

    #[test]
    fn test_tree_class_view_marks_last_children() {
        let mut graph = class_fixture();
        let view = class_hierarchy(&mut graph, true);

        assert!(view.starts_with(".. raw:: html"));
        assert!(view.contains("<ul class=\"collapsibleList\">"));
        assert!(view.contains("<li class=\"lastChild\">"));
        // the orphan class is the very last item at top level
        let outer = view.rfind("SomeOuterClass").unwrap();
        let last_marker = view.rfind("<li class=\"lastChild\">").unwrap();
        assert!(last_marker < outer);
    }

    #[test]
    fn test_tree_class_view_without_orphans_marks_final_namespace() {
        let mut graph = graph_from(vec![
            Compound::new("namespace", "arbitrary", "ns_arbitrary"),
            Compound::new("class", "arbitrary::BaseClass", "class_base"),
        ]);
        let view = class_hierarchy(&mut graph, true);
        // only one top-level namespace, so the restart pass must mark it
        let ns_entry = view.find("namespace-arbitrary").unwrap();
        let marker = view.find("<li class=\"lastChild\">").unwrap();
        assert!(marker < ns_entry);
    }

    #[test]
    fn test_namespace_without_class_like_content_is_skipped() {
        let mut graph = graph_from(vec![Compound::with_members(
            "namespace",
            "plain",
            "ns_plain",
            vec![Compound::new("function", "helper", "func_helper")],
        )]);
        let view = class_hierarchy(&mut graph, false);
        assert!(!view.contains("namespace_plain"));
    }

    #[test]
    fn test_directory_view_nests_dirs_and_files() {
        let mut graph = graph_from(vec![
            Compound::new("dir", "include", "dir_include"),
            Compound::new("dir", "include/arbitrary", "dir_arbitrary"),
            Compound::new("file", "common.h", "file_common"),
        ]);
        // attach the file by hand; xref normally does this from location
        let parent = graph.by_refid("dir_arbitrary").unwrap();
        let file = graph.by_refid("file_common").unwrap();
        graph.adopt(parent, file).unwrap();

        let view = directory_hierarchy(&mut graph, false);
        let lines: Vec<&str> = view.lines().collect();
        assert_eq!(lines[0], "- :ref:`directory_include`");
        assert!(lines.contains(&"    - :ref:`directory_include_arbitrary`"));
        assert!(lines.contains(&"        - :ref:`file_common.h`"));
    }

    #[test]
    fn test_directory_view_appends_unclaimed_files() {
        let mut graph = graph_from(vec![
            Compound::new("dir", "include", "dir_include"),
            Compound::new("file", "floating.h", "file_floating"),
        ]);
        let view = directory_hierarchy(&mut graph, false);
        // the directory owns no files, so only the floating file appears
        assert_eq!(view.trim(), "- :ref:`file_floating.h`");
    }

    #[test]
    fn test_unabridged_index_sections() {
        let graph = class_fixture();
        let index = unabridged_index(&graph, 5);

        assert!(index.contains("Namespaces\n"));
        assert!(index.contains("Classes and Structs\n"));
        assert!(index.contains(":maxdepth: 5"));
        assert!(index.contains("api_namespace_arbitrary__nested.rst"));
        assert!(index.contains("api_class_SomeOuterClass.rst"));
        // empty buckets are omitted
        assert!(!index.contains("Enums\n"));
        assert!(!index.contains("Files\n"));
    }

    #[test]
    fn test_unabridged_index_honors_max_depth() {
        let graph = class_fixture();
        let index = unabridged_index(&graph, 2);
        assert!(index.contains(":maxdepth: 2"));
        assert!(!index.contains(":maxdepth: 5"));
    }
}
