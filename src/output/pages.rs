// reStructuredText page generation
//
// Writes one page per entity, a program-listing page per file, the three
// view files, and the root index. Every page write is independently
// scoped: a failed write warns, counts as skipped, and the remaining
// pages still generate.

use crate::config::Config;
use crate::error::Result;
use crate::graph::{ApiGraph, EntityId, EntityKind};
use crate::output::templates::TemplateEngine;
use crate::output::views;
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use std::fs;
use std::path::PathBuf;
use tera::Context;

const CLASS_VIEW_FILE: &str = "class_view_hierarchy.rst";
const DIRECTORY_VIEW_FILE: &str = "directory_view_hierarchy.rst";
const UNABRIDGED_FILE: &str = "unabridged_api.rst";

/// Section heading rule inside page bodies
fn section_rule() -> String {
    "-".repeat(88)
}

/// Configuration for page generation
#[derive(Debug, Clone)]
pub struct RstConfig {
    /// Output directory
    pub output_dir: PathBuf,
    /// Name of the root page
    pub root_file: String,
    /// Root page title
    pub title: String,
    /// Paragraph under the root title
    pub description: String,
    /// Paragraph after the hierarchies
    pub summary: String,
    /// Navigation :maxdepth: hint
    pub max_depth: usize,
    /// Collapsible-list markup instead of plain nested lists
    pub tree_view: bool,
}

impl Default for RstConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./api"),
            root_file: "library_root.rst".to_string(),
            title: "Library API".to_string(),
            description: String::new(),
            summary: String::new(),
            max_depth: 5,
            tree_view: false,
        }
    }
}

impl RstConfig {
    /// Derive the generation settings from the main configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            output_dir: config.output.directory.clone(),
            root_file: config.output.root_file.clone(),
            title: config.project.title.clone(),
            description: config.project.description.clone(),
            summary: config.project.summary.clone(),
            max_depth: config.output.max_depth,
            tree_view: config.output.tree_view,
        }
    }
}

/// Report of what was generated
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub pages_written: usize,
    pub listings_written: usize,
    pub pages_skipped: usize,
}

impl GenerationReport {
    pub fn summary(&self) -> String {
        format!(
            "Wrote {} pages ({} program listings), skipped {}",
            self.pages_written, self.listings_written, self.pages_skipped
        )
    }
}

/// reStructuredText page generator
pub struct RstGenerator {
    config: RstConfig,
    templates: TemplateEngine,
}

impl RstGenerator {
    /// Create a new generator
    pub fn new(config: RstConfig) -> Result<Self> {
        let templates = TemplateEngine::new()?;
        Ok(Self { config, templates })
    }

    /// Generate every page for the graph. Fails only when the output
    /// directory or the root page cannot be created; individual page
    /// failures warn and are counted in the report.
    pub fn generate(&self, graph: &mut ApiGraph) -> Result<GenerationReport> {
        fs::create_dir_all(&self.config.output_dir)?;

        assign_names(graph);

        let mut report = GenerationReport::default();
        let progress = ProgressBar::new(page_count(graph) as u64);
        progress.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        for id in single_page_ids(graph) {
            self.write_entity_page(graph, id, &mut report);
            progress.inc(1);
        }
        self.write_namespace_pages(graph, &mut report, &progress);
        self.write_file_pages(graph, &mut report, &progress);
        self.write_directory_pages(graph, &mut report, &progress);
        self.write_views(graph, &mut report);
        self.write_root()?;

        progress.finish_and_clear();
        Ok(report)
    }

    /// Get the output directory
    pub fn output_dir(&self) -> &PathBuf {
        &self.config.output_dir
    }

    fn write_page(
        &self,
        file_name: &str,
        content: &str,
        entity_name: &str,
        report: &mut GenerationReport,
    ) -> bool {
        let path = self.config.output_dir.join(file_name);
        match fs::write(&path, content) {
            Ok(()) => {
                report.pages_written += 1;
                true
            }
            Err(err) => {
                eprintln!(
                    "warning: skipping page for `{}` ({}): {}",
                    entity_name,
                    path.display(),
                    err
                );
                report.pages_skipped += 1;
                false
            }
        }
    }

    fn render_and_write(
        &self,
        template: &str,
        context: &Context,
        file_name: &str,
        entity_name: &str,
        report: &mut GenerationReport,
    ) -> bool {
        match self.templates.render(template, context) {
            Ok(content) => self.write_page(file_name, &content, entity_name, report),
            Err(err) => {
                eprintln!("warning: skipping page for `{}`: {}", entity_name, err);
                report.pages_skipped += 1;
                false
            }
        }
    }

    fn write_entity_page(&self, graph: &ApiGraph, id: EntityId, report: &mut GenerationReport) {
        let entity = graph.entity(id);
        let mut context = Context::new();
        context.insert("link_name", &entity.link_name);
        context.insert("title", &entity.title);
        context.insert("directive", entity.kind.directive());
        context.insert("name", &entity.name);
        context.insert("specifications", entity.kind.specifications());

        self.render_and_write("entity.rst", &context, &entity.file_name, &entity.name, report);
    }

    fn write_namespace_pages(
        &self,
        graph: &ApiGraph,
        report: &mut GenerationReport,
        progress: &ProgressBar,
    ) {
        for &top in &graph.namespaces {
            // nested namespaces first, deepest-sorted last generated first
            let mut nested = Vec::new();
            for &child in &graph.entity(top).children {
                nested.extend(graph.nested(child, EntityKind::Namespace));
            }
            let nested = graph.sorted(&nested);
            for &namespace in nested.iter().rev() {
                self.write_namespace_page(graph, namespace, report);
                progress.inc(1);
            }
            self.write_namespace_page(graph, top, report);
            progress.inc(1);
        }
    }

    fn write_namespace_page(
        &self,
        graph: &ApiGraph,
        id: EntityId,
        report: &mut GenerationReport,
    ) {
        let entity = graph.entity(id);
        let children = namespace_children_sections(graph, &entity.children);

        let mut context = Context::new();
        context.insert("link_name", &entity.link_name);
        context.insert("title", &entity.title);
        context.insert("children", &children);

        self.render_and_write("namespace.rst", &context, &entity.file_name, &entity.name, report);
    }

    fn write_file_pages(
        &self,
        graph: &ApiGraph,
        report: &mut GenerationReport,
        progress: &ProgressBar,
    ) {
        // listing pages first so the file pages can link to them
        for &file in &graph.files {
            self.write_listing_page(graph, file, report);
            progress.inc(1);
        }
        for &file in &graph.files {
            self.write_file_page(graph, file, report);
            progress.inc(1);
        }
    }

    fn write_listing_page(&self, graph: &ApiGraph, id: EntityId, report: &mut GenerationReport) {
        let entity = graph.entity(id);
        let Some(data) = entity.file.as_ref() else { return };

        let title = format!("Program Listing for {} {}", entity.kind.qualifier(), entity.name);
        let mut context = Context::new();
        context.insert("link_name", &data.listing_link);
        context.insert("title", &title);
        context.insert("file_link", &entity.link_name);
        context.insert("listing", &sanitize_listing(&data.listing));

        if self.render_and_write("listing.rst", &context, &data.listing_file, &entity.name, report)
        {
            report.listings_written += 1;
        }
    }

    fn write_file_page(&self, graph: &ApiGraph, id: EntityId, report: &mut GenerationReport) {
        let entity = graph.entity(id);
        let Some(data) = entity.file.as_ref() else { return };

        // definition section pointing at the program listing
        let definition = if data.location.is_empty() {
            String::new()
        } else {
            format!(
                "Definition (``{}``)\n{}\n\n- :ref:`{}`\n\n",
                data.location,
                section_rule(),
                data.listing_link
            )
        };

        let includes = if data.includes.is_empty() {
            String::new()
        } else {
            let mut out = format!("Includes\n{}\n\n", section_rule());
            let mut sorted_includes = data.includes.clone();
            sorted_includes.sort();
            for include in &sorted_includes {
                // link when some known file's location carries this path
                let local = graph.files.iter().find(|&&other| {
                    graph
                        .entity(other)
                        .file
                        .as_ref()
                        .map(|d| d.location.contains(include))
                        .unwrap_or(false)
                });
                match local {
                    Some(&other) => out.push_str(&format!(
                        "- ``{}`` (:ref:`{}`)\n",
                        include,
                        graph.entity(other).link_name
                    )),
                    None => out.push_str(&format!("- ``{}``\n", include)),
                }
            }
            out
        };

        let included_by = if data.included_by.is_empty() {
            String::new()
        } else {
            let mut out = format!("Included By\n{}\n\n", section_rule());
            for (refid, _name) in &data.included_by {
                if let Some(other) = graph.by_refid(refid) {
                    if graph.entity(other).kind == EntityKind::File {
                        out.push_str(&format!("- :ref:`{}`\n", graph.entity(other).link_name));
                    }
                }
            }
            out
        };

        let children = file_children_sections(graph, entity.children.as_slice(), data);

        let mut context = Context::new();
        context.insert("link_name", &entity.link_name);
        context.insert("title", &entity.title);
        context.insert("definition", &definition);
        context.insert("includes", &includes);
        context.insert("included_by", &included_by);
        context.insert("children", &children);

        self.render_and_write("file.rst", &context, &entity.file_name, &entity.name, report);
    }

    fn write_directory_pages(
        &self,
        graph: &ApiGraph,
        report: &mut GenerationReport,
        progress: &ProgressBar,
    ) {
        let mut all = Vec::new();
        for &dir in &graph.dirs {
            all.extend(graph.nested(dir, EntityKind::Dir));
        }
        for dir in all {
            self.write_directory_page(graph, dir, report);
            progress.inc(1);
        }
    }

    fn write_directory_page(&self, graph: &ApiGraph, id: EntityId, report: &mut GenerationReport) {
        let entity = graph.entity(id);

        let mut child_dirs = Vec::new();
        let mut child_files = Vec::new();
        for &child in &entity.children {
            match graph.entity(child).kind {
                EntityKind::Dir => child_dirs.push(child),
                EntityKind::File => child_files.push(child),
                _ => {}
            }
        }

        let subdirectories = if child_dirs.is_empty() {
            String::new()
        } else {
            let mut out = format!("Subdirectories\n{}\n\n", section_rule());
            for child in graph.sorted(&child_dirs) {
                out.push_str(&format!("- :ref:`{}`\n", graph.entity(child).link_name));
            }
            out
        };

        let files = if child_files.is_empty() {
            String::new()
        } else {
            let mut out = format!("Files\n{}\n\n", section_rule());
            for child in graph.sorted(&child_files) {
                out.push_str(&format!("- :ref:`{}`\n", graph.entity(child).link_name));
            }
            out
        };

        let mut context = Context::new();
        context.insert("link_name", &entity.link_name);
        context.insert("title", &entity.title);
        context.insert("subdirectories", &subdirectories);
        context.insert("files", &files);

        self.render_and_write("directory.rst", &context, &entity.file_name, &entity.name, report);
    }

    fn write_views(&self, graph: &mut ApiGraph, report: &mut GenerationReport) {
        let class_body = views::class_hierarchy(graph, self.config.tree_view);
        self.write_view_file(CLASS_VIEW_FILE, "Class Hierarchy", &class_body, report);

        let directory_body = views::directory_hierarchy(graph, self.config.tree_view);
        self.write_view_file(DIRECTORY_VIEW_FILE, "File Hierarchy", &directory_body, report);

        let unabridged_body = views::unabridged_index(graph, self.config.max_depth);
        self.write_view_file(UNABRIDGED_FILE, "Full API", &unabridged_body, report);
    }

    fn write_view_file(
        &self,
        file_name: &str,
        title: &str,
        body: &str,
        report: &mut GenerationReport,
    ) {
        let mut context = Context::new();
        context.insert("title", title);
        context.insert("body", body);
        self.render_and_write("hierarchy.rst", &context, file_name, title, report);
    }

    fn write_root(&self) -> Result<()> {
        let mut context = Context::new();
        context.insert("title", &self.config.title);
        context.insert("description", &self.config.description);
        context.insert("summary", &self.config.summary);
        context.insert("class_view", CLASS_VIEW_FILE);
        context.insert("directory_view", DIRECTORY_VIEW_FILE);
        context.insert("unabridged", UNABRIDGED_FILE);

        let content = self.templates.render("root.rst", &context)?;
        let path = self.config.output_dir.join(&self.config.root_file);
        fs::write(&path, content)?;
        Ok(())
    }
}

/// Assign the derived page and link names to every entity: file names
/// are `api_<kind>_<safe-name>.rst`, link slugs start with the lowercase
/// kind qualifier, and titles pair the qualifier with the display name.
/// Names are assigned before any page writes, so cross-references never
/// depend on generation order.
pub fn assign_names(graph: &mut ApiGraph) {
    for index in 0..graph.len() {
        let id = EntityId(index);
        let entity = graph.entity(id);
        if entity.kind == EntityKind::EnumValue {
            continue;
        }

        let kind = entity.kind;
        let safe = entity.name.replace(':', "_").replace('/', "_");
        let display = match kind {
            // the upstream tool omits the namespace for variables and
            // typedefs, so the qualified name stays in the title
            EntityKind::Variable | EntityKind::Typedef | EntityKind::Namespace | EntityKind::File => {
                entity.name.clone()
            }
            EntityKind::Dir => entity
                .name
                .rsplit('/')
                .next()
                .unwrap_or(entity.name.as_str())
                .to_string(),
            _ => entity
                .name
                .rsplit("::")
                .next()
                .unwrap_or(entity.name.as_str())
                .to_string(),
        };

        let entity = graph.entity_mut(id);
        entity.file_name = format!("api_{}_{}.rst", kind.as_str(), safe);
        entity.link_name = format!("{}_{}", kind.qualifier().to_lowercase(), safe);
        entity.title = format!("{} {}", kind.qualifier(), display);
        if let Some(data) = entity.file.as_mut() {
            data.listing_file = format!("api_program_listing_file_{}.rst", safe);
            data.listing_link = format!("program_listing_file_{}", safe);
        }
    }
}

/// Every entity that gets a plain single-directive page
fn single_page_ids(graph: &ApiGraph) -> Vec<EntityId> {
    let mut ids = Vec::new();
    ids.extend(&graph.class_like);
    ids.extend(&graph.enums);
    ids.extend(&graph.functions);
    ids.extend(&graph.typedefs);
    ids.extend(&graph.unions);
    ids.extend(&graph.variables);
    ids.extend(&graph.defines);
    ids
}

fn page_count(graph: &ApiGraph) -> usize {
    let mut count = single_page_ids(graph).len() + graph.files.len() * 2;
    for &namespace in &graph.namespaces {
        count += graph.nested(namespace, EntityKind::Namespace).count();
    }
    for &dir in &graph.dirs {
        count += graph.nested(dir, EntityKind::Dir).count();
    }
    count
}

/// Grouped, sorted link sections for a namespace page
fn namespace_children_sections(graph: &ApiGraph, children: &[EntityId]) -> String {
    let mut namespaces = Vec::new();
    let mut class_like = Vec::new();
    let mut functions = Vec::new();
    let mut typedefs = Vec::new();
    let mut unions = Vec::new();
    let mut variables = Vec::new();
    for &child in children {
        match graph.entity(child).kind {
            EntityKind::Namespace => namespaces.push(child),
            EntityKind::Struct | EntityKind::Class => class_like.push(child),
            EntityKind::Function => functions.push(child),
            EntityKind::Typedef => typedefs.push(child),
            EntityKind::Union => unions.push(child),
            EntityKind::Variable => variables.push(child),
            _ => {}
        }
    }

    let out = sorted_child_list(graph, "Namespaces", "", &namespaces);
    let out = sorted_child_list(graph, "Classes", &out, &class_like);
    let out = sorted_child_list(graph, "Functions", &out, &functions);
    let out = sorted_child_list(graph, "Typedefs", &out, &typedefs);
    let out = sorted_child_list(graph, "Unions", &out, &unions);
    sorted_child_list(graph, "Variables", &out, &variables)
}

/// Grouped, sorted link sections for a file page; the namespace group
/// comes from the namespaces the file uses
fn file_children_sections(
    graph: &ApiGraph,
    children: &[EntityId],
    data: &crate::graph::FileData,
) -> String {
    let mut class_like = Vec::new();
    let mut functions = Vec::new();
    let mut typedefs = Vec::new();
    let mut unions = Vec::new();
    let mut variables = Vec::new();
    for &child in children {
        match graph.entity(child).kind {
            EntityKind::Struct | EntityKind::Class => class_like.push(child),
            EntityKind::Function => functions.push(child),
            EntityKind::Typedef => typedefs.push(child),
            EntityKind::Union => unions.push(child),
            EntityKind::Variable => variables.push(child),
            _ => {}
        }
    }

    let out = sorted_child_list(graph, "Namespaces", "", &data.namespaces_used);
    let out = sorted_child_list(graph, "Classes", &out, &class_like);
    let out = sorted_child_list(graph, "Functions", &out, &functions);
    let out = sorted_child_list(graph, "Typedefs", &out, &typedefs);
    let out = sorted_child_list(graph, "Unions", &out, &unions);
    sorted_child_list(graph, "Variables", &out, &variables)
}

fn sorted_child_list(
    graph: &ApiGraph,
    section_title: &str,
    previous: &str,
    ids: &[EntityId],
) -> String {
    if ids.is_empty() {
        return previous.to_string();
    }
    let mut out = format!("{}\n\n{}\n{}\n", previous, section_title, section_rule());
    for id in graph.sorted(ids) {
        out.push_str(&format!("\n- :ref:`{}`", graph.entity(id).link_name));
    }
    out
}

/// Strip the listing lines down to plain source text: whitespace tags
/// become spaces, remaining markup is dropped, and the escaped angle
/// brackets and ampersands are revived.
fn sanitize_listing(lines: &[String]) -> String {
    let tag_re = Regex::new(r"<[^<]+?>").expect("hard-coded pattern");
    let mut out = String::from(".. code-block:: cpp\n\n");
    for line in lines {
        let spaced = line.replace("<sp/>", " ");
        let stripped = tag_re.replace_all(&spaced, "");
        let revived = stripped
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&amp;", "&");
        out.push_str(&format!("   {}\n", revived));
    }
    out
}
