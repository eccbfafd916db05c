// Cross-reference resolution for file entities
//
// The index member lists never say which file declares which symbol or
// which file includes which; both only appear in the per-compound detail
// document. Each file's document is scanned line by line: the include /
// included-by / inner-reference tags come before the program listing,
// the location tag after it, so extraction is position-dependent rather
// than a generic parse.

use super::{ApiGraph, EntityId, EntityKind};
use crate::error::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

impl ApiGraph {
    /// Scan every file entity's detail document under `xml_dir` and fill
    /// in includes, included-by back-references, declared symbols, the
    /// source location, and the buffered program listing. A missing or
    /// unreadable document warns and leaves that one file untouched.
    pub fn resolve_file_refs(&mut self, xml_dir: &Path) {
        let inner_re = Regex::new(r#"<inner.*refid="(\w+)""#).expect("hard-coded pattern");
        let include_re = Regex::new(r"<includes.*>(.+)</includes>").expect("hard-coded pattern");
        let included_by_re =
            Regex::new(r#"<includedby refid="(\w+)".*>(.*)</includedby>"#).expect("hard-coded pattern");
        let location_re = Regex::new(r#"<location file="(.*)"/>"#).expect("hard-coded pattern");

        // refids found in each file's inner-reference section
        let mut ownerships: Vec<(EntityId, Vec<String>)> = Vec::new();

        let files = self.files.clone();
        for &file in &files {
            let refid = self.entity(file).refid.clone();
            let path = xml_dir.join(format!("{}.xml", refid));
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(err) => {
                    eprintln!(
                        "warning: unable to read detail document for `{}` ({}): {}",
                        self.entity(file).name,
                        path.display(),
                        err
                    );
                    continue;
                }
            };

            let mut owned_refids = Vec::new();
            let mut in_listing = false;
            let mut listing_done = false;
            for line in text.lines() {
                if !in_listing {
                    if let Some(caps) = included_by_re.captures(line) {
                        let entry = (caps[1].to_string(), caps[2].to_string());
                        if let Some(data) = self.entity_mut(file).file.as_mut() {
                            data.included_by.push(entry);
                        }
                        continue;
                    }
                    if let Some(caps) = include_re.captures(line) {
                        let include = caps[1].to_string();
                        if let Some(data) = self.entity_mut(file).file.as_mut() {
                            data.includes.push(include);
                        }
                        continue;
                    }
                    if let Some(caps) = inner_re.captures(line) {
                        let inner = caps[1].to_string();
                        if self.by_refid(&inner).is_some() {
                            owned_refids.push(inner);
                        }
                        continue;
                    }
                    if line.contains("<programlisting>") {
                        in_listing = true;
                    }
                } else if listing_done {
                    if let Some(caps) = location_re.captures(line) {
                        let location = caps[1].to_string();
                        if let Some(data) = self.entity_mut(file).file.as_mut() {
                            data.location = location;
                        }
                    }
                } else if line.contains("</programlisting>") {
                    listing_done = true;
                } else if let Some(data) = self.entity_mut(file).file.as_mut() {
                    data.listing.push(line.to_string());
                }
            }

            ownerships.push((file, owned_refids));
        }

        // resolve the collected inner references into declarations
        for (file, refids) in &ownerships {
            for refid in refids {
                let Some(child) = self.by_refid(refid) else { continue };
                match self.entity(child).kind {
                    EntityKind::Struct
                    | EntityKind::Class
                    | EntityKind::Function
                    | EntityKind::Typedef
                    | EntityKind::Define
                    | EntityKind::Enum => self.declare_in_file(*file, child),
                    EntityKind::Namespace => self.note_namespace_use(*file, child),
                    _ => {}
                }
            }
        }

        self.recover_orphans(&files);
    }

    /// Record `child` as declared in `file`, deduplicated by name against
    /// the existing children. Declaration does not claim ownership.
    fn declare_in_file(&mut self, file: EntityId, child: EntityId) {
        let name = self.entity(child).name.clone();
        let present = self
            .entity(file)
            .children
            .iter()
            .any(|&existing| self.entity(existing).name == name);
        if !present {
            self.entity_mut(file).children.push(child);
        }
    }

    /// A file references a namespace but never owns one
    fn note_namespace_use(&mut self, file: EntityId, namespace: EntityId) {
        let name = self.entity(namespace).name.clone();
        let Some(data) = self.entity(file).file.as_ref() else { return };
        let present = data
            .namespaces_used
            .iter()
            .any(|&existing| self.entity(existing).name == name);
        if !present {
            if let Some(data) = self.entity_mut(file).file.as_mut() {
                data.namespaces_used.push(namespace);
            }
        }
    }

    /// Enums and variables scoped in a namespace the file uses appear in
    /// the program listing but not in the inner-reference section. Attach
    /// such an orphan when its unqualified name occurs as a substring of
    /// any listing line. Best effort only: name collisions can over- or
    /// under-attach.
    fn recover_orphans(&mut self, files: &[EntityId]) {
        for &file in files {
            let used = match self.entity(file).file.as_ref() {
                Some(data) => data.namespaces_used.clone(),
                None => continue,
            };

            let mut candidates = Vec::new();
            for namespace in used {
                for &child in &self.entity(namespace).children {
                    if matches!(
                        self.entity(child).kind,
                        EntityKind::Enum | EntityKind::Variable
                    ) {
                        candidates.push(child);
                    }
                }
            }

            for orphan in candidates {
                if self.entity(file).children.contains(&orphan) {
                    continue;
                }
                let name = self.entity(orphan).name.clone();
                let unqualified = name.rsplit("::").next().unwrap_or(&name);
                let in_listing = self
                    .entity(file)
                    .file
                    .as_ref()
                    .map(|data| data.listing.iter().any(|line| line.contains(unqualified)))
                    .unwrap_or(false);
                if in_listing {
                    self.entity_mut(file).children.push(orphan);
                }
            }
        }
    }

    /// Attach each file to its owning directory by walking the directory
    /// tree against the file's source location. Files keep their place in
    /// the flat bucket; a file with no matching directory stays top
    /// level.
    pub fn attach_files_to_directories(&mut self) -> Result<()> {
        let files = self.files.clone();
        for &file in &files {
            let location = match self.entity(file).file.as_ref() {
                Some(data) => data.location.clone(),
                None => continue,
            };

            let mut parts: Vec<&str> = location.split('/').collect();
            parts.pop(); // drop the file component
            if parts.is_empty() {
                continue;
            }
            let dir_path = parts.join("/");

            let mut remaining = self.dirs.clone();
            while let Some(dir) = remaining.pop() {
                let dir_name = self.entity(dir).name.clone();
                if !dir_path.contains(&dir_name) {
                    continue;
                }
                if dir_name == dir_path {
                    self.adopt(dir, file)?;
                    break;
                }
                // descend into this directory's own subdirectories
                remaining = self
                    .entity(dir)
                    .children
                    .iter()
                    .copied()
                    .filter(|&child| self.entity(child).kind == EntityKind::Dir)
                    .collect();
            }
        }
        Ok(())
    }
}
