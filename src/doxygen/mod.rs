// Doxygen index parsing
//
// Reads the index.xml document Doxygen writes next to its per-compound
// detail files. Only the index is parsed structurally; the detail files
// are scanned line by line in graph::xref.

use crate::error::{Error, Result};
use std::path::Path;
use sxd_document::dom::{ChildOfElement, Element};
use sxd_document::parser;
use sxd_xpath::{Context, Factory, Value};

/// One documented compound from the index: a class, namespace, file,
/// directory, union, and so on, with the member compounds declared in it.
#[derive(Debug, Clone, Default)]
pub struct Compound {
    pub refid: String,
    pub kind: String,
    pub name: String,
    pub members: Vec<Compound>,
}

impl Compound {
    /// Create a compound with no members
    pub fn new(kind: impl Into<String>, name: impl Into<String>, refid: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            refid: refid.into(),
            members: Vec::new(),
        }
    }

    /// Create a compound with member compounds
    pub fn with_members(
        kind: impl Into<String>,
        name: impl Into<String>,
        refid: impl Into<String>,
        members: Vec<Compound>,
    ) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            refid: refid.into(),
            members,
        }
    }
}

/// The parsed compound list from a Doxygen index.xml
#[derive(Debug, Clone, Default)]
pub struct DoxygenIndex {
    pub compounds: Vec<Compound>,
}

impl DoxygenIndex {
    /// Load and parse an index.xml document from disk
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::index_parse(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::parse(&contents)
    }

    /// Parse an index.xml document from a string
    pub fn parse(xml: &str) -> Result<Self> {
        let package = parser::parse(xml)
            .map_err(|e| Error::index_parse(format!("malformed index document: {e:?}")))?;
        let document = package.as_document();

        let factory = Factory::new();
        let xpath = factory
            .build("/doxygenindex/compound")
            .map_err(|e| Error::index_parse(format!("bad compound query: {e:?}")))?
            .ok_or_else(|| Error::index_parse("empty compound query"))?;
        let value = xpath
            .evaluate(&Context::new(), document.root())
            .map_err(|e| Error::index_parse(format!("compound query failed: {e:?}")))?;

        let mut compounds = Vec::new();
        if let Value::Nodeset(nodes) = value {
            for node in nodes.document_order() {
                if let Some(element) = node.element() {
                    compounds.push(compound_from_element(element));
                }
            }
        }

        Ok(Self { compounds })
    }

    /// All top-level compounds in document order
    pub fn compounds(&self) -> &[Compound] {
        &self.compounds
    }
}

fn compound_from_element(element: Element<'_>) -> Compound {
    let mut compound = Compound {
        refid: element.attribute_value("refid").unwrap_or_default().to_string(),
        kind: element.attribute_value("kind").unwrap_or_default().to_string(),
        name: String::new(),
        members: Vec::new(),
    };

    for child in element.children() {
        if let ChildOfElement::Element(el) = child {
            match el.name().local_part() {
                "name" => compound.name = element_text(el),
                "member" => compound.members.push(compound_from_element(el)),
                _ => {}
            }
        }
    }

    compound
}

fn element_text(element: Element<'_>) -> String {
    let mut text = String::new();
    for child in element.children() {
        if let ChildOfElement::Text(t) = child {
            text.push_str(t.text());
        }
    }
    text
}
