// Template engine for the generated reStructuredText pages

use crate::error::Result;
use std::collections::HashMap;
use tera::{Context, Tera, Value};

/// Template engine wrapping Tera with the embedded page templates
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Create a new template engine with embedded templates
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("entity.rst", include_str!("../../templates/entity.rst.tera")),
            ("namespace.rst", include_str!("../../templates/namespace.rst.tera")),
            ("file.rst", include_str!("../../templates/file.rst.tera")),
            ("listing.rst", include_str!("../../templates/listing.rst.tera")),
            ("directory.rst", include_str!("../../templates/directory.rst.tera")),
            ("hierarchy.rst", include_str!("../../templates/hierarchy.rst.tera")),
            ("root.rst", include_str!("../../templates/root.rst.tera")),
        ])?;

        tera.register_filter("underline", underline);

        Ok(Self { tera })
    }

    /// Render a template with the given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Heading rule placed under a page or section title. Rules are a fixed
/// 88 columns, wide enough for any generated title.
fn underline(_value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let with = args.get("with").and_then(|v| v.as_str()).unwrap_or("=");
    Ok(Value::String(with.repeat(88)))
}
