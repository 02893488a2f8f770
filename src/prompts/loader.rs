//! Prompt template loading and rendering
//!
//! Templates resolve from an optional override directory first, then from
//! the embedded set. Rendering uses handlebars so overrides can keep the
//! same placeholder syntax as the built-ins.

use handlebars::Handlebars;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

use super::embedded::get_embedded;
use crate::error::AgentError;

/// Loads and renders prompt templates
pub struct PromptLoader {
    handlebars: Handlebars<'static>,
    override_dir: Option<PathBuf>,
}

impl PromptLoader {
    /// Create a loader with an optional override directory
    pub fn new(override_dir: Option<PathBuf>) -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);

        Self {
            handlebars,
            override_dir,
        }
    }

    /// Fetch the raw template text for `name`
    ///
    /// Looks for `<override_dir>/<name>.hbs` first, then the embedded set.
    /// A missing template is a deployment defect and surfaces as a
    /// configuration error.
    pub fn load(&self, name: &str) -> Result<String, AgentError> {
        if let Some(dir) = &self.override_dir {
            let path = dir.join(format!("{name}.hbs"));
            if path.exists() {
                debug!(%name, path = %path.display(), "Loading prompt override");
                return std::fs::read_to_string(&path).map_err(|e| {
                    AgentError::Configuration(format!("Failed to read prompt {}: {e}", path.display()))
                });
            }
        }

        get_embedded(name)
            .map(String::from)
            .ok_or_else(|| AgentError::Configuration(format!("Unknown prompt template: {name}")))
    }

    /// Check that a template exists without rendering it
    pub fn has(&self, name: &str) -> bool {
        self.load(name).is_ok()
    }

    /// Render the named template with the given context
    pub fn render<T: Serialize>(&self, name: &str, context: &T) -> Result<String, AgentError> {
        let template = self.load(name)?;
        self.handlebars
            .render_template(&template, context)
            .map_err(|e| AgentError::Configuration(format!("Failed to render prompt {name}: {e}")))
    }
}
