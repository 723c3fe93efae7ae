//! Site rendering
//!
//! Server-side page rendering with Tera. Default templates and static
//! assets are embedded in the binary; an on-disk templates directory can
//! override any of them without rebuilding.

pub mod locations;
pub mod slider;

use chrono::Datelike;
use rust_embed::RustEmbed;
use std::path::Path;
use tera::{Context as TeraContext, Tera};
use thiserror::Error;

pub use locations::LocationRegistry;
pub use slider::{ComparisonSlider, ContainerRect, PointerEvent};

use crate::config::SiteConfig;

/// Built-in page templates
#[derive(RustEmbed)]
#[folder = "assets/templates"]
struct EmbeddedTemplates;

/// Built-in static assets (scripts, styles) served under /static
#[derive(RustEmbed)]
#[folder = "assets/static"]
pub struct StaticAssets;

/// Errors from page rendering
#[derive(Debug, Error)]
pub enum SiteError {
    #[error("Template '{0}' not found")]
    TemplateNotFound(String),

    #[error("Failed to render template '{name}': {message}")]
    RenderError { name: String, message: String },

    #[error("Failed to load templates: {0}")]
    LoadError(String),
}

/// Tera-backed page renderer
pub struct SiteRenderer {
    tera: Tera,
    site: SiteConfig,
}

impl SiteRenderer {
    /// Build a renderer from the embedded templates, then apply any
    /// overrides found in the configured templates directory.
    pub fn new(site: SiteConfig) -> Result<Self, SiteError> {
        let mut tera = Tera::default();

        for name in EmbeddedTemplates::iter() {
            let file = EmbeddedTemplates::get(&name)
                .ok_or_else(|| SiteError::LoadError(name.to_string()))?;
            let content = std::str::from_utf8(file.data.as_ref())
                .map_err(|e| SiteError::LoadError(format!("{}: {}", name, e)))?;
            tera.add_raw_template(&name, content)
                .map_err(|e| SiteError::LoadError(format!("{}: {}", name, e)))?;
        }

        let override_dir = site.templates_path.clone();
        let mut renderer = Self { tera, site };
        if override_dir.exists() {
            renderer.apply_overrides(&override_dir)?;
        }

        Ok(renderer)
    }

    /// Re-register every `*.html` in `dir` over the embedded defaults
    fn apply_overrides(&mut self, dir: &Path) -> Result<(), SiteError> {
        let entries =
            std::fs::read_dir(dir).map_err(|e| SiteError::LoadError(e.to_string()))?;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("html") {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let content = std::fs::read_to_string(&path)
                .map_err(|e| SiteError::LoadError(format!("{}: {}", name, e)))?;
            self.tera
                .add_raw_template(name, &content)
                .map_err(|e| SiteError::LoadError(format!("{}: {}", name, e)))?;
            tracing::debug!("Template override applied: {}", name);
        }
        Ok(())
    }

    /// A context pre-filled with the site-wide variables every page needs
    pub fn base_context(&self) -> TeraContext {
        let mut ctx = TeraContext::new();
        ctx.insert("site_name", &self.site.name);
        ctx.insert("site_phone", &self.site.phone);
        ctx.insert("year", &chrono::Utc::now().year());
        ctx
    }

    /// Render a template by name
    pub fn render(&self, name: &str, context: &TeraContext) -> Result<String, SiteError> {
        if !self.tera.get_template_names().any(|n| n == name) {
            return Err(SiteError::TemplateNotFound(name.to_string()));
        }
        self.tera
            .render(name, context)
            .map_err(|e| SiteError::RenderError {
                name: name.to_string(),
                message: format_tera_error(&e),
            })
    }
}

/// Flatten a Tera error chain into one message
fn format_tera_error(e: &tera::Error) -> String {
    let mut message = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> SiteRenderer {
        SiteRenderer::new(SiteConfig::default()).unwrap()
    }

    #[test]
    fn embedded_templates_load() {
        let renderer = renderer();
        let names: Vec<_> = renderer.tera.get_template_names().collect();
        assert!(names.contains(&"base.html"));
        assert!(names.contains(&"area.html"));
        assert!(names.contains(&"gallery.html"));
    }

    #[test]
    fn base_context_carries_site_identity() {
        let renderer = renderer();
        let ctx = renderer.base_context();
        let html = renderer.render("home.html", &ctx).unwrap();
        assert!(html.contains("Blastline Surface Preparation"));
        assert!(html.contains("0800 000 0000"));
    }

    #[test]
    fn unknown_template_is_an_error() {
        let renderer = renderer();
        let err = renderer.render("nope.html", &TeraContext::new()).unwrap_err();
        assert!(matches!(err, SiteError::TemplateNotFound(_)));
    }

    #[test]
    fn disk_overrides_win() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("home.html"), "OVERRIDDEN {{ site_name }}").unwrap();

        let site = SiteConfig {
            templates_path: dir.path().to_path_buf(),
            ..SiteConfig::default()
        };
        let renderer = SiteRenderer::new(site).unwrap();
        let html = renderer.render("home.html", &renderer.base_context()).unwrap();
        assert!(html.starts_with("OVERRIDDEN"));
    }

    #[test]
    fn static_assets_embedded() {
        assert!(StaticAssets::get("site.js").is_some());
        assert!(StaticAssets::get("slider.js").is_some());
    }
}
