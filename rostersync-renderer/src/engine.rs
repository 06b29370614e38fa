//! Tera rendering engine: [`TemplateEngine`] and [`ProfileRenderer`].
//!
//! # Output naming
//!
//! | Piece      | Value                                              |
//! |------------|----------------------------------------------------|
//! | File name  | `<prefix> <Title Cased Profession> <Name><ext>`    |
//! | Default    | `Profile Developer Jane Doe.md`                    |
//!
//! Path separators inside the profession or name are replaced with `-` so a
//! profession such as `AI Prompt Engineer / Developer` never creates an extra
//! folder level.

use std::path::{Path, PathBuf};

use tera::Tera;

use rostersync_core::EmployeeRecord;

use crate::context::ProfileContext;
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded template: baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const PROFILE_TEMPLATE: &str = "profile.md.tera";
const PROFILE_TEMPLATE_SRC: &str = include_str!("templates/profile.md.tera");

const DEFAULT_PREFIX: &str = "Profile";
const DEFAULT_EXTENSION: &str = ".md";

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RenderError {
    RenderError::Io { path: path.into(), source }
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, RenderError> {
    let mut source = PROFILE_TEMPLATE_SRC.to_string();
    if let Some(dir) = user_template_dir {
        let path = dir.join(PROFILE_TEMPLATE);
        if path.is_file() {
            source = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        }
    }

    let mut tera = Tera::default();
    tera.add_raw_template(PROFILE_TEMPLATE, &source)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// Naming helpers
// ---------------------------------------------------------------------------

/// Upper-case the first character of every whitespace-separated word and join
/// the words with single spaces. The rest of each word is left as written, so
/// acronyms like `AI` survive.
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replace path separators so a value can be used as one path segment.
pub fn path_safe(s: &str) -> String {
    s.replace(['/', '\\'], "-")
}

/// File name for a newly provisioned profile document.
pub fn profile_file_name(prefix: &str, record: &EmployeeRecord, extension: &str) -> String {
    let profession = path_safe(&title_case(&record.profession));
    let name = path_safe(record.name.as_str().trim());
    let stem = [prefix, profession.as_str(), name.as_str()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    format!("{stem}{extension}")
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera-based engine with an optional user override.
///
/// A `profile.md.tera` inside `user_template_dir` replaces the embedded
/// template. The override must keep the four tracked field anchors or later
/// runs will not be able to reconcile the documents it produces.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        let tera = build_tera(user_template_dir)?;
        Ok(TemplateEngine { tera })
    }

    /// Render the profile body for `ctx`. Line endings are normalised to LF.
    pub fn render(&self, ctx: &ProfileContext) -> Result<String, RenderError> {
        let tera_ctx = ctx.to_tera_context()?;
        let content = self.tera.render(PROFILE_TEMPLATE, &tera_ctx)?;
        Ok(content.replace("\r\n", "\n"))
    }
}

// ---------------------------------------------------------------------------
// ProfileRenderer
// ---------------------------------------------------------------------------

/// A rendered document, ready to upload into the employee folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedProfile {
    pub file_name: String,
    pub content: String,
}

/// Renders provisioned profile documents. Create once and reuse.
pub struct ProfileRenderer {
    engine: TemplateEngine,
    prefix: String,
    extension: String,
}

impl ProfileRenderer {
    /// Construct a renderer with the embedded template and default naming.
    pub fn new() -> Result<Self, RenderError> {
        Self::with_template_dir(None)
    }

    /// Construct a renderer that honours a user template override.
    pub fn with_template_dir(user_template_dir: Option<&Path>) -> Result<Self, RenderError> {
        Ok(ProfileRenderer {
            engine: TemplateEngine::new(user_template_dir)?,
            prefix: DEFAULT_PREFIX.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
        })
    }

    /// Use a different file-name prefix and extension (must match what the
    /// locator searches for).
    pub fn with_naming(mut self, prefix: impl Into<String>, extension: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self.extension = extension.into();
        self
    }

    pub fn render(&self, record: &EmployeeRecord) -> Result<RenderedProfile, RenderError> {
        let ctx = ProfileContext::from_record(record);
        Ok(RenderedProfile {
            file_name: profile_file_name(&self.prefix, record, &self.extension),
            content: self.engine.render(&ctx)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
