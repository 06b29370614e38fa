//! # rostersync-renderer
//!
//! Tera-based template engine that renders new profile documents from roster
//! records.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rostersync_renderer::ProfileRenderer;
//! use rostersync_core::EmployeeRecord;
//!
//! fn render_one(record: &EmployeeRecord) {
//!     if let Ok(renderer) = ProfileRenderer::new() {
//!         if let Ok(doc) = renderer.render(record) {
//!             println!("{}: {} bytes", doc.file_name, doc.content.len());
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;

pub use context::{ProfileContext, UNSPECIFIED};
pub use engine::{
    path_safe, profile_file_name, title_case, ProfileRenderer, RenderedProfile, TemplateEngine,
};
pub use error::RenderError;
