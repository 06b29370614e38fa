//! Department inference from a free-text profession.
//!
//! [`DEPARTMENT_RULES`] is evaluated top to bottom against the lower-cased
//! profession, padded with a space on each side so that short keywords such as
//! `" ai "` only hit whole words. The first department with a keyword that is
//! a substring wins.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level department folders under the profile root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    Ai,
    Design,
    Dev,
    Video,
    LeadGen,
}

impl Department {
    /// Folder name used in the profile tree.
    pub fn folder_name(&self) -> &'static str {
        match self {
            Department::Ai => "AI",
            Department::Design => "Design",
            Department::Dev => "Dev",
            Department::Video => "Video",
            Department::LeadGen => "Lead Gen",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder_name())
    }
}

/// Ordered (department, keywords) table. Order is priority.
pub const DEPARTMENT_RULES: &[(Department, &[&str])] = &[
    (
        Department::Ai,
        &[
            " ai ",
            " ai/",
            "/ai ",
            "artificial intelligence",
            "machine learning",
            " ml ",
            "prompt",
            "llm",
            "automation",
        ],
    ),
    (
        Department::Design,
        &[
            "design",
            "ui/ux",
            " ux ",
            " ui ",
            "graphic",
            "illustrat",
            "brand",
            "figma",
        ],
    ),
    (
        Department::Dev,
        &[
            "develop",
            "engineer",
            "programm",
            "software",
            "coder",
            "frontend",
            "front-end",
            "backend",
            "back-end",
            "full stack",
            "fullstack",
            "devops",
            "web ",
            " qa ",
        ],
    ),
    (
        Department::Video,
        &[
            "video",
            "editor",
            "motion",
            "animat",
            "youtube",
            "videograph",
            "thumbnail",
        ],
    ),
    (
        Department::LeadGen,
        &[
            "lead gen",
            "lead-gen",
            "leadgen",
            "lead generation",
            "sales",
            "appointment",
            "cold call",
            "outreach",
            " sdr ",
            "prospect",
        ],
    ),
];

/// Infer the department for `profession`; `None` when no rule matches.
pub fn infer_department(profession: &str) -> Option<Department> {
    let haystack = format!(" {} ", profession.trim().to_lowercase());
    DEPARTMENT_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| haystack.contains(k)))
        .map(|(department, _)| *department)
}
