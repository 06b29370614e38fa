//! Template context: serializable rendering payload built from an
//! [`EmployeeRecord`].
//!
//! Only the four tracked fields and the name come from the roster. Every other
//! field is [`UNSPECIFIED`] until someone fills it in by hand.

use serde::{Deserialize, Serialize};

use rostersync_core::EmployeeRecord;

use crate::error::RenderError;

/// Placeholder for every profile field the roster does not carry.
pub const UNSPECIFIED: &str = "Not specified";

/// Nested rendering payload for `profile.md.tera`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileContext {
    pub identity: IdentityCtx,
    pub personal: PersonalCtx,
    pub contact: ContactCtx,
    pub work: WorkCtx,
    pub skills: String,
    pub tools: String,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityCtx {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalCtx {
    pub age: String,
    pub country: String,
    pub start_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactCtx {
    pub email: String,
    pub phone: String,
    pub telegram: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkCtx {
    pub profession: String,
    pub shift: String,
    pub rate: String,
    pub status: String,
}

impl ProfileContext {
    /// Build a [`ProfileContext`] from a roster record.
    pub fn from_record(record: &EmployeeRecord) -> Self {
        let unspecified = || UNSPECIFIED.to_string();
        ProfileContext {
            identity: IdentityCtx {
                id: record.id.clone(),
                name: record.name.0.clone(),
            },
            personal: PersonalCtx {
                age: unspecified(),
                country: unspecified(),
                start_date: unspecified(),
            },
            contact: ContactCtx {
                email: unspecified(),
                phone: unspecified(),
                telegram: unspecified(),
            },
            work: WorkCtx {
                profession: record.profession.clone(),
                shift: unspecified(),
                rate: record.rate.clone(),
                status: record.status.clone(),
            },
            skills: unspecified(),
            tools: unspecified(),
            summary: unspecified(),
        }
    }

    /// Convert to a [`tera::Context`] for rendering.
    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}
