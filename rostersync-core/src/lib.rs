//! rostersync core library: domain types, roster parsing, name matching,
//! department inference and configuration.
//!
//! Public API surface:
//! - [`types`]: records and run counters
//! - [`roster`]: markdown roster table → [`Roster`]
//! - [`matcher`]: profile folder name → roster record
//! - [`department`]: profession → [`Department`]
//! - [`config`]: [`SyncConfig`] load / defaults
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod department;
pub mod error;
pub mod matcher;
pub mod roster;
pub mod types;

pub use config::{RetryConfig, SyncConfig};
pub use department::{infer_department, Department, DEPARTMENT_RULES};
pub use error::ConfigError;
pub use matcher::{match_employee, MatchKind};
pub use roster::{parse_roster, ParsedRoster, Roster};
pub use types::{ChangeRecord, EmployeeName, EmployeeRecord, ErrorRecord, RunStats, TrackedField};
