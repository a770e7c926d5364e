//! Host record types produced by the target collector.
//!
//! A [`TargetRow`] mirrors the six columns returned by the repository query
//! in order; a [`HostRecord`] is the immutable, sanitized form consumed by
//! the group builder, tagged with the repository that produced it.

use crate::sanitize::sanitize;

/// Raw row returned by the repository target query, in column order.
///
/// The lifecycle status and line of business come from nullable target
/// properties; the OS qualifiers may also be absent for incompletely
/// discovered hosts. All values are lowercased server-side.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TargetRow {
    /// Unique target name.
    pub target_name: String,
    /// IP address property; the query requires it to exist.
    pub ip_address: String,
    /// Optional lifecycle status property.
    pub lifecycle_status: Option<String>,
    /// Optional line of business property.
    pub line_of_business: Option<String>,
    /// Optional operating system qualifier.
    pub operating_system: Option<String>,
    /// Optional operating system version qualifier.
    pub os_version: Option<String>,
}

/// One discovered host, sanitized and tagged with its source repository.
///
/// Records are immutable once produced and live only for the duration of a
/// single invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    /// Unique host identifier.
    pub name: String,
    /// IP address published as `ansible_host`.
    pub ip_address: String,
    /// Sanitized lifecycle status; empty when the property is absent.
    pub lifecycle_status: String,
    /// Sanitized line of business; empty when the property is absent.
    pub line_of_business: String,
    /// Sanitized operating system family.
    pub os_family: String,
    /// Sanitized operating system version.
    pub os_version: String,
    /// Sanitized name of the repository that produced this record.
    pub source_repository: String,
}

impl HostRecord {
    /// Converts a raw query row into a host record tagged with `repository`.
    ///
    /// The four grouped attributes and the repository name pass through
    /// [`sanitize`]; absent properties become empty strings so the group
    /// builder can map them to the `ungrouped` group.
    pub fn from_row(row: TargetRow, repository: &str) -> Self {
        Self {
            name: row.target_name,
            ip_address: row.ip_address,
            lifecycle_status: sanitize(row.lifecycle_status.as_deref().unwrap_or_default()),
            line_of_business: sanitize(row.line_of_business.as_deref().unwrap_or_default()),
            os_family: sanitize(row.operating_system.as_deref().unwrap_or_default()),
            os_version: sanitize(row.os_version.as_deref().unwrap_or_default()),
            source_repository: sanitize(repository),
        }
    }
}
