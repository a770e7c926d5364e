//! Configuration document types describing repository connections.
//!
//! The configuration is a YAML mapping of repository name to connection
//! section. Section order is preserved because it determines the order in
//! which repositories are visited and their targets concatenated. Field
//! names accept legacy uppercase aliases for compatibility with older
//! sectioned configuration files.

use std::{fs, path::Path};

use serde::Deserialize;
use serde_yaml::Mapping;

use crate::error::{self, Error};

/// Connection settings for a single repository section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositorySettings {
    /// Database host name.
    #[serde(alias = "HOST_NAME")]
    pub host_name: String,

    /// Database listener port.
    #[serde(alias = "PORT")]
    pub port: u16,

    /// Account used for the read-only target query.
    #[serde(alias = "USERNAME")]
    pub username: String,

    /// Password for the query account.
    #[serde(alias = "PASSWORD")]
    pub password: String,

    /// Service or database identifier to connect to.
    #[serde(alias = "SERVICE_NAME")]
    pub service_name: String,
}

/// One configured repository: its section name plus connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Section name identifying the repository; tags every collected record.
    pub name: String,
    /// Connection settings for the repository database.
    pub settings: RepositorySettings,
}

/// All configured repositories, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryConfig {
    /// Repositories to visit, strictly in configuration order.
    pub repositories: Vec<RepositoryConfig>,
}

/// Loads repository configuration from the provided YAML file path.
///
/// # Errors
///
/// Returns an [`Error`] when the file cannot be read, the YAML cannot be
/// deserialized, or the configuration violates invariants.
pub fn load_config(path: &Path) -> Result<InventoryConfig, Error> {
    let contents = fs::read_to_string(path).map_err(|source| error::io_error(path, source))?;
    parse_config(&contents)
}

/// Parses repository configuration from the provided YAML document string.
///
/// This function is suitable for unit tests and higher-level callers that
/// already obtained the configuration contents.
///
/// # Errors
///
/// Propagates [`Error::Parse`](Error::Parse) when the YAML cannot be decoded
/// and [`Error::Validation`](Error::Validation) when the document is empty,
/// a section name is not a non-empty string, or a section field is blank.
pub fn parse_config(contents: &str) -> Result<InventoryConfig, Error> {
    let document: Mapping = serde_yaml::from_str(contents)?;
    if document.is_empty() {
        return Err(Error::validation(
            "configuration must define at least one repository",
        ));
    }

    let mut repositories = Vec::with_capacity(document.len());
    for (key, value) in document {
        let name = key
            .as_str()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                Error::validation("repository section names must be non-empty strings")
            })?
            .to_owned();

        let settings: RepositorySettings = serde_yaml::from_value(value)?;
        validate_settings(&name, &settings)?;

        repositories.push(RepositoryConfig { name, settings });
    }

    Ok(InventoryConfig { repositories })
}

/// Validates that every connection field of a section carries a value.
///
/// # Errors
///
/// Returns [`Error::Validation`](Error::Validation) naming the section and
/// the offending field.
fn validate_settings(name: &str, settings: &RepositorySettings) -> Result<(), Error> {
    let fields = [
        ("host_name", settings.host_name.as_str()),
        ("username", settings.username.as_str()),
        ("password", settings.password.as_str()),
        ("service_name", settings.service_name.as_str()),
    ];

    for (field, value) in fields {
        if value.trim().is_empty() {
            return Err(Error::validation(format!(
                "repository '{name}': {field} cannot be empty"
            )));
        }
    }

    if settings.port == 0 {
        return Err(Error::validation(format!(
            "repository '{name}': port cannot be zero"
        )));
    }

    Ok(())
}
