//! Builds Ansible dynamic inventory documents from the host target metadata
//! of Enterprise Manager repositories.
//!
//! The library visits every configured repository sequentially, collects one
//! flat sequence of host records, and transforms it into a grouping document:
//! one group per distinct sanitized value of each operational attribute, plus
//! the reserved `_meta.hostvars` section with per-host variables. Public APIs
//! are documented with invariants and error semantics to facilitate
//! integration in automation tooling.

mod collector;
mod config;
mod error;
mod inventory;
mod sanitize;
mod statics;
mod target;

pub use collector::{RepositorySource, TARGET_QUERY, TargetSource, collect_targets};
pub use config::{InventoryConfig, RepositoryConfig, RepositorySettings, load_config, parse_config};
pub use error::{Error, connection_error, io_error, static_vars_error};
pub use inventory::{
    GroupDefinition, InventoryDocument, MetaSection, build_inventory, empty_inventory,
    write_inventory,
};
pub use sanitize::sanitize;
pub use statics::{StaticVars, load_static_vars, parse_static_vars};
pub use target::{HostRecord, TargetRow};
