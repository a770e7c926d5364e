//! Target collector: a single sequential pass over the configured
//! repositories.
//!
//! Repositories are visited strictly in configuration order, one blocking
//! round trip each: connect, run the target query, disconnect. Rows arrive
//! host-name-ascending from the query and are not re-sorted here. Any
//! connection or query failure aborts the whole run; no partial inventory is
//! ever produced.

use sqlx::{Connection, PgConnection, postgres::PgConnectOptions};
use tracing::{debug, info};

use crate::{
    config::{InventoryConfig, RepositoryConfig},
    error::{self, Error},
    target::{HostRecord, TargetRow},
};

/// Target type restricting the query to host targets.
const HOST_TARGET_TYPE: &str = "host";

/// Query returning the six host attribute columns, host-name-ascending.
///
/// The lifecycle status and line of business are nullable target properties,
/// hence the outer joins; the IP address property is required. The grouped
/// columns are lowercased server-side and sanitized again on the client,
/// which is harmless because the transform is idempotent.
pub const TARGET_QUERY: &str = r"
    select
        lower(tgt.target_name) as target_name,
        lower(ipadr.property_value) as ip_address,
        lower(lfcl.property_value) as lifecycle_status,
        lower(lnbus.property_value) as line_of_business,
        lower(tgt.type_qualifier1) as operating_system,
        regexp_replace(lower(tgt.type_qualifier2), '[(). ]+', '_', 'g') as os_version
    from
        mgmt$target tgt
        join mgmt$target_properties ipadr
            on tgt.target_name = ipadr.target_name
            and tgt.target_type = ipadr.target_type
            and tgt.target_guid = ipadr.target_guid
        left outer join mgmt$target_properties lfcl
            on tgt.target_name = lfcl.target_name
            and tgt.target_type = lfcl.target_type
            and tgt.target_guid = lfcl.target_guid
            and lfcl.property_name = 'orcl_gtp_lifecycle_status'
        left outer join mgmt$target_properties lnbus
            on tgt.target_name = lnbus.target_name
            and tgt.target_type = lnbus.target_type
            and tgt.target_guid = lnbus.target_guid
            and lnbus.property_name = 'orcl_gtp_line_of_bus'
    where
        tgt.target_type = $1
        and ipadr.property_name = 'IP_address'
    order by
        tgt.target_name
";

/// Source of raw target rows for a configured repository.
///
/// The production implementation is [`RepositorySource`]; tests inject
/// in-memory fakes so the collector can be exercised without a database.
#[allow(async_fn_in_trait)]
pub trait TargetSource {
    /// Fetches all target rows from the given repository.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`](Error::Connection) when the repository
    /// cannot be reached or queried.
    async fn fetch_targets(&self, repository: &RepositoryConfig) -> Result<Vec<TargetRow>, Error>;
}

/// Production source that opens one database connection per repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct RepositorySource;

impl TargetSource for RepositorySource {
    async fn fetch_targets(&self, repository: &RepositoryConfig) -> Result<Vec<TargetRow>, Error> {
        let options = PgConnectOptions::new()
            .host(&repository.settings.host_name)
            .port(repository.settings.port)
            .username(&repository.settings.username)
            .password(&repository.settings.password)
            .database(&repository.settings.service_name);

        let mut connection = PgConnection::connect_with(&options)
            .await
            .map_err(|source| error::connection_error(&repository.name, source))?;

        // On the error path the connection is released by drop.
        let rows = sqlx::query_as::<_, TargetRow>(TARGET_QUERY)
            .bind(HOST_TARGET_TYPE)
            .fetch_all(&mut connection)
            .await
            .map_err(|source| error::connection_error(&repository.name, source))?;

        connection
            .close()
            .await
            .map_err(|source| error::connection_error(&repository.name, source))?;

        Ok(rows)
    }
}

/// Collects host records from every configured repository.
///
/// Results are concatenated in configuration order into a freshly allocated
/// sequence; each record is tagged with the repository section name that
/// produced it.
///
/// # Errors
///
/// Propagates the first [`Error::Connection`](Error::Connection) encountered
/// and discards everything collected so far.
pub async fn collect_targets<S>(
    source: &S,
    config: &InventoryConfig,
) -> Result<Vec<HostRecord>, Error>
where
    S: TargetSource,
{
    let mut records = Vec::new();

    for repository in &config.repositories {
        debug!("querying targets from repository '{}'", repository.name);
        let rows = source.fetch_targets(repository).await?;
        info!(
            "collected {} targets from repository '{}'",
            rows.len(),
            repository.name
        );

        records.extend(
            rows.into_iter()
                .map(|row| HostRecord::from_row(row, &repository.name)),
        );
    }

    Ok(records)
}
