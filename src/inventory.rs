//! Group builder: transforms the flat host record sequence into the
//! inventory document consumed by the automation tool.
//!
//! The builder is a pure, single-pass transformation with no state between
//! invocations. Groups are keyed by sanitized attribute value; when two
//! attributes sanitize to the same name their host sets merge by union. The
//! document serializes with globally sorted keys and 4-space indentation.

use std::{
    collections::{BTreeMap, BTreeSet},
    io::Write,
};

use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::{Map, Value, ser::PrettyFormatter};

use crate::{error::Error, statics::StaticVars, target::HostRecord};

/// Reserved document key carrying per-host variables.
const META_KEY: &str = "_meta";
/// Group collecting hosts whose attribute value is empty.
const UNGROUPED: &str = "ungrouped";
/// Host variable carrying the connection address.
const ANSIBLE_HOST_VAR: &str = "ansible_host";
/// Indentation unit of the serialized document.
const INDENT: &[u8] = b"    ";

/// One named group of the inventory document.
///
/// Fields are declared in lexicographic order so the serialized object keys
/// stay sorted. `children` is part of the consuming tool's contract but is
/// never populated by this build; `vars` comes from the static overlay.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroupDefinition {
    /// Group names nested under this group; omitted when empty.
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub children: BTreeSet<String>,
    /// Names of the hosts directly in this group.
    pub hosts: BTreeSet<String>,
    /// Extra variables attached to the group; omitted when empty.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub vars: Map<String, Value>,
}

/// Reserved `_meta` section carrying per-host variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetaSection {
    /// Variables per host name; every collected host has an entry.
    pub hostvars: BTreeMap<String, Map<String, Value>>,
}

/// The full inventory document: named groups plus the `_meta` section.
///
/// Built once per invocation and discarded after serialization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryDocument {
    /// Groups keyed by sanitized attribute value.
    pub groups: BTreeMap<String, GroupDefinition>,
    /// Per-host variable section.
    pub meta: MetaSection,
}

impl Serialize for InventoryDocument {
    /// Serializes groups and the `_meta` section as one map with globally
    /// sorted keys.
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.groups.len() + 1))?;
        let mut meta_written = false;

        for (name, group) in &self.groups {
            // The reserved section wins over a group that sanitized to the
            // same name.
            if name == META_KEY {
                continue;
            }
            if !meta_written && name.as_str() > META_KEY {
                map.serialize_entry(META_KEY, &self.meta)?;
                meta_written = true;
            }
            map.serialize_entry(name, group)?;
        }

        if !meta_written {
            map.serialize_entry(META_KEY, &self.meta)?;
        }

        map.end()
    }
}

/// Returns the empty inventory document: `{"_meta": {"hostvars": {}}}`.
pub fn empty_inventory() -> InventoryDocument {
    InventoryDocument::default()
}

/// Builds the inventory document from the collected host records.
///
/// Sub-steps are order-insensitive: the meta section and the four attribute
/// partitions only read the input sequence and write disjoint parts of the
/// document. Hosts with an empty attribute value land in the `ungrouped`
/// group for that attribute rather than being omitted.
///
/// # Examples
///
/// ```
/// use emdi::{HostRecord, StaticVars, build_inventory};
///
/// let records = vec![HostRecord {
///     name: "web01".to_owned(),
///     ip_address: "10.0.0.1".to_owned(),
///     lifecycle_status: "prod".to_owned(),
///     line_of_business: "retail".to_owned(),
///     os_family: "linux".to_owned(),
///     os_version: "rhel_8".to_owned(),
///     source_repository: "emrepo".to_owned(),
/// }];
///
/// let document = build_inventory(&records, &StaticVars::default());
/// assert!(document.groups.contains_key("prod"));
/// assert!(document.meta.hostvars.contains_key("web01"));
/// ```
pub fn build_inventory(records: &[HostRecord], statics: &StaticVars) -> InventoryDocument {
    let mut document = InventoryDocument::default();

    build_meta_group(records, statics, &mut document.meta);

    let attributes: [fn(&HostRecord) -> &str; 4] = [
        |record| record.lifecycle_status.as_str(),
        |record| record.line_of_business.as_str(),
        |record| record.os_family.as_str(),
        |record| record.os_version.as_str(),
    ];
    for attribute in attributes {
        build_attribute_groups(records, attribute, statics, &mut document.groups);
    }

    document
}

/// Builds the `_meta.hostvars` mapping.
///
/// Each entry starts from the static overlay for the host, then sets
/// `ansible_host` to the record's IP address, which always wins. A host name
/// repeating across the input resolves last-write-wins.
fn build_meta_group(records: &[HostRecord], statics: &StaticVars, meta: &mut MetaSection) {
    for record in records {
        let mut vars = statics.vars_for(&record.name);
        vars.insert(
            ANSIBLE_HOST_VAR.to_owned(),
            Value::String(record.ip_address.clone()),
        );
        meta.hostvars.insert(record.name.clone(), vars);
    }
}

/// Partitions the records by one attribute and merges the resulting groups
/// into the document.
///
/// An empty attribute value maps to the `ungrouped` group. Existing groups
/// keep their variables and gain hosts by union.
fn build_attribute_groups(
    records: &[HostRecord],
    attribute: fn(&HostRecord) -> &str,
    statics: &StaticVars,
    groups: &mut BTreeMap<String, GroupDefinition>,
) {
    for record in records {
        let value = attribute(record);
        let name = if value.is_empty() { UNGROUPED } else { value };

        let group = groups
            .entry(name.to_owned())
            .or_insert_with(|| GroupDefinition {
                vars: statics.vars_for(name),
                ..GroupDefinition::default()
            });
        group.hosts.insert(record.name.clone());
    }
}

/// Writes the document to `writer` with sorted keys, 4-space indentation,
/// and a trailing newline.
///
/// # Errors
///
/// Returns [`Error::Serialize`](Error::Serialize) when serialization fails
/// and [`Error::Output`](Error::Output) when the writer does.
pub fn write_inventory<W>(writer: &mut W, document: &InventoryDocument) -> Result<(), Error>
where
    W: Write,
{
    let formatter = PrettyFormatter::with_indent(INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut *writer, formatter);
    document.serialize(&mut serializer)?;
    writer
        .write_all(b"\n")
        .map_err(|source| Error::Output { source })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{collections::BTreeSet, path::Path};

    use serde_json::Value;

    use super::{
        InventoryDocument, build_attribute_groups, build_inventory, empty_inventory,
        write_inventory,
    };
    use crate::{statics::{StaticVars, parse_static_vars}, target::HostRecord};

    fn record(
        name: &str,
        ip: &str,
        lifecycle: &str,
        line_of_business: &str,
        os_family: &str,
        os_version: &str,
    ) -> HostRecord {
        HostRecord {
            name: name.to_owned(),
            ip_address: ip.to_owned(),
            lifecycle_status: lifecycle.to_owned(),
            line_of_business: line_of_business.to_owned(),
            os_family: os_family.to_owned(),
            os_version: os_version.to_owned(),
            source_repository: "emrepo".to_owned(),
        }
    }

    fn render(document: &InventoryDocument) -> String {
        let mut buffer = Vec::new();
        write_inventory(&mut buffer, document).expect("expected serialization success");
        String::from_utf8(buffer).expect("invalid UTF-8")
    }

    #[test]
    fn empty_input_yields_only_the_meta_section() {
        let document = build_inventory(&[], &StaticVars::default());

        assert!(document.groups.is_empty());
        assert!(document.meta.hostvars.is_empty());
        assert_eq!(
            render(&document),
            "{\n    \"_meta\": {\n        \"hostvars\": {}\n    }\n}\n"
        );
    }

    #[test]
    fn empty_inventory_matches_built_empty_document() {
        assert_eq!(empty_inventory(), build_inventory(&[], &StaticVars::default()));
    }

    #[test]
    fn builds_expected_groups_for_two_hosts() {
        let records = vec![
            record("web01", "10.0.0.1", "prod", "retail", "linux", "rhel_8"),
            record("web02", "10.0.0.2", "prod", "retail", "linux", "rhel_9"),
        ];

        let document = build_inventory(&records, &StaticVars::default());

        let both: BTreeSet<_> = ["web01".to_owned(), "web02".to_owned()].into();
        assert_eq!(document.groups["prod"].hosts, both);
        assert_eq!(document.groups["retail"].hosts, both);
        assert_eq!(document.groups["linux"].hosts, both);
        assert_eq!(
            document.groups["rhel_8"].hosts,
            BTreeSet::from(["web01".to_owned()])
        );
        assert_eq!(
            document.groups["rhel_9"].hosts,
            BTreeSet::from(["web02".to_owned()])
        );
        assert_eq!(document.groups.len(), 5);

        assert_eq!(
            document.meta.hostvars["web01"]["ansible_host"],
            Value::from("10.0.0.1")
        );
        assert_eq!(
            document.meta.hostvars["web02"]["ansible_host"],
            Value::from("10.0.0.2")
        );
    }

    #[test]
    fn serializes_sorted_keys_with_four_space_indent() {
        let records = vec![
            record("web01", "10.0.0.1", "prod", "retail", "linux", "rhel_8"),
            record("web02", "10.0.0.2", "prod", "retail", "linux", "rhel_9"),
        ];

        let document = build_inventory(&records, &StaticVars::default());

        let expected = r#"{
    "_meta": {
        "hostvars": {
            "web01": {
                "ansible_host": "10.0.0.1"
            },
            "web02": {
                "ansible_host": "10.0.0.2"
            }
        }
    },
    "linux": {
        "hosts": [
            "web01",
            "web02"
        ]
    },
    "prod": {
        "hosts": [
            "web01",
            "web02"
        ]
    },
    "retail": {
        "hosts": [
            "web01",
            "web02"
        ]
    },
    "rhel_8": {
        "hosts": [
            "web01"
        ]
    },
    "rhel_9": {
        "hosts": [
            "web02"
        ]
    }
}
"#;
        assert_eq!(render(&document), expected);
    }

    #[test]
    fn empty_attribute_values_map_to_the_ungrouped_group() {
        let records = vec![
            record("web01", "10.0.0.1", "", "", "linux", "rhel_8"),
            record("web02", "10.0.0.2", "prod", "retail", "linux", "rhel_9"),
        ];

        let document = build_inventory(&records, &StaticVars::default());

        assert_eq!(
            document.groups["ungrouped"].hosts,
            BTreeSet::from(["web01".to_owned()])
        );
        assert_eq!(
            document.groups["prod"].hosts,
            BTreeSet::from(["web02".to_owned()])
        );
    }

    #[test]
    fn each_attribute_partition_is_complete_and_disjoint() {
        let records = vec![
            record("web01", "10.0.0.1", "prod", "retail", "linux", "rhel_8"),
            record("web02", "10.0.0.2", "", "wholesale", "linux", "rhel_9"),
            record("db01", "10.0.0.3", "staging", "retail", "windows", "2022"),
        ];
        let all_names: BTreeSet<_> = records.iter().map(|r| r.name.clone()).collect();

        let attributes: [fn(&HostRecord) -> &str; 4] = [
            |r| r.lifecycle_status.as_str(),
            |r| r.line_of_business.as_str(),
            |r| r.os_family.as_str(),
            |r| r.os_version.as_str(),
        ];

        for attribute in attributes {
            let mut groups = std::collections::BTreeMap::new();
            build_attribute_groups(&records, attribute, &StaticVars::default(), &mut groups);

            let mut union = BTreeSet::new();
            let mut total = 0;
            for group in groups.values() {
                total += group.hosts.len();
                union.extend(group.hosts.iter().cloned());
            }
            assert_eq!(union, all_names);
            assert_eq!(total, all_names.len());
        }
    }

    #[test]
    fn duplicate_host_names_resolve_last_write_wins() {
        let records = vec![
            record("web01", "10.0.0.1", "prod", "retail", "linux", "rhel_8"),
            record("web01", "192.168.0.1", "prod", "retail", "linux", "rhel_8"),
        ];

        let document = build_inventory(&records, &StaticVars::default());

        assert_eq!(document.meta.hostvars.len(), 1);
        assert_eq!(
            document.meta.hostvars["web01"]["ansible_host"],
            Value::from("192.168.0.1")
        );
    }

    #[test]
    fn colliding_group_names_merge_hosts_by_union() {
        // `linux` is both a lifecycle status and an OS family here.
        let records = vec![
            record("web01", "10.0.0.1", "linux", "retail", "solaris", "11"),
            record("web02", "10.0.0.2", "prod", "retail", "linux", "rhel_9"),
        ];

        let document = build_inventory(&records, &StaticVars::default());

        assert_eq!(
            document.groups["linux"].hosts,
            BTreeSet::from(["web01".to_owned(), "web02".to_owned()])
        );
    }

    #[test]
    fn static_overlay_seeds_hostvars_and_group_vars() {
        let overlay = r#"
{
    "web01": {"ansible_user": "deploy", "ansible_host": "ignored.example.com"},
    "prod": {"env": "production"}
}
"#;
        let statics =
            parse_static_vars(Path::new("static_vars.json"), overlay).expect("expected parse");
        let records = vec![record("web01", "10.0.0.1", "prod", "retail", "linux", "rhel_8")];

        let document = build_inventory(&records, &statics);

        let hostvars = &document.meta.hostvars["web01"];
        assert_eq!(hostvars["ansible_user"], Value::from("deploy"));
        // The collected address always wins over a static override.
        assert_eq!(hostvars["ansible_host"], Value::from("10.0.0.1"));

        assert_eq!(document.groups["prod"].vars["env"], Value::from("production"));
        assert!(document.groups["retail"].vars.is_empty());

        let rendered = render(&document);
        assert!(rendered.contains("\"vars\""));
        assert!(rendered.contains("\"env\": \"production\""));
    }

    #[test]
    fn groups_without_vars_omit_the_vars_key() {
        let records = vec![record("web01", "10.0.0.1", "prod", "retail", "linux", "rhel_8")];
        let rendered = render(&build_inventory(&records, &StaticVars::default()));

        assert!(!rendered.contains("\"vars\""));
        assert!(!rendered.contains("\"children\""));
    }

    #[test]
    fn reserved_meta_key_wins_over_a_colliding_group() {
        let records = vec![record("web01", "10.0.0.1", "_meta", "retail", "linux", "rhel_8")];

        let rendered = render(&build_inventory(&records, &StaticVars::default()));
        let value: Value = serde_json::from_str(&rendered).expect("expected valid JSON");

        assert!(value["_meta"].get("hostvars").is_some());
        assert_eq!(rendered.matches("\"_meta\"").count(), 1);
    }
}
