//! The `ClickHouseInstallation` custom resource, as far as cluster topology is concerned.
//!
//! An installation holds installation-wide [`Defaults`] and a list of [`Cluster`]s. Each cluster
//! describes its shards and replicas through a [`ClusterLayout`], and every level carries a
//! [`Deployment`] that is inherited by the level below it.

use std::collections::BTreeMap;

use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use crate::{config::merge::Merge, fingerprint::Fingerprint};

mod flags;

pub use flags::{FlagValue, InternalReplication, ReplicasUseFqdn};

/// A ClickHouse installation: one or more clusters made of shards and replicas.
#[derive(Clone, CustomResource, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[kube(
    group = "clickhouse.altinity.com",
    version = "v1",
    kind = "ClickHouseInstallation",
    plural = "clickhouseinstallations",
    shortname = "chi",
    namespaced,
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct ClickHouseInstallationSpec {
    /// Values applied to every cluster unless the cluster overrides them.
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub configuration: Configuration,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Defaults {
    /// Whether replicas refer to each other by fully qualified domain name.
    /// `1` enables this, any other value disables it.
    #[serde(
        default,
        rename = "replicasUseFQDN",
        skip_serializing_if = "Option::is_none"
    )]
    #[schemars(with = "Option<FlagValue>")]
    pub replicas_use_fqdn: Option<ReplicasUseFqdn>,

    /// Deployment inherited by every cluster.
    #[serde(default)]
    pub deployment: Deployment,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    #[serde(default)]
    pub clusters: Vec<Cluster>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub layout: ClusterLayout,

    /// Deployment inherited by every shard of this cluster.
    #[serde(default)]
    pub deployment: Deployment,
}

/// How the shards of a cluster are described.
#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize, strum::Display,
)]
pub enum LayoutType {
    /// `shardsCount` shards with `replicasCount` replicas each, generated from scratch.
    #[default]
    Standard,

    /// Every shard is listed explicitly.
    Advanced,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterLayout {
    #[serde(default, rename = "type")]
    pub layout_type: LayoutType,

    /// Number of shards of a [`LayoutType::Standard`] layout, `0` means one.
    #[serde(default)]
    pub shards_count: usize,

    /// Number of replicas per shard of a [`LayoutType::Standard`] layout, `0` means one.
    #[serde(default)]
    pub replicas_count: usize,

    #[serde(default)]
    pub shards: Vec<Shard>,
}

/// How the replicas of an [`LayoutType::Advanced`] shard are described.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
pub enum ShardDefinitionType {
    /// `replicasCount` replicas are generated, replacing any listed ones.
    ReplicasCount,

    /// The listed replicas are used as they are.
    #[default]
    #[serde(other)]
    Replicas,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shard {
    #[serde(default)]
    pub definition_type: ShardDefinitionType,

    #[serde(default)]
    pub replicas_count: usize,

    /// Defaults to enabled, only an explicit `Disabled` (or `false`) turns it off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<FlagValue>")]
    pub internal_replication: Option<InternalReplication>,

    /// Deployment inherited by every replica of this shard.
    #[serde(default)]
    pub deployment: Deployment,

    #[serde(default)]
    pub replicas: Vec<Replica>,
}

#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Replica {
    #[serde(default)]
    pub deployment: Deployment,
}

/// Where and how a ClickHouse server runs.
///
/// Two deployments with the same templates, scenario and zone are the same deployment, no matter
/// where in the installation they appear. The engine records this in [`Deployment::fingerprint`].
#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    /// Name of the pod template. An empty name counts as unset.
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub pod_template: Option<String>,

    /// Name of the volume claim template. An empty name counts as unset.
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub volume_claim_template: Option<String>,

    /// Placement strategy, for example `Default` or `NodeMonopoly`.
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub scenario: Option<String>,

    #[serde(default)]
    pub zone: DeploymentZone,

    /// Set by normalization, do not edit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<Fingerprint>,

    /// Set by normalization, do not edit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl Merge for Deployment {
    fn merge(&mut self, defaults: &Self) {
        self.pod_template.merge(&defaults.pod_template);
        self.volume_claim_template.merge(&defaults.volume_claim_template);
        self.zone.merge(&defaults.zone);
        self.scenario.merge(&defaults.scenario);
    }
}

/// Node labels a deployment is pinned to.
#[derive(Clone, Debug, Default, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentZone {
    #[serde(default)]
    pub match_labels: BTreeMap<String, String>,
}

/// A zone is inherited as a whole: a zone with no labels takes over all labels of `defaults`,
/// a zone with at least one label ignores `defaults` entirely.
impl Merge for DeploymentZone {
    fn merge(&mut self, defaults: &Self) {
        self.match_labels.merge(&defaults.match_labels);
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// A replica together with its position in the installation.
#[derive(Clone, Copy, Debug)]
pub struct ReplicaRef<'a> {
    pub cluster: &'a Cluster,
    pub shard_index: usize,
    pub replica_index: usize,
    pub replica: &'a Replica,
}

impl ClickHouseInstallation {
    /// Namespace of the installation, empty if unset.
    pub fn namespace_or_default(&self) -> String {
        self.namespace().unwrap_or_default()
    }

    /// Iterates over all replicas, cluster by cluster, shard by shard, in stored order.
    pub fn replicas(&self) -> impl Iterator<Item = ReplicaRef<'_>> {
        self.spec.configuration.clusters.iter().flat_map(|cluster| {
            cluster
                .layout
                .shards
                .iter()
                .enumerate()
                .flat_map(move |(shard_index, shard)| {
                    shard
                        .replicas
                        .iter()
                        .enumerate()
                        .map(move |(replica_index, replica)| ReplicaRef {
                            cluster,
                            shard_index,
                            replica_index,
                            replica,
                        })
                })
        })
    }
}
