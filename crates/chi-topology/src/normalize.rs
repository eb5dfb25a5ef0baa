//! Normalization of a [`ClickHouseInstallation`].
//!
//! Normalization fills in every default, expands each cluster layout into concrete shards and
//! replicas, resolves the deployment of every replica by inheritance and stamps it with its
//! [`Fingerprint`] and index. It works in place on the resource and never fails; questionable
//! input is normalized silently, validation is left to the caller.

use kube::ResourceExt;
use tracing::{debug, instrument, trace};

use crate::{
    config::merge::{Merge, merge, merge_from},
    constants::{DEFAULT_LAYOUT_COUNT, DEPLOYMENT_SCENARIO_DEFAULT},
    crd::{
        ClickHouseInstallation, ClickHouseInstallationSpec, Cluster, Deployment,
        InternalReplication, LayoutType, Replica, Shard, ShardDefinitionType,
    },
    fingerprint::Fingerprint,
    usage::DeploymentUsage,
};

/// Normalizes the whole installation.
///
/// Returns, for every deployment fingerprint, the highest number of uses within a single cluster.
/// That is how many instances of the deployment are needed to satisfy all clusters.
#[instrument(
    skip_all,
    fields(chi.namespace = ?chi.metadata.namespace, chi.name = ?chi.metadata.name)
)]
pub fn normalize_installation(chi: &mut ClickHouseInstallation) -> DeploymentUsage {
    apply_defaults(chi);

    let namespace = chi.namespace_or_default();
    let name = chi.name_any();
    let ClickHouseInstallationSpec {
        defaults,
        configuration,
    } = &mut chi.spec;
    let scope = InstallationScope::new(&namespace, &name).with_defaults(&defaults.deployment);

    let mut usage = DeploymentUsage::new();
    for cluster in &mut configuration.clusters {
        let cluster_usage = scope.normalize_cluster(cluster);
        usage.merge_max(&cluster_usage);
    }

    debug!(
        deployments = usage.len(),
        instances = usage.total(),
        "normalized installation"
    );
    usage
}

/// Resolves the installation-wide settings in `spec.defaults`.
pub fn apply_defaults(chi: &mut ClickHouseInstallation) {
    let defaults = &mut chi.spec.defaults;

    // Anything but an explicit "enabled" has already been read as disabled
    defaults.replicas_use_fqdn = Some(defaults.replicas_use_fqdn.unwrap_or_default());

    if defaults
        .deployment
        .scenario
        .as_deref()
        .is_none_or(str::is_empty)
    {
        defaults.deployment.scenario = Some(DEPLOYMENT_SCENARIO_DEFAULT.to_string());
    }
}

/// Identity and defaults of the installation a cluster is normalized within.
#[derive(Clone, Copy, Debug)]
pub struct InstallationScope<'a> {
    namespace: &'a str,
    name: &'a str,
    defaults: Option<&'a Deployment>,
}

impl<'a> InstallationScope<'a> {
    pub fn new(namespace: &'a str, name: &'a str) -> Self {
        Self {
            namespace,
            name,
            defaults: None,
        }
    }

    /// Deployment inherited by every cluster.
    pub fn with_defaults(self, defaults: &'a Deployment) -> Self {
        Self {
            defaults: Some(defaults),
            ..self
        }
    }

    /// Expands the layout of `cluster` into shards and replicas and resolves their deployments.
    ///
    /// Shards generated for a [`LayoutType::Standard`] layout inherit the cluster deployment just
    /// like listed shards do, so the cluster's templates, scenario and zone reach every replica
    /// and take part in its fingerprint.
    ///
    /// Returns how often each deployment is used within this cluster.
    pub fn normalize_cluster(&self, cluster: &mut Cluster) -> DeploymentUsage {
        let mut usage = DeploymentUsage::new();

        merge_from(&mut cluster.deployment, self.defaults);

        let layout = &mut cluster.layout;
        match layout.layout_type {
            LayoutType::Standard => {
                if layout.shards_count == 0 {
                    layout.shards_count = DEFAULT_LAYOUT_COUNT;
                }
                if layout.replicas_count == 0 {
                    layout.replicas_count = DEFAULT_LAYOUT_COUNT;
                }

                let replicas_count = layout.replicas_count;
                layout.shards = (0..layout.shards_count)
                    .map(|_| Shard {
                        definition_type: ShardDefinitionType::ReplicasCount,
                        replicas_count,
                        // Standard layouts always replicate internally
                        internal_replication: Some(InternalReplication::Enabled),
                        deployment: merge(Deployment::default(), &cluster.deployment),
                        replicas: vec![Replica::default(); replicas_count],
                    })
                    .collect();

                for shard in &mut layout.shards {
                    self.resolve_replicas(shard, &mut usage);
                }
            }

            LayoutType::Advanced => {
                for shard in &mut layout.shards {
                    shard.internal_replication =
                        Some(shard.internal_replication.unwrap_or_default());
                    shard.deployment.merge(&cluster.deployment);

                    match shard.definition_type {
                        ShardDefinitionType::ReplicasCount => {
                            shard.replicas = vec![Replica::default(); shard.replicas_count];
                        }
                        ShardDefinitionType::Replicas => {
                            shard.replicas_count = shard.replicas.len();
                        }
                    }

                    self.resolve_replicas(shard, &mut usage);
                }
            }
        }

        debug!(
            cluster.name = %cluster.name,
            cluster.layout = %layout.layout_type,
            shards = layout.shards.len(),
            deployments = usage.len(),
            "normalized cluster"
        );
        usage
    }

    /// Resolves the deployment of every replica of `shard` and assigns its fingerprint and index.
    ///
    /// The index of a replica is the number of replicas with the same fingerprint that were
    /// resolved before it against the same `usage`.
    pub fn resolve_replicas(&self, shard: &mut Shard, usage: &mut DeploymentUsage) {
        for replica in &mut shard.replicas {
            let deployment = &mut replica.deployment;
            deployment.merge(&shard.deployment);

            let fingerprint = Fingerprint::compute(self.namespace, self.name, deployment);
            let index = usage.increment(&fingerprint) - 1;
            trace!(%fingerprint, index, "resolved replica deployment");

            deployment.fingerprint = Some(fingerprint);
            deployment.index = Some(index);
        }
    }
}
