//! Topology normalization for `ClickHouseInstallation` resources.
//!
//! A `ClickHouseInstallation` describes its clusters in shorthand: "two shards with three
//! replicas each", with placement settings given wherever the user found convenient. Before any
//! Kubernetes object can be built from it, [`normalize::normalize_installation`]
//!
//! - fills in installation-wide defaults,
//! - expands every cluster layout into concrete shards and replicas,
//! - resolves the [deployment](crd::Deployment) of every replica by inheritance
//!   (defaults → cluster → shard → replica),
//! - stamps each replica with a [fingerprint](fingerprint::Fingerprint) of its deployment and an
//!   index among the replicas of the cluster sharing that fingerprint.
//!
//! Replicas are then named with [`identity::full_deployment_id`], and the returned
//! [`usage::DeploymentUsage`] tells how many instances of each deployment are needed.

pub mod config;
pub mod constants;
pub mod crd;
pub mod fingerprint;
pub mod identity;
pub mod normalize;
pub mod usage;

// External re-exports
pub use k8s_openapi;
pub use kube;
pub use schemars;
