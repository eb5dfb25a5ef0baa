//! Names derived from deployment fingerprints.
//!
//! A [`Fingerprint`] is too long to be part of a Kubernetes resource name, so resources are named
//! after its [short ID](Fingerprint::short_id) instead. Replicas sharing a deployment are told
//! apart by their deployment index, giving the full deployment ID `<short ID>-<index>`.

use std::collections::BTreeMap;

use snafu::{OptionExt, Snafu};
use tracing::warn;

use crate::{crd::Replica, fingerprint::Fingerprint, usage::DeploymentUsage};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, PartialEq, Snafu)]
pub enum Error {
    #[snafu(display("replica deployment has no {field}, normalize the installation first"))]
    ReplicaNotNormalized { field: &'static str },

    #[snafu(display("deployments {first} and {second} share the short ID {short_id:?}"))]
    ShortIdCollision {
        short_id: String,
        first: Fingerprint,
        second: Fingerprint,
    },
}

/// Returns the full deployment ID of a normalized replica, such as `1eb454a3c9-2`.
///
/// The ID is unique within an installation as long as no two of its deployments share a short
/// ID, see [`check_short_id_collisions`].
pub fn full_deployment_id(replica: &Replica) -> Result<String> {
    let deployment = &replica.deployment;
    let fingerprint = deployment
        .fingerprint
        .as_ref()
        .context(ReplicaNotNormalizedSnafu {
            field: "fingerprint",
        })?;
    let index = deployment
        .index
        .context(ReplicaNotNormalizedSnafu { field: "index" })?;

    Ok(format!("{short_id}-{index}", short_id = fingerprint.short_id()))
}

/// Makes sure that no two deployments in `usage` share a short ID.
///
/// Every collision is logged, the first one is returned as error.
pub fn check_short_id_collisions(usage: &DeploymentUsage) -> Result<()> {
    let mut seen: BTreeMap<&str, &Fingerprint> = BTreeMap::new();
    let mut first_collision = None;

    for (fingerprint, _) in usage.iter() {
        let short_id = fingerprint.short_id();
        match seen.get(short_id) {
            Some(&first) => {
                warn!(
                    short_id,
                    %first,
                    second = %fingerprint,
                    "deployments share a short ID, resource names will clash"
                );
                first_collision.get_or_insert_with(|| ShortIdCollisionSnafu {
                    short_id,
                    first: first.clone(),
                    second: fingerprint.clone(),
                });
            }
            None => {
                seen.insert(short_id, fingerprint);
            }
        }
    }

    match first_collision {
        Some(collision) => collision.fail(),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::crd::Deployment;

    fn replica(fingerprint: Option<&str>, index: Option<usize>) -> Replica {
        Replica {
            deployment: Deployment {
                fingerprint: fingerprint.map(|f| Fingerprint::from(f.to_string())),
                index,
                ..Deployment::default()
            },
        }
    }

    #[rstest]
    #[case("5e1c07b4c5a6b7f3f1eb454a3c9", 0, "1eb454a3c9-0")]
    #[case("5e1c07b4c5a6b7f3f1eb454a3c9", 2, "1eb454a3c9-2")]
    #[case("abc", 11, "abc-11")]
    fn full_deployment_id_pattern(
        #[case] fingerprint: &str,
        #[case] index: usize,
        #[case] expected: &str,
    ) {
        assert_eq!(
            full_deployment_id(&replica(Some(fingerprint), Some(index))).unwrap(),
            expected
        );
    }

    #[rstest]
    #[case(None, Some(0), "fingerprint")]
    #[case(Some("abc"), None, "index")]
    #[case(None, None, "fingerprint")]
    fn full_deployment_id_requires_normalization(
        #[case] fingerprint: Option<&str>,
        #[case] index: Option<usize>,
        #[case] field: &'static str,
    ) {
        assert_eq!(
            full_deployment_id(&replica(fingerprint, index)),
            Err(Error::ReplicaNotNormalized { field })
        );
    }

    #[test]
    fn distinct_short_ids_pass() {
        let usage: DeploymentUsage = [
            (Fingerprint::from("aaaa0123456789".to_string()), 1),
            (Fingerprint::from("aaaa0123456788".to_string()), 2),
        ]
        .into_iter()
        .collect();

        assert_eq!(check_short_id_collisions(&usage), Ok(()));
    }

    #[test]
    fn shared_short_id_is_reported() {
        let first = Fingerprint::from("aaaa0123456789".to_string());
        let second = Fingerprint::from("bbbb0123456789".to_string());
        let usage: DeploymentUsage = [(first.clone(), 1), (second.clone(), 1)]
            .into_iter()
            .collect();

        assert_eq!(
            check_short_id_collisions(&usage),
            Err(Error::ShortIdCollision {
                short_id: "0123456789".to_string(),
                first,
                second,
            })
        );
    }
}
