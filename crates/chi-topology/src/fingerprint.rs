//! Content-derived identity of a [`Deployment`].
//!
//! A deployment is reduced to a canonical string of the form
//!
//! ```text
//! <podTemplate>::<volumeClaimTemplate>::<scenario>::::<key1>=<value1>::<key2>=<value2>
//! ```
//!
//! with zone labels ordered by key, and then hashed together with the namespace and name of the
//! owning installation. Identical deployments therefore share one fingerprint within an
//! installation, but not across installations.

use std::fmt::{self, Display};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::{
    constants::{CANONICAL_SEPARATOR, SHORT_ID_LENGTH},
    crd::Deployment,
};

/// Hex-encoded SHA-256 digest identifying a deployment variant within one installation.
#[derive(Clone, Debug, Deserialize, Eq, Hash, JsonSchema, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Computes the fingerprint of `deployment` within the installation `namespace`/`name`.
    ///
    /// `deployment` is expected to be fully resolved, inheritance is not applied here.
    pub fn compute(namespace: &str, name: &str, deployment: &Deployment) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(namespace.as_bytes());
        hasher.update(name.as_bytes());
        hasher.update(deployment.canonical_string().as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last [`SHORT_ID_LENGTH`] characters of the fingerprint, short enough to be used in
    /// resource names.
    ///
    /// Different fingerprints can share a short ID, see
    /// [`check_short_id_collisions`](crate::identity::check_short_id_collisions).
    /// Fingerprints shorter than that are returned whole.
    pub fn short_id(&self) -> &str {
        let start = self.0.len().saturating_sub(SHORT_ID_LENGTH);
        self.0.get(start..).unwrap_or(&self.0)
    }
}

impl From<String> for Fingerprint {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Deployment {
    /// Renders the fields that make up the identity of this deployment.
    ///
    /// Unset fields render as empty strings. Zone labels are ordered by key, so the result does
    /// not depend on the order the labels were written in.
    pub fn canonical_string(&self) -> String {
        let head = format!(
            "{pod_template}{sep}{volume_claim_template}{sep}{scenario}{sep}",
            pod_template = self.pod_template.as_deref().unwrap_or_default(),
            volume_claim_template = self.volume_claim_template.as_deref().unwrap_or_default(),
            scenario = self.scenario.as_deref().unwrap_or_default(),
            sep = CANONICAL_SEPARATOR,
        );

        // BTreeMap iterates in key order
        std::iter::once(head)
            .chain(
                self.zone
                    .match_labels
                    .iter()
                    .map(|(key, value)| format!("{key}={value}")),
            )
            .collect::<Vec<_>>()
            .join(CANONICAL_SEPARATOR)
    }
}
