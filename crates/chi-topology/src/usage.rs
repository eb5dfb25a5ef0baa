use std::collections::{BTreeMap, btree_map};

use crate::fingerprint::Fingerprint;

/// Number of uses per deployment [`Fingerprint`].
///
/// Within a cluster this counts how often each deployment occurs. Aggregated over an installation
/// with [`DeploymentUsage::merge_max`], it tells how many instances of each deployment are needed
/// to satisfy the cluster that uses it most.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DeploymentUsage(BTreeMap<Fingerprint, usize>);

impl DeploymentUsage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one more use of `fingerprint` and returns the updated count.
    pub fn increment(&mut self, fingerprint: &Fingerprint) -> usize {
        let count = self.0.entry(fingerprint.clone()).or_default();
        *count += 1;
        *count
    }

    /// Takes over every count of `other` that is bigger than the one recorded here.
    pub fn merge_max(&mut self, other: &Self) {
        for (fingerprint, &count) in &other.0 {
            match self.0.entry(fingerprint.clone()) {
                btree_map::Entry::Occupied(mut entry) => {
                    let current = entry.get_mut();
                    *current = (*current).max(count);
                }
                btree_map::Entry::Vacant(entry) => {
                    entry.insert(count);
                }
            }
        }
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> usize {
        self.0.get(fingerprint).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Fingerprint, usize)> {
        self.0.iter().map(|(fingerprint, &count)| (fingerprint, count))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }
}

impl FromIterator<(Fingerprint, usize)> for DeploymentUsage {
    fn from_iter<I: IntoIterator<Item = (Fingerprint, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
