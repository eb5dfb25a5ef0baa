use std::collections::BTreeMap;

/// A type that can be merged with itself
///
/// This is intended to be implemented for configuration values that can come from several
/// scopes (replica, shard, cluster, installation defaults) where a tighter scope takes precedence.
///
/// # Example
///
/// ```
/// # use chi_topology::config::merge::{Merge, merge};
/// # use chi_topology::crd::Deployment;
/// let replica = Deployment {
///     pod_template: Some("clickhouse-v23.8".to_string()),
///     ..Deployment::default()
/// };
/// let shard = Deployment {
///     pod_template: Some("clickhouse-v22.3".to_string()),
///     scenario: Some("NodeMonopoly".to_string()),
///     ..Deployment::default()
/// };
///
/// let resolved = merge(replica, &shard);
/// assert_eq!(resolved.pod_template.as_deref(), Some("clickhouse-v23.8"));
/// assert_eq!(resolved.scenario.as_deref(), Some("NodeMonopoly"));
/// ```
pub trait Merge {
    /// Merge with `defaults`, preferring values from `self` if they are set there
    fn merge(&mut self, defaults: &Self);
}

/// A marker trait for types that are merged atomically (as one single value) rather than
/// trying to merge each field individually
pub trait Atomic: Clone {
    /// Whether a present value still counts as unset, and is replaced by the defaults
    fn is_unset(&self) -> bool {
        false
    }
}
impl Atomic for u32 {}

/// An empty string is as good as no string at all
impl Atomic for String {
    fn is_unset(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Atomic> Merge for Option<T> {
    fn merge(&mut self, defaults: &Self) {
        if self.as_ref().is_none_or(Atomic::is_unset) {
            self.clone_from(defaults);
        }
    }
}

/// Label maps are inherited as a whole: an empty map takes over all of `defaults`, a non-empty
/// map keeps exactly its own entries.
impl Merge for BTreeMap<String, String> {
    fn merge(&mut self, defaults: &Self) {
        if self.is_empty() {
            self.clone_from(defaults);
        }
    }
}

/// Moving version of [`Merge::merge`], returning the fully resolved value
pub fn merge<T: Merge>(mut overrides: T, defaults: &T) -> T {
    overrides.merge(defaults);
    overrides
}

/// Merges `defaults` into `this` if there are any, does nothing otherwise
pub fn merge_from<T: Merge>(this: &mut T, defaults: Option<&T>) {
    if let Some(defaults) = defaults {
        this.merge(defaults);
    }
}
