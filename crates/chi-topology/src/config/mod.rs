//! Hierarchical configuration layering.
//!
//! A `ClickHouseInstallation` describes placement at four levels:
//!
//! ```yaml
//! spec:
//!   defaults:          # installation-wide fallback
//!     deployment: ...
//!   configuration:
//!     clusters:
//!       - deployment: ...       # cluster
//!         layout:
//!           shards:
//!             - deployment: ... # shard
//!               replicas:
//!                 - deployment: ... # replica
//! ```
//!
//! Every level inherits the values of its parent unless it sets them itself. Inheritance
//! always flows downwards (defaults → cluster → shard → replica), never sideways between
//! siblings. The actual layering is done by [`Merge`](merge::Merge), where the parent is just
//! another layer of defaults.

pub mod merge;
