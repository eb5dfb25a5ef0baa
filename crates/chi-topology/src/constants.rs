/// Scenario assigned to the installation-wide default deployment when none is given.
pub const DEPLOYMENT_SCENARIO_DEFAULT: &str = "Default";

/// One ClickHouse server per node, placed with pod anti-affinity.
pub const DEPLOYMENT_SCENARIO_NODE_MONOPOLY: &str = "NodeMonopoly";

/// Separator between the fields of a canonical deployment string.
pub const CANONICAL_SEPARATOR: &str = "::";

/// Number of trailing fingerprint characters kept in a short deployment ID.
pub const SHORT_ID_LENGTH: usize = 10;

/// Standard layouts default to this many shards and replicas per shard.
pub const DEFAULT_LAYOUT_COUNT: usize = 1;
