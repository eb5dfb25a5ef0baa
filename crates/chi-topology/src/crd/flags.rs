//! Two-valued switches that arrive as loosely typed values on the wire.
//!
//! Users write these as strings, integers or booleans. Each switch is read leniently into a
//! strict enum, and written back in one canonical form, so that a normalized resource reads back
//! to the same value.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Raw wire value of a switch, before it is resolved into its enum.
#[derive(Clone, Debug, Deserialize, Eq, JsonSchema, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
    String(String),
}

/// Whether replicas address each other by fully qualified domain name.
///
/// Only `1` turns this on, everything else (including `true`, `yes` and garbage) reads as
/// [`ReplicasUseFqdn::Disabled`].
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, strum::Display)]
#[serde(from = "FlagValue", into = "FlagValue")]
pub enum ReplicasUseFqdn {
    #[strum(serialize = "1")]
    Enabled,

    #[default]
    #[strum(serialize = "0")]
    Disabled,
}

impl From<FlagValue> for ReplicasUseFqdn {
    fn from(value: FlagValue) -> Self {
        match value {
            FlagValue::Int(1) => Self::Enabled,
            FlagValue::String(s) if s == "1" => Self::Enabled,
            _ => Self::Disabled,
        }
    }
}

impl From<ReplicasUseFqdn> for FlagValue {
    fn from(value: ReplicasUseFqdn) -> Self {
        match value {
            ReplicasUseFqdn::Enabled => Self::Int(1),
            ReplicasUseFqdn::Disabled => Self::Int(0),
        }
    }
}

/// Whether a shard relies on the replicated table engine (`internal_replication` in the
/// ClickHouse `remote_servers` config).
///
/// Only `Disabled` or the written form `false` turn this off, everything else reads as
/// [`InternalReplication::Enabled`].
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize, strum::Display)]
#[serde(from = "FlagValue", into = "FlagValue")]
pub enum InternalReplication {
    #[default]
    #[strum(serialize = "true")]
    Enabled,

    #[strum(serialize = "false")]
    Disabled,
}

impl From<FlagValue> for InternalReplication {
    fn from(value: FlagValue) -> Self {
        match value {
            FlagValue::Bool(false) => Self::Disabled,
            FlagValue::String(s) if s == "Disabled" || s == "false" => Self::Disabled,
            _ => Self::Enabled,
        }
    }
}

impl From<InternalReplication> for FlagValue {
    fn from(value: InternalReplication) -> Self {
        Self::String(value.to_string())
    }
}
