use std::collections::BTreeSet;

use chi_topology::{
    constants::{DEPLOYMENT_SCENARIO_DEFAULT, DEPLOYMENT_SCENARIO_NODE_MONOPOLY},
    crd::{ClickHouseInstallation, InternalReplication, LayoutType, ReplicasUseFqdn},
    identity::{check_short_id_collisions, full_deployment_id},
    normalize::normalize_installation,
};
use indoc::indoc;

const MANIFEST: &str = indoc! {"
    apiVersion: clickhouse.altinity.com/v1
    kind: ClickHouseInstallation
    metadata:
      name: analytics
      namespace: clickhouse
    spec:
      defaults:
        replicasUseFQDN: 0
        deployment:
          podTemplate: clickhouse-v23.8
          volumeClaimTemplate: default-storage
      configuration:
        clusters:
          - name: events
            layout:
              shardsCount: 3
          - name: reports
            deployment:
              scenario: NodeMonopoly
              zone:
                matchLabels:
                  clickhouse.altinity.com/zone: zone4
                  clickhouse.altinity.com/kind: ssd
            layout:
              type: Advanced
              shards:
                - definitionType: ReplicasCount
                  replicasCount: 2
                - definitionType: Replicas
                  internalReplication: Disabled
                  replicas:
                    - deployment:
                        podTemplate: clickhouse-v22.3
                    - deployment:
                        zone:
                          matchLabels:
                            clickhouse.altinity.com/kind: ssd
                            clickhouse.altinity.com/zone: zone4
                    - deployment:
                        scenario: Default
"};

fn load() -> ClickHouseInstallation {
    serde_yaml::from_str(MANIFEST).expect("manifest must deserialize")
}

#[test]
fn normalizes_multi_cluster_installation() {
    let mut chi = load();
    let usage = normalize_installation(&mut chi);

    assert_eq!(
        chi.spec.defaults.replicas_use_fqdn,
        Some(ReplicasUseFqdn::Disabled)
    );
    assert_eq!(
        chi.spec.defaults.deployment.scenario.as_deref(),
        Some(DEPLOYMENT_SCENARIO_DEFAULT)
    );

    let events = &chi.spec.configuration.clusters[0];
    assert_eq!(events.layout.layout_type, LayoutType::Standard);
    assert_eq!(events.layout.shards.len(), 3);
    assert_eq!(events.layout.replicas_count, 1);

    let reports = &chi.spec.configuration.clusters[1];
    let shards = &reports.layout.shards;
    assert_eq!(shards[0].replicas.len(), 2);
    assert_eq!(
        shards[0].internal_replication,
        Some(InternalReplication::Enabled)
    );
    assert_eq!(shards[1].replicas_count, 3);
    assert_eq!(
        shards[1].internal_replication,
        Some(InternalReplication::Disabled)
    );

    // Explicit zone with the same labels in a different order is the same deployment
    let counted = &shards[0].replicas[0].deployment;
    let relisted = &shards[1].replicas[1].deployment;
    assert_eq!(
        counted.scenario.as_deref(),
        Some(DEPLOYMENT_SCENARIO_NODE_MONOPOLY)
    );
    assert_eq!(counted.fingerprint, relisted.fingerprint);
    assert_eq!(relisted.index, Some(2));

    let pinned = &shards[1].replicas[0].deployment;
    assert_eq!(pinned.pod_template.as_deref(), Some("clickhouse-v22.3"));
    assert_eq!(
        pinned.volume_claim_template.as_deref(),
        Some("default-storage")
    );
    assert_eq!(pinned.zone, counted.zone);

    let default_scenario = &shards[1].replicas[2].deployment;
    let events_deployment = &events.layout.shards[0].replicas[0].deployment;
    assert_ne!(default_scenario.fingerprint, events_deployment.fingerprint);

    // events: one deployment used 3 times
    // reports: NodeMonopoly/zone4 used 3 times, v22.3 once, Default/zone4 once
    let counts: Vec<_> = usage.iter().map(|(_, count)| count).collect();
    assert_eq!(usage.len(), 4);
    assert_eq!(usage.total(), 8);
    assert_eq!(counts.iter().filter(|&&count| count == 3).count(), 2);
    assert_eq!(
        usage.get(
            events_deployment
                .fingerprint
                .as_ref()
                .expect("replica must have a fingerprint")
        ),
        3
    );
}

#[test]
fn full_deployment_ids_are_unique() {
    let mut chi = load();
    let usage = normalize_installation(&mut chi);
    check_short_id_collisions(&usage).expect("short IDs must not collide");

    let ids: Vec<_> = chi
        .replicas()
        .map(|r| full_deployment_id(r.replica).expect("replica must be normalized"))
        .collect();
    let unique: BTreeSet<_> = ids.iter().collect();

    assert_eq!(ids.len(), 8);
    assert_eq!(unique.len(), ids.len());
    for id in &ids {
        let (short_id, index) = id.rsplit_once('-').expect("ID must contain an index");
        assert_eq!(short_id.len(), 10);
        assert!(index.parse::<usize>().is_ok());
    }
}

#[test]
fn fingerprints_depend_on_installation_identity() {
    let mut original = load();
    let mut renamed = load();
    renamed.metadata.name = Some("analytics-staging".to_string());

    let original_usage = normalize_installation(&mut original);
    let renamed_usage = normalize_installation(&mut renamed);

    assert_eq!(original_usage.len(), renamed_usage.len());
    assert!(
        original_usage
            .iter()
            .all(|(fingerprint, _)| renamed_usage.get(fingerprint) == 0)
    );

    // Indices only depend on the structure
    let indices = |chi: &ClickHouseInstallation| {
        chi.replicas()
            .map(|r| r.replica.deployment.index)
            .collect::<Vec<_>>()
    };
    assert_eq!(indices(&original), indices(&renamed));
}

#[test]
fn normalized_manifest_round_trips() {
    let mut chi = load();
    let usage = normalize_installation(&mut chi);

    let yaml = serde_yaml::to_string(&chi).expect("installation must serialize");
    let mut reread: ClickHouseInstallation =
        serde_yaml::from_str(&yaml).expect("normalized installation must deserialize");

    assert_eq!(reread, chi);
    assert_eq!(normalize_installation(&mut reread), usage);
    assert_eq!(reread, chi);
}
