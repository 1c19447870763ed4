//! Advisory rules over hand-built environments

use std::collections::BTreeSet;

use envdiff_content::ConfigTree;
use envdiff_core::{
    Advisory, AdvisoryKind, AdvisoryRule, Classification, CompareConfig, Comparison, DiffRecord,
    EnvironmentConfig, EnvironmentRoles, RuleContext, RuleRegistry, RuleSpec, Severity,
    WarningKind, diff,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

fn ranked(name: &str, rank: u32, value: Value) -> EnvironmentConfig {
    EnvironmentConfig::new(name, ConfigTree::from(&value)).with_rank(rank)
}

fn production_roles() -> EnvironmentRoles {
    [("prod", "production-like")].into_iter().collect()
}

fn evaluate(environments: Vec<EnvironmentConfig>, roles: &EnvironmentRoles) -> Vec<Advisory> {
    let report = diff(environments).unwrap();
    RuleRegistry::default().evaluate(&report, roles).advisories
}

#[test]
fn test_scaling_outlier_is_flagged() {
    let advisories = evaluate(
        vec![
            ranked("dev", 0, json!({"pool": {"max_connections": 10}})),
            ranked("staging", 1, json!({"pool": {"max_connections": 50}})),
            ranked("prod", 2, json!({"pool": {"max_connections": 5}})),
        ],
        &production_roles(),
    );

    assert_eq!(advisories.len(), 1);
    let advisory = &advisories[0];
    assert_eq!(advisory.kind, AdvisoryKind::InconsistentScaling);
    assert_eq!(advisory.severity, Severity::Medium);
    assert_eq!(advisory.environments, vec!["prod".to_string()]);
    assert!(advisory.description.contains("dev=10, staging=50, prod=5"));
}

#[test]
fn test_scaling_skips_environments_without_the_path() {
    let environments = vec![
        ranked("dev", 0, json!({"pool": {"max_connections": 10}})),
        ranked("qa", 1, json!({"pool": {}})),
        ranked("staging", 2, json!({"pool": {"max_connections": 50}})),
        ranked("prod", 3, json!({"pool": {"max_connections": 5}})),
    ];
    let report = diff(environments).unwrap();
    assert_eq!(
        report.record("pool.max_connections").unwrap().classification,
        Classification::Missing
    );

    let advisories = RuleRegistry::default().evaluate(&report, &production_roles()).advisories;
    assert_eq!(advisories.len(), 1);
    assert_eq!(advisories[0].kind, AdvisoryKind::InconsistentScaling);
    assert_eq!(advisories[0].severity, Severity::Medium);
    assert_eq!(advisories[0].environments, vec!["prod".to_string()]);
    assert!(advisories[0].description.contains("dev=10, staging=50, prod=5"));
}

#[test]
fn test_monotonic_scaling_is_quiet() {
    let advisories = evaluate(
        vec![
            ranked("dev", 0, json!({"workers": 1})),
            ranked("staging", 1, json!({"workers": 2})),
            ranked("prod", 2, json!({"workers": 8})),
        ],
        &production_roles(),
    );
    assert!(advisories.is_empty());
}

#[test]
fn test_scaling_ignores_unranked_environments() {
    let advisories = evaluate(
        vec![
            EnvironmentConfig::new("dev", ConfigTree::from(&json!({"workers": 9}))),
            ranked("staging", 1, json!({"workers": 2})),
            ranked("prod", 2, json!({"workers": 8})),
        ],
        &production_roles(),
    );
    assert!(advisories.is_empty());
}

#[test]
fn test_debug_logging_in_production_is_high() {
    let advisories = evaluate(
        vec![
            ranked("dev", 0, json!({"logging": {"level": "info"}})),
            ranked("prod", 1, json!({"logging": {"level": "DEBUG"}})),
        ],
        &production_roles(),
    );

    assert_eq!(advisories.len(), 1);
    assert_eq!(advisories[0].kind, AdvisoryKind::InsecureDefault);
    assert_eq!(advisories[0].severity, Severity::High);
    assert_eq!(
        advisories[0].description,
        "`logging.level` resolves to `DEBUG` in prod (production-like)"
    );
}

#[test]
fn test_missing_non_sensitive_key_is_medium() {
    let advisories = evaluate(
        vec![
            ranked("dev", 0, json!({"app": {"name": "svc"}})),
            ranked("prod", 1, json!({"app": {}})),
        ],
        &production_roles(),
    );

    assert_eq!(advisories.len(), 1);
    assert_eq!(advisories[0].severity, Severity::Medium);
    assert_eq!(
        advisories[0].recommendation,
        "Define `app.name` explicitly in prod instead of relying on application defaults"
    );
}

#[test]
fn test_no_critical_environment_means_no_missing_advisory() {
    let advisories = evaluate(
        vec![
            ranked("dev", 0, json!({"features": {"beta_flag": true}})),
            ranked("prod", 1, json!({})),
        ],
        &EnvironmentRoles::new(),
    );
    assert!(advisories.is_empty());
}

#[test]
fn test_shared_endpoint_is_not_environment_specific() {
    let advisories = evaluate(
        vec![
            ranked("dev", 0, json!({"cache": {"url": "redis://a"}})),
            ranked("qa", 1, json!({"cache": {"url": "redis://a"}})),
            ranked("prod", 2, json!({"cache": {"url": "redis://b"}})),
        ],
        &production_roles(),
    );
    assert!(advisories.is_empty());
}

#[test]
fn test_unknown_role_mapping_is_a_warning() {
    let report = diff(vec![ranked("dev", 0, json!({"a": 1}))]).unwrap();
    let roles: EnvironmentRoles = [("prodd", "production-like")].into_iter().collect();
    let evaluation = RuleRegistry::default().evaluate(&report, &roles);

    assert!(evaluation.advisories.is_empty());
    assert_eq!(evaluation.warnings.len(), 1);
    assert_eq!(evaluation.warnings[0].kind, WarningKind::InvalidRoleMapping);
    assert_eq!(evaluation.warnings[0].environment, "prodd");
}

struct EveryPath;

impl AdvisoryRule for EveryPath {
    fn id(&self) -> &str {
        "every-path"
    }

    fn evaluate(&self, record: &DiffRecord, _ctx: &RuleContext<'_>) -> Vec<Advisory> {
        vec![Advisory {
            rule: self.id().to_string(),
            kind: AdvisoryKind::Custom("audit".to_string()),
            severity: Severity::Low,
            description: record.path.clone(),
            recommendation: String::new(),
            paths: BTreeSet::from([record.path.clone()]),
            environments: Vec::new(),
        }]
    }
}

#[test]
fn test_evaluation_order_is_path_then_registration() {
    let config = CompareConfig {
        rules: vec![RuleSpec::InsecureDefault(Default::default())],
        ..CompareConfig::default()
    };
    let mut registry = RuleRegistry::from_config(&config);
    registry.register(Box::new(EveryPath));

    let environments = vec![
        ranked("dev", 0, json!({"z": 1, "debug": true, "a": 1})),
        ranked("prod", 1, json!({"z": 1, "debug": false, "a": 1})),
    ];
    let report = Comparison::new(config)
        .with_registry(registry)
        .run_parsed(environments, &production_roles())
        .unwrap();

    let order: Vec<_> = report
        .advisories
        .advisories
        .iter()
        .map(|a| format!("{}:{}", a.rule, a.paths.iter().next().unwrap()))
        .collect();
    assert_eq!(
        order,
        vec!["every-path:a", "insecure-default:debug", "every-path:debug", "every-path:z"]
    );
}
