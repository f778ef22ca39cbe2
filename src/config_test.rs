use std::collections::HashMap;

use super::*;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_apply_when_only_pack_is_set() {
    let config = Config::from_lookup(lookup(&[("IDC_PACK", "pack.json")])).unwrap();
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.dashboard_dir, PathBuf::from("dashboards"));
    assert_eq!(config.pack_path, PathBuf::from("pack.json"));
    assert!(!config.cors);
}

#[test]
fn pack_path_is_required() {
    let err = Config::from_lookup(lookup(&[])).unwrap_err();
    assert!(matches!(err, ConfigError::Missing { var: "IDC_PACK" }));
    let err = Config::from_lookup(lookup(&[("IDC_PACK", "  ")])).unwrap_err();
    assert!(matches!(err, ConfigError::Missing { .. }));
}

#[test]
fn explicit_values_override_defaults() {
    let config = Config::from_lookup(lookup(&[
        ("IDC_PACK", "/srv/pack.json"),
        ("PORT", "8080"),
        ("IDC_DASHBOARD_DIR", "/srv/dashboards"),
        ("IDC_CORS", "TRUE"),
    ]))
    .unwrap();
    assert_eq!(config.port, 8080);
    assert_eq!(config.dashboard_dir, PathBuf::from("/srv/dashboards"));
    assert!(config.cors);
}

#[test]
fn invalid_port_is_rejected() {
    let err = Config::from_lookup(lookup(&[("IDC_PACK", "p"), ("PORT", "http")])).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { var: "PORT", .. }));
    assert_eq!(err.to_string(), "invalid PORT: http");
}

#[test]
fn cors_flag_parsing() {
    for (raw, expected) in [("1", true), ("on", true), ("0", false), ("off", false), ("", false)] {
        let config = Config::from_lookup(lookup(&[("IDC_PACK", "p"), ("IDC_CORS", raw)])).unwrap();
        assert_eq!(config.cors, expected, "{raw}");
    }
    assert!(Config::from_lookup(lookup(&[("IDC_PACK", "p"), ("IDC_CORS", "maybe")])).is_err());
}
