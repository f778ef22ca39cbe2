use super::*;

const PACK: &str = r#"{
  "classes": {
    "gauge": {
      "description": "Gauge",
      "group": "Meters",
      "defaults": {"oid": ""},
      "props": [{"name": "oid", "kind": "oid_subscribed"}, {"name": "alarm", "kind": "oid"}],
      "default_size": {"x": 100, "y": 50}
    },
    "label": {
      "description": "Text label",
      "group": "Text",
      "defaults": {"text": ""},
      "props": [{"name": "text", "kind": "string"}],
      "default_size": {"x": 20, "y": 20}
    }
  }
}"#;

const PLANT: &str = r#"{
  "name": "Plant",
  "viewport": {"x": 400, "y": 300},
  "grid": 10,
  "elements": [
    {"kind": "gauge", "params": {"oid": "sensor:${unit}/temp", "alarm": "lvar:${unit}/alarm"}, "position": {"x": 13, "y": 27}},
    {"kind": "gauge", "params": {"oid": "sensor:${unit}/temp"}, "position": {"x": 390, "y": 290}},
    {"kind": "label", "params": {"text": "${title}"}, "position": {"x": 0, "y": 0}}
  ]
}"#;

fn pack() -> ElementPack {
    ElementPack::from_json(PACK).unwrap()
}

fn plant() -> DashboardData {
    DashboardData::from_source(PLANT).unwrap()
}

#[test]
fn var_arguments_parse() {
    assert_eq!(parse_var("unit=u1"), Ok(("unit".to_owned(), "u1".to_owned())));
    assert_eq!(parse_var("path=a=b"), Ok(("path".to_owned(), "a=b".to_owned())));
    assert!(parse_var("novalue").is_err());
    assert!(parse_var("=x").is_err());
}

#[test]
fn cli_accepts_pack_after_subcommand() {
    let cli = Cli::try_parse_from(["idc-cli", "oids", "plant.json", "--pack", "pack.json", "--var", "unit=u1"]).unwrap();
    assert_eq!(cli.pack, Some(PathBuf::from("pack.json")));
    let Command::Oids { file, vars } = cli.command else {
        panic!("expected oids command");
    };
    assert_eq!(file, PathBuf::from("plant.json"));
    assert_eq!(vars, [("unit".to_owned(), "u1".to_owned())]);
}

#[test]
fn cli_rejects_malformed_var() {
    assert!(Cli::try_parse_from(["idc-cli", "remote", "view", "plant", "--var", "unit"]).is_err());
}

#[test]
fn summary_counts_kinds_and_variables() {
    let summary = summarize(&plant());
    assert_eq!(summary["name"], "Plant");
    assert_eq!(summary["elements"], 3);
    assert_eq!(summary["kinds"], json!({"gauge": 2, "label": 1}));
    assert_eq!(summary["variables"], json!(["title", "unit"]));
    assert_eq!(summary["viewport"], json!({"x": 400.0, "y": 300.0}));
}

#[test]
fn oids_are_deduplicated_and_substituted() {
    let vars = Variables::from([("unit".to_owned(), "u7".to_owned())]);
    assert_eq!(subscribed_oids(&plant(), &pack(), vars), ["sensor:u7/temp"]);
}

#[test]
fn align_clips_and_snaps() {
    let aligned = align_dashboard(plant(), pack());
    let positions: Vec<(f64, f64)> = aligned.elements.iter().map(|el| (el.position.x, el.position.y)).collect();
    assert_eq!(positions, [(10.0, 30.0), (300.0, 250.0), (0.0, 0.0)]);
    assert_eq!(aligned.name, "Plant");
    assert_eq!(aligned.grid, 10);
}

#[test]
fn unknown_kinds_are_reported_once() {
    let mut data = plant();
    data.elements[0].kind = "dial".into();
    data.elements[1].kind = "dial".into();
    assert_eq!(unknown_kinds(&data, &pack()), ["dial"]);
    assert!(unknown_kinds(&plant(), &pack()).is_empty());
}

#[test]
fn palette_lines_group_classes() {
    let lines = palette_lines(&pack());
    assert_eq!(lines[0], "Meters");
    assert!(lines[1].trim_start().starts_with("gauge"));
    assert!(lines[1].ends_with("Gauge"));
    assert_eq!(lines[2], "Text");
}

#[test]
fn read_dashboard_checks_extension_and_content() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("plant.json");
    std::fs::write(&good, PLANT).unwrap();
    assert_eq!(read_dashboard(&good).unwrap().name, "Plant");

    let wrong_ext = dir.path().join("plant.yaml");
    std::fs::write(&wrong_ext, PLANT).unwrap();
    assert!(matches!(read_dashboard(&wrong_ext), Err(CliError::UnsupportedFile(_))));

    let broken = dir.path().join("broken.txt");
    std::fs::write(&broken, "{").unwrap();
    assert!(matches!(read_dashboard(&broken), Err(CliError::InvalidDashboard { .. })));

    let missing = dir.path().join("missing.json");
    assert!(matches!(read_dashboard(&missing), Err(CliError::Io { .. })));
}

#[test]
fn commands_needing_a_pack_say_so() {
    let ctx = CliContext { base_url: "http://localhost".into(), pack: None };
    assert!(matches!(load_pack(&ctx), Err(CliError::MissingPack)));
}

#[test]
fn api_urls_join_cleanly() {
    let ctx = CliContext { base_url: "http://localhost:3000/".into(), pack: None };
    assert_eq!(api_url(&ctx, "/api/dashboards"), "http://localhost:3000/api/dashboards");
}

#[test]
fn remote_names_must_be_path_safe() {
    assert_eq!(parse_dashboard_name("plant_1-a"), Ok("plant_1-a".to_owned()));
    for bad in ["", "../etc", "a b", "a/b", "a?b", "a%2F"] {
        assert!(parse_dashboard_name(bad).is_err(), "{bad}");
    }
    assert!(Cli::try_parse_from(["idc-cli", "remote", "get", "../secrets"]).is_err());
    assert!(Cli::try_parse_from(["idc-cli", "remote", "view", "a?x=1"]).is_err());
    let cli = Cli::try_parse_from(["idc-cli", "remote", "get", "plant"]).unwrap();
    let Command::Remote(RemoteCommand { command: RemoteSubcommand::Get { name } }) = cli.command else {
        panic!("expected remote get");
    };
    assert_eq!(name, "plant");
}
