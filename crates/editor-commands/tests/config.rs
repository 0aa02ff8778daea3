use editor_commands::{ConfigError, EngineConfig, Platform};
use pretty_assertions::assert_eq;

#[test]
fn test_empty_yaml_is_default() {
    assert_eq!(EngineConfig::from_yaml_str("").unwrap(), EngineConfig::default());
    assert_eq!(
        EngineConfig::from_yaml_str("{}").unwrap(),
        EngineConfig::default()
    );
}

#[test]
fn test_partial_yaml_keeps_other_defaults() {
    let config = EngineConfig::from_yaml_str("platform: linux\ncopy_with_empty_selection: false\n")
        .unwrap();

    assert_eq!(config.platform, Platform::Primary);
    assert!(!config.copy_with_empty_selection);
    assert!(config.emit_exec_events);
}

#[test]
fn test_platform_aliases() {
    for (text, platform) in [
        ("primary", Platform::Primary),
        ("windows", Platform::Primary),
        ("secondary", Platform::Secondary),
        ("macos", Platform::Secondary),
    ] {
        let config = EngineConfig::from_yaml_str(&format!("platform: {text}")).unwrap();
        assert_eq!(config.platform, platform, "{text}");
    }
}

#[test]
fn test_invalid_yaml_is_reported() {
    let err = EngineConfig::from_yaml_str("platform: amiga").unwrap_err();
    assert!(matches!(err, ConfigError::Yaml(_)));

    let err = EngineConfig::from_yaml_str("emit_exec_events: [1, 2]").unwrap_err();
    assert!(matches!(err, ConfigError::Yaml(_)));
}

#[test]
fn test_load_from_path() {
    let dir = std::env::temp_dir().join(format!("editor-commands-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("engine.yaml");
    std::fs::write(&path, "platform: mac\nemit_exec_events: false\n").unwrap();

    let config = EngineConfig::load_from_path(&path).unwrap();
    assert_eq!(config.platform, Platform::Secondary);
    assert!(!config.emit_exec_events);

    let missing = EngineConfig::load_from_path(dir.join("missing.yaml")).unwrap_err();
    assert!(matches!(missing, ConfigError::Io(_)));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_config_round_trips_through_yaml() {
    let config = EngineConfig::default().with_platform(Platform::Secondary);
    let yaml = serde_yaml::to_string(&config).unwrap();
    assert_eq!(EngineConfig::from_yaml_str(&yaml).unwrap(), config);
}
