// tests/config_test.rs
use plugin_release::config::{load_config, Config, StableOverride, CONFIG_FILE_NAME};
use plugin_release::ReleaseError;
use serial_test::serial;
use std::env;
use std::fs;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
[git]
tag_format = "{name}/v{version}"

[commits]
note_keywords = ["BREAKING CHANGE", "DEPRECATED"]
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(temp_file.path().to_str()).unwrap();
    assert_eq!(config.git.tag_format, "{name}/v{version}");
    assert_eq!(config.git.commit_format, "chore(release): {name} v{version}");
    assert_eq!(
        config.commits.note_keywords,
        vec!["BREAKING CHANGE", "DEPRECATED"]
    );
    assert_eq!(config.layout, Config::default().layout);
}

#[test]
fn test_load_fixture() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/custom_config.toml");
    let config = load_config(Some(path)).unwrap();

    assert_eq!(config.layout.plugins_directory, "packages");
    assert_eq!(config.layout.test_apps_directory, "test-apps");
    assert_eq!(config.layout.name_prefix, "vite-plugin-");
    assert_eq!(config.git.tag_format, "{name}@{version}");
    assert_eq!(config.changelog.file, "HISTORY.md");
    assert_eq!(config.changelog.profile_url, "https://www.github.com");
    assert!(config.prerelease.suffixes.contains(&"next".to_string()));
    assert_eq!(config.versioning.stable_override, StableOverride::Honor);
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let err = load_config(Some("/definitely/not/here/plugin-release.toml")).unwrap_err();
    assert!(matches!(err, ReleaseError::Io(_)));
}

#[test]
fn test_invalid_toml_is_an_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[layout\nname_prefix = ").unwrap();
    temp_file.flush().unwrap();

    let err = load_config(temp_file.path().to_str()).unwrap_err();
    assert!(matches!(err, ReleaseError::Config(_)));
}

#[test]
#[serial]
fn test_local_file_is_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "[changelog]\nfile = \"CHANGES.md\"\n",
    )
    .unwrap();

    let previous = env::current_dir().unwrap();
    env::set_current_dir(dir.path()).unwrap();
    let result = load_config(None);
    env::set_current_dir(previous).unwrap();

    assert_eq!(result.unwrap().changelog.file, "CHANGES.md");
}
