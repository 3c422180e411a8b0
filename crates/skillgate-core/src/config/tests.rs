use std::io::Write;

use serial_test::serial;

use super::*;

const ENV_KEYS: [&str; 6] = [
    "SKILLGATE_SKILL_PATHS",
    "SKILLGATE_INCLUDE_PROJECT",
    "SKILLGATE_SIMILARITY_THRESHOLD",
    "SKILLGATE_STRICT",
    "SKILLGATE_VERBOSE",
    "SKILLGATE_ASSUME_YES",
];

fn clear_env() {
    for key in ENV_KEYS {
        unsafe { std::env::remove_var(key) };
    }
}

#[test]
fn defaults() {
    let config = Config::default();
    assert_eq!(
        config.skills.paths,
        ["~/.claude/skills", "~/.claude/commands"]
    );
    assert!(config.skills.include_project);
    assert!((config.similarity.threshold - 0.5).abs() < f64::EPSILON);
    assert!(!config.validation.strict);
    assert!(!config.validation.verbose);
    assert!(!config.gate.assume_yes);
    assert!(config.validate().is_ok());
}

#[test]
#[serial]
fn defaults_when_file_missing() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
#[serial]
fn parse_valid_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.toml");
    let mut f = std::fs::File::create(&path).unwrap();
    write!(
        f,
        r#"
[skills]
paths = ["./skills"]
include_project = false

[similarity]
threshold = 0.35

[validation]
strict = true
"#
    )
    .unwrap();

    clear_env();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.skills.paths, ["./skills"]);
    assert!(!config.skills.include_project);
    assert!((config.similarity.threshold - 0.35).abs() < f64::EPSILON);
    assert!(config.validation.strict);
    assert!(!config.validation.verbose);
    assert!(!config.gate.assume_yes);
}

#[test]
#[serial]
fn empty_file_uses_section_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.toml");
    std::fs::write(&path, "").unwrap();

    clear_env();

    assert_eq!(Config::load(&path).unwrap(), Config::default());
}

#[test]
#[serial]
fn invalid_toml_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[similarity\nthreshold = ").unwrap();

    clear_env();

    let err = Config::load(&path).unwrap_err();
    assert!(err.to_string().contains("failed to parse config file"));
}

#[test]
#[serial]
fn env_overrides() {
    clear_env();
    let mut config = Config::default();

    unsafe {
        std::env::set_var("SKILLGATE_SKILL_PATHS", "/a, /b ,,");
        std::env::set_var("SKILLGATE_SIMILARITY_THRESHOLD", "0.8");
        std::env::set_var("SKILLGATE_STRICT", "true");
        std::env::set_var("SKILLGATE_ASSUME_YES", "true");
    }
    config.apply_env_overrides();
    clear_env();

    assert_eq!(config.skills.paths, ["/a", "/b"]);
    assert!((config.similarity.threshold - 0.8).abs() < f64::EPSILON);
    assert!(config.validation.strict);
    assert!(config.gate.assume_yes);
}

#[test]
#[serial]
fn invalid_env_values_are_ignored() {
    clear_env();
    let mut config = Config::default();

    unsafe {
        std::env::set_var("SKILLGATE_SIMILARITY_THRESHOLD", "high");
        std::env::set_var("SKILLGATE_VERBOSE", "yes please");
    }
    config.apply_env_overrides();
    clear_env();

    assert!((config.similarity.threshold - 0.5).abs() < f64::EPSILON);
    assert!(!config.validation.verbose);
}

#[test]
fn threshold_out_of_range_is_rejected() {
    let mut config = Config::default();
    config.similarity.threshold = 1.5;
    assert!(config.validate().is_err());
    config.similarity.threshold = -0.1;
    assert!(config.validate().is_err());
    config.similarity.threshold = 1.0;
    assert!(config.validate().is_ok());
}

#[test]
fn expand_home_prefix() {
    let Some(home) = dirs::home_dir() else {
        return;
    };
    assert_eq!(expand_home("~/.claude/skills"), home.join(".claude/skills"));
    assert_eq!(expand_home("~"), home);
    assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
    assert_eq!(expand_home("~other/x"), PathBuf::from("~other/x"));
}

#[test]
fn project_root_added_when_present() {
    let cwd = tempfile::tempdir().unwrap();
    let mut config = Config::default();
    config.skills.paths = vec!["/shared/skills".into()];

    assert_eq!(config.skill_roots(cwd.path()), [PathBuf::from("/shared/skills")]);

    std::fs::create_dir_all(cwd.path().join(PROJECT_SKILLS_DIR)).unwrap();
    let roots = config.skill_roots(cwd.path());
    assert_eq!(roots.len(), 2);
    assert_eq!(roots[1], cwd.path().join(PROJECT_SKILLS_DIR));

    config.skills.include_project = false;
    assert_eq!(config.skill_roots(cwd.path()).len(), 1);
}
