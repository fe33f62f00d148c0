use assert_cmd::Command;

fn lectern() -> Command {
    let mut cmd = Command::cargo_bin("lectern").unwrap();
    cmd.env("LECTERN_CONFIG_DIR", std::env::temp_dir().join("lectern-cli-no-config"))
        .env("RUST_LOG", "off");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let output = lectern().arg("--help").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    for subcommand in ["serve", "migrate", "config"] {
        assert!(stdout.contains(subcommand), "missing {subcommand} in help");
    }
}

#[test]
fn config_prints_resolved_settings() {
    let output = lectern()
        .env("LECTERN_SERVER__PORT", "9191")
        .arg("config")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("port: 9191"));
}

#[test]
fn migrate_applies_catalog_schema() {
    let output = lectern()
        .env("LECTERN_DATABASE__URL", "sqlite::memory:")
        .arg("migrate")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("applied 2 migration(s)"));
}

#[test]
fn unknown_environment_fails() {
    lectern().args(["--env", "qa", "config"]).assert().failure();
}

#[test]
fn config_dir_flag_still_honours_lectern_env() {
    let dir = std::env::temp_dir().join("lectern-cli-explicit-dir");
    let output = lectern()
        .env("LECTERN_ENV", "production")
        .arg("--config-dir")
        .arg(&dir)
        .arg("config")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("environment: Production"));
}

#[test]
fn env_flag_overrides_lectern_env() {
    let output = lectern()
        .env("LECTERN_ENV", "production")
        .args(["--env", "staging", "config"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("environment: Staging"));
}
