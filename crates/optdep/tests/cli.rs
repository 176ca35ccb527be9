use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn optdep(config_dir: &std::path::Path) -> Result<Command, Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("optdep")?;
    cmd.arg("--config-dir").arg(config_dir);
    Ok(cmd)
}

#[test]
fn test_ping_command() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("optdep")?;
    cmd.arg("--ping");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("pong"))
        .stdout(predicate::str::contains("Initializing application...").not());

    Ok(())
}

#[test]
fn test_no_args_runs_normally() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = tempdir()?;

    optdep(config_dir.path())?
        .assert()
        .success()
        .stdout(predicate::str::contains("Initializing application..."))
        .stdout(predicate::str::contains("Started 3 plugins"))
        .stdout(predicate::str::contains("IpsumClass: 1 provider(s), 1 subscriber(s)"))
        .stdout(predicate::str::contains("Shutting down application..."))
        .stdout(predicate::str::contains("pong").not());

    Ok(())
}

#[test]
fn test_list_shows_registered_apis() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = tempdir()?;

    optdep(config_dir.path())?
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("IpsumClass"))
        .stdout(predicate::str::contains("core-logging"))
        .stdout(predicate::str::contains("IpsumMethod:"))
        .stdout(predicate::str::contains("IsIpsumActive: () -> bool (0 args)"));

    Ok(())
}

#[test]
fn test_invoke_broadcasts_string_arguments() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = tempdir()?;

    optdep(config_dir.path())?
        .args(["invoke", "IpsumClass", "IpsumMethod", "a", "b", "c"])
        .assert()
        .success()
        .stdout(predicate::str::contains("IpsumMethod on ipsum_provider::IpsumApi: ok"));

    Ok(())
}

#[test]
fn test_invoke_failures_exit_nonzero() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = tempdir()?;

    optdep(config_dir.path())?
        .args(["invoke", "IpsumClass", "Missing"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Missing on ipsum_provider::IpsumApi: not provided"));

    optdep(config_dir.path())?
        .args(["invoke", "NoSuchApi", "Anything"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("No provider registered for 'NoSuchApi'."));

    Ok(())
}

#[test]
fn test_failing_method_reports_its_error() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = tempdir()?;

    optdep(config_dir.path())?
        .args(["invoke", "IpsumClass", "Greet", " "])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Method 'Greet' failed: Greet needs a name"));

    Ok(())
}

#[test]
fn test_config_init_writes_application_config_once() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = tempdir()?;

    optdep(config_dir.path())?
        .args(["config", "--init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote optdep.json"))
        .stdout(predicate::str::contains("application (1)"))
        .stdout(predicate::str::contains("  optdep: log_format, log_level, report_replay_failures"));
    assert!(config_dir.path().join("optdep.json").is_file());

    optdep(config_dir.path())?
        .args(["config", "--init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Application config already exists"));

    Ok(())
}

#[test]
fn test_config_lists_plugin_layers() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = tempdir()?;
    let user_dir = config_dir.path().join("plugins").join("user");
    std::fs::create_dir_all(&user_dir)?;
    std::fs::write(user_dir.join("ipsum-provider.json"), r#"{ "greeting": "hey" }"#)?;

    optdep(config_dir.path())?
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("application (0)"))
        .stdout(predicate::str::contains("plugin defaults (0)"))
        .stdout(predicate::str::contains("plugin user (1)"))
        .stdout(predicate::str::contains("  ipsum-provider: greeting"));

    Ok(())
}
