use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write an executable shell script into `dir`.
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A fake pip that logs its arguments next to itself, prints `stdout` and exits with `rc`.
fn fake_pip(dir: &Path, stdout: &str, rc: i32) -> PathBuf {
    let log = dir.join("pip.log");
    write_script(
        dir,
        "pip",
        &format!(
            "echo \"$@\" >> '{}'\nprintf '%s\\n' '{}'\nexit {}",
            log.display(),
            stdout,
            rc
        ),
    );
    log
}

fn pipstate(bin_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pipstate").unwrap();
    cmd.env("PATH", format!("{}:/usr/bin:/bin", bin_dir.display()))
        .env_remove("PIPSTATE_LOG")
        .env_remove("RUST_LOG")
        .arg("--no-config");
    cmd
}

fn payload(output: &std::process::Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim()).expect("stdout should be a single JSON object")
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("pipstate").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: pipstate"))
        .stdout(predicate::str::contains("--requirements"))
        .stdout(predicate::str::contains("--virtualenv-site-packages"))
        .stdout(predicate::str::contains("--check"));
}

#[test]
fn test_install_pinned_version() {
    let temp_dir = TempDir::new().unwrap();
    let log = fake_pip(temp_dir.path(), "Successfully installed flask-0.8", 0);

    let output = pipstate(temp_dir.path())
        .args(["--name", "flask", "--version", "0.8"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let result = payload(&output);
    assert_eq!(result["changed"], true);
    assert_eq!(result["name"], "flask");
    assert_eq!(result["version"], "0.8");
    assert_eq!(result["state"], "present");
    assert!(
        result["cmd"]
            .as_str()
            .unwrap()
            .ends_with("pip install --use-mirrors flask==0.8")
    );

    let logged = fs::read_to_string(log).unwrap();
    assert_eq!(logged.trim(), "install --use-mirrors flask==0.8");
}

#[test]
fn test_already_installed_is_unchanged() {
    let temp_dir = TempDir::new().unwrap();
    fake_pip(temp_dir.path(), "Requirement already satisfied: flask", 0);

    let output = pipstate(temp_dir.path())
        .args(["--name", "flask", "--use-mirrors", "no"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let result = payload(&output);
    assert_eq!(result["changed"], false);
    assert!(!result["cmd"].as_str().unwrap().contains("--use-mirrors"));
}

#[test]
fn test_uninstall_of_missing_package_succeeds() {
    let temp_dir = TempDir::new().unwrap();
    let log = fake_pip(
        temp_dir.path(),
        "Cannot uninstall requirement flask, not installed",
        1,
    );

    let output = pipstate(temp_dir.path())
        .args(["--name", "flask", "--state", "absent"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let result = payload(&output);
    assert_eq!(result["changed"], false);
    assert_eq!(result["state"], "absent");

    let logged = fs::read_to_string(log).unwrap();
    assert_eq!(logged.trim(), "uninstall -y flask");
}

#[test]
fn test_uninstall_reports_change() {
    let temp_dir = TempDir::new().unwrap();
    fake_pip(temp_dir.path(), "Successfully uninstalled flask", 0);

    let output = pipstate(temp_dir.path())
        .args(["--name", "flask", "--state", "absent"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(payload(&output)["changed"], true);
}

#[test]
fn test_pip_failure() {
    let temp_dir = TempDir::new().unwrap();
    fake_pip(temp_dir.path(), "No matching distribution found for nosuchpkg", 1);

    let output = pipstate(temp_dir.path())
        .args(["--name", "nosuchpkg"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(exitcode::SOFTWARE));
    let result = payload(&output);
    assert_eq!(result["failed"], true);
    assert_eq!(result["rc"], 1);
    assert!(result["cmd"].as_str().unwrap().contains("install"));
    assert!(
        result["msg"]
            .as_str()
            .unwrap()
            .contains("No matching distribution found")
    );
}

#[test]
fn test_latest_with_version_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let log = fake_pip(temp_dir.path(), "Successfully installed flask", 0);

    let output = pipstate(temp_dir.path())
        .args(["--name", "flask", "--version", "0.8", "--state", "latest"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(exitcode::USAGE));
    assert!(
        payload(&output)["msg"]
            .as_str()
            .unwrap()
            .contains("state=latest")
    );
    assert!(!log.exists());
}

#[test]
fn test_embedded_version_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let log = fake_pip(temp_dir.path(), "", 0);

    let output = pipstate(temp_dir.path())
        .args(["--name", "flask==0.8"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(exitcode::USAGE));
    assert!(!log.exists());
}

#[test]
fn test_name_and_requirements_conflict() {
    let temp_dir = TempDir::new().unwrap();

    pipstate(temp_dir.path())
        .args(["--name", "flask", "--requirements", "/tmp/reqs.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_missing_pip() {
    let temp_dir = TempDir::new().unwrap();

    let mut cmd = Command::cargo_bin("pipstate").unwrap();
    let output = cmd
        .env("PATH", temp_dir.path())
        .args(["--no-config", "--name", "flask"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(exitcode::UNAVAILABLE));
    assert_eq!(
        payload(&output)["msg"],
        "Failed to find required executable pip"
    );
}

#[test]
fn test_check_mode_with_missing_virtualenv() {
    let temp_dir = TempDir::new().unwrap();
    let bin_dir = temp_dir.path().join("bin");
    fs::create_dir(&bin_dir).unwrap();
    let virtualenv_log = bin_dir.join("virtualenv.log");
    write_script(
        &bin_dir,
        "virtualenv",
        &format!("echo \"$@\" >> '{}'", virtualenv_log.display()),
    );
    let pip_log = fake_pip(&bin_dir, "Successfully installed flask", 0);
    let env = temp_dir.path().join("venv");

    let output = pipstate(&bin_dir)
        .args(["--name", "flask", "--check", "--virtualenv"])
        .arg(&env)
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(payload(&output)["changed"], true);
    assert!(!env.exists());
    assert!(!virtualenv_log.exists());
    assert!(!pip_log.exists());
}

#[test]
fn test_requirements_into_new_virtualenv() {
    let temp_dir = TempDir::new().unwrap();
    let bin_dir = temp_dir.path().join("bin");
    fs::create_dir(&bin_dir).unwrap();

    // system pip must not be picked once the virtualenv exists
    let system_log = fake_pip(&bin_dir, "wrong pip", 1);

    // creates <env>/bin/activate and a pip that logs to <env>/pip.log
    write_script(
        &bin_dir,
        "virtualenv",
        r#"env_dir="$1"
if [ "$1" = "--system-site-packages" ]; then env_dir="$2"; fi
mkdir -p "$env_dir/bin"
touch "$env_dir/bin/activate"
printf '#!/bin/sh\necho "$@" >> "%s/pip.log"\necho "Successfully installed flask requests"\n' "$env_dir" > "$env_dir/bin/pip"
chmod +x "$env_dir/bin/pip"
echo "created virtual environment""#,
    );

    let env = temp_dir.path().join("venv");
    let requirements = temp_dir.path().join("reqs.txt");
    fs::write(&requirements, "flask\nrequests\n").unwrap();

    let output = pipstate(&bin_dir)
        .args(["--virtualenv-site-packages", "--requirements"])
        .arg(&requirements)
        .arg("--virtualenv")
        .arg(&env)
        .output()
        .unwrap();

    assert!(output.status.success(), "{:?}", output);
    let result = payload(&output);
    assert_eq!(result["changed"], true);
    assert_eq!(result["virtualenv"], &*env.to_string_lossy());

    let cmd = result["cmd"].as_str().unwrap();
    assert!(cmd.starts_with(&env.join("bin/pip").to_string_lossy().into_owned()));
    assert!(cmd.ends_with(&format!("-r {}", requirements.display())));

    let stdout = result["stdout"].as_str().unwrap();
    assert!(stdout.starts_with("created virtual environment"));
    assert!(stdout.contains("Successfully installed flask requests"));

    assert!(env.join("bin/activate").exists());
    assert!(!system_log.exists());
    let logged = fs::read_to_string(env.join("pip.log")).unwrap();
    assert!(logged.contains("install --use-mirrors -r"));
}

#[test]
fn test_virtualenv_creation_failure() {
    let temp_dir = TempDir::new().unwrap();
    let bin_dir = temp_dir.path().join("bin");
    fs::create_dir(&bin_dir).unwrap();
    write_script(&bin_dir, "virtualenv", "echo 'no interpreter' >&2\nexit 3");
    let pip_log = fake_pip(&bin_dir, "", 0);

    let output = pipstate(&bin_dir)
        .args(["--name", "flask", "--virtualenv"])
        .arg(temp_dir.path().join("venv"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(exitcode::SOFTWARE));
    let result = payload(&output);
    assert_eq!(result["stderr"], "no interpreter\n");
    assert!(result["cmd"].as_str().unwrap().contains("virtualenv"));
    assert!(!pip_log.exists());
}
