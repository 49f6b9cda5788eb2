use assert_cmd::Command;
use predicates::prelude::*;

/// Check if running as root
fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

fn burrow() -> Command {
    Command::new(env!("CARGO_BIN_EXE_burrow"))
}

#[test]
fn test_help_command() {
    burrow()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Run a command in new Linux namespaces"))
        .stdout(predicate::str::contains("--hostname"))
        .stdout(predicate::str::contains("--verbose"));
}

#[test]
fn test_version_command() {
    burrow()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("burrow"))
        .stderr(predicate::str::is_empty());
}

#[test]
fn test_no_command() {
    burrow()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No command specified"))
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_options_without_command() {
    burrow()
        .arg("--hostname")
        .arg("box")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No command specified"));
}

#[test]
fn test_unknown_option_exits_one() {
    burrow()
        .arg("--no-such-option")
        .arg("true")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("--no-such-option"));
}

#[test]
fn test_invalid_hostname() {
    burrow()
        .arg("--hostname")
        .arg("a".repeat(65))
        .arg("true")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("hostname too long"));
}

#[test]
fn test_clone_refused_without_user_namespaces() {
    // Only meaningful where user namespaces are disabled for unprivileged users
    if is_root() || user_namespaces_enabled() {
        return;
    }

    burrow()
        .arg("true")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error calling clone:"));
}

fn user_namespaces_enabled() -> bool {
    std::fs::read_to_string("/proc/sys/kernel/unprivileged_userns_clone")
        .map(|v| v.trim() != "0")
        .unwrap_or(true)
}

#[test]
#[ignore] // Requires unprivileged user namespaces
fn test_exit_code_propagates() {
    burrow().args(["sh", "-c", "exit 42"]).assert().code(42);
}

#[test]
#[ignore] // Requires unprivileged user namespaces
fn test_command_with_args() {
    burrow()
        .args(["echo", "hello", "-n", "world"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hello -n world"));
}

#[test]
#[ignore] // Requires unprivileged user namespaces
fn test_default_hostname() {
    burrow()
        .arg("hostname")
        .assert()
        .success()
        .stdout(predicate::str::diff("new-hostname\n"));
}

#[test]
#[ignore] // Requires unprivileged user namespaces
fn test_custom_hostname() {
    burrow()
        .args(["--hostname", "my-test-container", "hostname"])
        .assert()
        .success()
        .stdout(predicate::str::contains("my-test-container"));
}

#[test]
#[ignore] // Requires unprivileged user namespaces
fn test_child_sees_itself_as_pid_one() {
    burrow()
        .args(["sh", "-c", "echo $$"])
        .assert()
        .success()
        .stdout(predicate::str::diff("1\n"));
}

#[test]
#[ignore] // Requires unprivileged user namespaces
fn test_missing_command() {
    burrow()
        .arg("/nonexistent/burrow-command")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error executing command:"));
}

#[test]
#[ignore] // Requires unprivileged user namespaces
fn test_runs_twice() {
    for _ in 0..2 {
        burrow().arg("true").assert().success();
    }
}

#[test]
#[ignore] // Requires unprivileged user namespaces
fn test_verbose_logs_to_stderr() {
    burrow()
        .args(["-v", "true"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Launching isolated command"));
}
