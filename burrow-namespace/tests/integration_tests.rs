use burrow_core::{CommandSpec, Error, ExitOutcome, SetupStep};
use burrow_namespace::*;
use nix::sched::CloneFlags;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn sh(script: &str) -> CommandSpec {
    CommandSpec::new(["sh", "-c", script]).unwrap()
}

#[test]
fn test_default_isolation_request() {
    let request = compose_isolation_request();

    for flag in [
        CloneFlags::CLONE_NEWNET,
        CloneFlags::CLONE_NEWUTS,
        CloneFlags::CLONE_NEWNS,
        CloneFlags::CLONE_NEWIPC,
        CloneFlags::CLONE_NEWPID,
        CloneFlags::CLONE_NEWUSER,
    ] {
        assert!(request.flags.contains(flag), "missing {flag:?}");
    }
}

#[test]
fn test_launcher_keeps_config() {
    let launcher = Launcher::new(NamespaceConfig::new().with_hostname("box"));
    assert_eq!(launcher.config().hostname, "box");
    assert_eq!(Launcher::default().config().hostname, DEFAULT_HOSTNAME);
}

#[test]
fn test_exit_code_propagates_without_namespaces() {
    init_tracing();
    let launcher = Launcher::new(NamespaceConfig::none());

    for code in [0, 3, 255] {
        let outcome = launcher.launch(&sh(&format!("exit {code}"))).unwrap();
        assert_eq!(outcome, ExitOutcome::Exited(code));
    }
}

#[test]
fn test_signaled_child_without_namespaces() {
    let launcher = Launcher::new(NamespaceConfig::none());
    let outcome = launcher.launch(&sh("kill -9 $$")).unwrap();

    assert_eq!(outcome.exit_code(), 137);
}

#[test]
#[ignore] // Requires unprivileged user namespaces
fn test_hostname_is_namespaced() {
    init_tracing();
    let before = nix::unistd::gethostname().unwrap();

    let outcome = launch(&sh("test \"$(uname -n)\" = new-hostname")).unwrap();
    assert!(outcome.success());

    assert_eq!(nix::unistd::gethostname().unwrap(), before);
}

#[test]
#[ignore] // Requires unprivileged user namespaces
fn test_custom_hostname() {
    let launcher = Launcher::new(NamespaceConfig::new().with_hostname("burrow-box"));
    let outcome = launcher.launch(&sh("test \"$(uname -n)\" = burrow-box")).unwrap();

    assert!(outcome.success());
}

#[test]
#[ignore] // Requires unprivileged user namespaces
fn test_child_is_pid_one() {
    let outcome = launch(&sh("test $$ -eq 1 && test \"$(readlink /proc/self)\" -lt 10")).unwrap();
    assert!(outcome.success());
}

#[test]
#[ignore] // Requires unprivileged user namespaces
fn test_private_message_queue() {
    // Only the queue created during setup is visible in the new namespace
    let outcome = launch(&sh("test \"$(tail -n +2 /proc/sysvipc/msg | wc -l)\" -eq 1")).unwrap();
    assert!(outcome.success());
}

#[test]
#[ignore] // Requires unprivileged user namespaces
fn test_repeated_launches() {
    for _ in 0..2 {
        let outcome = launch(&sh("exit 0")).unwrap();
        assert!(outcome.success());
    }
}

#[test]
#[ignore] // Requires unprivileged user namespaces
fn test_missing_command_in_namespaces() {
    let command = CommandSpec::new(["/nonexistent/burrow"]).unwrap();
    let outcome = launch(&command).unwrap();

    assert_eq!(outcome, ExitOutcome::Exited(1));
}

#[test]
fn test_spawn_denied_without_privilege() {
    // Mount namespace alone, no user namespace: an unprivileged clone is refused
    if nix::unistd::geteuid().is_root() {
        return;
    }

    let launcher = Launcher::new(NamespaceConfig::none().with_mount(true));
    let err = launcher.launch(&sh("exit 0")).unwrap_err();

    assert!(matches!(err, Error::Spawn(_)));
    assert!(err.to_string().starts_with("Error calling clone: "));
}

#[test]
#[ignore] // Requires unprivileged user namespaces
fn test_remount_denied_aborts_before_exec() {
    // procfs may only be mounted by the user namespace owning the PID namespace
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("executed");
    let script = format!("touch '{}'; exit 42", marker.display());

    let config = NamespaceConfig::none().with_user(true).with_mount(true);
    let outcome = Launcher::new(config).launch(&sh(&script)).unwrap();

    assert_eq!(outcome, ExitOutcome::Exited(1));
    assert!(!marker.exists());
}

#[test]
fn test_setup_error_names_step() {
    let err = Error::setup(SetupStep::Remount, nix::errno::Errno::EPERM);
    assert_eq!(err.to_string(), "Error mounting proc: Operation not permitted");
}
