//! Command line tests against the built `nmstate-handler` binary

use std::io::Write;
use std::process::{Command, Output};

const CURRENT_STATE: &str = "interfaces:
- name: eth0
  type: ethernet
  state: up
- name: veth0a1b2c
  type: veth
  state: up
- name: br1
  type: linux-bridge
  state: up
  bridge:
    options:
      gc-timer: 27510
      hello-timer: 100
routes:
  running:
  - destination: 10.244.0.0/24
    next-hop-interface: veth0a1b2c
";

fn handler() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_nmstate-handler"));
    command.env_remove("INTERFACES_FILTER").env_remove("RUST_LOG");
    command
}

fn write_fixture(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

#[test]
fn test_filter_state_from_file() {
    let fixture = write_fixture(CURRENT_STATE);
    let output = handler()
        .env("INTERFACES_FILTER", "{veth*,cali*}")
        .arg("filter-state")
        .arg("--input")
        .arg(fixture.path())
        .output()
        .unwrap();

    assert!(output.status.success(), "{:?}", output);
    let filtered = stdout(&output);
    assert!(filtered.contains("eth0"));
    assert!(filtered.contains("br1"));
    assert!(!filtered.contains("veth0a1b2c"));
    assert!(!filtered.contains("gc-timer"));
    assert!(!filtered.contains("hello-timer"));
}

#[test]
fn test_missing_interfaces_filter_fails_startup() {
    let fixture = write_fixture(CURRENT_STATE);
    let output = handler()
        .arg("filter-state")
        .arg("--input")
        .arg(fixture.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_invalid_interfaces_filter_fails_startup() {
    let output = handler()
        .args(["filter-state", "--interfaces-filter", "{veth*,cali*"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("InvalidFilterPattern"));
}

#[test]
fn test_filter_state_rejects_non_mapping_document() {
    let fixture = write_fixture("- eth0\n- eth1\n");
    let output = handler()
        .args(["filter-state", "--interfaces-filter", "veth*", "--input"])
        .arg(fixture.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
}

#[test]
fn test_format_and_decode_error() {
    let raw = "libnmstate.error.NmstateValueError: Interface bond1 has unknown slave: eth10\n";
    let raw_file = write_fixture(raw);
    let formatted = handler()
        .args(["format-error", "--input"])
        .arg(raw_file.path())
        .output()
        .unwrap();

    assert!(formatted.status.success(), "{:?}", formatted);
    let message = stdout(&formatted);
    assert!(message.starts_with(
        "libnmstate.error.NmstateValueError\n  Interface bond1 has unknown slave\n    eth10\n\n"
    ));

    let message_file = write_fixture(&message);
    let decoded = handler()
        .args(["decode-error", "--input"])
        .arg(message_file.path())
        .output()
        .unwrap();

    assert!(decoded.status.success(), "{:?}", decoded);
    assert_eq!(stdout(&decoded), raw);
}

#[test]
fn test_version_and_error_commands_need_no_filter() {
    let output = handler().arg("version").output().unwrap();
    assert!(output.status.success(), "{:?}", output);
    assert!(stdout(&output).starts_with("nmstate-handler v"));

    let raw_file = write_fixture("DEBUG only noise\n");
    let output = handler()
        .args(["format-error", "--input"])
        .arg(raw_file.path())
        .output()
        .unwrap();
    assert!(output.status.success(), "{:?}", output);
    assert_eq!(stdout(&output), "");
}
