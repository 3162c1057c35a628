use assert_cmd::Command;
use input_probe::engine::channel::ChannelId;
use input_probe::InputEvent;
use predicates::prelude::*;
use serde_json::Value;

// Use the dev-dependency crate for helpers
use test_helpers::*;

fn probe() -> Command {
    let mut cmd = Command::cargo_bin("input-probe").unwrap();
    cmd.env("RUST_LOG", "warn").env("NO_COLOR", "1");
    cmd
}

fn snapshot_json(stdout: &[u8]) -> Value {
    serde_json::from_slice(stdout).expect("stdout is a single JSON document")
}

fn chatter_input() -> String {
    let a = key("KeyA");
    to_jsonl(&[down(&a, 0), up(&a, 20 * MS), down(&a, 50 * MS), up(&a, 70 * MS)])
}

#[test]
fn reports_chatter_from_jsonl() {
    let output = probe()
        .arg("--stats-json")
        .write_stdin(chatter_input())
        .output()
        .unwrap();
    assert!(output.status.success(), "status: {:?}", output.status);

    let v = snapshot_json(&output.stdout);
    assert_eq!(v["keyboard"]["chatter_count"], 1);
    assert_eq!(v["keyboard"]["per_channel"]["KeyA"]["down"], 2);
    assert_eq!(v["keyboard"]["active_count"], 0);
    assert_eq!(v["mouse"]["total_event_count"], 0);
    assert_eq!(v["meta"]["chatter_us"], 80_000);
}

#[test]
fn chatter_threshold_is_configurable() {
    let output = probe()
        .args(["--stats-json", "--chatter", "30ms"])
        .write_stdin(chatter_input())
        .output()
        .unwrap();
    let v = snapshot_json(&output.stdout);
    assert_eq!(v["keyboard"]["chatter_count"], 0);
    assert_eq!(v["meta"]["chatter_us"], 30_000);
}

#[test]
fn anomaly_feed_precedes_snapshot() {
    let output = probe()
        .args(["--stats-json", "--log-anomalies"])
        .write_stdin(chatter_input())
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let (first, rest) = stdout.split_once('\n').unwrap();
    let entry: Value = serde_json::from_str(first).unwrap();
    assert_eq!(entry["kind"], "down");
    assert_eq!(entry["classification"], "warning");
    assert_eq!(entry["since_last_us"], 50_000);

    let v: Value = serde_json::from_str(rest).unwrap();
    assert_eq!(v["keyboard"]["chatter_count"], 1);
}

#[test]
fn skips_malformed_lines() {
    let a = key("KeyA");
    let input = format!(
        "{}\n{{not json\n\n{}\n",
        serde_json::to_string(&down(&a, 0)).unwrap(),
        serde_json::to_string(&up(&a, 90 * MS)).unwrap()
    );
    let output = probe().arg("--stats-json").write_stdin(input).output().unwrap();
    assert!(output.status.success());
    let v = snapshot_json(&output.stdout);
    assert_eq!(v["keyboard"]["per_channel"]["KeyA"]["up"], 1);
}

#[test]
fn reads_raw_evdev_events() {
    let bytes = events_to_bytes(&[
        key_ev(0, KEY_A, 1),
        syn_ev(0),
        key_ev(10_000, KEY_B, 1),
        syn_ev(10_000),
        key_ev(40_000, KEY_A, 0),
        key_ev(45_000, KEY_B, 0),
        rel_x_ev(50_000, 4),
        syn_ev(50_000),
        key_ev(60_000, BTN_LEFT, 1),
        key_ev(70_000, BTN_LEFT, 0),
    ]);
    let output = probe()
        .args(["--format", "evdev", "--stats-json"])
        .write_stdin(bytes)
        .output()
        .unwrap();
    assert!(output.status.success(), "status: {:?}", output.status);

    let v = snapshot_json(&output.stdout);
    let keyboard = &v["keyboard"];
    assert_eq!(keyboard["per_channel"]["KeyA"]["down"], 1);
    assert_eq!(keyboard["per_channel"]["KeyB"]["up"], 1);
    assert_eq!(keyboard["max_concurrent"], 2);
    assert_eq!(keyboard["tested_key_count"], 2);
    let mouse = &v["mouse"];
    assert_eq!(mouse["per_channel"]["Mouse0"]["down"], 1);
    assert_eq!(mouse["tested_key_count"], 1);
}

#[test]
fn modifier_held_during_click_counts_per_device() {
    // Shift held while the left button clicks twice.
    let bytes = events_to_bytes(&[
        key_ev(0, KEY_LEFTSHIFT, 1),
        syn_ev(0),
        key_ev(10_000, BTN_LEFT, 1),
        syn_ev(10_000),
        key_ev(30_000, BTN_LEFT, 0),
        syn_ev(30_000),
        rel_x_ev(40_000, 2),
        syn_ev(40_000),
        key_ev(200_000, BTN_LEFT, 1),
        syn_ev(200_000),
        key_ev(220_000, BTN_LEFT, 0),
        syn_ev(220_000),
        key_ev(300_000, KEY_LEFTSHIFT, 0),
        syn_ev(300_000),
    ]);
    let output = probe()
        .args(["--format", "evdev", "--stats-json"])
        .write_stdin(bytes)
        .output()
        .unwrap();
    assert!(output.status.success(), "status: {:?}", output.status);

    let v = snapshot_json(&output.stdout);
    assert_eq!(v["keyboard"]["max_concurrent"], 1);
    assert_eq!(v["keyboard"]["per_channel"]["ShiftLeft"]["up"], 1);
    assert_eq!(v["keyboard"]["double_click_count"], 0);
    assert_eq!(v["mouse"]["max_concurrent"], 1);
    assert_eq!(v["mouse"]["double_click_count"], 1);
    assert_eq!(v["mouse"]["per_channel"].get("ShiftLeft"), None);
    assert_eq!(v["meta"]["runtime_us"], 300_000);
}

#[test]
fn human_report_honours_locale() {
    probe()
        .args(["--locale", "zh"])
        .write_stdin(chatter_input())
        .assert()
        .success()
        .stdout(predicate::str::contains("连击抖动: 1"))
        .stdout(predicate::str::contains("A (KeyA)"));
}

#[test]
fn focus_lost_event_releases_held_buttons() {
    let b = ChannelId::Button(2);
    let input = to_jsonl(&[down(&b, 0), InputEvent::FocusLost]);
    let output = probe().arg("--stats-json").write_stdin(input).output().unwrap();
    let mouse = &snapshot_json(&output.stdout)["mouse"];
    assert_eq!(mouse["active_count"], 0);
    assert_eq!(mouse["per_channel"]["Mouse2"]["up"], 1);
}

#[test]
fn rejects_invalid_configuration() {
    probe()
        .args(["--timing-window", "0"])
        .write_stdin("")
        .assert()
        .code(2);
}

#[test]
fn rejects_unparseable_duration() {
    probe()
        .args(["--chatter", "soon"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--chatter"));
}

#[test]
fn empty_input_prints_empty_snapshot() {
    let output = probe().arg("--stats-json").write_stdin("").output().unwrap();
    assert!(output.status.success());
    let v = snapshot_json(&output.stdout);
    for device in ["keyboard", "mouse"] {
        assert_eq!(v[device]["total_event_count"], 0);
        assert_eq!(v[device]["runtime_us"], Value::Null);
    }
    assert_eq!(v["meta"]["runtime_us"], Value::Null);
}
