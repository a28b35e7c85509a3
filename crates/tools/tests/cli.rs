use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output};

fn tmp_path(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    let n = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    p.push(format!("tools_test_{}_{}", n, name));
    p
}

fn write_text(path: &PathBuf, s: &str) {
    let mut f = File::create(path).expect("create file");
    f.write_all(s.as_bytes()).expect("write file");
}

fn run(bin: &str, args: &[&str]) -> Output {
    Command::new(bin).args(args).env("RUST_LOG", "warn").output().expect("spawn")
}

fn collapse_demo(args: &[&str]) -> Output {
    run(env!("CARGO_BIN_EXE_collapse_demo"), args)
}

#[test]
fn test_collapse_demo_default_run() {
    let out = collapse_demo(&[]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("  X:      (8, 5)"));
    assert!(stdout.contains("  Layer 1  W: (5, 7),  b: (7,)"));
    assert!(stdout.contains("  Layer 4  W: (4, 3),  b: (3,)"));
    assert!(stdout.contains("  Collapsed W_eff: (5, 3), b_eff: (3,)"));
    assert!(stdout.contains("Max absolute difference between the two outputs:"));
    assert!(stdout.contains("Conclusion:"));
}

#[test]
fn test_collapse_demo_cli_overrides() {
    let out = collapse_demo(&["--d-in", "3", "--hidden", "2", "--d-out", "4", "--samples", "2"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("  X:      (2, 3)"));
    assert!(stdout.contains("  Collapsed W_eff: (3, 4), b_eff: (4,)"));
    assert!(!stdout.contains("Layer 3"));
}

#[test]
fn test_collapse_demo_yaml_config() {
    let cfg = tmp_path("collapse.yaml");
    write_text(&cfg, "seed: 3\nd_in: 2\nhidden: []\nd_out: 1\nrows: 1\n");

    let out = collapse_demo(&["--config", cfg.to_str().unwrap()]);
    let _ = std::fs::remove_file(&cfg);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("  Layer 1  W: (2, 1),  b: (1,)"));
    assert!(!stdout.contains("Layer 2"));
    assert!(stdout.contains("First 1 rows of Y"));
}

#[test]
fn test_collapse_demo_rejects_unknown_config_field() {
    let cfg = tmp_path("bad.json");
    write_text(&cfg, r#"{"seed": 1, "layers": 3}"#);

    let out = collapse_demo(&["--config", cfg.to_str().unwrap()]);
    let _ = std::fs::remove_file(&cfg);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid JSON config"));
}

#[test]
fn test_collapse_demo_rejects_negative_tolerance() {
    let out = collapse_demo(&["--atol=-1"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid tolerance"));
}

#[test]
fn test_collapse_demo_zero_tolerance_fails() {
    // 大きな重み・深い層で丸め誤差が必ず出る
    let out = collapse_demo(&[
        "--scale", "3", "--hidden", "16,16,16,16,16", "--atol", "0", "--rtol", "0",
    ]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Mismatch! The equivalence failed."), "stderr: {stderr}");
    assert!(stderr.contains("Equivalence violated"), "stderr: {stderr}");
}

#[test]
fn test_collapse_demo_auto_tolerance() {
    let out = collapse_demo(&["--scale", "3", "--hidden", "16,16,16,16,16", "--auto-tolerance"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
}

#[test]
fn test_softmax_bars_default() {
    let out = run(env!("CARGO_BIN_EXE_softmax_bars"), &[]);
    assert!(out.status.success());

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Logits (Input)"));
    assert!(stdout.contains("Softmax Probabilities (Output)"));
    assert!(stdout.contains("0.6590"));
    assert!(stdout.contains("0.0986"));
}

#[test]
fn test_softmax_bars_negative_logits() {
    let out = run(env!("CARGO_BIN_EXE_softmax_bars"), &["--logits", "-1,-1", "--width", "4"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(String::from_utf8_lossy(&out.stdout).contains("#### 0.5000"));
}
