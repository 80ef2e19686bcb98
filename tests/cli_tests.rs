// Integration tests for the strace-tree binary

#![allow(deprecated)] // Command::cargo_bin is deprecated but still functional

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write `strace -ff` style files into a fresh directory
fn traces(files: &[(&str, &str)]) -> TempDir {
    let tmp_dir = TempDir::new().unwrap();
    for (name, content) in files {
        fs::write(tmp_dir.path().join(name), content).unwrap();
    }
    tmp_dir
}

fn strace_tree(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("strace-tree").unwrap();
    cmd.current_dir(dir);
    cmd
}

const SHELL: &str = "\
08:15:00.000001 execve(\"/bin/sh\", [\"sh\", \"-c\", \"true\"], 0x7ffc /* 20 vars */) = 0
08:15:00.000300 brk(NULL) = 0x5581
08:15:00.000500 clone(child_stack=NULL, flags=CLONE_CHILD_CLEARTID|SIGCHLD, child_tidptr=0x7f) = 101
08:15:00.000900 wait4(-1, [{WIFEXITED(s) && WEXITSTATUS(s) == 0}], 0, NULL) = 101
08:15:00.001000 exit_group(0) = ?
08:15:00.001100 +++ exited with 0 +++
";

const CHILD: &str = "\
08:15:00.000600 set_robust_list(0x7f, 24) = 0
08:15:00.000700 exit_group(0) = ?
";

// ============================================================================
// Listing
// ============================================================================

#[test]
fn test_text_listing() {
    let tmp_dir = traces(&[("trace.100", SHELL), ("trace.101", CHILD)]);

    strace_tree(tmp_dir.path())
        .args(["--no-mirror", "trace.100", "trace.101"])
        .assert()
        .success()
        .stdout(" 100 sh [\"sh\", \"-c\", \"true\"]\n   101 clone\n");
}

#[test]
fn test_disjoint_roots_listed_separately() {
    let tmp_dir = traces(&[
        ("trace.100", SHELL),
        ("trace.101", CHILD),
        ("trace.300", "execve(\"/usr/bin/sleep\", [\"sleep\", \"5\"]) = 0\n"),
    ]);

    strace_tree(tmp_dir.path())
        .args(["--no-mirror", "trace.100", "trace.101", "trace.300"])
        .assert()
        .success()
        .stdout(predicate::str::contains(" 100 sh"))
        .stdout(predicate::str::contains("\n 300 sleep [\"sleep\", \"5\"]\n"));
}

#[test]
fn test_json_listing() {
    let tmp_dir = traces(&[("trace.100", SHELL), ("trace.101", CHILD)]);

    let output = strace_tree(tmp_dir.path())
        .args(["--no-mirror", "--format", "json", "trace.100", "trace.101"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["total_processes"], 2);
    assert_eq!(value["roots"][0]["pid"], 100);
    assert_eq!(value["roots"][0]["executable"], "/bin/sh");
    assert_eq!(value["roots"][0]["children"][0]["label"], "clone");
}

#[test]
fn test_shared_child_listed_and_mirrored_under_each_parent() {
    let tmp_dir = traces(&[
        ("trace.1", "clone(flags=SIGCHLD) = 3\n"),
        ("trace.2", "vfork() = 3\n"),
        ("trace.3", ""),
    ]);

    strace_tree(tmp_dir.path())
        .args(["trace.1", "trace.2", "trace.3"])
        .assert()
        .success()
        .stdout(" 1 init\n   3 clone\n 2 init\n   3 clone\n")
        .stderr(predicate::str::contains("spawn cycle").not());

    assert!(tmp_dir.path().join("tree/1.init/3.clone/strace").is_file());
    assert!(tmp_dir.path().join("tree/2.init/3.clone/strace").is_file());
}

#[test]
fn test_pid_pattern_flag() {
    let tmp_dir = traces(&[("proc-42.log", "vfork() = 43\n"), ("proc-43.log", "")]);

    strace_tree(tmp_dir.path())
        .args(["--no-mirror", "--pid-pattern", r"^proc-(\d+)\.log$", "proc-42.log", "proc-43.log"])
        .assert()
        .success()
        .stdout(" 42 init\n   43 clone\n");
}

#[test]
fn test_config_file() {
    let tmp_dir = traces(&[
        ("trace.100", SHELL),
        ("trace.101", CHILD),
        ("strace-tree.toml", "args_width = 4\nindent_width = 1\n"),
    ]);

    strace_tree(tmp_dir.path())
        .args(["--no-mirror", "--config", "strace-tree.toml", "trace.100", "trace.101"])
        .assert()
        .success()
        .stdout(" 100 sh [\"sh\"]\n  101 clone\n");
}

// ============================================================================
// Mirror
// ============================================================================

#[test]
fn test_mirror_tree_and_rerun() {
    let tmp_dir = traces(&[("trace.100", SHELL), ("trace.101", CHILD)]);

    for _ in 0..2 {
        strace_tree(tmp_dir.path())
            .args(["--no-print", "trace.100", "trace.101"])
            .assert()
            .success()
            .stdout("");
    }

    let root_link = tmp_dir.path().join("tree/100.sh/strace");
    let child_link = tmp_dir.path().join("tree/100.sh/101.clone/strace");
    assert_eq!(fs::read_to_string(root_link).unwrap(), SHELL);
    assert_eq!(fs::read_to_string(child_link).unwrap(), CHILD);
}

#[test]
fn test_mirror_output_dir_and_link_name() {
    let tmp_dir = traces(&[("trace.7", "")]);

    strace_tree(tmp_dir.path())
        .args(["--no-print", "-o", "out", "--link-name", "log", "trace.7"])
        .assert()
        .success();

    assert!(tmp_dir.path().join("out/7.init/log").is_file());
    assert!(!tmp_dir.path().join("tree").exists());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_malformed_filename_fails() {
    let tmp_dir = traces(&[("trace.abc", "")]);

    strace_tree(tmp_dir.path())
        .args(["--no-mirror", "trace.abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("trace.abc"));
}

#[test]
fn test_missing_file_fails() {
    let tmp_dir = traces(&[("trace.1", "")]);

    strace_tree(tmp_dir.path())
        .args(["--no-mirror", "trace.1", "trace.2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("trace.2"));
}

#[test]
fn test_duplicate_pid_fails() {
    let tmp_dir = traces(&[("a.5", ""), ("b.5", "")]);

    strace_tree(tmp_dir.path())
        .args(["--no-mirror", "a.5", "b.5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Duplicate pid 5"));
}

#[test]
fn test_link_name_must_stay_inside_process_dir() {
    for name in ["", "a/b", "../../escaped"] {
        let tmp_dir = traces(&[("trace.7", "")]);

        strace_tree(tmp_dir.path())
            .args(["--no-print", "--link-name", name, "trace.7"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("link_name must be a plain file name"));

        assert!(!tmp_dir.path().join("tree").exists());
        assert!(!tmp_dir.path().join("escaped").exists());
    }
}

#[test]
fn test_no_files_is_usage_error() {
    let tmp_dir = TempDir::new().unwrap();

    strace_tree(tmp_dir.path()).assert().failure();
}
