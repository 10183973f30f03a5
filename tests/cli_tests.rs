mod common;

use common::{run_meetsync, TestEnv};

#[test]
fn meetsync_help_shows_usage() {
    let output = run_meetsync(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "--help should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr
    );
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("Commands:"));
    assert!(
        !stderr.contains("No config file found"),
        "--help should not log config fallback noise\nstderr:\n{}",
        stderr
    );
}

#[test]
fn meetsync_version_shows_version() {
    let output = run_meetsync(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "--version should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr
    );
    assert!(stdout.contains("meetsync "));
    assert!(
        !stderr.contains("No config file found"),
        "--version should not log config fallback noise\nstderr:\n{}",
        stderr
    );
}

#[test]
fn completions_bash_outputs_script() {
    let output = run_meetsync(&["completions", "bash"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "completions bash should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr
    );
    assert!(
        stdout.contains("meetsync"),
        "expected completion output to reference command name\nstdout:\n{}",
        stdout
    );
}

#[test]
fn config_show_works() {
    let output = run_meetsync(&["config", "show"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "config show should succeed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        stderr
    );
    assert!(stdout.contains("[general]"));
    assert!(stdout.contains("[chunking]"));
    assert!(stdout.contains("chunk_size"));
}

#[test]
fn config_init_writes_file_and_respects_force() {
    let env = TestEnv::new();

    let output = env.run(&["config", "init"]);
    assert!(
        output.status.success(),
        "config init should succeed\nstderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(env.config_path().exists());

    let output = env.run(&["config", "init"]);
    assert!(
        !output.status.success(),
        "config init without --force should refuse to overwrite"
    );

    let output = env.run(&["config", "init", "--force"]);
    assert!(
        output.status.success(),
        "config init --force should overwrite\nstderr:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn config_file_values_show_up_in_config_show() {
    let env = TestEnv::new();
    env.write_config(
        r#"
[chunking]
chunk_size = 777
"#,
    );

    let output = env.run(&["config", "show"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(
        stdout.contains("chunk_size = 777"),
        "expected overridden chunk_size in output\nstdout:\n{}",
        stdout
    );
}
