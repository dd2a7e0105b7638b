use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn leaf() -> Result<Command> {
    let mut cmd = Command::cargo_bin("leaf")?;
    cmd.env_remove("LEAF");
    Ok(cmd)
}

#[test]
fn test_file_copied_verbatim_when_stdout_is_not_a_terminal() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("input.txt");
    let content: Vec<u8> = (0..10_240u32).map(|i| (i % 251) as u8).collect();
    fs::write(&path, &content)?;

    let output = leaf()?.arg(&path).output()?;

    assert!(output.status.success());
    assert_eq!(output.stdout, content);
    Ok(())
}

#[test]
fn test_stdin_copied_through() -> Result<()> {
    leaf()?
        .write_stdin("hello\n")
        .assert()
        .success()
        .stdout("hello\n");
    Ok(())
}

#[test]
fn test_missing_file_fails() -> Result<()> {
    leaf()?
        .arg("/no/such/file")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open /no/such/file"));
    Ok(())
}

#[test]
fn test_shift_zero_is_rejected() -> Result<()> {
    leaf()?
        .args(["-shift", "0"])
        .write_stdin("x\n")
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("Shift amount must be at least 1, was 0"))
        .stderr(predicate::str::contains("Usage:"));
    Ok(())
}

#[test]
fn test_unknown_style_points_at_style_list() -> Result<()> {
    leaf()?
        .args(["-style", "does-not-exist"])
        .write_stdin("x\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"Styles\""))
        .stderr(predicate::str::contains("monokai"));
    Ok(())
}

#[test]
fn test_two_files_is_a_usage_error() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let a = temp_dir.path().join("a");
    let b = temp_dir.path().join("b");
    fs::write(&a, "a")?;
    fs::write(&b, "b")?;

    leaf()?
        .arg(&a)
        .arg(&b)
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("Expected exactly one filename"));
    Ok(())
}

#[test]
fn test_command_line_overrides_environment() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("input.txt");
    fs::write(&path, "content\n")?;

    // A valid environment value alone copies fine
    leaf()?
        .env("LEAF", "-shift 8")
        .arg(&path)
        .assert()
        .success()
        .stdout("content\n");

    // The command line value is parsed last, so its error is the one reported
    leaf()?
        .env("LEAF", "-shift 8")
        .args(["-shift", "0"])
        .arg(&path)
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("was 0"))
        .stderr(predicate::str::contains("Environment: LEAF=\"-shift 8\""));
    Ok(())
}

#[test]
fn test_invalid_environment_value_is_an_error() -> Result<()> {
    leaf()?
        .env("LEAF", "-shift 0")
        .args(["-shift", "5"])
        .write_stdin("x\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Shift amount must be at least 1, was 0"));
    Ok(())
}

#[test]
fn test_version() -> Result<()> {
    leaf()?
        .arg("-version")
        .assert()
        .success()
        .stdout(format!("{}\n", env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn test_help_goes_to_stdout() -> Result<()> {
    leaf()?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("-quit-if-one-screen"))
        .stdout(predicate::str::contains("Styles:"));
    Ok(())
}
