use anyhow::Result;
use assert_cmd::Command;
use tempfile::TempDir;

const SAMPLE_FIXTURE: &str = "gASVEgAAAAAAAAB9lIwDa2V5lIwFdmFsdWWUcy4=";

fn pickle_fixture() -> Result<Command> {
    Ok(Command::cargo_bin("pickle-fixture")?)
}

#[test]
fn test_no_arguments_prints_sample_fixture() -> Result<()> {
    let output = pickle_fixture()?.env_remove("RUST_LOG").output()?;

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout)?, format!("{}\n", SAMPLE_FIXTURE));
    Ok(())
}

#[test]
fn test_entries_and_protocol_flags() -> Result<()> {
    let output = pickle_fixture()?
        .args(["--protocol", "3", "--entry", "a=x", "--entry", "b=x", "--entry", "c=y"])
        .output()?;

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout)?,
        "gAN9cQAoWAEAAABhcQFYAQAAAHhxAlgBAAAAYnEDaAJYAQAAAGNxBFgBAAAAeXEFdS4=\n"
    );
    Ok(())
}

#[test]
fn test_output_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("out/fixture.b64");

    let output = pickle_fixture()?
        .args(["--output", path.to_str().unwrap()])
        .output()?;

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert_eq!(std::fs::read_to_string(&path)?, format!("{}\n", SAMPLE_FIXTURE));
    Ok(())
}

#[test]
fn test_config_file() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let config_path = temp_dir.path().join("fixture.toml");
    std::fs::write(&config_path, "[fixture]\nprotocol = 4\n\n[fixture.entries]\n")?;

    let output = pickle_fixture()?
        .args(["--config", config_path.to_str().unwrap()])
        .output()?;

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout)?, "gAR9lC4=\n");
    Ok(())
}

#[test]
fn test_decode_argument() -> Result<()> {
    let output = pickle_fixture()?.args(["decode", SAMPLE_FIXTURE]).output()?;

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout)?,
        "{\n  \"key\": \"value\"\n}\n"
    );
    Ok(())
}

#[test]
fn test_decode_stdin() -> Result<()> {
    let output = pickle_fixture()?
        .arg("decode")
        .write_stdin(format!("{}\n", SAMPLE_FIXTURE))
        .output()?;

    assert!(output.status.success());
    assert!(String::from_utf8(output.stdout)?.contains("\"key\": \"value\""));
    Ok(())
}

#[test]
fn test_invalid_protocol_exits_with_config_error() -> Result<()> {
    let output = pickle_fixture()?.args(["--protocol", "1"]).output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8(output.stderr)?.contains("protocol"));
    Ok(())
}

#[test]
fn test_decode_garbage_exits_with_codec_error() -> Result<()> {
    let output = pickle_fixture()?.args(["decode", "aGVsbG8="]).output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
    Ok(())
}
