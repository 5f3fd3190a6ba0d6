use std::error::Error;
use std::io::Write;

use sigbar::config::{load_and_validate, validate_config, ConfigFile};

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(contents: &str) -> Result<tempfile::NamedTempFile, Box<dyn Error>> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    Ok(file)
}

#[test]
fn loads_full_config_from_toml() -> TestResult {
    let file = write_config(
        r#"
delimiter = " :: "

[[block]]
command = "date '+%R'"
signal = 1

[[block]]
command = "battery-status"
"#,
    )?;

    let cfg = load_and_validate(file.path())?;
    assert_eq!(cfg.delimiter, " :: ");
    assert_eq!(cfg.block.len(), 2);
    assert_eq!(cfg.block[0].command, "date '+%R'");
    assert_eq!(cfg.block[0].signal, Some(1));
    assert_eq!(cfg.block[1].signal, None);
    Ok(())
}

#[test]
fn delimiter_defaults_to_pipe() -> TestResult {
    let file = write_config(
        r#"
[[block]]
command = "echo hi"
"#,
    )?;

    let cfg = load_and_validate(file.path())?;
    assert_eq!(cfg.delimiter, " | ");
    Ok(())
}

#[test]
fn empty_block_table_is_rejected() -> TestResult {
    let file = write_config("delimiter = \" | \"\n")?;
    assert!(load_and_validate(file.path()).is_err());
    Ok(())
}

#[test]
fn blank_command_is_rejected() -> TestResult {
    let file = write_config(
        r#"
[[block]]
command = "   "
"#,
    )?;
    assert!(load_and_validate(file.path()).is_err());
    Ok(())
}

#[test]
fn out_of_range_signal_offset_is_rejected() -> TestResult {
    let file = write_config(
        r#"
[[block]]
command = "echo hi"
signal = 4000
"#,
    )?;
    assert!(load_and_validate(file.path()).is_err());
    Ok(())
}

#[test]
fn duplicate_signal_offsets_are_allowed() -> TestResult {
    let cfg: ConfigFile = toml::from_str(
        r#"
[[block]]
command = "echo A"
signal = 3

[[block]]
command = "echo B"
signal = 3
"#,
    )?;
    validate_config(&cfg)?;
    Ok(())
}
