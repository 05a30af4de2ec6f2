//! JSON I/O for the CLI
//!
//! - Input: one JSON document on stdin
//! - Output: one JSON object per line on stdout

use std::io::{self, Read, Write};

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Reads the whole of `reader` as one JSON document
pub fn read_document<R: Read>(reader: &mut R) -> CliResult<Value> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;

    if input.trim().is_empty() {
        return Err(CliError::EmptyInput);
    }
    Ok(serde_json::from_str(&input)?)
}

pub fn read_request() -> CliResult<Value> {
    read_document(&mut io::stdin().lock())
}

pub fn write_response(data: Value) -> CliResult<()> {
    write_line(&json!({"status": "ok", "data": data}))
}

pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_line(&json!({"status": "error", "code": code, "message": message}))
}

fn write_line(response: &Value) -> CliResult<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, response)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}
