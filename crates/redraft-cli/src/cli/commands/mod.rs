//! Command handlers.

pub mod account;
pub mod auth;
pub mod config;
pub mod paraphrase;
pub mod posts;

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};

/// Prompts on stderr and reads one trimmed line from stdin.
pub fn prompt_line(label: &str) -> Result<String> {
    eprint!("{label}: ");
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("read from stdin")?;
    Ok(line.trim().to_string())
}

/// Returns the flag value, or prompts for it when omitted.
pub fn required(value: Option<String>, label: &str) -> Result<String> {
    let value = match value {
        Some(value) => value,
        None => prompt_line(label)?,
    };
    if value.is_empty() {
        bail!("{label} must not be empty");
    }
    Ok(value)
}

/// Reads content from a file, or from stdin when the path is "-".
pub fn read_content(path: &Path) -> Result<String> {
    let content = if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("read content from stdin")?;
        buffer
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("read content from {}", path.display()))?
    };

    if content.trim().is_empty() {
        bail!("content is empty");
    }
    Ok(content)
}

/// Writes command output to a file, or to stdout when no path is given.
pub fn emit(content: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => fs::write(path, content)
            .with_context(|| format!("write output to {}", path.display())),
        None => {
            println!("{content}");
            Ok(())
        }
    }
}
