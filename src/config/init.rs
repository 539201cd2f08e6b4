use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use crate::config::{get_config_path, Config};
use crate::data::ColumnMap;
use crate::scoring::ScoringConfig;

/// Prompt user with a message and return their trimmed input.
fn prompt(message: &str) -> Result<String> {
    eprint!("{}", message);
    std::io::stderr().flush().context("Failed to flush stderr")?;
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read input")?;
    Ok(input.trim().to_string())
}

/// Prompt user with a yes/no question. Returns bool based on input and default.
fn prompt_yes_no(message: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    let input = prompt(&format!("{} [{}]: ", message, hint))?;
    let input = input.to_lowercase();
    if input.is_empty() {
        Ok(default_yes)
    } else {
        Ok(input == "y" || input == "yes")
    }
}

/// The configuration written by `init`: every default spelled out so it can be edited.
pub fn default_config() -> Config {
    Config {
        scoring: Some(ScoringConfig::default()),
        columns: Some(ColumnMap::default()),
    }
}

/// Write the default configuration file.
///
/// Refuses to replace an existing file unless `force` is set or the user
/// confirms on an interactive terminal. Returns the path written.
pub fn write_default_config(path: Option<PathBuf>, force: bool) -> Result<PathBuf> {
    let config_path = match path.or_else(get_config_path) {
        Some(p) => p,
        None => anyhow::bail!("Could not determine home directory; pass a config path"),
    };

    if config_path.exists() && !force {
        let confirmed = std::io::stdin().is_terminal()
            && prompt_yes_no(
                &format!("Config already exists at {}. Overwrite?", config_path.display()),
                false,
            )?;
        if !confirmed {
            anyhow::bail!(
                "Config already exists at {} (use --force to overwrite)",
                config_path.display()
            );
        }
    }

    save_config(&config_path, &default_config())?;
    Ok(config_path)
}

/// Serialize `config` as YAML and replace `path` atomically.
pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    let yaml = serde_saphyr::to_string(config)
        .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;

    // Create parent directories
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;
    file.write_all(yaml.as_bytes())
        .with_context(|| format!("Failed to write config to {}", path.display()))?;
    file.commit()
        .with_context(|| format!("Failed to save config to {}", path.display()))?;
    Ok(())
}
