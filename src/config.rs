use std::fs;
use std::io;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalConfig {
    /// Prefix of every diagnostic line the evaluator prints.
    pub name: String,
    /// Exit status of a child whose program image could not be executed.
    pub exec_failure_status: i32,
    /// Poll finished background jobs before each top-level evaluation.
    pub reap_background: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        ConfigLoader::default_config()
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn default_config() -> EvalConfig {
        EvalConfig {
            name: "shelltree".to_string(),
            exec_failure_status: 127,
            reap_background: true,
        }
    }

    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<EvalConfig, ConfigError> {
        let src = fs::read_to_string(path)?;
        Self::load_from_str(&src)
    }

    pub fn load_from_str(src: &str) -> Result<EvalConfig, ConfigError> {
        let mut config = Self::default_config();

        for (lineno, line) in src.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                return Err(ConfigError::Parse(format!("Line {}: No '=' found: {}", lineno + 1, line)));
            };
            let (key, value) = (key.trim(), value.trim());

            match key {
                "name" => config.name = value.to_string(),
                "exec_failure_status" => match value.parse::<i32>() {
                    Ok(n) if (1..=255).contains(&n) => config.exec_failure_status = n,
                    _ => return Err(ConfigError::Parse(format!("Line {}: Invalid exit status: {}", lineno + 1, value))),
                },
                "reap_background" => match value {
                    "true" => config.reap_background = true,
                    "false" => config.reap_background = false,
                    _ => return Err(ConfigError::Parse(format!("Line {}: Invalid bool: {}", lineno + 1, value))),
                },
                _ => return Err(ConfigError::Parse(format!("Line {}: Unknown key: {}", lineno + 1, key))),
            }
        }

        Ok(config)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error: {0}")]
    Parse(String),
}
