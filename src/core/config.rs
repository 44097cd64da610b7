use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{success, warning};
use std::path::Path;
use std::process::Command;

pub struct ConfigLogic;

impl ConfigLogic {
    /// Print the effective configuration with the client secret masked.
    pub fn print(cfg: &Config) -> AppResult<()> {
        println!("📄 Current configuration:\n");
        println!("{}", serde_yaml::to_string(&cfg.masked())?);
        if !cfg.has_credentials() {
            warning("Zoom credentials are incomplete: meetings cannot be created or synced.");
        }
        Ok(())
    }

    /// Open the configuration file in an editor: the requested one first,
    /// then $EDITOR / $VISUAL, then a platform default.
    pub fn edit(path: &Path, editor: Option<&str>) -> AppResult<()> {
        let default_editor = std::env::var("EDITOR")
            .or_else(|_| std::env::var("VISUAL"))
            .unwrap_or_else(|_| {
                if cfg!(target_os = "windows") {
                    "notepad".to_string()
                } else {
                    "nano".to_string()
                }
            });

        let mut candidates = Vec::new();
        if let Some(e) = editor {
            candidates.push(e.to_string());
        }
        if !candidates.contains(&default_editor) {
            candidates.push(default_editor);
        }

        for ed in &candidates {
            match Command::new(ed).arg(path).status() {
                Ok(s) if s.success() => {
                    success(format!("Configuration file edited using '{}'", ed));
                    return Ok(());
                }
                _ => warning(format!("Editor '{}' not available", ed)),
            }
        }

        Err(AppError::Config(format!(
            "could not edit {} with any of: {}",
            path.display(),
            candidates.join(", ")
        )))
    }
}
