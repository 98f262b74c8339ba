use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use bbdoc::RenderSettings;
use bbdoc_parser::ParserSettings;

/// Refers to a `forumtext.yml` file that configures parsing and rendering. Every field is
/// optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub parser: ParserSettings,
    #[serde(default)]
    pub render: RenderSettings,
    /// Title catalog used to label references. Relative paths are resolved against the directory
    /// of the configuration file.
    #[serde(default)]
    pub titles: Option<PathBuf>,
}

impl ProjectConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let input = fs::read_to_string(path)
            .with_context(|| format!("Could not read configuration {}", path.display()))?;
        let mut config: ProjectConfig =
            serde_yaml::from_str(&input).context("Error loading project configuration:")?;

        if let (Some(titles), Some(dir)) = (&config.titles, path.parent()) {
            if titles.is_relative() {
                config.titles = Some(dir.join(titles));
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_partial_config() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("forumtext.yml");
        fs::write(
            &path,
            "parser:\n  allow_html: true\nrender:\n  meta_description_length: 160\n  language_aliases:\n    lsnes: lua\ntitles: titles.yml\n",
        )?;

        let config = ProjectConfig::load(&path)?;
        assert!(config.parser.allow_html);
        assert!(!config.parser.single_line);
        assert_eq!(160, config.render.meta_description_length);
        assert_eq!("tasvideos.org", config.render.site_host);
        assert_eq!(
            Some("lua"),
            config.render.language_aliases.get("lsnes").map(|s| s.as_str())
        );
        assert_eq!(Some(dir.path().join("titles.yml")), config.titles);
        Ok(())
    }

    #[test]
    fn empty_config_is_default() -> anyhow::Result<()> {
        let config: ProjectConfig = serde_yaml::from_str("{}")?;
        assert_eq!(ProjectConfig::default(), config);
        Ok(())
    }

    #[test]
    fn invalid_config_reports_context() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("forumtext.yml");
        fs::write(&path, "render:\n  meta_description_length: lots\n")?;

        let err = ProjectConfig::load(&path).unwrap_err();
        assert_eq!("Error loading project configuration:", err.to_string());
        Ok(())
    }
}
