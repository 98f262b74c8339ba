use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use bbdoc::LookupProvider;

/// Titles read from a YAML file, for rendering without a database.
///
/// ```yaml
/// games:
///   1: Super Mario Bros.
/// topics:
///   10: Welcome
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleCatalog {
    pub games: HashMap<i32, String>,
    pub game_groups: HashMap<i32, String>,
    pub movies: HashMap<i32, String>,
    pub submissions: HashMap<i32, String>,
    pub topics: HashMap<i32, String>,
}

impl TitleCatalog {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let input = fs::read_to_string(path)
            .with_context(|| format!("Could not read title catalog {}", path.display()))?;
        serde_yaml::from_str(&input)
            .with_context(|| format!("Error loading title catalog {}", path.display()))
    }
}

#[async_trait]
impl LookupProvider for TitleCatalog {
    async fn game_title(&self, id: i32) -> anyhow::Result<Option<String>> {
        Ok(self.games.get(&id).cloned())
    }

    async fn game_group_title(&self, id: i32) -> anyhow::Result<Option<String>> {
        Ok(self.game_groups.get(&id).cloned())
    }

    async fn movie_title(&self, id: i32) -> anyhow::Result<Option<String>> {
        Ok(self.movies.get(&id).cloned())
    }

    async fn submission_title(&self, id: i32) -> anyhow::Result<Option<String>> {
        Ok(self.submissions.get(&id).cloned())
    }

    async fn topic_title(&self, id: i32) -> anyhow::Result<Option<String>> {
        Ok(self.topics.get(&id).cloned())
    }
}
