use linked_hash_map::LinkedHashMap;
use serde::{Deserialize, Serialize};

/// Url templates for the site routes that reference tags link to. `{}` is replaced with the
/// referenced id or page name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Routes {
    pub topic: String,
    pub post: String,
    pub game: String,
    pub game_group: String,
    pub movie: String,
    pub submission: String,
    pub user_file: String,
    pub wiki: String,
}

impl Default for Routes {
    fn default() -> Self {
        Routes {
            topic: "/Forum/Topics/{}".to_string(),
            post: "/Forum/Posts/{}".to_string(),
            game: "/{}G".to_string(),
            game_group: "/GameGroups/{}".to_string(),
            movie: "/{}M".to_string(),
            submission: "/{}S".to_string(),
            user_file: "/userfiles/info/{}".to_string(),
            wiki: "/{}".to_string(),
        }
    }
}

impl Routes {
    /// Fills in a route template. Templates without a placeholder get the value appended.
    pub fn build(template: &str, value: &str) -> String {
        if template.contains("{}") {
            template.replacen("{}", value, 1)
        } else {
            format!("{template}{value}")
        }
    }
}

/// Settings shared by the html and meta description renderers.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RenderSettings {
    /// Maximum length of meta descriptions, in characters.
    pub meta_description_length: usize,
    /// Links to this host (or any of its subdomains) are not marked as external.
    pub site_host: String,
    pub routes: Routes,
    /// Extra code language aliases, added on top of the built-in table.
    pub language_aliases: LinkedHashMap<String, String>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            meta_description_length: 400,
            site_host: "tasvideos.org".to_string(),
            routes: Routes::default(),
            language_aliases: LinkedHashMap::new(),
        }
    }
}
