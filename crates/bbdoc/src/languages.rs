use std::collections::{HashMap, HashSet};

use linked_hash_map::LinkedHashMap;

/// Languages the client side highlighter knows.
const HIGHLIGHTER_NAMES: &[&str] = &[
    "markup",
    "css",
    "clike",
    "javascript",
    "typescript",
    "c",
    "cpp",
    "csharp",
    "java",
    "lua",
    "python",
    "ruby",
    "perl",
    "php",
    "rust",
    "go",
    "haskell",
    "pascal",
    "basic",
    "nasm",
    "bash",
    "batch",
    "powershell",
    "json",
    "yaml",
    "ini",
    "sql",
    "diff",
    "makefile",
];

const ALIASES: &[(&str, &str)] = &[
    ("html", "markup"),
    ("xml", "markup"),
    ("svg", "markup"),
    ("js", "javascript"),
    ("ts", "typescript"),
    ("h", "c"),
    ("c++", "cpp"),
    ("cc", "cpp"),
    ("hpp", "cpp"),
    ("c#", "csharp"),
    ("cs", "csharp"),
    ("py", "python"),
    ("rb", "ruby"),
    ("pl", "perl"),
    ("rs", "rust"),
    ("hs", "haskell"),
    ("pas", "pascal"),
    ("delphi", "pascal"),
    ("bas", "basic"),
    ("asm", "nasm"),
    ("sh", "bash"),
    ("shell", "bash"),
    ("bat", "batch"),
    ("cmd", "batch"),
    ("ps1", "powershell"),
    ("yml", "yaml"),
    ("cfg", "ini"),
    ("patch", "diff"),
    ("make", "makefile"),
];

/// Language name normalization for code blocks. Built once, read only afterwards.
#[derive(Debug, Clone)]
pub struct LanguageTable {
    names: HashSet<String>,
    aliases: HashMap<String, String>,
}

impl LanguageTable {
    pub fn new(extra_aliases: &LinkedHashMap<String, String>) -> Self {
        let names = HIGHLIGHTER_NAMES.iter().map(|n| n.to_string()).collect();
        let mut aliases: HashMap<String, String> = ALIASES
            .iter()
            .map(|(alias, name)| (alias.to_string(), name.to_string()))
            .collect();
        for (alias, name) in extra_aliases {
            aliases.insert(alias.to_lowercase(), name.to_lowercase());
        }
        LanguageTable { names, aliases }
    }

    /// The highlighter name for a user supplied language, `text` when unknown.
    pub fn resolve(&self, language: &str) -> &str {
        let language = language.trim().to_lowercase();
        if let Some(name) = self.names.get(&language) {
            return name;
        }
        self.aliases
            .get(&language)
            .map(|n| n.as_str())
            .unwrap_or("text")
    }
}

impl Default for LanguageTable {
    fn default() -> Self {
        Self::new(&LinkedHashMap::new())
    }
}
