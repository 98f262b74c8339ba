use std::collections::{HashMap, HashSet};

use anyhow::Result;
use async_trait::async_trait;
use bbdoc_parser::ast::visitor::NodeVisitor;
use bbdoc_parser::ast::Element;
use bbdoc_parser::tags::Tag;
use tracing::warn;

/// Entities whose display titles are looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Game,
    GameGroup,
    Movie,
    Submission,
    Topic,
}

impl EntityKind {
    /// The kind of entity a tag references, if any.
    pub fn for_tag(tag: Tag) -> Option<Self> {
        Some(match tag {
            Tag::Game => EntityKind::Game,
            Tag::GameGroup => EntityKind::GameGroup,
            Tag::Movie => EntityKind::Movie,
            Tag::Submission => EntityKind::Submission,
            Tag::Thread => EntityKind::Topic,
            _ => return None,
        })
    }
}

/// Resolves ids to display titles. `Ok(None)` means not found. Errors are logged by the
/// renderers and treated as not found.
#[async_trait]
pub trait LookupProvider: Send + Sync {
    async fn game_title(&self, id: i32) -> Result<Option<String>>;
    async fn game_group_title(&self, id: i32) -> Result<Option<String>>;
    async fn movie_title(&self, id: i32) -> Result<Option<String>>;
    async fn submission_title(&self, id: i32) -> Result<Option<String>>;
    async fn topic_title(&self, id: i32) -> Result<Option<String>>;

    async fn title(&self, kind: EntityKind, id: i32) -> Result<Option<String>> {
        match kind {
            EntityKind::Game => self.game_title(id).await,
            EntityKind::GameGroup => self.game_group_title(id).await,
            EntityKind::Movie => self.movie_title(id).await,
            EntityKind::Submission => self.submission_title(id).await,
            EntityKind::Topic => self.topic_title(id).await,
        }
    }
}

/// Provider for contexts without a database. Nothing is ever found.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLookup;

#[async_trait]
impl LookupProvider for NullLookup {
    async fn game_title(&self, _id: i32) -> Result<Option<String>> {
        Ok(None)
    }

    async fn game_group_title(&self, _id: i32) -> Result<Option<String>> {
        Ok(None)
    }

    async fn movie_title(&self, _id: i32) -> Result<Option<String>> {
        Ok(None)
    }

    async fn submission_title(&self, _id: i32) -> Result<Option<String>> {
        Ok(None)
    }

    async fn topic_title(&self, _id: i32) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Numeric id of a reference, as written in markup.
pub fn parse_id(text: &str) -> Option<i32> {
    text.trim().parse().ok()
}

/// The id text a reference element is labelled by: its options, or its body when it has none.
pub fn reference_text(element: &Element) -> &str {
    if element.options.is_empty() {
        element.single_text().ok().flatten().unwrap_or_default()
    } else {
        &element.options
    }
}

/// Collects the `(kind, id)` pairs whose titles a render will need, in document order.
#[derive(Debug, Default)]
pub struct ReferenceCollector {
    pub references: Vec<(EntityKind, i32)>,
    meta: bool,
}

impl ReferenceCollector {
    /// References used by the html renderer, including quote captions.
    pub fn for_html() -> Self {
        Self::default()
    }

    /// References used by meta descriptions. Quotes are skipped and labels are only computed for
    /// references without options.
    pub fn for_meta() -> Self {
        ReferenceCollector {
            references: vec![],
            meta: true,
        }
    }

    pub fn collect(mut self, root: &Element) -> Vec<(EntityKind, i32)> {
        self.walk_root(root);
        self.references
    }
}

impl NodeVisitor for ReferenceCollector {
    fn visit_element(&mut self, element: &Element) {
        if self.meta && element.tag == Tag::Quote {
            return;
        }
        if let Some(kind) = EntityKind::for_tag(element.tag) {
            if !(self.meta && !element.options.is_empty()) {
                if let Some(id) = parse_id(reference_text(element)) {
                    self.references.push((kind, id));
                }
            }
        }
        self.walk_element(element)
    }
}

/// Titles resolved ahead of a render.
#[derive(Debug, Default, Clone)]
pub struct Titles {
    titles: HashMap<(EntityKind, i32), String>,
}

impl Titles {
    /// Looks up each distinct reference once, in order. Provider errors are logged and count as
    /// not found.
    pub async fn resolve(
        references: impl IntoIterator<Item = (EntityKind, i32)>,
        provider: &dyn LookupProvider,
    ) -> Self {
        let mut titles = HashMap::new();
        let mut seen = HashSet::new();

        for (kind, id) in references {
            if !seen.insert((kind, id)) {
                continue;
            }
            match provider.title(kind, id).await {
                Ok(Some(title)) => {
                    titles.insert((kind, id), title);
                }
                Ok(None) => {}
                Err(e) => warn!(?kind, id, error = %e, "title lookup failed"),
            }
        }

        Titles { titles }
    }

    pub fn get(&self, kind: EntityKind, id: i32) -> Option<&str> {
        self.titles.get(&(kind, id)).map(|s| s.as_str())
    }
}
