use bbdoc_parser::ast::{Element, NotRawText};
use bbdoc_parser::tags::Tag;
use thiserror::Error;
use tracing::error;

use crate::config::{RenderSettings, Routes};
use crate::languages::LanguageTable;
use crate::lookup::{parse_id, EntityKind, LookupProvider, ReferenceCollector, Titles};
use crate::writer::{HtmlSink, HtmlWriter, WriterError};

pub mod html;
pub mod links;
pub mod meta;

/// Rendering only fails on parser/renderer mismatches, never because of markup content.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("internal error on tag `{tag}`: {reason}")]
    Internal { tag: Tag, reason: String },
    #[error("internal error in html output: {0}")]
    Writer(#[from] WriterError),
}

impl From<NotRawText> for RenderError {
    fn from(value: NotRawText) -> Self {
        RenderError::Internal {
            tag: value.tag,
            reason: value.to_string(),
        }
    }
}

/// Renders parsed markup to html and meta descriptions. Holds only read-only tables, so a single
/// renderer can serve any number of concurrent renders.
#[derive(Debug, Clone)]
pub struct MarkupRenderer {
    settings: RenderSettings,
    languages: LanguageTable,
}

impl Default for MarkupRenderer {
    fn default() -> Self {
        Self::new(RenderSettings::default())
    }
}

impl MarkupRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        let languages = LanguageTable::new(&settings.language_aliases);
        MarkupRenderer {
            settings,
            languages,
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Resolves the titles the document references, then writes it to `sink`.
    pub async fn write_html(
        &self,
        root: &Element,
        sink: &mut dyn HtmlSink,
        lookup: &dyn LookupProvider,
    ) -> Result<(), RenderError> {
        let titles = Titles::resolve(ReferenceCollector::for_html().collect(root), lookup).await;
        self.write_html_with_titles(root, sink, &titles)
    }

    /// Writes html using titles that were already resolved.
    pub fn write_html_with_titles(
        &self,
        root: &Element,
        sink: &mut dyn HtmlSink,
        titles: &Titles,
    ) -> Result<(), RenderError> {
        let renderer = html::HtmlRenderer {
            markup: self,
            titles,
        };
        renderer.write_element(root, sink).map_err(|e| {
            error!(error = %e, "markup rendering aborted");
            e
        })
    }

    pub async fn render_html(
        &self,
        root: &Element,
        lookup: &dyn LookupProvider,
    ) -> Result<String, RenderError> {
        let mut writer = HtmlWriter::new();
        self.write_html(root, &mut writer, lookup).await?;
        Ok(writer.finish()?)
    }

    /// Plain text summary of at most `max_length` characters.
    pub async fn write_meta_description(
        &self,
        root: &Element,
        lookup: &dyn LookupProvider,
        max_length: usize,
    ) -> String {
        let titles = Titles::resolve(ReferenceCollector::for_meta().collect(root), lookup).await;
        meta::MetaRenderer::new(&titles, max_length).render(root)
    }

    /// [MarkupRenderer::write_meta_description] with the configured length.
    pub async fn meta_description(&self, root: &Element, lookup: &dyn LookupProvider) -> String {
        self.write_meta_description(root, lookup, self.settings.meta_description_length)
            .await
    }

    /// Link target of a url-family tag.
    fn href(&self, tag: Tag, target: &str) -> String {
        let routes = &self.settings.routes;
        match tag {
            Tag::Email => format!("mailto:{target}"),
            Tag::Thread => Routes::build(&routes.topic, target),
            Tag::Post => Routes::build(&routes.post, target),
            Tag::Game => Routes::build(&routes.game, target),
            Tag::GameGroup => Routes::build(&routes.game_group, target),
            Tag::Movie => Routes::build(&routes.movie, target),
            Tag::Submission => Routes::build(&routes.submission, target),
            Tag::UserFile => Routes::build(&routes.user_file, target),
            Tag::Wiki => Routes::build(&routes.wiki, target),
            _ => target.to_string(),
        }
    }
}

/// Display label of a reference tag. `None` for tags that are labelled by their own text
/// (`url`, `email`).
pub(crate) fn reference_label(tag: Tag, text: &str, titles: &Titles) -> Option<String> {
    let title = move |kind: EntityKind| parse_id(text).and_then(|id| titles.get(kind, id));
    let titled = move |kind: EntityKind, fallback: &str| match title(kind) {
        Some(title) => title.to_string(),
        None => format!("{fallback} #{text}"),
    };

    Some(match tag {
        Tag::Thread => match title(EntityKind::Topic) {
            Some(topic) => format!("Thread #{text}: {topic}"),
            None => format!("Thread #{text}"),
        },
        Tag::Post => format!("Post #{text}"),
        Tag::Game => titled(EntityKind::Game, "Game"),
        Tag::GameGroup => titled(EntityKind::GameGroup, "Game group"),
        Tag::Movie => titled(EntityKind::Movie, "Movie"),
        Tag::Submission => titled(EntityKind::Submission, "Submission"),
        Tag::UserFile => format!("User movie #{text}"),
        Tag::Wiki => format!("Wiki: {text}"),
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::NullLookup;
    use bbdoc_parser::ast::Node;
    use bbdoc_parser::parse;

    #[tokio::test]
    async fn rendering_is_repeatable() {
        let renderer = MarkupRenderer::default();
        let doc = parse(
            "[quote=Bob]hi [game]3[/game][/quote][code=lua]x = 1[/code][frames]90[/frames]",
            false,
            false,
        );
        let first = renderer.render_html(&doc, &NullLookup).await.unwrap();
        let second = renderer.render_html(&doc, &NullLookup).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn element_inside_raw_tag_is_internal_error() {
        let doc = Element::root(vec![Node::Element(Element::new(
            Tag::Code,
            "",
            vec![Element::with_text(Tag::Bold, "x").into()],
        ))]);
        let err = MarkupRenderer::default()
            .render_html(&doc, &NullLookup)
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Internal { tag: Tag::Code, .. }));
    }

    #[test]
    fn labels() {
        let titles = Titles::default();
        assert_eq!(
            Some("Thread #5".to_string()),
            reference_label(Tag::Thread, "5", &titles)
        );
        assert_eq!(
            Some("Game group #x".to_string()),
            reference_label(Tag::GameGroup, "x", &titles)
        );
        assert_eq!(None, reference_label(Tag::Url, "http://a", &titles));
    }
}
