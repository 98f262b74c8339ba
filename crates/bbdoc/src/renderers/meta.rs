use bbdoc_parser::ast::visitor::NodeVisitor;
use bbdoc_parser::ast::{Element, Node};
use bbdoc_parser::tags::Tag;
use tracing::error;

use crate::lookup::Titles;
use crate::renderers::links::remove_urls;
use crate::renderers::{reference_label, RenderError};
use crate::timing::FrameCount;

/// Builds a plain text summary. Once `max_length` characters are collected every further node is
/// skipped, and the result is cut to `max_length`.
pub(crate) struct MetaRenderer<'a> {
    titles: &'a Titles,
    buf: String,
    chars: usize,
    max_length: usize,
}

impl<'a> MetaRenderer<'a> {
    pub(crate) fn new(titles: &'a Titles, max_length: usize) -> Self {
        MetaRenderer {
            titles,
            buf: String::new(),
            chars: 0,
            max_length,
        }
    }

    pub(crate) fn render(mut self, root: &Element) -> String {
        self.walk_root(root);
        match self.buf.char_indices().nth(self.max_length) {
            Some((end, _)) => self.buf[..end].to_string(),
            None => self.buf,
        }
    }

    fn is_full(&self) -> bool {
        self.chars >= self.max_length
    }

    fn push(&mut self, text: &str) {
        let text = remove_urls(text);
        self.chars += text.chars().count();
        self.buf.push_str(&text);
    }

    fn write_reference(&mut self, element: &Element) -> Result<(), RenderError> {
        let text = element.single_text()?.unwrap_or_default();
        let label = reference_label(element.tag, text, self.titles).unwrap_or_default();
        self.push(&label);
        Ok(())
    }

    fn write_frames(&mut self, element: &Element) -> Result<(), RenderError> {
        let count = FrameCount::parse(&element.child_text()?);
        self.push(&count.duration().to_string());
        Ok(())
    }
}

impl NodeVisitor for MetaRenderer<'_> {
    fn visit_node(&mut self, node: &Node) {
        if !self.is_full() {
            self.walk_node(node)
        }
    }

    fn visit_element(&mut self, element: &Element) {
        if self.is_full() {
            return;
        }

        let result = match element.tag {
            Tag::Quote | Tag::Code | Tag::Img | Tag::Email => Ok(()),
            Tag::Thread
            | Tag::Post
            | Tag::Game
            | Tag::GameGroup
            | Tag::Movie
            | Tag::Submission
            | Tag::UserFile
            | Tag::Wiki
                if element.options.is_empty() =>
            {
                self.write_reference(element)
            }
            Tag::Frames => self.write_frames(element),
            _ => {
                self.walk_nodes(&element.children);
                Ok(())
            }
        };

        if let Err(e) = result {
            error!(error = %e, "skipping element in meta description");
        }
    }

    fn visit_text(&mut self, text: &str) {
        self.push(text);
    }
}

#[cfg(test)]
mod tests {
    use crate::lookup::{LookupProvider, NullLookup};
    use crate::renderers::MarkupRenderer;
    use async_trait::async_trait;
    use bbdoc_parser::parse;

    struct Titled;

    #[async_trait]
    impl LookupProvider for Titled {
        async fn game_title(&self, _id: i32) -> anyhow::Result<Option<String>> {
            Ok(Some("Mega Man (see https://megaman.example)".to_string()))
        }

        async fn game_group_title(&self, _id: i32) -> anyhow::Result<Option<String>> {
            Ok(None)
        }

        async fn movie_title(&self, _id: i32) -> anyhow::Result<Option<String>> {
            Ok(None)
        }

        async fn submission_title(&self, _id: i32) -> anyhow::Result<Option<String>> {
            Ok(Some("#1234S: someone's NES Mega Man".to_string()))
        }

        async fn topic_title(&self, _id: i32) -> anyhow::Result<Option<String>> {
            Ok(None)
        }
    }

    async fn meta(input: &str, lookup: &dyn LookupProvider, max_length: usize) -> String {
        MarkupRenderer::default()
            .write_meta_description(&parse(input, false, false), lookup, max_length)
            .await
    }

    macro_rules! meta_tests {
        ($($name:ident: $value:expr,)*) => {
        $(
            paste::item!{
            #[tokio::test]
            async fn [<meta_ $name>]() {
                let (input, expected) = $value;
                assert_eq!(expected, meta(input, &NullLookup, 400).await);
            }
            }
        )*
        }
    }

    meta_tests! {
        plain: ("[b]bold[/b] and [i]italic[/i]", "bold and italic"),
        skipped_tags: ("a[quote]q[/quote][code]c[/code][img]i.png[/img][email]e@x.y[/email]b", "ab"),
        references: ("[game]5[/game], [thread]7[/thread], [wiki]Home[/wiki]", "Game #5, Thread #7, Wiki: Home"),
        labelled_reference: ("[movie=3]the run[/movie]", "the run"),
        frames: ("took [frames]90[/frames]", "took 00:01.50"),
        urls_removed: ("visit https://example.com today", "visit  today"),
        linked_url: ("[url]https://example.com[/url]!", "!"),
        html_escaped_never: ("a < b", "a < b"),
    }

    #[tokio::test]
    async fn resolved_titles_without_urls() {
        assert_eq!(
            "Mega Man (see  and #1234S: someone's NES Mega Man",
            meta("[game]1[/game] and [submission]2[/submission]", &Titled, 400).await
        );
    }

    #[tokio::test]
    async fn quote_then_long_text_is_bounded() {
        let body = "x".repeat(500);
        let input = format!("[quote=Someone]quoted[/quote]{body}");
        let description = meta(&input, &NullLookup, 400).await;
        assert_eq!(400, description.chars().count());
        assert!(!description.contains("quoted"));
    }

    #[tokio::test]
    async fn stops_visiting_after_limit() {
        assert_eq!("abc", meta("abc[b]def[/b]", &NullLookup, 3).await);
        assert_eq!("ab", meta("abc", &NullLookup, 2).await);
        assert_eq!("héł", meta("héłło", &NullLookup, 3).await);
    }

    #[tokio::test]
    async fn deeply_nested_post() {
        let input = format!("{}[game]1[/game]", "[i]".repeat(10_000));
        let description = meta(&input, &NullLookup, 400).await;
        assert_eq!(400, description.chars().count());
        assert!(description.starts_with("[i][i]"));
    }

    #[tokio::test]
    async fn configured_length() {
        let doc = parse(&"y".repeat(1000), false, false);
        let description = MarkupRenderer::default()
            .meta_description(&doc, &NullLookup)
            .await;
        assert_eq!(400, description.len());
    }
}
