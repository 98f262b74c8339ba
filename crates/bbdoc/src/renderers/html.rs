use bbdoc_parser::ast::{Element, Node};
use bbdoc_parser::parse;
use bbdoc_parser::tags::Tag;
use tracing::debug;
use urlencoding::encode;

use crate::lookup::Titles;
use crate::renderers::links::{is_external, is_safe_href};
use crate::renderers::{reference_label, MarkupRenderer, RenderError};
use crate::timing::{parse_invariant_f64, FrameCount};
use crate::video::{write_embed, VideoParameters};
use crate::writer::HtmlSink;

type Result<T = ()> = std::result::Result<T, RenderError>;

/// One html render walk over a document whose titles have been resolved.
pub(crate) struct HtmlRenderer<'a> {
    pub(crate) markup: &'a MarkupRenderer,
    pub(crate) titles: &'a Titles,
}

impl HtmlRenderer<'_> {
    fn write_node(&self, node: &Node, sink: &mut dyn HtmlSink) -> Result {
        match node {
            Node::Text(text) => Ok(sink.text(text)?),
            Node::Element(element) => self.write_element(element, sink),
        }
    }

    fn write_children(&self, element: &Element, sink: &mut dyn HtmlSink) -> Result {
        element
            .children
            .iter()
            .try_for_each(|c| self.write_node(c, sink))
    }

    fn write_simple(&self, element: &Element, sink: &mut dyn HtmlSink, name: &str) -> Result {
        sink.open_tag(name)?;
        self.write_children(element, sink)?;
        Ok(sink.close_tag(name)?)
    }

    fn write_classy(
        &self,
        element: &Element,
        sink: &mut dyn HtmlSink,
        name: &str,
        class: &str,
    ) -> Result {
        sink.open_tag(name)?;
        sink.attribute("class", class)?;
        self.write_children(element, sink)?;
        Ok(sink.close_tag(name)?)
    }

    pub(crate) fn write_element(&self, element: &Element, sink: &mut dyn HtmlSink) -> Result {
        match element.tag {
            Tag::Root | Tag::NoParse => self.write_children(element, sink),

            Tag::Bold => self.write_simple(element, sink, "b"),
            Tag::Italic => self.write_simple(element, sink, "i"),
            Tag::Underline => self.write_simple(element, sink, "u"),
            Tag::Strikethrough => self.write_simple(element, sink, "s"),
            Tag::Subscript => self.write_simple(element, sink, "sub"),
            Tag::Superscript => self.write_simple(element, sink, "sup"),
            Tag::Teletype => self.write_simple(element, sink, "tt"),
            Tag::Table => self.write_simple(element, sink, "table"),
            Tag::TableRow => self.write_simple(element, sink, "tr"),
            Tag::TableCell => self.write_simple(element, sink, "td"),
            Tag::TableHeader => self.write_simple(element, sink, "th"),
            Tag::ListItem => self.write_simple(element, sink, "li"),
            Tag::List => {
                let name = if element.options == "1" { "ol" } else { "ul" };
                self.write_simple(element, sink, name)
            }

            Tag::Html(html) if html.is_void() => Ok(sink.void_tag(html.name())?),
            Tag::Html(html) => self.write_simple(element, sink, html.name()),
            Tag::Hr => Ok(sink.void_tag("hr")?),

            Tag::Left => self.write_classy(element, sink, "div", "a-l"),
            Tag::Center => self.write_classy(element, sink, "div", "a-c"),
            Tag::Right => self.write_classy(element, sink, "div", "a-r"),
            Tag::Spoiler => self.write_classy(element, sink, "span", "spoiler"),
            Tag::Warning => self.write_classy(element, sink, "div", "warning"),
            Tag::Note => self.write_classy(element, sink, "div", "forumline"),
            Tag::Highlight => self.write_classy(element, sink, "span", "highlight"),

            Tag::Color => self.write_style_span(element, sink, "color"),
            Tag::BgColor => self.write_style_span(element, sink, "background-color"),
            Tag::Size => self.write_size(element, sink),

            Tag::Quote => self.write_quote(element, sink),
            Tag::Code => self.write_code(element, sink),
            Tag::Img => self.write_img(element, sink),
            Tag::Frames => self.write_frames(element, sink),
            Tag::Google => self.write_google(element, sink),
            Tag::Video => self.write_video(element, sink),

            Tag::Url
            | Tag::Email
            | Tag::Thread
            | Tag::Post
            | Tag::Game
            | Tag::GameGroup
            | Tag::Movie
            | Tag::Submission
            | Tag::UserFile
            | Tag::Wiki => self.write_reference(element, sink),
        }
    }

    /// Writes an anchor. Tag specific attributes come before the stock ones so they win on
    /// duplicates.
    fn write_hyperlink(
        &self,
        sink: &mut dyn HtmlSink,
        href: &str,
        attributes: &[(&str, &str)],
        contents: impl FnOnce(&mut dyn HtmlSink) -> Result,
    ) -> Result {
        sink.open_tag("a")?;
        sink.attribute("href", href)?;
        for (name, value) in attributes {
            sink.attribute(name, value)?;
        }
        if is_external(href, &self.markup.settings.site_host) {
            sink.attribute("rel", "noopener external")?;
        }
        contents(&mut *sink)?;
        Ok(sink.close_tag("a")?)
    }

    fn write_reference(&self, element: &Element, sink: &mut dyn HtmlSink) -> Result {
        if element.options.is_empty() {
            let text = element.single_text()?.unwrap_or_default();
            let href = self.markup.href(element.tag, text);
            let label = reference_label(element.tag, text, self.titles)
                .unwrap_or_else(|| text.to_string());

            if !is_safe_href(&href) {
                debug!(%href, "unsafe link target written as text");
                return Ok(sink.text(&label)?);
            }
            self.write_hyperlink(sink, &href, &[], |s| Ok(s.text(&label)?))
        } else {
            let href = self.markup.href(element.tag, &element.options);
            if !is_safe_href(&href) {
                debug!(%href, "unsafe link target written as text");
                return self.write_children(element, sink);
            }

            let title = reference_label(element.tag, &element.options, self.titles);
            let attributes: Vec<(&str, &str)> = title
                .as_deref()
                .map(|t| vec![("title", t)])
                .unwrap_or_default();
            self.write_hyperlink(sink, &href, &attributes, |s| {
                self.write_children(element, s)
            })
        }
    }

    fn write_quote(&self, element: &Element, sink: &mut dyn HtmlSink) -> Result {
        sink.open_tag("figure")?;
        if !element.options.is_empty() {
            sink.open_tag("figcaption")?;
            match &element.caption {
                Some(caption) => self.write_element(caption, sink)?,
                None => self.write_element(&parse(&element.options, false, true), sink)?,
            }
            sink.text(" wrote:")?;
            sink.close_tag("figcaption")?;
        }
        self.write_simple(element, sink, "blockquote")?;
        Ok(sink.close_tag("figure")?)
    }

    /// `lang` options select the language, `name.lang` options also add a download link.
    fn write_code(&self, element: &Element, sink: &mut dyn HtmlSink) -> Result {
        let parts: Vec<&str> = element
            .options
            .split('.')
            .filter(|s| !s.is_empty())
            .collect();

        if parts.len() == 2 {
            let href = format!("data:text/plain,{}", encode(&element.child_text()?));
            let label = format!("Download {}", element.options);
            self.write_hyperlink(
                sink,
                &href,
                &[
                    ("class", "btn btn-info code-download"),
                    ("download", element.options.as_str()),
                ],
                |s| Ok(s.text(&label)?),
            )?;
        }

        let language = self
            .markup
            .languages
            .resolve(parts.last().copied().unwrap_or("text"));

        sink.open_tag("pre")?;
        if language != "text" {
            sink.open_tag("div")?;
            sink.text("Language: ")?;
            sink.open_tag("cite")?;
            sink.text(language)?;
            sink.close_tag("cite")?;
            sink.close_tag("div")?;
            sink.void_tag("hr")?;
        }
        sink.open_tag("code")?;
        sink.attribute("class", &format!("language-{language}"))?;
        if let Some(text) = element.single_text()? {
            sink.text(text)?;
        }
        sink.close_tag("code")?;
        Ok(sink.close_tag("pre")?)
    }

    fn write_img(&self, element: &Element, sink: &mut dyn HtmlSink) -> Result {
        let src = element.child_text()?;
        if !is_safe_href(&src) {
            debug!(%src, "unsafe image source written as text");
            return Ok(sink.text(&src)?);
        }

        let (width, height) = parse_size(&element.options);
        sink.void_tag("img")?;
        if let Some(width) = width {
            sink.attribute("width", &width.to_string())?;
        }
        if let Some(height) = height {
            sink.attribute("height", &height.to_string())?;
        }
        sink.attribute("src", &src)?;
        Ok(sink.attribute("class", "mw-100")?)
    }

    fn write_frames(&self, element: &Element, sink: &mut dyn HtmlSink) -> Result {
        let count = FrameCount::parse(&element.child_text()?);
        sink.open_tag("abbr")?;
        sink.attribute("title", &count.description())?;
        sink.text(&count.duration().to_string())?;
        Ok(sink.close_tag("abbr")?)
    }

    fn write_style_span(
        &self,
        element: &Element,
        sink: &mut dyn HtmlSink,
        property: &str,
    ) -> Result {
        // TODO: validate the css value, only `;` is filtered today
        let value = first_style_token(&element.options);
        sink.open_tag("span")?;
        sink.attribute("style", &format!("{property}: {value}"))?;
        self.write_children(element, sink)?;
        Ok(sink.close_tag("span")?)
    }

    /// Unitless sizes are pixels at the 12px base size and become `em`.
    fn write_size(&self, element: &Element, sink: &mut dyn HtmlSink) -> Result {
        let size = first_style_token(&element.options);
        let style = match parse_invariant_f64(size).filter(|s| s.is_finite()) {
            Some(px) => format!("--fs: {}em", px / 12.0),
            None => format!("--fs: {size}"),
        };

        sink.open_tag("span")?;
        sink.attribute("class", "fontsize")?;
        sink.attribute("style", &style)?;
        self.write_children(element, sink)?;
        Ok(sink.close_tag("span")?)
    }

    fn write_google(&self, element: &Element, sink: &mut dyn HtmlSink) -> Result {
        let query = element.child_text()?;
        let (label, base) = if element.options == "images" {
            ("Google Images Search", "//www.google.com/images?q=")
        } else {
            ("Google Search", "//www.google.com/search?q=")
        };
        let href = format!("{base}{}", encode(&query));
        self.write_hyperlink(sink, &href, &[], |s| {
            Ok(s.text(&format!("{label}: {query}"))?)
        })
    }

    /// Embeds known providers, and always links to the video.
    fn write_video(&self, element: &Element, sink: &mut dyn HtmlSink) -> Result {
        let href = element.child_text()?;
        if !is_safe_href(&href) {
            debug!(%href, "unsafe video link written as text");
            return Ok(sink.text(&href)?);
        }

        if let Some(mut params) = VideoParameters::from_url(&href) {
            if let (Some(width), Some(height)) = parse_size(&element.options) {
                params.width = Some(width);
                params.height = Some(height);
            }
            write_embed(sink, &params)?;
        }

        self.write_hyperlink(sink, &href, &[], |s| Ok(s.text("Link to video")?))
    }
}

fn first_style_token(options: &str) -> &str {
    options.split(';').next().unwrap_or_default()
}

/// `WxH`, `W`, `Wx` or `xH`. More than one `x` gives neither side.
fn parse_size(options: &str) -> (Option<u32>, Option<u32>) {
    let parts: Vec<&str> = options.split('x').collect();
    let number = |s: &str| s.trim().parse::<u32>().ok();
    match parts.as_slice() {
        [width] => (number(*width), None),
        [width, height] => (number(*width), number(*height)),
        _ => (None, None),
    }
}
