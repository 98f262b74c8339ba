use crate::ast::{Element, Node};
use crate::tags::{ChildrenMode, HtmlTag, OptionsMode, Tag};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    // Options may contain one level of balanced brackets so captions like
    // `[quote=[b]name[/b]]` survive.
    static ref OPENING_TAG: Regex =
        Regex::new(r"^\[([^\p{C}\[\]=/]+)(?:=((?:[^\p{C}\[\]]|\[[^\p{C}\[\]]*\])*))?\]")
            .expect("invalid regex expression");
    static ref CLOSING_TAG: Regex =
        Regex::new(r"^\[/([^\p{C}\[\]=/]+)\]").expect("invalid regex expression");
    // No attributes are accepted on html tags.
    static ref HTML_OPENING: Regex =
        Regex::new(r"^<\s*([a-zA-Z]+)\s*>").expect("invalid regex expression");
    static ref HTML_CLOSING: Regex =
        Regex::new(r"^<\s*/\s*([a-zA-Z]+)\s*>").expect("invalid regex expression");
    static ref HTML_VOID: Regex =
        Regex::new(r"^<\s*([a-zA-Z]+)\s*/\s*>").expect("invalid regex expression");
    static ref BARE_URL: Regex =
        Regex::new(r"^https?://(?:[A-Za-z0-9\-._~!$&'()*+,;=:@/?#]|%[A-Fa-f0-9]{2})+")
            .expect("invalid regex expression");
}

/// Elements nested deeper than this stay literal text.
pub const MAX_DEPTH: usize = 100;

/// Additional parser configuration.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserSettings {
    /// Recognize the html passthrough subset (`<b>`, `<br/>`, ...).
    #[serde(default)]
    pub allow_html: bool,
    /// Treat block tags (lists, tables, quotes, ...) as literal text.
    #[serde(default)]
    pub single_line: bool,
}

/// Parses markup into a tree rooted at a [Tag::Root] element. Never fails: anything that is not
/// well-formed markup is kept as literal text.
pub fn parse(markup: &str, allow_html: bool, single_line: bool) -> Element {
    BbParser::new(
        markup,
        ParserSettings {
            allow_html,
            single_line,
        },
    )
    .parse()
}

fn parse_caption(options: &str) -> Element {
    parse(options, false, true)
}

/// Stack based markup parser. The root is kept outside the stack so the stack only holds
/// elements that are still open.
pub struct BbParser<'a> {
    input: &'a str,
    // ascii-lowercased copy of the input, byte offsets are identical
    lowered: String,
    index: usize,
    settings: ParserSettings,
    root: Element,
    stack: Vec<Element>,
    text: String,
}

impl<'a> BbParser<'a> {
    pub fn new(input: &'a str, settings: ParserSettings) -> Self {
        Self {
            input,
            lowered: input.to_ascii_lowercase(),
            index: 0,
            settings,
            root: Element::root(vec![]),
            stack: vec![],
            text: String::new(),
        }
    }

    pub fn parse(mut self) -> Element {
        let input = self.input;

        while self.index < input.len() {
            if self.in_raw_text() {
                self.read_raw_text();
                continue;
            }

            let rest = &input[self.index..];
            if rest.starts_with('[') && (self.try_opening_tag() || self.try_closing_tag()) {
                continue;
            }
            if self.settings.allow_html && rest.starts_with('<') && self.try_html_tag() {
                continue;
            }
            if rest.starts_with('h') && self.try_bare_url() {
                continue;
            }

            match rest.chars().next() {
                Some(c) => {
                    self.text.push(c);
                    self.index += c.len_utf8();
                }
                None => break,
            }
        }

        self.flush_text();
        while !self.stack.is_empty() {
            self.pop();
        }
        self.root
    }

    fn current(&self) -> &Element {
        self.stack.last().unwrap_or(&self.root)
    }

    fn current_mut(&mut self) -> &mut Element {
        match self.stack.last_mut() {
            Some(e) => e,
            None => &mut self.root,
        }
    }

    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            self.current_mut().children.push(Node::Text(text));
        }
    }

    /// Adds an element to the current element. Void elements are attached directly, all others
    /// stay open until closed.
    fn open(&mut self, element: Element, void: bool) {
        self.flush_text();
        if void {
            self.current_mut().children.push(element.into());
        } else {
            self.stack.push(element);
        }
    }

    fn pop(&mut self) {
        self.flush_text();
        if let Some(element) = self.stack.pop() {
            self.current_mut().children.push(element.into());
        }
    }

    /// Closes `tag` and everything opened after it. Returns false if `tag` is not open.
    fn close(&mut self, tag: Tag, consumed: usize) -> bool {
        let Some(pos) = self.stack.iter().rposition(|e| e.tag == tag) else {
            return false;
        };
        self.index += consumed;
        while self.stack.len() > pos {
            self.pop();
        }
        true
    }

    fn is_full(&self) -> bool {
        self.stack.len() >= MAX_DEPTH
    }

    fn in_raw_text(&self) -> bool {
        let current = self.current();
        current.tag.info().is_raw(&current.options)
    }

    fn read_raw_text(&mut self) {
        let close = format!("[/{}]", self.current().tag);
        match self.lowered[self.index..].find(&close) {
            Some(offset) => {
                self.text
                    .push_str(&self.input[self.index..self.index + offset]);
                self.index += offset + close.len();
                self.pop();
            }
            None => {
                self.text.push_str(&self.input[self.index..]);
                self.index = self.input.len();
            }
        }
    }

    fn try_opening_tag(&mut self) -> bool {
        let input = self.input;
        let Some(caps) = OPENING_TAG.captures(&input[self.index..]) else {
            return false;
        };
        let Some(tag) = Tag::from_bb_name(&caps[1].to_lowercase()) else {
            return false;
        };
        if self.settings.single_line && tag.is_block() {
            return false;
        }

        let info = tag.info();
        let reopens_item = tag == Tag::ListItem && self.current().tag == Tag::ListItem;
        if info.children != ChildrenMode::None && !reopens_item && self.is_full() {
            return false;
        }
        let options = match (info.options, caps.get(2).map(|m| unquote(m.as_str()))) {
            (OptionsMode::None, Some(_)) => return false,
            (OptionsMode::Required, None | Some("")) => return false,
            (_, options) => options.unwrap_or_default().to_string(),
        };

        self.index += caps[0].len();

        if reopens_item {
            self.pop();
        }

        let mut element = Element::new(tag, options, vec![]);
        if info.children == ChildrenMode::ParsedOnce && !element.options.is_empty() {
            element.caption = Some(Box::new(parse_caption(&element.options)));
        }
        self.open(element, info.children == ChildrenMode::None);
        true
    }

    fn try_closing_tag(&mut self) -> bool {
        let input = self.input;
        let Some(caps) = CLOSING_TAG.captures(&input[self.index..]) else {
            return false;
        };
        match Tag::from_bb_name(&caps[1].to_lowercase()) {
            Some(tag) => self.close(tag, caps[0].len()),
            None => false,
        }
    }

    fn try_html_tag(&mut self) -> bool {
        let input = self.input;
        let rest = &input[self.index..];

        if let Some(caps) = HTML_CLOSING.captures(rest) {
            return match HtmlTag::from_name(&caps[1].to_ascii_lowercase()) {
                Some(html) => self.close(Tag::Html(html), caps[0].len()),
                None => false,
            };
        }

        let (caps, self_closing) = if let Some(caps) = HTML_VOID.captures(rest) {
            (caps, true)
        } else if let Some(caps) = HTML_OPENING.captures(rest) {
            (caps, false)
        } else {
            return false;
        };

        let Some(html) = HtmlTag::from_name(&caps[1].to_ascii_lowercase()) else {
            return false;
        };
        if self_closing && !html.is_void() {
            return false;
        }
        let tag = Tag::Html(html);
        if self.settings.single_line && tag.is_block() {
            return false;
        }
        if !html.is_void() && self.is_full() {
            return false;
        }

        self.index += caps[0].len();
        self.open(Element::empty(tag), html.is_void());
        true
    }

    fn try_bare_url(&mut self) -> bool {
        let input = self.input;
        if self.stack.iter().any(|e| e.tag.is_link()) {
            return false;
        }
        if input[..self.index]
            .chars()
            .next_back()
            .map_or(false, |c| c.is_alphanumeric())
        {
            return false;
        }
        let Some(m) = BARE_URL.find(&input[self.index..]) else {
            return false;
        };

        let url = m
            .as_str()
            .trim_end_matches(&['.', ',', ';', ':', '!', '?'][..]);
        if url.ends_with("//") {
            return false;
        }

        self.index += url.len();
        self.open(Element::with_text(Tag::Url, url), true);
        true
    }
}

fn unquote(options: &str) -> &str {
    options
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Node {
        Node::Text(s.into())
    }

    fn el(tag: Tag, options: &str, children: Vec<Node>) -> Node {
        Node::Element(Element::new(tag, options, children))
    }

    macro_rules! parse_tests {
        ($prefix:ident ($allow_html:expr, $single_line:expr) $($name:ident: $value:expr,)*) => {
        $(
            paste::item!{
            #[test]
            fn [<$prefix _ $name>]() {
                let (input, expected): (&str, Vec<Node>) = $value;
                let doc = parse(input, $allow_html, $single_line);
                assert_eq!(Element::root(expected), doc);
            }
            }
        )*
        }
    }

    parse_tests! {
        bb (false, false)
        plain_text: ("just some text", vec![text("just some text")]),
        bold: ("[b]hello[/b]", vec![el(Tag::Bold, "", vec![text("hello")])]),
        unclosed_at_end: ("[b]hello", vec![el(Tag::Bold, "", vec![text("hello")])]),
        case_insensitive: ("[B]x[/b]", vec![el(Tag::Bold, "", vec![text("x")])]),
        unknown_tag: ("[foo]bar[/foo]", vec![text("[foo]bar[/foo]")]),
        stray_bracket: ("a [ b ] c", vec![text("a [ b ] c")]),
        stray_close: ("a[/b]", vec![text("a[/b]")]),
        options_not_allowed: ("[b=1]x[/b]", vec![text("[b=1]x[/b]")]),
        required_options_missing: ("[color]x[/color]", vec![text("[color]x[/color]")]),
        required_options_empty: ("[size=]x[/size]", vec![text("[size=]x[/size]")]),
        required_options: ("[color=red]x[/color]", vec![el(Tag::Color, "red", vec![text("x")])]),
        empty_optional_options: ("[list=]a[/list]", vec![el(Tag::List, "", vec![text("a")])]),
        quoted_options: ("[url=\"http://a.b\"]x[/url]", vec![el(Tag::Url, "http://a.b", vec![text("x")])]),
        nested: ("[b][i]x[/i]y[/b]", vec![
            el(Tag::Bold, "", vec![el(Tag::Italic, "", vec![text("x")]), text("y")])
        ]),
        close_outer_closes_inner: ("[b][i]x[/b]y", vec![
            el(Tag::Bold, "", vec![el(Tag::Italic, "", vec![text("x")])]),
            text("y"),
        ]),
        code_is_raw: ("[code][b]<x>[/b][/code]", vec![el(Tag::Code, "", vec![text("[b]<x>[/b]")])]),
        raw_close_case_insensitive: ("[noparse]a[/NOPARSE]b", vec![
            el(Tag::NoParse, "", vec![text("a")]),
            text("b"),
        ]),
        empty_raw: ("[code][/code]", vec![el(Tag::Code, "", vec![])]),
        unclosed_raw: ("[code=lua]x = [1]", vec![el(Tag::Code, "lua", vec![text("x = [1]")])]),
        link_without_options_is_raw: ("[url]http://a.b/[b][/url]", vec![
            el(Tag::Url, "", vec![text("http://a.b/[b]")])
        ]),
        link_with_options_is_parsed: ("[game=1][b]SMB[/b][/game]", vec![
            el(Tag::Game, "1", vec![el(Tag::Bold, "", vec![text("SMB")])])
        ]),
        void_hr: ("a[hr]b", vec![text("a"), el(Tag::Hr, "", vec![]), text("b")]),
        list_items: ("[list][*]a[*]b[/list]", vec![
            el(Tag::List, "", vec![
                el(Tag::ListItem, "", vec![text("a")]),
                el(Tag::ListItem, "", vec![text("b")]),
            ])
        ]),
        html_ignored: ("<b>x</b>", vec![text("<b>x</b>")]),
        bare_url: ("see http://example.com/a?b=1. ok", vec![
            text("see "),
            el(Tag::Url, "", vec![text("http://example.com/a?b=1")]),
            text(". ok"),
        ]),
        bare_url_needs_boundary: ("xhttp://example.com", vec![text("xhttp://example.com")]),
        no_url_in_links: ("[url=http://a.b]http://c.d[/url]", vec![
            el(Tag::Url, "http://a.b", vec![text("http://c.d")])
        ]),
        unicode: ("[b]héllo ✓[/b]ü", vec![el(Tag::Bold, "", vec![text("héllo ✓")]), text("ü")]),
        multiline_options_rejected: ("[color=re\nd]x", vec![text("[color=re\nd]x")]),
    }

    parse_tests! {
        html (true, false)
        html_bold: ("<b>x</b>", vec![el(Tag::Html(HtmlTag::B), "", vec![text("x")])]),
        html_void: ("a<br/>b<hr>", vec![
            text("a"),
            el(Tag::Html(HtmlTag::Br), "", vec![]),
            text("b"),
            el(Tag::Html(HtmlTag::Hr), "", vec![]),
        ]),
        html_unknown: ("<script>x</script>", vec![text("<script>x</script>")]),
        html_attributes_rejected: ("<b onclick=x>y</b>", vec![text("<b onclick=x>y</b>")]),
        html_mixed: ("[i]<em>x[/i]", vec![
            el(Tag::Italic, "", vec![el(Tag::Html(HtmlTag::Em), "", vec![text("x")])])
        ]),
    }

    parse_tests! {
        single_line (false, true)
        list_demoted: ("[list][*]a[/list]", vec![text("[list][*]a[/list]")]),
        inline_kept: ("[i]a[/i]", vec![el(Tag::Italic, "", vec![text("a")])]),
        quote_demoted: ("[quote]a[/quote]", vec![text("[quote]a[/quote]")]),
    }

    fn depth(element: &Element) -> usize {
        element
            .children
            .iter()
            .filter_map(|c| match c {
                Node::Element(e) => Some(1 + depth(e)),
                Node::Text(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn deep_nesting_stays_text() {
        let doc = parse(&"[b]".repeat(10_000), false, false);
        assert_eq!(MAX_DEPTH, depth(&doc));

        let doc = parse(&"<i>".repeat(10_000), true, false);
        assert_eq!(MAX_DEPTH, depth(&doc));
    }

    #[test]
    fn void_and_list_items_at_depth_limit() {
        let input = format!("{}[list][*]a[*]b[hr]", "[b]".repeat(MAX_DEPTH - 2));
        let doc = parse(&input, false, false);

        let mut inner = &doc;
        for _ in 0..MAX_DEPTH - 1 {
            match inner.children.last() {
                Some(Node::Element(e)) => inner = e,
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(Tag::List, inner.tag);
        assert_eq!(
            vec![
                el(Tag::ListItem, "", vec![text("a")]),
                el(
                    Tag::ListItem,
                    "",
                    vec![text("b"), el(Tag::Hr, "", vec![])]
                ),
            ],
            inner.children
        );
    }

    #[test]
    fn quote_caption_is_parsed_once() {
        let doc = parse("[quote=[b]Bob[/b]]hi[/quote]", false, false);
        let quote = doc.children[0].get_element().unwrap();
        assert_eq!(Tag::Quote, quote.tag);
        assert_eq!("[b]Bob[/b]", quote.options);
        assert_eq!(
            &Element::root(vec![el(Tag::Bold, "", vec![text("Bob")])]),
            quote.caption.as_deref().unwrap()
        );
    }

    #[test]
    fn nested_quote_in_caption_is_literal() {
        let doc = parse("[quote=[quote]x[/quote]]y[/quote]", false, false);
        let quote = doc.children[0].get_element().unwrap();
        assert_eq!(
            &Element::root(vec![text("[quote]x[/quote]")]),
            quote.caption.as_deref().unwrap()
        );
    }

    #[test]
    fn quote_without_options_has_no_caption() {
        let doc = parse("[quote]y[/quote]", false, false);
        assert_eq!(None, doc.children[0].get_element().unwrap().caption);
    }

    #[test]
    fn raw_elements_have_at_most_one_text_child() {
        let doc = parse("[code]a[b]c[/b]<i>[/code]", true, false);
        let code = doc.children[0].get_element().unwrap();
        assert_eq!(Ok(Some("a[b]c[/b]<i>")), code.single_text());
    }
}
