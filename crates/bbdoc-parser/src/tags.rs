use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// How the body of a tag is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildrenMode {
    /// Void tag, never has a body.
    None,
    /// Body is copied verbatim up to the matching close tag.
    RawText,
    /// Body is parsed as markup.
    Parsed,
    /// Body is parsed as markup; the options string is parsed once more as a single-line
    /// caption run (quote authors).
    ParsedOnce,
    /// Raw text when the tag has no options (the body is the link target), parsed markup when it
    /// has options (the body is the label).
    RawTextUnlessOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsMode {
    None,
    Required,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagInfo {
    pub children: ChildrenMode,
    pub options: OptionsMode,
}

impl TagInfo {
    const fn new(children: ChildrenMode, options: OptionsMode) -> Self {
        Self { children, options }
    }

    /// Whether the body of an element with the given options is raw text.
    pub fn is_raw(&self, options: &str) -> bool {
        match self.children {
            ChildrenMode::RawText => true,
            ChildrenMode::RawTextUnlessOptions => options.is_empty(),
            _ => false,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown tag name `{0}`")]
pub struct UnknownTag(pub String);

/// The subset of html that may be written directly in markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HtmlTag {
    B,
    I,
    Em,
    U,
    Pre,
    Code,
    Tt,
    Strike,
    S,
    Del,
    Sup,
    Sub,
    Div,
    Small,
    Br,
    Hr,
}

impl HtmlTag {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "b" => HtmlTag::B,
            "i" => HtmlTag::I,
            "em" => HtmlTag::Em,
            "u" => HtmlTag::U,
            "pre" => HtmlTag::Pre,
            "code" => HtmlTag::Code,
            "tt" => HtmlTag::Tt,
            "strike" => HtmlTag::Strike,
            "s" => HtmlTag::S,
            "del" => HtmlTag::Del,
            "sup" => HtmlTag::Sup,
            "sub" => HtmlTag::Sub,
            "div" => HtmlTag::Div,
            "small" => HtmlTag::Small,
            "br" => HtmlTag::Br,
            "hr" => HtmlTag::Hr,
            _ => return None,
        })
    }

    /// The html element name written to the output.
    pub fn name(&self) -> &'static str {
        match self {
            HtmlTag::B => "b",
            HtmlTag::I => "i",
            HtmlTag::Em => "em",
            HtmlTag::U => "u",
            HtmlTag::Pre => "pre",
            HtmlTag::Code => "code",
            HtmlTag::Tt => "tt",
            HtmlTag::Strike => "strike",
            HtmlTag::S => "s",
            HtmlTag::Del => "del",
            HtmlTag::Sup => "sup",
            HtmlTag::Sub => "sub",
            HtmlTag::Div => "div",
            HtmlTag::Small => "small",
            HtmlTag::Br => "br",
            HtmlTag::Hr => "hr",
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, HtmlTag::Br | HtmlTag::Hr)
    }
}

/// Every element name a parsed tree can contain.
///
/// Serializes as the canonical name (`b`, `*`, `_root`, `html:em`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Tag {
    /// Implicit wrapper around a whole document.
    Root,
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Subscript,
    Superscript,
    Teletype,
    Left,
    Center,
    Right,
    Spoiler,
    Warning,
    Note,
    Highlight,
    Quote,
    Code,
    Img,
    Url,
    Email,
    Thread,
    Post,
    Game,
    GameGroup,
    Movie,
    Submission,
    UserFile,
    Wiki,
    Video,
    Google,
    Frames,
    Color,
    BgColor,
    Size,
    NoParse,
    Hr,
    List,
    ListItem,
    Table,
    TableRow,
    TableCell,
    TableHeader,
    Html(HtmlTag),
}

impl Tag {
    /// Looks up a lower-cased `[tag]` name. Never returns [Tag::Root] or [Tag::Html].
    pub fn from_bb_name(name: &str) -> Option<Self> {
        Some(match name {
            "b" => Tag::Bold,
            "i" => Tag::Italic,
            "u" => Tag::Underline,
            "s" => Tag::Strikethrough,
            "sub" => Tag::Subscript,
            "sup" => Tag::Superscript,
            "tt" => Tag::Teletype,
            "left" => Tag::Left,
            "center" => Tag::Center,
            "right" => Tag::Right,
            "spoiler" => Tag::Spoiler,
            "warning" => Tag::Warning,
            "note" => Tag::Note,
            "highlight" => Tag::Highlight,
            "quote" => Tag::Quote,
            "code" => Tag::Code,
            "img" => Tag::Img,
            "url" => Tag::Url,
            "email" => Tag::Email,
            "thread" => Tag::Thread,
            "post" => Tag::Post,
            "game" => Tag::Game,
            "gamegroup" => Tag::GameGroup,
            "movie" => Tag::Movie,
            "submission" => Tag::Submission,
            "userfile" => Tag::UserFile,
            "wiki" => Tag::Wiki,
            "video" => Tag::Video,
            "google" => Tag::Google,
            "frames" => Tag::Frames,
            "color" => Tag::Color,
            "bgcolor" => Tag::BgColor,
            "size" => Tag::Size,
            "noparse" => Tag::NoParse,
            "hr" => Tag::Hr,
            "list" => Tag::List,
            "*" => Tag::ListItem,
            "table" => Tag::Table,
            "tr" => Tag::TableRow,
            "td" => Tag::TableCell,
            "th" => Tag::TableHeader,
            _ => return None,
        })
    }

    /// Inverse of [Tag::name].
    pub fn from_name(name: &str) -> Result<Self, UnknownTag> {
        if name == "_root" {
            return Ok(Tag::Root);
        }
        if let Some(html) = name.strip_prefix("html:") {
            return HtmlTag::from_name(html)
                .map(Tag::Html)
                .ok_or_else(|| UnknownTag(name.to_string()));
        }
        Tag::from_bb_name(name).ok_or_else(|| UnknownTag(name.to_string()))
    }

    /// Canonical identifier of the tag. Html passthrough tags are prefixed with `html:`.
    pub fn name(&self) -> String {
        match self {
            Tag::Html(h) => format!("html:{}", h.name()),
            other => other.bb_name().to_string(),
        }
    }

    fn bb_name(&self) -> &'static str {
        match self {
            Tag::Root => "_root",
            Tag::Bold => "b",
            Tag::Italic => "i",
            Tag::Underline => "u",
            Tag::Strikethrough => "s",
            Tag::Subscript => "sub",
            Tag::Superscript => "sup",
            Tag::Teletype => "tt",
            Tag::Left => "left",
            Tag::Center => "center",
            Tag::Right => "right",
            Tag::Spoiler => "spoiler",
            Tag::Warning => "warning",
            Tag::Note => "note",
            Tag::Highlight => "highlight",
            Tag::Quote => "quote",
            Tag::Code => "code",
            Tag::Img => "img",
            Tag::Url => "url",
            Tag::Email => "email",
            Tag::Thread => "thread",
            Tag::Post => "post",
            Tag::Game => "game",
            Tag::GameGroup => "gamegroup",
            Tag::Movie => "movie",
            Tag::Submission => "submission",
            Tag::UserFile => "userfile",
            Tag::Wiki => "wiki",
            Tag::Video => "video",
            Tag::Google => "google",
            Tag::Frames => "frames",
            Tag::Color => "color",
            Tag::BgColor => "bgcolor",
            Tag::Size => "size",
            Tag::NoParse => "noparse",
            Tag::Hr => "hr",
            Tag::List => "list",
            Tag::ListItem => "*",
            Tag::Table => "table",
            Tag::TableRow => "tr",
            Tag::TableCell => "td",
            Tag::TableHeader => "th",
            Tag::Html(_) => "html",
        }
    }

    pub fn info(&self) -> TagInfo {
        use ChildrenMode as C;
        use OptionsMode as O;

        match self {
            Tag::Root
            | Tag::Bold
            | Tag::Italic
            | Tag::Underline
            | Tag::Strikethrough
            | Tag::Subscript
            | Tag::Superscript
            | Tag::Teletype
            | Tag::Left
            | Tag::Center
            | Tag::Right
            | Tag::Spoiler
            | Tag::Warning
            | Tag::Note
            | Tag::Highlight
            | Tag::ListItem
            | Tag::Table
            | Tag::TableRow
            | Tag::TableCell
            | Tag::TableHeader => TagInfo::new(C::Parsed, O::None),

            Tag::Quote => TagInfo::new(C::ParsedOnce, O::Optional),

            Tag::Code | Tag::Img | Tag::Video | Tag::Google => {
                TagInfo::new(C::RawText, O::Optional)
            }
            Tag::Frames | Tag::NoParse => TagInfo::new(C::RawText, O::None),

            Tag::Url
            | Tag::Email
            | Tag::Thread
            | Tag::Post
            | Tag::Game
            | Tag::GameGroup
            | Tag::Movie
            | Tag::Submission
            | Tag::UserFile
            | Tag::Wiki => TagInfo::new(C::RawTextUnlessOptions, O::Optional),

            Tag::Color | Tag::BgColor | Tag::Size => TagInfo::new(C::Parsed, O::Required),
            Tag::List => TagInfo::new(C::Parsed, O::Optional),
            Tag::Hr => TagInfo::new(C::None, O::None),

            Tag::Html(h) if h.is_void() => TagInfo::new(C::None, O::None),
            Tag::Html(_) => TagInfo::new(C::Parsed, O::None),
        }
    }

    /// Tags that are not recognized in single-line contexts.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            Tag::List
                | Tag::ListItem
                | Tag::Table
                | Tag::TableRow
                | Tag::TableCell
                | Tag::TableHeader
                | Tag::Quote
                | Tag::Code
                | Tag::Hr
                | Tag::Left
                | Tag::Center
                | Tag::Right
                | Tag::Warning
                | Tag::Note
                | Tag::Video
                | Tag::Html(HtmlTag::Div | HtmlTag::Pre | HtmlTag::Hr)
        )
    }

    /// Tags rendered as hyperlinks. Bare urls are not auto-linked inside these.
    pub fn is_link(&self) -> bool {
        matches!(
            self,
            Tag::Url
                | Tag::Email
                | Tag::Thread
                | Tag::Post
                | Tag::Game
                | Tag::GameGroup
                | Tag::Movie
                | Tag::Submission
                | Tag::UserFile
                | Tag::Wiki
                | Tag::Google
                | Tag::Video
        )
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Tag::Html(h) => write!(f, "html:{}", h.name()),
            other => f.write_str(other.bb_name()),
        }
    }
}

impl TryFrom<String> for Tag {
    type Error = UnknownTag;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Tag::from_name(&value)
    }
}

impl From<Tag> for String {
    fn from(value: Tag) -> Self {
        value.name()
    }
}
