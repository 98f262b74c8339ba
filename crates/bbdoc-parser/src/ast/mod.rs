pub mod visitor;

use crate::tags::Tag;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Literal text. Never reinterpreted as markup.
    Text(String),
    Element(Element),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(rename = "name")]
    pub tag: Tag,
    /// Everything after `=` in the opening tag, empty if absent.
    #[serde(default)]
    pub options: String,
    #[serde(default)]
    pub children: Vec<Node>,
    /// Quote author, parsed as a single-line run. Only set for quotes with options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<Box<Element>>,
}

/// A raw-text element held something other than text.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("`{tag}` element contains an element child where only text is allowed")]
pub struct NotRawText {
    pub tag: Tag,
}

impl Element {
    pub fn new<S: Into<String>>(tag: Tag, options: S, children: Vec<Node>) -> Self {
        Self {
            tag,
            options: options.into(),
            children,
            caption: None,
        }
    }

    pub fn root(children: Vec<Node>) -> Self {
        Self::new(Tag::Root, "", children)
    }

    pub fn empty(tag: Tag) -> Self {
        Self::new(tag, "", vec![])
    }

    pub fn with_text<S: Into<String>>(tag: Tag, text: S) -> Self {
        Self::new(tag, "", vec![Node::Text(text.into())])
    }

    /// Text of the single text child of a raw-text element, or `None` when the body was empty.
    pub fn single_text(&self) -> Result<Option<&str>, NotRawText> {
        let mut found = None;
        for child in &self.children {
            match child {
                Node::Text(s) if found.is_none() => found = Some(s.as_str()),
                _ => return Err(NotRawText { tag: self.tag }),
            }
        }
        Ok(found)
    }

    /// Concatenation of all text children.
    pub fn child_text(&self) -> Result<String, NotRawText> {
        self.children
            .iter()
            .map(|c| match c {
                Node::Text(s) => Ok(s.as_str()),
                Node::Element(_) => Err(NotRawText { tag: self.tag }),
            })
            .collect()
    }
}

impl Node {
    pub fn get_element(&self) -> Option<&Element> {
        if let Node::Element(e) = self {
            Some(e)
        } else {
            None
        }
    }

    pub fn get_text(&self) -> Option<&str> {
        if let Node::Text(s) = self {
            Some(s)
        } else {
            None
        }
    }
}

impl From<Element> for Node {
    fn from(value: Element) -> Self {
        Node::Element(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_text_of_raw_element() {
        let el = Element::new(
            Tag::Code,
            "",
            vec![Node::Text("a".into()), Node::Text("b".into())],
        );
        assert_eq!(Ok("ab".to_string()), el.child_text());
        assert_eq!(Err(NotRawText { tag: Tag::Code }), el.single_text());
        assert_eq!(Ok(None), Element::empty(Tag::Url).single_text());
    }

    #[test]
    fn element_child_is_rejected() {
        let el = Element::new(Tag::Img, "", vec![Element::empty(Tag::Bold).into()]);
        assert_eq!(Err(NotRawText { tag: Tag::Img }), el.child_text());
    }

    #[test]
    fn tree_serialization() {
        let tree = Element::root(vec![
            Element::with_text(Tag::Bold, "hi").into(),
            Node::Text(" there".into()),
        ]);
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!("_root", json["name"]);
        assert_eq!("b", json["children"][0]["Element"]["name"]);
        assert!(json.get("caption").is_none());

        let back: Element = serde_json::from_value(json).unwrap();
        assert_eq!(tree, back);
    }

    #[test]
    fn unknown_tag_name_fails_to_deserialize() {
        let json = r#"{"name": "marquee", "options": "", "children": []}"#;
        assert!(serde_json::from_str::<Element>(json).is_err());
    }
}
