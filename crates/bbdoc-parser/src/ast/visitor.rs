use crate::ast::{Element, Node};

/// Implements the visitor pattern for parsed markup trees. Blanket implementations are provided
/// so implementors only have to implement the methods they need. Walks never mutate the tree.
pub trait NodeVisitor {
    fn walk_root(&mut self, root: &Element) {
        self.visit_element(root)
    }

    fn walk_nodes(&mut self, nodes: &[Node]) {
        nodes.iter().for_each(|n| self.visit_node(n))
    }

    fn walk_node(&mut self, node: &Node) {
        match node {
            Node::Text(text) => self.visit_text(text),
            Node::Element(element) => self.visit_element(element),
        }
    }

    /// Visits the caption (if any) and then the children.
    fn walk_element(&mut self, element: &Element) {
        if let Some(caption) = &element.caption {
            self.visit_element(caption);
        }
        self.walk_nodes(&element.children)
    }

    fn visit_node(&mut self, node: &Node) {
        self.walk_node(node)
    }

    fn visit_element(&mut self, element: &Element) {
        self.walk_element(element)
    }

    fn visit_text(&mut self, _text: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::Tag;

    #[derive(Default)]
    struct TagCounter {
        tags: Vec<Tag>,
        text: String,
    }

    impl NodeVisitor for TagCounter {
        fn visit_element(&mut self, element: &Element) {
            self.tags.push(element.tag);
            self.walk_element(element)
        }

        fn visit_text(&mut self, text: &str) {
            self.text.push_str(text);
        }
    }

    #[test]
    fn walks_depth_first_including_captions() {
        let mut quote = Element::with_text(Tag::Quote, "body");
        quote.options = "bob".into();
        quote.caption = Some(Box::new(Element::root(vec![Node::Text("bob".into())])));
        let tree = Element::root(vec![
            Element::with_text(Tag::Bold, "a").into(),
            quote.into(),
        ]);

        let mut counter = TagCounter::default();
        counter.walk_root(&tree);

        assert_eq!(
            vec![Tag::Root, Tag::Bold, Tag::Quote, Tag::Root],
            counter.tags
        );
        assert_eq!("abobbody", counter.text);
    }
}
