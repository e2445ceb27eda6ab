//! In-memory XML element tree.
//!
//! Element names are stored in Clark notation (`{uri}local`) when the element is bound to a
//! namespace and as the bare local name otherwise. Attribute names are local names; namespace
//! declarations are not kept as attributes.

/// A node inside an element's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// One parsed XML element with its attributes and content in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    /// Looks up an attribute value by name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over direct child elements, skipping text.
    pub fn child_elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// Leading text content (before the first child element), trimmed.
    ///
    /// Text that follows a child element is tail text of that child and is not included.
    /// Returns `None` when the element has no non-whitespace leading text.
    pub fn text(&self) -> Option<String> {
        let mut text = String::new();
        for node in &self.children {
            match node {
                XmlNode::Text(value) => text.push_str(value),
                XmlNode::Element(_) => break,
            }
        }
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Local part of the element name, without any `{uri}` qualifier.
    pub fn local_name(&self) -> &str {
        match self.name.split_once('}') {
            Some((_, local)) if self.name.starts_with('{') => local,
            _ => &self.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_leading_and_trimmed() {
        let element = XmlElement::new("Car")
            .with_text("  Fo")
            .with_text("rd ")
            .with_child(XmlElement::new("Model"))
            .with_text(" Motor\n");
        assert_eq!(element.text().as_deref(), Some("Ford"));
    }

    #[test]
    fn tail_text_only_is_none() {
        let element = XmlElement::new("Car")
            .with_child(XmlElement::new("Model"))
            .with_text("Ford");
        assert!(element.text().is_none());
    }

    #[test]
    fn whitespace_only_text_is_none() {
        let element = XmlElement::new("People").with_text("\n    ");
        assert!(element.text().is_none());
    }

    #[test]
    fn local_name_strips_namespace() {
        assert_eq!(XmlElement::new("{urn:x}Person").local_name(), "Person");
        assert_eq!(XmlElement::new("Person").local_name(), "Person");
    }

    #[test]
    fn child_elements_skip_text() {
        let element = XmlElement::new("Person")
            .with_text("x")
            .with_child(XmlElement::new("Car"))
            .with_child(XmlElement::new("Car"));
        assert_eq!(element.child_elements().count(), 2);
    }
}
