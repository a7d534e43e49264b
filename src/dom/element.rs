use kuchikiki::NodeRef;
use kuchikiki::iter::NodeIterator;

/// Element-level helpers over parsed DOM nodes.
///
/// Text and sibling semantics follow the browser's: `text()` is `textContent`,
/// sibling helpers skip text and comment nodes like `nextElementSibling` does.
pub trait NodeExt {
    /// Lower-cased tag name, `None` for non-element nodes
    fn tag_name(&self) -> Option<String>;

    /// Check if element is a specific tag
    fn is_tag(&self, tag: &str) -> bool;

    /// Get attribute value by key
    fn attribute(&self, key: &str) -> Option<String>;

    /// Check if element has a specific class
    fn has_class(&self, class_name: &str) -> bool;

    /// Check if the raw `class` attribute contains `fragment` anywhere
    fn class_contains(&self, fragment: &str) -> bool;

    /// Concatenated text of all descendants
    fn text(&self) -> String;

    /// `text()` with surrounding whitespace removed
    fn trimmed_text(&self) -> String;

    /// Closest ancestor (or self) that is an element
    fn parent_element(&self) -> Option<NodeRef>;

    fn element_children(&self) -> Vec<NodeRef>;

    fn next_element_sibling(&self) -> Option<NodeRef>;

    fn previous_element_sibling(&self) -> Option<NodeRef>;

    /// Closest inclusive ancestor with the given tag
    fn closest_tag(&self, tag: &str) -> Option<NodeRef>;

    /// Descendant elements matching a CSS selector, in document order
    fn select_all(&self, css: &str) -> Vec<NodeRef>;

    /// First descendant element matching a CSS selector
    fn select_one(&self, css: &str) -> Option<NodeRef>;

    /// Structural CSS path usable to locate this element in the live page
    fn css_path(&self) -> String;

    /// Convert to a simplified string representation
    fn to_simple_string(&self) -> String;
}

impl NodeExt for NodeRef {
    fn tag_name(&self) -> Option<String> {
        self.as_element()
            .map(|element| element.name.local.to_string().to_ascii_lowercase())
    }

    fn is_tag(&self, tag: &str) -> bool {
        self.as_element()
            .is_some_and(|element| str::eq_ignore_ascii_case(&element.name.local, tag))
    }

    fn attribute(&self, key: &str) -> Option<String> {
        self.as_element()
            .and_then(|element| element.attributes.borrow().get(key).map(str::to_string))
    }

    fn has_class(&self, class_name: &str) -> bool {
        self.attribute("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class_name))
    }

    fn class_contains(&self, fragment: &str) -> bool {
        self.attribute("class")
            .is_some_and(|classes| classes.contains(fragment))
    }

    fn text(&self) -> String {
        self.text_contents()
    }

    fn trimmed_text(&self) -> String {
        self.text_contents().trim().to_string()
    }

    fn parent_element(&self) -> Option<NodeRef> {
        self.parent().filter(|parent| parent.as_element().is_some())
    }

    fn element_children(&self) -> Vec<NodeRef> {
        self.children()
            .filter(|child| child.as_element().is_some())
            .collect()
    }

    fn next_element_sibling(&self) -> Option<NodeRef> {
        self.following_siblings()
            .find(|sibling| sibling.as_element().is_some())
    }

    fn previous_element_sibling(&self) -> Option<NodeRef> {
        self.preceding_siblings()
            .find(|sibling| sibling.as_element().is_some())
    }

    fn closest_tag(&self, tag: &str) -> Option<NodeRef> {
        self.inclusive_ancestors().find(|node| node.is_tag(tag))
    }

    fn select_all(&self, css: &str) -> Vec<NodeRef> {
        match self.descendants().select(css) {
            Ok(matches) => matches.map(|m| m.as_node().clone()).collect(),
            Err(()) => {
                log::debug!("Ignoring unparsable selector: {}", css);
                Vec::new()
            }
        }
    }

    fn select_one(&self, css: &str) -> Option<NodeRef> {
        self.descendants()
            .select(css)
            .ok()
            .and_then(|mut matches| matches.next())
            .map(|m| m.as_node().clone())
    }

    fn css_path(&self) -> String {
        // Prefer ID selector if available
        if let Some(id) = self.attribute("id").filter(|id| is_plain_ident(id)) {
            return format!("#{}", id);
        }

        let mut segments = Vec::new();
        let mut current = Some(self.clone());

        while let Some(node) = current {
            let Some(tag) = node.tag_name() else {
                break;
            };

            match node.parent_element() {
                Some(parent) => {
                    let position = parent
                        .element_children()
                        .iter()
                        .position(|child| *child == node)
                        .map_or(1, |p| p + 1);
                    segments.push(format!("{}:nth-child({})", tag, position));
                    current = Some(parent);
                }
                None => {
                    segments.push(tag);
                    current = None;
                }
            }
        }

        segments.reverse();
        segments.join(" > ")
    }

    fn to_simple_string(&self) -> String {
        let Some(tag) = self.tag_name() else {
            return String::new();
        };

        let mut parts = vec![format!("<{}", tag)];

        if let Some(id) = self.attribute("id") {
            parts.push(format!(" id=\"{}\"", id));
        }

        if let Some(class) = self.attribute("class") {
            parts.push(format!(" class=\"{}\"", class));
        }

        parts.push(">".to_string());

        let text = self.trimmed_text();
        if !text.is_empty() {
            let preview: String = text.chars().take(47).collect();
            if preview.len() < text.len() {
                parts.push(format!("{}...", preview));
            } else {
                parts.push(preview);
            }
        }

        parts.join("")
    }
}

fn is_plain_ident(value: &str) -> bool {
    let mut chars = value.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
