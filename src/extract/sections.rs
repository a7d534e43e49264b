use crate::dom::{DomTree, NodeExt};
use kuchikiki::NodeRef;

/// The rendered markdown panel of a version
const MARKDOWN_PANEL: &str = "div.px-4.text-sm.leading-5.markdown.prose.w-full.break-words";

/// Elements that may carry a section heading inside the panel
const PANEL_HEADINGS: &str = "p, strong";

/// Headings used by the loose fallback scan
const LOOSE_HEADINGS: &str = "h2, h3, h4, p strong";

/// A labelled section of the version panel and the heading that ends it
#[derive(Debug, Clone, Copy)]
pub struct Section {
    pub heading: &'static str,
    pub terminator: &'static str,
}

pub const SUMMARY: Section = Section {
    heading: "summary",
    terminator: "testing",
};

pub const TESTING: Section = Section {
    heading: "testing",
    terminator: "notes",
};

/// Summary and testing text read from one snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionText {
    pub summary: String,
    pub testing: String,
}

/// Read the Summary (and optionally Testing) sections.
///
/// The markdown panel is tried first. Only when it yields no summary does the
/// loose heading scan run, and it then only fills the summary.
pub fn extract_sections(tree: &DomTree, include_testing: bool) -> SectionText {
    let mut text = SectionText::default();

    if let Some(panel) = tree.select_first(MARKDOWN_PANEL) {
        text.summary = panel_section(&panel, SUMMARY);
        if include_testing {
            text.testing = panel_section(&panel, TESTING);
        }
    } else {
        log::debug!("Markdown panel not found");
    }

    if text.summary.is_empty() {
        text.summary = loose_summary(tree);
    }

    text
}

/// Lines of a section inside the markdown panel, joined with newlines
pub fn panel_section(panel: &NodeRef, section: Section) -> String {
    let Some(heading) = panel
        .select_all(PANEL_HEADINGS)
        .into_iter()
        .find(|el| el.trimmed_text().to_lowercase() == section.heading)
    else {
        return String::new();
    };

    let start = heading
        .closest_tag("p")
        .and_then(|p| p.next_element_sibling())
        .or_else(|| heading.next_element_sibling());

    let mut lines = Vec::new();
    let mut current = start;

    while let Some(el) = current {
        if is_heading(&el, section.terminator) {
            break;
        }

        if el.is_tag("ul") || el.is_tag("ol") {
            lines.extend(list_lines(&el));
        } else if el.is_tag("p") {
            let text = el.trimmed_text();
            if !text.is_empty() {
                lines.push(text);
            }
        }

        current = el.next_element_sibling();
    }

    lines.join("\n")
}

/// Whether `el` (or the first `strong` inside it) reads exactly `heading`
fn is_heading(el: &NodeRef, heading: &str) -> bool {
    if el.trimmed_text().to_lowercase() == heading {
        return true;
    }

    el.select_one("strong")
        .is_some_and(|strong| strong.trimmed_text().to_lowercase() == heading)
}

/// `• item` for unordered lists, `N. item` for ordered ones
fn list_lines(list: &NodeRef) -> Vec<String> {
    let ordered = list.is_tag("ol");

    list.select_all("li")
        .iter()
        .enumerate()
        .filter_map(|(position, item)| {
            let text = item.trimmed_text();
            if text.is_empty() {
                None
            } else if ordered {
                Some(format!("{}. {}", position + 1, text))
            } else {
                Some(format!("• {}", text))
            }
        })
        .collect()
}

/// Fallback for pages without the markdown panel: any heading mentioning
/// "summary", then sibling text until the next heading or a "testing" mention
fn loose_summary(tree: &DomTree) -> String {
    let Some(heading) = tree
        .select(LOOSE_HEADINGS)
        .into_iter()
        .find(|el| el.text().to_lowercase().contains("summary"))
    else {
        return String::new();
    };

    let start = heading
        .parent_element()
        .and_then(|parent| parent.next_element_sibling())
        .or_else(|| heading.next_element_sibling());

    let mut parts = Vec::new();
    let mut current = start;

    while let Some(el) = current {
        let ends_section = ["h2", "h3", "h4"].iter().any(|tag| el.is_tag(tag))
            || el.text().to_lowercase().contains("testing");
        if ends_section {
            break;
        }

        let text = el.trimmed_text();
        if !text.is_empty() {
            parts.push(text);
        }

        current = el.next_element_sibling();
    }

    parts.join("\n")
}
