use crate::dom::{DomTree, NodeExt};
use regex::Regex;
use std::sync::LazyLock;

/// The prompt bubble holding the original task
const TASK_BUBBLE: &str =
    "div.self-end.bg-token-bg-tertiary div.px-4.text-sm.break-words.whitespace-pre-wrap";

/// Any pre-wrapped text block; candidates for the heuristic scan
const TEXT_BLOCK: &str = "div.whitespace-pre-wrap";

static IMPERATIVE_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(create|add|implement|fix|update|build|make|write|design|develop)")
        .expect("imperative pattern is valid")
});

const TASK_KEYWORDS: [&str; 3] = ["endpoint", "function", "page"];

type TaskStrategy = fn(&DomTree) -> Option<String>;

/// Tried in order; the first that finds anything wins
const STRATEGIES: [(&str, TaskStrategy); 2] = [("bubble", from_bubble), ("heuristic", from_text_blocks)];

/// Extract the original task description, or an empty string
pub fn extract_task(tree: &DomTree) -> String {
    for (name, strategy) in STRATEGIES {
        if let Some(task) = strategy(tree) {
            log::debug!("Task found via {} strategy ({} chars)", name, task.chars().count());
            return task;
        }
    }

    log::debug!("No task text found");
    String::new()
}

fn from_bubble(tree: &DomTree) -> Option<String> {
    // Once the bubble exists its text is authoritative, even when empty
    tree.select_first(TASK_BUBBLE).map(|bubble| bubble.trimmed_text())
}

fn from_text_blocks(tree: &DomTree) -> Option<String> {
    tree.select(TEXT_BLOCK)
        .into_iter()
        .map(|block| block.trimmed_text())
        .find(|text| looks_like_task(text))
}

/// Task heuristic: 50-5000 characters that read like an instruction
pub fn looks_like_task(text: &str) -> bool {
    let length = text.chars().count();
    if length <= 50 || length >= 5000 {
        return false;
    }

    IMPERATIVE_START.is_match(text) || TASK_KEYWORDS.iter().any(|keyword| text.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG_TASK: &str =
        "Implement a rate limiter for the public API so that abusive clients are throttled quickly.";

    #[test]
    fn test_bubble_wins() {
        let html = format!(
            r#"<body>
                <div class="self-end bg-token-bg-tertiary"><div class="px-4 text-sm break-words whitespace-pre-wrap">
                    Fix the login flow
                </div></div>
                <div class="whitespace-pre-wrap">{}</div>
            </body>"#,
            LONG_TASK
        );

        assert_eq!(extract_task(&DomTree::parse(&html)), "Fix the login flow");
    }

    #[test]
    fn test_heuristic_picks_first_match() {
        let html = format!(
            r#"<body>
                <div class="whitespace-pre-wrap">short</div>
                <div class="whitespace-pre-wrap">{}</div>
                <div class="whitespace-pre-wrap">Add another thing that is also long enough to qualify as a task here.</div>
            </body>"#,
            LONG_TASK
        );

        assert_eq!(extract_task(&DomTree::parse(&html)), LONG_TASK);
    }

    #[test]
    fn test_no_candidates() {
        let tree = DomTree::parse("<body><p>Nothing here</p></body>");
        assert_eq!(extract_task(&tree), "");
    }

    #[test]
    fn test_looks_like_task_bounds() {
        let fifty = format!("Create {}", "x".repeat(43));
        assert_eq!(fifty.chars().count(), 50);
        assert!(!looks_like_task(&fifty));

        let fifty_one = format!("{}y", fifty);
        assert!(looks_like_task(&fifty_one));

        let huge = format!("Create {}", "x".repeat(5000));
        assert!(!looks_like_task(&huge));
    }

    #[test]
    fn test_looks_like_task_keywords() {
        let verb = "BUILD a dashboard that displays the weekly metrics for each team in the org";
        assert!(looks_like_task(verb));

        let keyword = "The checkout page should remember the last shipping address that was used";
        assert!(looks_like_task(keyword));

        let neither = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod tempor";
        assert!(!looks_like_task(neither));
    }
}
