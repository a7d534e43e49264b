use regex::Regex;
use std::sync::LazyLock;

/// Extensions recognised as source files
const EXTENSIONS: &str = "js|ts|jsx|tsx|json|py|md|css|scss|html|xml";

/// `name.ext` anywhere in a short label
static FILE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b([^\s]+\.({EXTENSIONS}))\b")).expect("file token pattern is valid")
});

/// A `src/…` path to a script file
static SRC_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(src/[^\s]+\.(js|ts|jsx|tsx))\b").expect("src path pattern is valid")
});

/// A bare file name without directories
static BARE_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b([^\s/]+\.({EXTENSIONS}))\b")).expect("bare file pattern is valid")
});

/// Either of the above, whichever occurs first
static ANY_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b(src/[^\s]+\.(js|ts|jsx|tsx)|[^\s]+\.({EXTENSIONS}))\b"))
        .expect("combined file pattern is valid")
});

/// Labels that are nothing but a file name, e.g. a file-tree button
static FILE_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\.({EXTENSIONS})$")).expect("file label pattern is valid")
});

/// File name inside a short label such as a diff header
pub fn file_in_label(text: &str) -> Option<String> {
    FILE_TOKEN.captures(text).map(|caps| caps[1].to_string())
}

/// File name near the top of a block: a `src/` path is preferred over a bare name
pub fn file_in_head(text: &str, max_lines: usize) -> Option<String> {
    let head = text.split('\n').take(max_lines).collect::<Vec<_>>().join("\n");

    [&*SRC_PATH, &*BARE_FILE]
        .into_iter()
        .find_map(|pattern| pattern.captures(&head).map(|caps| caps[1].to_string()))
}

/// First file-like token anywhere in a block
pub fn file_anywhere(text: &str) -> Option<String> {
    ANY_FILE.captures(text).map(|caps| caps[1].to_string())
}

/// Whether a label ends in a known source extension
pub fn is_file_label(text: &str) -> bool {
    FILE_LABEL.is_match(text)
}
