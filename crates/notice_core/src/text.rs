use std::sync::LazyLock;

use ego_tree::NodeRef;
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html};

static BR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?\s*>").unwrap());
static NEWLINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n+").unwrap());

/// Source typos corrected before a record is split into lines.
const TYPO_FIXES: &[(&str, &str)] = &[
    ("\"Less than Cat 3\n", "\"Less than Cat 3"),
    ("\"Category 2\n", "\"Category 2\""),
    ("\"Category 3\n", "\"Category 3\""),
    ("\"Category 1\n", "\"Category 1\""),
    ("(NRC()", "(NRC)"),
];

/// Turns `<br>` tags into newlines and collapses newline runs.
pub fn break_tags_to_newlines(html: &str) -> String {
    let replaced = BR_RE.replace_all(html, "\n");
    NEWLINES_RE.replace_all(&replaced, "\n").into_owned()
}

/// Elements whose end starts a new line, so adjacent cells never fuse.
const LINE_BREAKING: &[&str] = &[
    "table", "tr", "td", "th", "p", "div", "li", "pre", "h1", "h2", "h3", "h4", "h5", "h6",
];

/// Text nodes of an HTML fragment, skipping scripts and styles. Block and
/// table elements end with a newline.
pub fn fragment_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::new();
    for child in fragment.root_element().children() {
        collect_text(child, &mut out);
    }
    out
}

/// Text of a single element, with the same skipping rules as [`fragment_text`].
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for child in element.children() {
        collect_text(child, &mut out);
    }
    out
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(text),
        Node::Element(element) => {
            if matches!(
                element.name(),
                "script" | "style" | "noscript" | "template"
            ) {
                return;
            }
            for child in node.children() {
                collect_text(child, out);
            }
            if LINE_BREAKING.contains(&element.name()) && !out.ends_with('\n') {
                out.push('\n');
            }
        }
        _ => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
    }
}

/// Applies typo fixes, strips NBSP, trims every line and drops blank ones.
pub fn normalize_lines(text: &str) -> Vec<String> {
    let mut fixed = text.to_string();
    for (from, to) in TYPO_FIXES {
        if fixed.contains(from) {
            fixed = fixed.replace(from, to);
        }
    }
    fixed
        .split('\n')
        .map(|line| line.trim().replace('\u{a0}', ""))
        .filter(|line| !line.is_empty())
        .collect()
}
