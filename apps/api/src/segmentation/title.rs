//! Title normalization shared by every segmentation strategy.

use std::sync::LazyLock;

use regex::Regex;

/// Titles shorter than this (in chars) are replaced by a synthesized one.
const MIN_TITLE_CHARS: usize = 3;

static LABEL_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:portfolio\s+)?project\s+\d+\s*:\s*").expect("valid label prefix regex")
});

/// `1. `, `2) ` or a `-`/`+`/`*` bullet.
static LIST_ORDINAL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+[.)]|[-+*])\s+").expect("valid list ordinal regex"));

static EMPHASIS_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\*{2,3}([^*]+)\*{2,3}").expect("valid emphasis prefix regex")
});

static HEADER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#+\s*").expect("valid header prefix regex"));

/// Default title for the segment at `position` (0-based).
pub fn default_title(position: usize) -> String {
    format!("Portfolio Project {}", position + 1)
}

/// Removes leading marker syntax (ordinal label, list number or bullet,
/// emphasis wrapper, header hashes) and a trailing colon, repeating until nothing changes.
///
/// `"## **1. Project 2: Churn Model:**"` becomes `"Churn Model"`.
pub fn strip_markers(line: &str) -> String {
    let mut current = line.trim().to_string();
    loop {
        let next = strip_once(&current);
        if next == current {
            break;
        }
        current = next;
    }
    // Trimmed last so a bare `Project 2:` is still seen as a label.
    current.trim_end_matches(':').trim_end().to_string()
}

fn strip_once(line: &str) -> String {
    let line = LABEL_PREFIX.replace(line, "");
    let line = LIST_ORDINAL_PREFIX.replace(&line, "");
    let line = EMPHASIS_PREFIX.replace(&line, "${1}");
    let line = HEADER_PREFIX.replace(&line, "");
    line.trim().to_string()
}

/// Whether `seed` still carries a usable title once its markers are stripped.
/// A bare label such as `**Project 1:**` does not.
pub fn has_own_title(seed: &str) -> bool {
    strip_markers(seed).chars().count() >= MIN_TITLE_CHARS
}

/// Derives the display title and body for the segment at `position`.
///
/// Idempotent: feeding the output back in returns it unchanged.
pub fn normalize_title(position: usize, title: &str, content: &str) -> (String, String) {
    let title = if has_own_title(title) {
        strip_markers(title)
    } else {
        default_title(position)
    };
    let content = drop_repeated_title(content, &title);
    (title, content)
}

/// Drops leading content lines that just repeat the title, so it is not
/// rendered twice.
fn drop_repeated_title(content: &str, title: &str) -> String {
    let mut rest = content.trim();
    loop {
        let (first, tail) = rest.split_once('\n').unwrap_or((rest, ""));
        if first.trim().is_empty() || strip_markers(first) != title {
            return rest.to_string();
        }
        rest = tail.trim();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_title_is_one_based() {
        assert_eq!(default_title(0), "Portfolio Project 1");
        assert_eq!(default_title(4), "Portfolio Project 5");
    }

    #[test]
    fn test_strip_numbered_labels() {
        assert_eq!(strip_markers("Project 3: Churn Model"), "Churn Model");
        assert_eq!(strip_markers("Portfolio Project 12:Churn Model"), "Churn Model");
        assert_eq!(strip_markers("project 1 : lower case"), "lower case");
    }

    #[test]
    fn test_strip_list_ordinals() {
        assert_eq!(strip_markers("1. Sales Dashboard"), "Sales Dashboard");
        assert_eq!(strip_markers("2) Sales Dashboard"), "Sales Dashboard");
        // A version number is not a list ordinal.
        assert_eq!(strip_markers("2.5D Platformer"), "2.5D Platformer");
    }

    #[test]
    fn test_strip_emphasis_and_headers() {
        assert_eq!(strip_markers("**Sales Dashboard**"), "Sales Dashboard");
        assert_eq!(strip_markers("### Sales Dashboard"), "Sales Dashboard");
        assert_eq!(strip_markers("**Tech Stack:** Python"), "Tech Stack: Python");
    }

    #[test]
    fn test_strip_nested_markers() {
        assert_eq!(strip_markers("## **1. Project 2: Churn Model:**"), "Churn Model");
        assert_eq!(strip_markers("**Project 1: Alpha**"), "Alpha");
    }

    #[test]
    fn test_strip_bold_italic_and_bullets() {
        assert_eq!(strip_markers("***Sales Dashboard***"), "Sales Dashboard");
        assert_eq!(strip_markers("- **Sales Dashboard**"), "Sales Dashboard");
        assert_eq!(strip_markers("* Sales Dashboard"), "Sales Dashboard");
        assert_eq!(strip_markers("1. ***Sales Dashboard:***"), "Sales Dashboard");
    }

    #[test]
    fn test_bare_label_has_no_own_title() {
        assert!(!has_own_title("Project 1:"));
        assert!(!has_own_title("**Project 2:**"));
        assert!(has_own_title("**Project 2:** Churn Model"));
        assert!(has_own_title("Weather App:"));
    }

    #[test]
    fn test_plain_text_is_untouched() {
        assert_eq!(strip_markers("  Sales Dashboard  "), "Sales Dashboard");
        assert_eq!(strip_markers("Portfolio Project 3"), "Portfolio Project 3");
    }

    #[test]
    fn test_short_title_replaced_with_default() {
        let (title, _) = normalize_title(2, "## AB", "body");
        assert_eq!(title, "Portfolio Project 3");

        let (title, _) = normalize_title(0, "", "body");
        assert_eq!(title, "Portfolio Project 1");
    }

    #[test]
    fn test_three_char_title_is_kept() {
        let (title, _) = normalize_title(0, "**ETL**", "body");
        assert_eq!(title, "ETL");
    }

    #[test]
    fn test_repeated_title_line_removed_from_content() {
        let (title, content) =
            normalize_title(0, "Project 1: Churn Model", "**Churn Model**\n\nPredict churn.");
        assert_eq!(title, "Churn Model");
        assert_eq!(content, "Predict churn.");
    }

    #[test]
    fn test_every_leading_repeat_is_removed() {
        let (_, content) = normalize_title(0, "Churn Model", "Churn Model\n## Churn Model\nBody");
        assert_eq!(content, "Body");
    }

    #[test]
    fn test_title_mentioned_later_in_content_is_kept() {
        let (_, content) = normalize_title(0, "Churn Model", "Intro\nChurn Model\nBody");
        assert_eq!(content, "Intro\nChurn Model\nBody");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let cases = [
            (0, "## **1. Churn Model:**", "Churn Model\nChurn Model\n\nBody text"),
            (1, "", "  unstructured body  "),
            (2, "X", "Portfolio Project 3\nbody"),
            (3, "Project 4: Résumé Parser", "- parse PDFs\n- extract skills"),
        ];
        for (position, title, content) in cases {
            let once = normalize_title(position, title, content);
            let twice = normalize_title(position, &once.0, &once.1);
            assert_eq!(once, twice, "not idempotent for {title:?}");
        }
    }
}
