//! Keyword retrieval over extracted text.
//!
//! Deliberately simple: a line matches when it contains any question word
//! longer than two characters. Each match contributes the line with two
//! lines of context on either side.

/// Number of sections returned for one question
pub const MAX_SECTIONS: usize = 3;
/// Lines returned when nothing matched
pub const FALLBACK_LINES: usize = 10;
/// Lines scanned for a summary
pub const SUMMARY_SCAN: usize = 20;
/// Lines kept in a summary
pub const SUMMARY_LINES: usize = 10;

const CONTEXT: usize = 2;

pub fn keywords(question: &str) -> Vec<String> {
    question
        .to_lowercase()
        .split_whitespace()
        .filter(|word| word.chars().count() > 2)
        .map(str::to_string)
        .collect()
}

/// Every distinct matching section, in document order.
pub fn matching_sections(text: &str, question: &str) -> Vec<String> {
    let words = keywords(question);
    if words.is_empty() {
        return Vec::new();
    }

    let lines: Vec<&str> = text.split('\n').collect();
    let mut sections: Vec<String> = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let lower = line.to_lowercase();
        if !words.iter().any(|w| lower.contains(w.as_str())) {
            continue;
        }

        let start = i.saturating_sub(CONTEXT);
        let end = (i + CONTEXT + 1).min(lines.len());
        let section = lines[start..end].join("\n").trim().to_string();
        if !section.is_empty() && !sections.contains(&section) {
            sections.push(section);
        }
    }

    sections
}

/// Non-empty content lines, skipping page markers.
fn content_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .filter(|line| !line.starts_with("---"))
        .map(str::trim)
        .filter(|line| !line.is_empty())
}

pub fn fallback_lines(text: &str) -> Vec<String> {
    content_lines(text)
        .take(FALLBACK_LINES)
        .map(str::to_string)
        .collect()
}

/// Up to ten lines longer than 20 characters from the first twenty content lines.
pub fn summary_lines(text: &str) -> Vec<String> {
    content_lines(text)
        .take(SUMMARY_SCAN)
        .filter(|line| line.chars().count() > 20)
        .take(SUMMARY_LINES)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "--- Page 1 ---\n\
        Introduction\n\
        Agents plan their work.\n\
        They call tools.\n\
        Tools return results.\n\
        Results feed the next step.\n\
        \n\
        --- Page 2 ---\n\
        Memory keeps context between steps.";

    #[test]
    fn test_keywords_drop_short_words() {
        assert_eq!(
            keywords("What is an Agent tool?"),
            vec!["what", "agent", "tool?"]
        );
    }

    #[test]
    fn test_sections_include_context() {
        let sections = matching_sections(DOC, "memory");
        assert_eq!(sections.len(), 1);
        assert_eq!(
            sections[0],
            "\n--- Page 2 ---\nMemory keeps context between steps.".trim()
        );
    }

    #[test]
    fn test_overlapping_matches_are_distinct_sections() {
        let sections = matching_sections(DOC, "tools");
        // "They call tools." and "Tools return results." each give a window
        assert_eq!(sections.len(), 2);
        assert!(sections[0].starts_with("Introduction"));
        assert!(sections[1].starts_with("Agents plan"));
    }

    #[test]
    fn test_no_keywords_no_sections() {
        assert!(matching_sections(DOC, "is it").is_empty());
    }

    #[test]
    fn test_fallback_skips_markers_and_blanks() {
        let lines = fallback_lines(DOC);
        assert_eq!(lines.first().map(String::as_str), Some("Introduction"));
        assert!(lines.iter().all(|l| !l.starts_with("---") && !l.is_empty()));
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_summary_keeps_long_lines() {
        let lines = summary_lines(DOC);
        assert_eq!(
            lines,
            vec![
                "Agents plan their work.",
                "Tools return results.",
                "Results feed the next step.",
                "Memory keeps context between steps."
            ]
        );
    }
}
