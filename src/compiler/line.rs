use std::sync::LazyLock;

use regex::Regex;

/// `line` followed by a number, e.g. `Parse error on line 3` or `Error line 12 in file`.
static LINE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bline\s+(\d+)").expect("valid line regex"));

/// Extract the first source line number a compiler message mentions.
pub fn extract_line(message: &str) -> Option<u32> {
    LINE_PATTERN
        .captures(message)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mermaid_parse_error() {
        let msg = "Error: Parse error on line 2:\ngraph TD;A-->\n-------------^";
        assert_eq!(extract_line(msg), Some(2));
    }

    #[test]
    fn test_plantuml_style() {
        assert_eq!(extract_line("Error line 12 in file: seq.puml"), Some(12));
        assert_eq!(extract_line("LINE 7: unexpected"), Some(7));
    }

    #[test]
    fn test_no_line() {
        assert_eq!(extract_line("something went wrong"), None);
        assert_eq!(extract_line("pipeline 4 failed"), None);
        assert_eq!(extract_line("line without number"), None);
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(extract_line("line 3 (see also line 9)"), Some(3));
    }
}
