//! Text helpers shared by parsing and report rendering.

/// Truncate a string to a maximum byte length with ellipsis (UTF-8 safe)
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len.saturating_sub(3).min(s.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

/// Split text into paragraphs separated by blank lines
pub fn paragraphs(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                out.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        out.push(current.join("\n"));
    }
    out
}

/// Format a millisecond duration as seconds with one decimal (`"12.3s"`)
pub fn format_duration_ms(ms: u64) -> String {
    format!("{:.1}s", ms as f64 / 1000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("héllo wörld", 6), "hé...");
    }

    #[test]
    fn test_paragraphs() {
        let text = "first line\nstill first\n\n\nsecond\n  \nthird";
        assert_eq!(
            paragraphs(text),
            vec!["first line\nstill first", "second", "third"]
        );
        assert!(paragraphs("").is_empty());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration_ms(12_345), "12.3s");
        assert_eq!(format_duration_ms(0), "0.0s");
    }
}
