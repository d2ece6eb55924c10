//! Formatting utilities (Telegram legacy Markdown, leaderboard rendering).

use crate::scores::LeaderboardEntry;

/// Escape characters that Telegram's legacy `Markdown` parse mode treats as entities.
///
/// Legacy Markdown has no escaping for `\` itself, only for the entity openers.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Render the ranked leaderboard body (Markdown). Ranks start at 1.
pub fn format_leaderboard(title: &str, entries: &[LeaderboardEntry]) -> String {
    let mut text = format!("{title}\n\n");
    for (idx, entry) in entries.iter().enumerate() {
        text.push_str(&format!(
            "{}. {} — {} попыток\n",
            idx + 1,
            escape_markdown(&entry.name),
            entry.best_score
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markdown_entities() {
        assert_eq!(escape_markdown("a_b*c`d[e]"), "a\\_b\\*c\\`d\\[e]");
        assert_eq!(escape_markdown("Аня"), "Аня");
    }

    #[test]
    fn leaderboard_lines_are_ranked() {
        let entries = vec![
            LeaderboardEntry {
                name: "Ann".to_string(),
                best_score: 4,
            },
            LeaderboardEntry {
                name: "cool_bo".to_string(),
                best_score: 7,
            },
        ];
        let text = format_leaderboard("*TOP*", &entries);
        assert_eq!(
            text,
            "*TOP*\n\n1. Ann — 4 попыток\n2. cool\\_bo — 7 попыток\n"
        );
    }
}
