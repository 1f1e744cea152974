//! Visual theme and styling.

use console::Style;

/// The `memeplot` color theme.
#[derive(Debug, Clone)]
pub struct MemeTheme {
    /// Success messages (green).
    pub success: Style,
    /// Warning messages (orange).
    pub warning: Style,
    /// Error messages (red bold).
    pub error: Style,
    /// Secondary text.
    pub dim: Style,
    /// Header banners (magenta bold).
    pub header: Style,
    /// Labels in key-value lines (bold).
    pub key: Style,
}

impl Default for MemeTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl MemeTheme {
    /// Create the default colored theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            header: Style::new().bold().magenta(),
            key: Style::new().bold(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            header: Style::new(),
            key: Style::new(),
        }
    }

    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    pub fn format_header(&self, title: &str) -> String {
        format!("{}", self.header.apply_to(title))
    }

    /// Format a `key: value` line with the key padded to a fixed width.
    pub fn format_field(&self, key: &str, value: &str) -> String {
        format!(
            "  {} {}",
            self.key.apply_to(format!("{:<14}", format!("{}:", key))),
            value
        )
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_formats_status_icons() {
        let theme = MemeTheme::plain();
        assert_eq!(theme.format_success("Fetched"), "✓ Fetched");
        assert_eq!(theme.format_warning("Stale"), "⚠ Stale");
        assert_eq!(theme.format_error("Failed"), "✗ Failed");
    }

    #[test]
    fn theme_pads_field_keys() {
        let theme = MemeTheme::plain();
        let line = theme.format_field("Images", "3");
        assert!(line.starts_with("  Images:"));
        assert!(line.ends_with(" 3"));
    }

    #[test]
    fn colored_theme_keeps_text() {
        let theme = MemeTheme::new();
        assert!(theme.format_header("Templates").contains("Templates"));
    }
}
