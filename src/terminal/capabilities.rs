/// What the attached terminal can do. Detected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalCapabilities {
    pub supports_color: bool,
    pub supports_ansi: bool,
    pub supports_clear: bool,
    pub width: u16,
    pub height: u16,
}

const DEFAULT_WIDTH: u16 = 80;
const DEFAULT_HEIGHT: u16 = 24;

impl Default for TerminalCapabilities {
    /// Plain output on an 80x24 surface
    fn default() -> Self {
        Self {
            supports_color: false,
            supports_ansi: false,
            supports_clear: false,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl TerminalCapabilities {
    /// Reads `TERM`/`COLORTERM` and asks crossterm for the window size.
    pub fn detect() -> Self {
        let term = std::env::var("TERM").ok();
        let color_term = std::env::var("COLORTERM").ok();
        let size = crossterm::terminal::size().ok();
        Self::from_env(term.as_deref(), color_term.as_deref(), size)
    }

    pub fn from_env(term: Option<&str>, color_term: Option<&str>, size: Option<(u16, u16)>) -> Self {
        let term = term.unwrap_or("");
        let color_term = color_term.unwrap_or("");

        let colorful = ["color", "xterm", "screen"]
            .iter()
            .any(|needle| term.contains(needle))
            || !color_term.is_empty();

        let (width, height) = match size {
            Some((w, h)) if w > 0 && h > 0 => (w, h),
            _ => (DEFAULT_WIDTH, DEFAULT_HEIGHT),
        };

        Self {
            supports_color: colorful,
            supports_ansi: colorful,
            supports_clear: !term.is_empty() && term != "dumb",
            width,
            height,
        }
    }
}
