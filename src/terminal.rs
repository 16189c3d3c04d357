pub mod capabilities;

use chrono::Local;
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor, Stylize},
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};
use std::time::Duration;

pub use capabilities::TerminalCapabilities;

use crate::error::PomoError;
use crate::util::format_elapsed;

const PURPLE: Color = Color::Rgb {
    r: 138,
    g: 43,
    b: 226,
};
const DARK_GRAY: Color = Color::Rgb {
    r: 64,
    g: 64,
    b: 64,
};
const MIN_BAR_WIDTH: usize = 10;
const BAR_MARGIN: usize = 10;
const FALLBACK_CLEAR_LINES: usize = 10;

/// Snapshot handed to the display on every tick
#[derive(Debug, Clone, PartialEq)]
pub struct SessionInfo {
    pub label: String,
    pub elapsed: Duration,
    /// Raw elapsed/planned ratio; may drift outside [0, 1]
    pub progress: f64,
    pub progress_bar_width: usize,
}

/// Output surface the engine draws on
pub trait SessionDisplay {
    fn display_session(&mut self, info: &SessionInfo) -> Result<(), PomoError>;
    fn display_completion(&mut self, label: &str) -> Result<(), PomoError>;
}

/// Capability-aware renderer over any writer (stdout in production)
pub struct Terminal<W: Write> {
    capabilities: TerminalCapabilities,
    out: W,
}

impl Terminal<io::Stdout> {
    pub fn stdout(capabilities: TerminalCapabilities) -> Self {
        Self::new(capabilities, io::stdout())
    }
}

impl<W: Write> Terminal<W> {
    pub fn new(capabilities: TerminalCapabilities, out: W) -> Self {
        Self { capabilities, out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn clear_screen(&mut self) -> io::Result<()> {
        if !self.capabilities.supports_clear {
            for _ in 0..FALLBACK_CLEAR_LINES {
                writeln!(self.out)?;
            }
            return Ok(());
        }
        queue!(self.out, MoveTo(0, 0), Clear(ClearType::All))
    }

    /// Bar width clamped into `[10, terminal width - 10]`; the lower bound wins on narrow terminals.
    pub fn bar_width(&self, requested: usize) -> usize {
        requested
            .min((self.capabilities.width as usize).saturating_sub(BAR_MARGIN))
            .max(MIN_BAR_WIDTH)
    }

    pub fn draw_progress_bar(&self, progress: f64, requested_width: usize) -> String {
        let progress = clamp_progress(progress);
        let width = self.bar_width(requested_width);
        let filled = ((width as f64 * progress) as usize).min(width);
        let empty = width - filled;

        if !self.capabilities.supports_color {
            return format!("[{}{}]", "#".repeat(filled), "-".repeat(empty));
        }

        format!(
            "{}{}",
            " ".repeat(filled).on(PURPLE),
            " ".repeat(empty).on(DARK_GRAY)
        )
    }

    fn write_styled(&mut self, text: &str, color: Color) -> io::Result<()> {
        if self.capabilities.supports_color {
            queue!(self.out, SetForegroundColor(color), Print(text), ResetColor)
        } else {
            queue!(self.out, Print(text))
        }
    }

    fn write_bold(&mut self, text: &str) -> io::Result<()> {
        if self.capabilities.supports_ansi {
            queue!(
                self.out,
                SetAttribute(Attribute::Bold),
                Print(text),
                SetAttribute(Attribute::Reset)
            )
        } else {
            queue!(self.out, Print(text))
        }
    }

    fn render_session(&mut self, info: &SessionInfo) -> io::Result<()> {
        self.clear_screen()?;

        self.write_styled(&info.label.to_lowercase(), PURPLE)?;
        writeln!(self.out)?;

        let clock = Local::now().format("%-I:%M %p").to_string();
        self.write_bold(&clock)?;
        write!(self.out, " - ")?;
        self.write_bold(&format_elapsed(info.elapsed))?;
        writeln!(self.out)?;

        let bar = self.draw_progress_bar(info.progress, info.progress_bar_width);
        let percent = (clamp_progress(info.progress) * 100.0) as u32;
        write!(self.out, "{}  ", bar)?;
        self.write_styled(&format!("{}%", percent), Color::White)?;
        writeln!(self.out)?;

        writeln!(self.out)?;
        if self.capabilities.supports_ansi {
            self.write_styled("Press Ctrl+C to exit", Color::DarkGrey)?;
            writeln!(self.out)?;
        } else {
            writeln!(self.out, "Press Ctrl+C to exit")?;
        }

        self.out.flush()
    }

    fn render_completion(&mut self, label: &str) -> io::Result<()> {
        self.clear_screen()?;

        self.write_styled(&format!("{} complete!", label), PURPLE)?;
        writeln!(self.out)?;

        if self.capabilities.supports_ansi {
            self.write_styled("✓ Session finished successfully", Color::White)?;
            writeln!(self.out)?;
        } else {
            writeln!(self.out, "* Session finished successfully")?;
        }

        self.out.flush()
    }
}

impl<W: Write> SessionDisplay for Terminal<W> {
    fn display_session(&mut self, info: &SessionInfo) -> Result<(), PomoError> {
        self.render_session(info)
            .map_err(|e| PomoError::TerminalUnsupported {
                operation: "display session",
                message: e.to_string(),
            })
    }

    fn display_completion(&mut self, label: &str) -> Result<(), PomoError> {
        self.render_completion(label)
            .map_err(|e| PomoError::TerminalUnsupported {
                operation: "display completion",
                message: e.to_string(),
            })
    }
}

pub fn clamp_progress(progress: f64) -> f64 {
    if progress.is_nan() {
        return 0.0;
    }
    progress.clamp(0.0, 1.0)
}
