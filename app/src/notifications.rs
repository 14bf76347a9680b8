//! Modal-style notices shown to whoever is at the till.

use std::fmt;
use std::time::Duration;

use log::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: Level,
    pub title: Option<String>,
    pub text: Option<String>,
    /// How long the notice stays up before dismissing itself.
    pub timer: Duration,
}

pub const SHORT: Duration = Duration::from_millis(1500);
pub const LONG: Duration = Duration::from_millis(2500);

impl Notice {
    pub fn success(title: &str) -> Self {
        Notice {
            level: Level::Success,
            title: Some(title.to_string()),
            text: None,
            timer: SHORT,
        }
    }

    pub fn error(text: &str) -> Self {
        Notice {
            level: Level::Error,
            title: None,
            text: Some(text.to_string()),
            timer: LONG,
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        let mark = match self.level {
            Level::Success => "✔",
            Level::Error => "✖",
        };
        write!(fmt, "{}", mark)?;
        if let Some(title) = self.title.as_ref() {
            write!(fmt, " {}", title)?;
        }
        if let Some(text) = self.text.as_ref() {
            if self.title.is_some() {
                write!(fmt, ":")?;
            }
            write!(fmt, " {}", text)?;
        }
        Ok(())
    }
}

pub trait Notifier {
    fn notify(&self, notice: &Notice);
}

/// Writes notices to stdout; there is no modal to dismiss so the timer
/// is only logged.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: &Notice) {
        match notice.level {
            Level::Success => info!("notice: {} ({:?})", notice, notice.timer),
            Level::Error => warn!("notice: {} ({:?})", notice, notice.timer),
        }
        println!("{}", notice);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn renders_title_and_text() {
        let n = Notice::error("Se ha detectado un error").with_title("Error");
        assert_eq!(n.to_string(), "✖ Error: Se ha detectado un error");
        assert_eq!(Notice::success("Listo").to_string(), "✔ Listo");
    }

    #[test]
    fn error_notices_linger_longer() {
        assert!(Notice::error("x").timer > Notice::success("y").timer);
        assert_eq!(SHORT, Duration::from_millis(1500));
    }
}
