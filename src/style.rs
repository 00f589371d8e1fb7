use crossterm::style::{Color, Stylize};

use crate::config::ColourConfig;

#[derive(Debug, Clone, Copy)]
pub enum Role {
    Directory,
    Executable,
    Summary,
    Runcards,
    Error,
}

/// Foreground colours for terminal output. Disabled in bare mode so the
/// output stays machine-readable.
#[derive(Debug, Clone)]
pub struct Palette {
    enabled: bool,
    directory: Color,
    executable: Color,
    summary: Color,
    runcards: Color,
    error: Color,
}

fn parse_colour(name: &str, fallback: Color) -> Color {
    Color::try_from(name).unwrap_or_else(|_| {
        tracing::warn!("Unknown colour '{}', using {:?}", name, fallback);
        fallback
    })
}

impl Palette {
    pub fn new(colours: &ColourConfig, enabled: bool) -> Self {
        Self {
            enabled,
            directory: parse_colour(&colours.directory, Color::DarkYellow),
            executable: parse_colour(&colours.executable, Color::DarkBlue),
            summary: parse_colour(&colours.summary, Color::DarkGreen),
            runcards: parse_colour(&colours.runcards, Color::DarkBlue),
            error: parse_colour(&colours.error, Color::DarkRed),
        }
    }

    #[cfg(test)]
    pub fn plain() -> Self {
        Self::new(&ColourConfig::default(), false)
    }

    pub fn paint(&self, text: &str, role: Role) -> String {
        if !self.enabled {
            return text.to_string();
        }
        let colour = match role {
            Role::Directory => self.directory,
            Role::Executable => self.executable,
            Role::Summary => self.summary,
            Role::Runcards => self.runcards,
            Role::Error => self.error,
        };
        text.with(colour).to_string()
    }
}
