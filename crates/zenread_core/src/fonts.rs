use std::fmt;
use std::str::FromStr;

pub const MIN_FONT_SIZE: u16 = 12;
pub const MAX_FONT_SIZE: u16 = 32;
pub const DEFAULT_FONT_SIZE: u16 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontFamily {
    #[default]
    Sans,
    Serif,
    Mono,
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FontFamily::Sans => "sans",
            FontFamily::Serif => "serif",
            FontFamily::Mono => "mono",
        })
    }
}

impl FromStr for FontFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sans" | "sans-serif" => Ok(FontFamily::Sans),
            "serif" => Ok(FontFamily::Serif),
            "mono" | "monospace" => Ok(FontFamily::Mono),
            other => Err(format!("unknown font family '{other}'")),
        }
    }
}

/// Reader typography, kept apart from the article session so that leaving
/// an article never touches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontPreferences {
    size: u16,
    family: FontFamily,
}

impl Default for FontPreferences {
    fn default() -> Self {
        Self {
            size: DEFAULT_FONT_SIZE,
            family: FontFamily::default(),
        }
    }
}

impl FontPreferences {
    pub fn size(&self) -> u16 {
        self.size
    }

    pub fn family(&self) -> FontFamily {
        self.family
    }

    /// Returns whether the stored value changed.
    pub fn set_size(&mut self, size: u16) -> bool {
        let size = size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        let changed = size != self.size;
        self.size = size;
        changed
    }

    pub fn set_family(&mut self, family: FontFamily) -> bool {
        let changed = family != self.family;
        self.family = family;
        changed
    }

    pub fn reset(&mut self) -> bool {
        let changed = *self != Self::default();
        *self = Self::default();
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_is_clamped() {
        let mut fonts = FontPreferences::default();
        assert!(fonts.set_size(100));
        assert_eq!(fonts.size(), MAX_FONT_SIZE);
        assert!(fonts.set_size(0));
        assert_eq!(fonts.size(), MIN_FONT_SIZE);
        assert!(!fonts.set_size(11));
    }

    #[test]
    fn family_parses_common_names() {
        assert_eq!("Monospace".parse(), Ok(FontFamily::Mono));
        assert_eq!("serif".parse(), Ok(FontFamily::Serif));
        assert!("comic".parse::<FontFamily>().is_err());
    }
}
