//! Highlighting styles and the small enums that shape the pager's look.
//!
//! # Built-in Styles
//!
//! - `native` - Default, muted greens on dark backgrounds
//! - `monokai` - Sublime Text inspired
//! - `dracula` - Dark theme with vibrant colors
//! - `nord` - Arctic, bluish color palette
//! - `solarized-dark` / `solarized-light` - Ethan Schoonover's Solarized
//! - `gruvbox-dark` - Retro groove colors
//! - `tokyo-night` - VS Code Tokyo Night theme

use crate::core::cell::Color;

/// Palette size used when emitting colors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    Colors8,
    Colors16,
    Colors256,
    TrueColor,
}

impl ColorDepth {
    pub fn label(self) -> &'static str {
        match self {
            ColorDepth::Colors8 => "8",
            ColorDepth::Colors16 => "16",
            ColorDepth::Colors256 => "256",
            ColorDepth::TrueColor => "16M",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBarStyle {
    Inverse,
    Plain,
    Bold,
}

/// How characters that can't be printed as-is are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnprintableStyle {
    Highlight,
    Whitespace,
}

/// A named highlighting style
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightStyle {
    pub name: &'static str,
    pub line_number: Color,
    pub unprintable_fg: Color,
    pub unprintable_bg: Color,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self::native()
    }
}

impl HighlightStyle {
    /// Default style
    pub fn native() -> Self {
        Self {
            name: "native",
            line_number: Color::Rgb(102, 102, 102),
            unprintable_fg: Color::Rgb(255, 255, 255),
            unprintable_bg: Color::Rgb(166, 40, 0),
        }
    }

    pub fn monokai() -> Self {
        Self {
            name: "monokai",
            line_number: Color::Rgb(117, 113, 94),
            unprintable_fg: Color::Rgb(248, 248, 240),
            unprintable_bg: Color::Rgb(249, 38, 114),
        }
    }

    pub fn dracula() -> Self {
        Self {
            name: "dracula",
            line_number: Color::Rgb(98, 114, 164),
            unprintable_fg: Color::Rgb(40, 42, 54),
            unprintable_bg: Color::Rgb(255, 85, 85),
        }
    }

    pub fn nord() -> Self {
        Self {
            name: "nord",
            line_number: Color::Rgb(76, 86, 106),
            unprintable_fg: Color::Rgb(46, 52, 64),
            unprintable_bg: Color::Rgb(191, 97, 106),
        }
    }

    pub fn solarized_dark() -> Self {
        Self {
            name: "solarized-dark",
            line_number: Color::Rgb(88, 110, 117),
            unprintable_fg: Color::Rgb(253, 246, 227),
            unprintable_bg: Color::Rgb(220, 50, 47),
        }
    }

    pub fn solarized_light() -> Self {
        Self {
            name: "solarized-light",
            line_number: Color::Rgb(147, 161, 161),
            unprintable_fg: Color::Rgb(253, 246, 227),
            unprintable_bg: Color::Rgb(220, 50, 47),
        }
    }

    pub fn gruvbox_dark() -> Self {
        Self {
            name: "gruvbox-dark",
            line_number: Color::Rgb(124, 111, 100),
            unprintable_fg: Color::Rgb(40, 40, 40),
            unprintable_bg: Color::Rgb(251, 73, 52),
        }
    }

    pub fn tokyo_night() -> Self {
        Self {
            name: "tokyo-night",
            line_number: Color::Rgb(59, 66, 97),
            unprintable_fg: Color::Rgb(26, 27, 38),
            unprintable_bg: Color::Rgb(247, 118, 142),
        }
    }

    /// Look up a style by name, `None` if there is no such style
    pub fn by_name(name: &str) -> Option<Self> {
        let style = match name {
            "native" => Self::native(),
            "monokai" => Self::monokai(),
            "dracula" => Self::dracula(),
            "nord" => Self::nord(),
            "solarized-dark" => Self::solarized_dark(),
            "solarized-light" => Self::solarized_light(),
            "gruvbox-dark" => Self::gruvbox_dark(),
            "tokyo-night" => Self::tokyo_night(),
            _ => return None,
        };
        Some(style)
    }

    /// List available styles
    pub fn list() -> Vec<&'static str> {
        vec![
            "native",
            "monokai",
            "dracula",
            "nord",
            "solarized-dark",
            "solarized-light",
            "gruvbox-dark",
            "tokyo-night",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listed_style_resolves() {
        for name in HighlightStyle::list() {
            let style = HighlightStyle::by_name(name).unwrap();
            assert_eq!(style.name, name);
        }
    }

    #[test]
    fn test_unknown_style() {
        assert!(HighlightStyle::by_name("does-not-exist").is_none());
        // Lookups are exact
        assert!(HighlightStyle::by_name("Monokai").is_none());
    }
}
