//! Value parsers for the options that need more than a boolean

use unicode_width::UnicodeWidthChar;

use crate::core::cell::{parse_styled, Cell};
use crate::style::{ColorDepth, HighlightStyle, StatusBarStyle, UnprintableStyle};

pub fn parse_style(name: &str) -> Result<HighlightStyle, String> {
    HighlightStyle::by_name(name).ok_or_else(|| {
        format!(
            "Pick a style from the \"Styles\" list in `leaf -help`: {}",
            HighlightStyle::list().join(", ")
        )
    })
}

/// `term` is the value of `$TERM`, consulted only for `auto`
pub fn parse_colors(value: &str, term: Option<&str>) -> Result<ColorDepth, String> {
    let value = if value.eq_ignore_ascii_case("auto") {
        // Covers "xterm-256color" as used by the macOS Terminal
        if term.is_some_and(|t| t.contains("256")) {
            "256"
        } else {
            "16M"
        }
    } else {
        value
    };

    match value.to_ascii_uppercase().as_str() {
        "8" => Ok(ColorDepth::Colors8),
        "16" => Ok(ColorDepth::Colors16),
        "256" => Ok(ColorDepth::Colors256),
        "16M" => Ok(ColorDepth::TrueColor),
        _ => Err("Valid counts are 8, 16, 256, 16M or auto.".to_string()),
    }
}

pub fn parse_status_bar_style(value: &str) -> Result<StatusBarStyle, String> {
    match value {
        "inverse" => Ok(StatusBarStyle::Inverse),
        "plain" => Ok(StatusBarStyle::Plain),
        "bold" => Ok(StatusBarStyle::Bold),
        _ => Err("Good ones are inverse, plain and bold".to_string()),
    }
}

pub fn parse_unprintable_style(value: &str) -> Result<UnprintableStyle, String> {
    match value {
        "highlight" => Ok(UnprintableStyle::Highlight),
        "whitespace" => Ok(UnprintableStyle::Whitespace),
        _ => Err("Good ones are highlight or whitespace".to_string()),
    }
}

/// One character, optionally styled. The literal text `ESC` stands for the
/// escape byte so hints can be written in shell rc files.
pub fn parse_scroll_hint(value: &str) -> Result<Cell, String> {
    let expanded = value.replace("ESC", "\x1b");
    let mut cells = parse_styled(&expanded);

    let single = cells.len() == 1 && !cells[0].ch.is_control() && cells[0].ch.width() == Some(1);
    match cells.pop() {
        Some(cell) if single => Ok(cell),
        _ => Err(
            "Expected exactly one (optionally highlighted) character. For example: 'ESC[2m…'"
                .to_string(),
        ),
    }
}

pub fn parse_shift(value: &str) -> Result<u32, String> {
    let amount: u32 = value.parse().map_err(|e| format!("{}", e))?;
    if amount < 1 {
        return Err(format!("Shift amount must be at least 1, was {}", amount));
    }

    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cell::{AttrFlags, Color};

    #[test]
    fn test_style_lookup() {
        assert_eq!(parse_style("nord").unwrap().name, "nord");

        let err = parse_style("does-not-exist").unwrap_err();
        assert!(err.contains("leaf -help"));
        assert!(err.contains("monokai"));
    }

    #[test]
    fn test_colors() {
        assert_eq!(parse_colors("8", None), Ok(ColorDepth::Colors8));
        assert_eq!(parse_colors("16", None), Ok(ColorDepth::Colors16));
        assert_eq!(parse_colors("256", None), Ok(ColorDepth::Colors256));
        assert_eq!(parse_colors("16m", None), Ok(ColorDepth::TrueColor));
        assert!(parse_colors("24", None).unwrap_err().contains("Valid counts"));
    }

    #[test]
    fn test_colors_auto() {
        assert_eq!(
            parse_colors("auto", Some("xterm-256color")),
            Ok(ColorDepth::Colors256)
        );
        assert_eq!(parse_colors("AUTO", Some("xterm")), Ok(ColorDepth::TrueColor));
        assert_eq!(parse_colors("auto", None), Ok(ColorDepth::TrueColor));
    }

    #[test]
    fn test_enums() {
        assert_eq!(parse_status_bar_style("bold"), Ok(StatusBarStyle::Bold));
        assert!(parse_status_bar_style("italic").is_err());
        assert_eq!(
            parse_unprintable_style("whitespace"),
            Ok(UnprintableStyle::Whitespace)
        );
        assert!(parse_unprintable_style("hide").is_err());
    }

    #[test]
    fn test_scroll_hint() {
        let cell = parse_scroll_hint("ESC[2m…").unwrap();
        assert_eq!(cell.ch, '…');
        assert!(cell.attrs.flags.contains(AttrFlags::DIM));

        let cell = parse_scroll_hint("\x1b[31m<").unwrap();
        assert_eq!(cell.attrs.fg, Color::Indexed(1));

        assert!(parse_scroll_hint("<<").is_err());
        assert!(parse_scroll_hint("").is_err());
        assert!(parse_scroll_hint("ESC[1m").is_err());
        assert!(parse_scroll_hint("\t").is_err());
    }

    #[test]
    fn test_shift() {
        assert_eq!(parse_shift("1"), Ok(1));
        assert_eq!(parse_shift("16"), Ok(16));
        assert_eq!(
            parse_shift("0").unwrap_err(),
            "Shift amount must be at least 1, was 0"
        );
        assert!(parse_shift("-3").is_err());
        assert!(parse_shift("many").is_err());
    }
}
