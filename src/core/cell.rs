//! Styled cells and the SGR subset needed to read them.
//!
//! Input lines and scroll hints arrive as text with embedded ANSI SGR
//! sequences. They are parsed into [`Cell`]s so the pager can measure,
//! shift, and re-emit them with the palette the user asked for.

use std::io::{self, Write};

use bitflags::bitflags;
use crossterm::queue;
use crossterm::style::{Attribute, SetAttribute, SetBackgroundColor, SetForegroundColor};
use unicode_width::UnicodeWidthChar;

use crate::style::ColorDepth;

/// One character with its attributes
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub attrs: CellAttrs,
}

impl Cell {
    pub fn new(ch: char, attrs: CellAttrs) -> Self {
        Self { ch, attrs }
    }

    /// Display width in terminal columns (0 for combining marks)
    pub fn width(&self) -> usize {
        self.ch.width().unwrap_or(0)
    }
}

/// Cell attributes
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellAttrs {
    pub fg: Color,
    pub bg: Color,
    pub flags: AttrFlags,
}

impl CellAttrs {
    pub fn with_flags(flags: AttrFlags) -> Self {
        Self {
            flags,
            ..Self::default()
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Color definition
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Color {
    #[default]
    Default,
    Indexed(u8),
    Rgb(u8, u8, u8),
}

impl Color {
    /// Fit this color into the palette the terminal can show
    pub fn reduce(self, depth: ColorDepth) -> Color {
        match (self, depth) {
            (Color::Default, _) => Color::Default,
            (Color::Rgb(..), ColorDepth::TrueColor) => self,
            (Color::Rgb(r, g, b), ColorDepth::Colors256) => Color::Indexed(cube_index(r, g, b)),
            (Color::Rgb(r, g, b), ColorDepth::Colors16) => Color::Indexed(nearest_basic(r, g, b, 16)),
            (Color::Rgb(r, g, b), ColorDepth::Colors8) => Color::Indexed(nearest_basic(r, g, b, 8)),
            (Color::Indexed(n), ColorDepth::Colors8) if n >= 8 => Color::Indexed(reduce_indexed(n, 8)),
            (Color::Indexed(n), ColorDepth::Colors16) if n >= 16 => Color::Indexed(reduce_indexed(n, 16)),
            (Color::Indexed(_), _) => self,
        }
    }

    /// Convert to crossterm color
    pub fn to_crossterm(self) -> crossterm::style::Color {
        match self {
            Color::Default => crossterm::style::Color::Reset,
            Color::Indexed(n) => crossterm::style::Color::AnsiValue(n),
            Color::Rgb(r, g, b) => crossterm::style::Color::Rgb { r, g, b },
        }
    }

    fn rgb(self) -> Option<(u8, u8, u8)> {
        match self {
            Color::Default => None,
            Color::Rgb(r, g, b) => Some((r, g, b)),
            Color::Indexed(n) => Some(indexed_to_rgb(n)),
        }
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct AttrFlags: u16 {
        const BOLD          = 0b0000_0000_0001;
        const DIM           = 0b0000_0000_0010;
        const ITALIC        = 0b0000_0000_0100;
        const UNDERLINE     = 0b0000_0000_1000;
        const BLINK         = 0b0000_0001_0000;
        const INVERSE       = 0b0000_0010_0000;
        const HIDDEN        = 0b0000_0100_0000;
        const STRIKETHROUGH = 0b0000_1000_0000;
    }
}

const BASIC_RGB: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (205, 0, 0),
    (0, 205, 0),
    (205, 205, 0),
    (0, 0, 238),
    (205, 0, 205),
    (0, 205, 205),
    (229, 229, 229),
    (127, 127, 127),
    (255, 0, 0),
    (0, 255, 0),
    (255, 255, 0),
    (92, 92, 255),
    (255, 0, 255),
    (0, 255, 255),
    (255, 255, 255),
];

const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

fn cube_level(v: u8) -> usize {
    CUBE_LEVELS
        .iter()
        .enumerate()
        .min_by_key(|(_, level)| (i32::from(**level) - i32::from(v)).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn cube_index(r: u8, g: u8, b: u8) -> u8 {
    (16 + 36 * cube_level(r) + 6 * cube_level(g) + cube_level(b)) as u8
}

fn indexed_to_rgb(n: u8) -> (u8, u8, u8) {
    match n {
        0..=15 => BASIC_RGB[n as usize],
        16..=231 => {
            let i = n - 16;
            (
                CUBE_LEVELS[(i / 36) as usize],
                CUBE_LEVELS[((i / 6) % 6) as usize],
                CUBE_LEVELS[(i % 6) as usize],
            )
        }
        _ => {
            let v = 8 + (n - 232) * 10;
            (v, v, v)
        }
    }
}

fn nearest_basic(r: u8, g: u8, b: u8, count: usize) -> u8 {
    let distance = |(cr, cg, cb): (u8, u8, u8)| {
        let dr = i32::from(cr) - i32::from(r);
        let dg = i32::from(cg) - i32::from(g);
        let db = i32::from(cb) - i32::from(b);
        dr * dr + dg * dg + db * db
    };
    BASIC_RGB[..count]
        .iter()
        .enumerate()
        .min_by_key(|(_, rgb)| distance(**rgb))
        .map(|(i, _)| i as u8)
        .unwrap_or(7)
}

fn reduce_indexed(n: u8, count: usize) -> u8 {
    let (r, g, b) = Color::Indexed(n).rgb().unwrap_or((229, 229, 229));
    nearest_basic(r, g, b, count)
}

/// Parse text with embedded SGR sequences into cells.
///
/// Non-SGR escape sequences are dropped. Control characters are kept as
/// cells so the caller can decide how to render them.
pub fn parse_styled(text: &str) -> Vec<Cell> {
    let mut cells = Vec::new();
    let mut attrs = CellAttrs::default();
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\x1b' {
            cells.push(Cell::new(ch, attrs.clone()));
            continue;
        }

        if chars.peek() != Some(&'[') {
            // Lone ESC or a non-CSI sequence, skip the introducer only
            continue;
        }
        chars.next();

        let mut raw_params = String::new();
        let mut final_byte = None;
        for c in chars.by_ref() {
            if ('\x40'..='\x7e').contains(&c) {
                final_byte = Some(c);
                break;
            }
            raw_params.push(c);
        }

        if final_byte == Some('m') {
            let params: Vec<u16> = if raw_params.is_empty() {
                Vec::new()
            } else {
                raw_params
                    .split(|c| c == ';' || c == ':')
                    .map(|p| p.parse().unwrap_or(0))
                    .collect()
            };
            apply_sgr(&params, &mut attrs);
        }
    }

    cells
}

fn apply_sgr(params: &[u16], attrs: &mut CellAttrs) {
    if params.is_empty() {
        attrs.reset();
        return;
    }

    let mut iter = params.iter().copied();

    while let Some(param) = iter.next() {
        match param {
            0 => attrs.reset(),
            1 => attrs.flags |= AttrFlags::BOLD,
            2 => attrs.flags |= AttrFlags::DIM,
            3 => attrs.flags |= AttrFlags::ITALIC,
            4 => attrs.flags |= AttrFlags::UNDERLINE,
            5 => attrs.flags |= AttrFlags::BLINK,
            7 => attrs.flags |= AttrFlags::INVERSE,
            8 => attrs.flags |= AttrFlags::HIDDEN,
            9 => attrs.flags |= AttrFlags::STRIKETHROUGH,

            22 => attrs.flags &= !(AttrFlags::BOLD | AttrFlags::DIM),
            23 => attrs.flags &= !AttrFlags::ITALIC,
            24 => attrs.flags &= !AttrFlags::UNDERLINE,
            25 => attrs.flags &= !AttrFlags::BLINK,
            27 => attrs.flags &= !AttrFlags::INVERSE,
            28 => attrs.flags &= !AttrFlags::HIDDEN,
            29 => attrs.flags &= !AttrFlags::STRIKETHROUGH,

            30..=37 => attrs.fg = Color::Indexed((param - 30) as u8),
            38 => attrs.fg = extended_color(&mut iter).unwrap_or(attrs.fg),
            39 => attrs.fg = Color::Default,

            40..=47 => attrs.bg = Color::Indexed((param - 40) as u8),
            48 => attrs.bg = extended_color(&mut iter).unwrap_or(attrs.bg),
            49 => attrs.bg = Color::Default,

            90..=97 => attrs.fg = Color::Indexed((param - 90 + 8) as u8),
            100..=107 => attrs.bg = Color::Indexed((param - 100 + 8) as u8),

            _ => {}
        }
    }
}

fn extended_color(iter: &mut impl Iterator<Item = u16>) -> Option<Color> {
    match iter.next()? {
        5 => iter.next().map(|n| Color::Indexed(n as u8)),
        2 => {
            let r = iter.next().unwrap_or(0) as u8;
            let g = iter.next().unwrap_or(0) as u8;
            let b = iter.next().unwrap_or(0) as u8;
            Some(Color::Rgb(r, g, b))
        }
        _ => None,
    }
}

/// Emit the escape sequences for `attrs`, fitted to `depth`
pub fn apply_attrs<W: Write>(out: &mut W, attrs: &CellAttrs, depth: ColorDepth) -> io::Result<()> {
    // Reset first
    queue!(out, SetAttribute(Attribute::Reset))?;

    if attrs.flags.contains(AttrFlags::BOLD) {
        queue!(out, SetAttribute(Attribute::Bold))?;
    }
    if attrs.flags.contains(AttrFlags::DIM) {
        queue!(out, SetAttribute(Attribute::Dim))?;
    }
    if attrs.flags.contains(AttrFlags::ITALIC) {
        queue!(out, SetAttribute(Attribute::Italic))?;
    }
    if attrs.flags.contains(AttrFlags::UNDERLINE) {
        queue!(out, SetAttribute(Attribute::Underlined))?;
    }
    if attrs.flags.contains(AttrFlags::BLINK) {
        queue!(out, SetAttribute(Attribute::SlowBlink))?;
    }
    if attrs.flags.contains(AttrFlags::INVERSE) {
        queue!(out, SetAttribute(Attribute::Reverse))?;
    }
    if attrs.flags.contains(AttrFlags::STRIKETHROUGH) {
        queue!(out, SetAttribute(Attribute::CrossedOut))?;
    }

    let fg = attrs.fg.reduce(depth);
    if fg != Color::Default {
        queue!(out, SetForegroundColor(fg.to_crossterm()))?;
    }
    let bg = attrs.bg.reduce(depth);
    if bg != Color::Default {
        queue!(out, SetBackgroundColor(bg.to_crossterm()))?;
    }

    Ok(())
}

/// Write a row of cells, switching attributes only where they change
pub fn write_cells<W: Write>(out: &mut W, cells: &[Cell], depth: ColorDepth) -> io::Result<()> {
    let mut current = CellAttrs::default();
    for cell in cells {
        if cell.attrs != current {
            apply_attrs(out, &cell.attrs, depth)?;
            current = cell.attrs.clone();
        }
        write!(out, "{}", cell.ch)?;
    }
    if current != CellAttrs::default() {
        queue!(out, SetAttribute(Attribute::Reset))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        let cells = parse_styled("ab");
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].ch, 'a');
        assert_eq!(cells[1].attrs, CellAttrs::default());
    }

    #[test]
    fn test_sgr_colors() {
        let cells = parse_styled("\x1b[31mx\x1b[0my");
        assert_eq!(cells[0].attrs.fg, Color::Indexed(1));
        assert_eq!(cells[1].attrs.fg, Color::Default);
    }

    #[test]
    fn test_extended_colors() {
        let cells = parse_styled("\x1b[38;2;10;20;30;48;5;200mx");
        assert_eq!(cells[0].attrs.fg, Color::Rgb(10, 20, 30));
        assert_eq!(cells[0].attrs.bg, Color::Indexed(200));
    }

    #[test]
    fn test_non_sgr_sequences_dropped() {
        let cells = parse_styled("\x1b[2Kz");
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].ch, 'z');
    }

    #[test]
    fn test_dim_then_normal_intensity() {
        let cells = parse_styled("\x1b[2ma\x1b[22mb");
        assert!(cells[0].attrs.flags.contains(AttrFlags::DIM));
        assert!(cells[1].attrs.flags.is_empty());
    }

    #[test]
    fn test_color_reduction() {
        assert_eq!(Color::Rgb(255, 0, 0).reduce(ColorDepth::Colors256), Color::Indexed(196));
        assert_eq!(Color::Rgb(255, 0, 0).reduce(ColorDepth::Colors8), Color::Indexed(1));
        assert_eq!(Color::Indexed(196).reduce(ColorDepth::Colors16), Color::Indexed(9));
        assert_eq!(Color::Rgb(1, 2, 3).reduce(ColorDepth::TrueColor), Color::Rgb(1, 2, 3));
        assert_eq!(Color::Indexed(3).reduce(ColorDepth::Colors8), Color::Indexed(3));
    }

    #[test]
    fn test_write_cells_resets_at_end() {
        let mut out = Vec::new();
        let cells = parse_styled("\x1b[1mA");
        write_cells(&mut out, &cells, ColorDepth::Colors256).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains('A'));
        assert!(text.ends_with("\x1b[0m"));
    }
}
