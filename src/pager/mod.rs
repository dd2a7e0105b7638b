//! The interactive viewer.
//!
//! The session harness only needs the [`Pager`] trait; [`LinePager`] is the
//! built-in implementation: a line oriented view with line numbers, optional
//! wrapping, horizontal scrolling and a status bar.
//!
//! # Keys
//!
//! | Key | Action |
//! |-----|--------|
//! | q, Esc, Ctrl+C | Quit |
//! | ↓ j Enter / ↑ k | One line down / up |
//! | PgDn Space f / PgUp b | One screen down / up |
//! | Home g / End G | First / last line |
//! | ← / → | Scroll sideways, ← at the left edge shows line numbers |
//! | = | Toggle status bar |
//! | w | Toggle line wrapping |

pub mod reader;

use std::io::{self, Write};
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{debug, trace};

use crate::config::Config;
use crate::core::cell::{parse_styled, write_cells, AttrFlags, Cell, CellAttrs};
use crate::style::{ColorDepth, StatusBarStyle, UnprintableStyle};
use crate::ui::screen::Screen;

pub use reader::Reader;

const TAB_WIDTH: usize = 8;
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Something that takes over a screen until the user is done
pub trait Pager {
    /// Run until the user quits
    fn start_paging(&mut self, screen: &mut dyn Screen) -> Result<()>;

    /// Whether the view should vanish when paging ends
    fn clears_on_exit(&self) -> bool;

    /// Print the last view to the (restored) terminal
    fn reprint_after_exit(&self, out: &mut dyn Write) -> io::Result<()>;
}

pub struct LinePager {
    reader: Reader,

    pub wrap_long_lines: bool,
    pub following: bool,
    pub show_line_numbers: bool,
    pub show_status_bar: bool,
    pub clear_on_exit: bool,
    pub quit_if_one_screen: bool,
    pub status_bar_style: StatusBarStyle,
    pub unprintable_style: UnprintableStyle,
    pub scroll_left_hint: Cell,
    pub scroll_right_hint: Cell,
    pub side_scroll_amount: usize,
    pub colors: ColorDepth,

    /// First line shown
    top: usize,
    /// Columns scrolled off to the left
    left: usize,
    /// Content rows of the last frame, without the status bar
    last_view: Vec<Vec<Cell>>,
}

impl LinePager {
    pub fn new(reader: Reader, config: &Config) -> Self {
        Self {
            reader,
            wrap_long_lines: config.wrap,
            following: config.follow,
            show_line_numbers: config.show_line_numbers,
            show_status_bar: config.show_status_bar,
            clear_on_exit: config.clear_on_exit,
            quit_if_one_screen: config.quit_if_one_screen,
            status_bar_style: config.status_bar_style,
            unprintable_style: config.unprintable_style,
            scroll_left_hint: config.scroll_left_hint.clone(),
            scroll_right_hint: config.scroll_right_hint.clone(),
            side_scroll_amount: config.shift as usize,
            colors: config.colors,
            top: 0,
            left: 0,
            last_view: Vec::new(),
        }
    }

    fn content_height(&self, height: usize) -> usize {
        if self.show_status_bar {
            height.saturating_sub(1)
        } else {
            height
        }
    }

    fn number_width(&self) -> usize {
        if !self.show_line_numbers {
            return 0;
        }
        // Digits plus one column of padding
        self.reader.line_count().max(1).to_string().len() + 1
    }

    fn max_top(&self, height: usize) -> usize {
        self.reader
            .line_count()
            .saturating_sub(self.content_height(height))
    }

    fn scroll_to(&mut self, top: usize, height: usize) {
        self.top = top.min(self.max_top(height));
    }

    /// Expand tabs and substitute characters that can't be shown as-is
    fn display_cells(&self, line: &str) -> Vec<Cell> {
        let style = self.reader.style();
        let mut cells = Vec::with_capacity(line.len());

        for cell in parse_styled(line) {
            if cell.ch == '\t' {
                let pad = TAB_WIDTH - cells.len() % TAB_WIDTH;
                cells.extend(std::iter::repeat(Cell::new(' ', cell.attrs.clone())).take(pad));
                continue;
            }

            if cell.ch.is_control() || cell.ch == '\u{fffd}' {
                let replacement = match self.unprintable_style {
                    UnprintableStyle::Whitespace => Cell::new(' ', cell.attrs),
                    UnprintableStyle::Highlight => Cell::new(
                        '?',
                        CellAttrs {
                            fg: style.unprintable_fg,
                            bg: style.unprintable_bg,
                            flags: AttrFlags::empty(),
                        },
                    ),
                };
                cells.push(replacement);
                continue;
            }

            if cell.width() == 0 {
                // Zero-width characters would break column accounting
                continue;
            }

            cells.push(cell);
        }

        cells
    }

    fn number_cells(&self, number: Option<usize>, width: usize) -> Vec<Cell> {
        let text = match number {
            Some(n) => format!("{:>w$} ", n, w = width - 1),
            None => " ".repeat(width),
        };
        let attrs = CellAttrs {
            fg: self.reader.style().line_number,
            ..CellAttrs::default()
        };
        text.chars().map(|c| Cell::new(c, attrs.clone())).collect()
    }

    /// Cut `cells` to what fits in `width` columns after scrolling sideways
    fn shifted(&self, cells: Vec<Cell>, width: usize) -> Vec<Cell> {
        if width == 0 {
            return Vec::new();
        }

        let mut visible: Vec<Cell> = Vec::new();
        let mut column = 0;
        let mut used = 0;
        let mut truncated = false;

        for cell in cells {
            let w = cell.width();
            if column < self.left {
                column += w;
                continue;
            }
            if used + w > width {
                truncated = true;
                break;
            }
            used += w;
            column += w;
            visible.push(cell);
        }

        if self.left > 0 && !visible.is_empty() {
            visible[0] = self.scroll_left_hint.clone();
        }
        if truncated {
            // Make room for the hint even if the last cell is wide
            while used + 1 > width {
                match visible.pop() {
                    Some(cell) => used -= cell.width(),
                    None => break,
                }
            }
            visible.push(self.scroll_right_hint.clone());
        }

        visible
    }

    /// Split `cells` into rows of at most `width` columns
    fn wrapped(cells: Vec<Cell>, width: usize) -> Vec<Vec<Cell>> {
        if width == 0 {
            return vec![Vec::new()];
        }

        let mut rows = vec![Vec::new()];
        let mut used = 0;
        for cell in cells {
            let w = cell.width();
            if used + w > width {
                rows.push(Vec::new());
                used = 0;
            }
            used += w;
            if let Some(row) = rows.last_mut() {
                row.push(cell);
            }
        }
        rows
    }

    /// Content rows for a screen of the given size, status bar excluded
    fn render_view(&self, width: usize, height: usize) -> Vec<Vec<Cell>> {
        let content_height = self.content_height(height);
        let number_width = self.number_width();
        let text_width = width.saturating_sub(number_width);

        let mut rows = Vec::with_capacity(content_height);
        let mut line_number = self.top;
        for line in self.reader.lines(self.top, content_height) {
            line_number += 1;
            let cells = self.display_cells(&line);

            let pieces = if self.wrap_long_lines {
                Self::wrapped(cells, text_width)
            } else {
                vec![self.shifted(cells, text_width)]
            };

            for (i, piece) in pieces.into_iter().enumerate() {
                if rows.len() == content_height {
                    break;
                }
                let mut row = if number_width > 0 {
                    self.number_cells((i == 0).then_some(line_number), number_width)
                } else {
                    Vec::new()
                };
                row.extend(piece);
                rows.push(row);
            }

            if rows.len() == content_height {
                break;
            }
        }

        rows
    }

    fn status_bar(&self, width: usize, height: usize) -> Vec<Cell> {
        let total = self.reader.line_count();
        let shown = self.content_height(height).min(total.saturating_sub(self.top));
        let name = self.reader.name().unwrap_or("stdin");

        let mut text = if total == 0 {
            format!("{}: <empty>", name)
        } else {
            let last = self.top + shown;
            format!(
                "{}: {}-{}/{} {}%",
                name,
                self.top + 1,
                last,
                total,
                last * 100 / total
            )
        };
        if !self.reader.is_done() {
            text.push_str(" (reading...)");
        }
        text.push_str("  Press 'ESC' or 'q' to exit");

        let attrs = match self.status_bar_style {
            StatusBarStyle::Inverse => CellAttrs::with_flags(AttrFlags::INVERSE),
            StatusBarStyle::Plain => CellAttrs::default(),
            StatusBarStyle::Bold => CellAttrs::with_flags(AttrFlags::BOLD),
        };

        let mut cells: Vec<Cell> = text
            .chars()
            .take(width)
            .map(|c| Cell::new(c, attrs.clone()))
            .collect();
        if self.status_bar_style == StatusBarStyle::Inverse {
            while cells.len() < width {
                cells.push(Cell::new(' ', attrs.clone()));
            }
        }
        cells
    }

    fn redraw(&mut self, screen: &mut dyn Screen) -> Result<()> {
        let (width, height) = screen.size()?;
        let (width, height) = (width as usize, height as usize);

        if self.following {
            self.top = self.max_top(height);
        }

        let view = self.render_view(width, height);
        let mut frame = view.clone();
        if self.show_status_bar && height > 0 {
            while frame.len() < height - 1 {
                frame.push(Vec::new());
            }
            frame.push(self.status_bar(width, height));
        }

        screen.draw(&frame, self.colors)?;
        self.last_view = view;
        Ok(())
    }

    /// True if everything fits on one screen without scrolling
    fn fits_on_screen(&self, width: usize, height: usize) -> bool {
        if !self.reader.is_done() {
            return false;
        }
        let content_height = self.content_height(height);
        let text_width = width.saturating_sub(self.number_width());
        let lines = self.reader.lines(0, content_height + 1);
        lines.len() <= content_height
            && lines.iter().all(|line| {
                let cells = self.display_cells(line);
                cells.iter().map(Cell::width).sum::<usize>() <= text_width
            })
    }

    /// Returns false when the user wants out
    fn handle_key(&mut self, key: KeyEvent, height: usize) -> bool {
        let page = self.content_height(height).max(1);

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return false,

            KeyCode::Down | KeyCode::Char('j') | KeyCode::Enter => {
                self.following = false;
                self.scroll_to(self.top + 1, height);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.following = false;
                self.top = self.top.saturating_sub(1);
            }
            KeyCode::PageDown | KeyCode::Char(' ') | KeyCode::Char('f') => {
                self.following = false;
                self.scroll_to(self.top + page, height);
            }
            KeyCode::PageUp | KeyCode::Char('b') => {
                self.following = false;
                self.top = self.top.saturating_sub(page);
            }
            KeyCode::Home | KeyCode::Char('g') => {
                self.following = false;
                self.top = 0;
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.scroll_to(usize::MAX, height);
            }

            KeyCode::Left => {
                if self.left == 0 {
                    self.show_line_numbers = true;
                } else {
                    self.left = self.left.saturating_sub(self.side_scroll_amount);
                }
            }
            KeyCode::Right if !self.wrap_long_lines => {
                if self.show_line_numbers && self.left == 0 {
                    self.show_line_numbers = false;
                } else {
                    self.left += self.side_scroll_amount;
                }
            }

            KeyCode::Char('=') => self.show_status_bar = !self.show_status_bar,
            KeyCode::Char('w') => {
                self.wrap_long_lines = !self.wrap_long_lines;
                self.left = 0;
            }

            other => trace!("Unhandled key: {:?}", other),
        }

        true
    }
}

impl Pager for LinePager {
    fn start_paging(&mut self, screen: &mut dyn Screen) -> Result<()> {
        self.reader.start();

        let mut first_frame = true;
        loop {
            self.redraw(screen)?;

            if first_frame && self.quit_if_one_screen {
                let (width, height) = screen.size()?;
                if self.fits_on_screen(width as usize, height as usize) {
                    debug!("Contents fit on one screen, not paging");
                    self.clear_on_exit = false;
                    return Ok(());
                }
            }
            if self.reader.is_done() {
                first_frame = false;
            }

            match screen.poll_event(POLL_INTERVAL)? {
                Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    let (_, height) = screen.size()?;
                    if !self.handle_key(key, height as usize) {
                        return Ok(());
                    }
                }
                Some(other) => trace!("Event: {:?}", other),
                None => {}
            }
        }
    }

    fn clears_on_exit(&self) -> bool {
        self.clear_on_exit
    }

    fn reprint_after_exit(&self, out: &mut dyn Write) -> io::Result<()> {
        let mut rows = self.last_view.as_slice();
        while let Some((last, rest)) = rows.split_last() {
            if !last.is_empty() {
                break;
            }
            rows = rest;
        }

        let mut buffer = Vec::new();
        for row in rows {
            write_cells(&mut buffer, row, self.colors)?;
            buffer.push(b'\n');
        }
        out.write_all(&buffer)?;
        out.flush()
    }
}
