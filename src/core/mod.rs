//! Styled text cells.
//!
//! - **cell**: cells with colors and attributes, SGR parsing, color depth
//!   reduction and crossterm output
//!
//! ```text
//! "\x1b[1;31mhi" ──parse_styled──▶ [Cell{'h', bold red}, Cell{'i', bold red}]
//!                                   │
//!                         write_cells(depth)
//!                                   ▼
//!                           SGR for the terminal
//! ```

pub mod cell;
