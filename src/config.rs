//! Resolved configuration.
//!
//! Options come from two places, merged into one token stream:
//!
//! 1. The `LEAF` environment variable, split on whitespace
//! 2. The command line
//!
//! Environment tokens go first, so anything on the command line overrides
//! them.
//!
//! ```text
//! export LEAF="-style monokai -no-linenumbers"
//! leaf -style nord file.txt      # nord wins
//! ```

use tracing::Level;

use crate::core::cell::{AttrFlags, Cell, CellAttrs};
use crate::options::parsers;
use crate::options::{FlagSet, Key, OptionError, OptionSpec};
use crate::style::{ColorDepth, HighlightStyle, StatusBarStyle, UnprintableStyle};

/// Environment variable holding extra option tokens
pub const OPTIONS_ENV: &str = "LEAF";

/// Every option's final value, plus the positional arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub print_version: bool,
    pub debug: bool,
    pub trace: bool,
    pub wrap: bool,
    pub follow: bool,
    pub style: HighlightStyle,
    pub colors: ColorDepth,
    pub show_line_numbers: bool,
    pub show_status_bar: bool,
    pub quit_if_one_screen: bool,
    pub clear_on_exit: bool,
    pub status_bar_style: StatusBarStyle,
    pub unprintable_style: UnprintableStyle,
    pub scroll_left_hint: Cell,
    pub scroll_right_hint: Cell,
    pub shift: u32,
    pub files: Vec<String>,
}

impl Config {
    /// Most verbose level that should be recorded
    pub fn log_level(&self) -> Level {
        if self.trace {
            Level::TRACE
        } else if self.debug {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }
}

struct Keys {
    version: Key<bool>,
    debug: Key<bool>,
    trace: Key<bool>,
    wrap: Key<bool>,
    follow: Key<bool>,
    style: Key<HighlightStyle>,
    colors: Key<ColorDepth>,
    no_line_numbers: Key<bool>,
    no_status_bar: Key<bool>,
    quit_if_one_screen: Key<bool>,
    no_clear_on_exit: Key<bool>,
    status_bar_style: Key<StatusBarStyle>,
    unprintable_style: Key<UnprintableStyle>,
    scroll_left_hint: Key<Cell>,
    scroll_right_hint: Key<Cell>,
    shift: Key<u32>,
}

/// The option registry
pub struct Options {
    flags: FlagSet,
    keys: Keys,
}

impl Options {
    /// `term` is `$TERM`, used by `-colors auto`
    pub fn new(term: Option<&str>) -> Self {
        let mut flags = FlagSet::new();
        let term = term.map(str::to_string);
        let reverse = CellAttrs::with_flags(AttrFlags::INVERSE);

        let keys = Keys {
            version: flags.add(OptionSpec::flag("version", "Prints the leaf version number")),
            debug: flags.add(OptionSpec::flag("debug", "Print debug logs after exiting")),
            trace: flags.add(OptionSpec::flag("trace", "Print trace logs after exiting")),
            wrap: flags.add(OptionSpec::flag("wrap", "Wrap long lines")),
            follow: flags.add(OptionSpec::flag(
                "follow",
                "Follow piped input just like \"tail -f\"",
            )),
            style: flags.add(
                OptionSpec::new(
                    "style",
                    HighlightStyle::native(),
                    "Highlighting style, see the Styles list below",
                    parsers::parse_style,
                )
                .default_text("native"),
            ),
            colors: flags.add(
                OptionSpec::new(
                    "colors",
                    ColorDepth::Colors256,
                    "Highlighting palette size: 8, 16, 256, 16M, auto",
                    move |value| parsers::parse_colors(value, term.as_deref()),
                )
                .default_text("256"),
            ),
            no_line_numbers: flags.add(OptionSpec::flag(
                "no-linenumbers",
                "Hide line numbers on startup, press left arrow key to show",
            )),
            no_status_bar: flags.add(OptionSpec::flag(
                "no-statusbar",
                "Hide the status bar, toggle with '='",
            )),
            quit_if_one_screen: flags.add(OptionSpec::flag(
                "quit-if-one-screen",
                "Don't page if contents fits on one screen",
            )),
            no_clear_on_exit: flags.add(OptionSpec::flag(
                "no-clear-on-exit",
                "Retain screen contents when exiting leaf",
            )),
            status_bar_style: flags.add(
                OptionSpec::new(
                    "statusbar",
                    StatusBarStyle::Inverse,
                    "Status bar style: inverse, plain or bold",
                    parsers::parse_status_bar_style,
                )
                .default_text("inverse"),
            ),
            unprintable_style: flags.add(
                OptionSpec::new(
                    "render-unprintable",
                    UnprintableStyle::Highlight,
                    "How unprintable characters are rendered: highlight or whitespace",
                    parsers::parse_unprintable_style,
                )
                .default_text("highlight"),
            ),
            scroll_left_hint: flags.add(OptionSpec::new(
                "scroll-left-hint",
                Cell::new('<', reverse.clone()),
                "Shown when view can scroll left. One character with optional ANSI highlighting.",
                parsers::parse_scroll_hint,
            )),
            scroll_right_hint: flags.add(OptionSpec::new(
                "scroll-right-hint",
                Cell::new('>', reverse),
                "Shown when view can scroll right. One character with optional ANSI highlighting.",
                parsers::parse_scroll_hint,
            )),
            shift: flags.add(
                OptionSpec::new(
                    "shift",
                    16u32,
                    "Horizontal scroll amount >=1",
                    parsers::parse_shift,
                )
                .default_text("16"),
            ),
        };

        Self { flags, keys }
    }

    /// Usage listing for every registered option
    pub fn usage(&self) -> String {
        self.flags.usage()
    }

    /// Merge both sources and parse them into a [`Config`]
    pub fn resolve(&self, env_options: Option<&str>, args: &[String]) -> Result<Config, OptionError> {
        let matches = self.flags.parse(merge_tokens(env_options, args))?;
        let k = &self.keys;

        Ok(Config {
            print_version: *matches.get(k.version),
            debug: *matches.get(k.debug),
            trace: *matches.get(k.trace),
            wrap: *matches.get(k.wrap),
            follow: *matches.get(k.follow),
            style: matches.get(k.style).clone(),
            colors: *matches.get(k.colors),
            show_line_numbers: !*matches.get(k.no_line_numbers),
            show_status_bar: !*matches.get(k.no_status_bar),
            quit_if_one_screen: *matches.get(k.quit_if_one_screen),
            clear_on_exit: !*matches.get(k.no_clear_on_exit),
            status_bar_style: *matches.get(k.status_bar_style),
            unprintable_style: *matches.get(k.unprintable_style),
            scroll_left_hint: matches.get(k.scroll_left_hint).clone(),
            scroll_right_hint: matches.get(k.scroll_right_hint).clone(),
            shift: *matches.get(k.shift),
            files: matches.positionals().to_vec(),
        })
    }
}

/// Environment tokens first, then the command line
pub fn merge_tokens(env_options: Option<&str>, args: &[String]) -> Vec<String> {
    env_options
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .chain(args.iter().cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let config = Options::new(None).resolve(None, &[]).unwrap();
        assert_eq!(config.style.name, "native");
        assert_eq!(config.colors, ColorDepth::Colors256);
        assert_eq!(config.shift, 16);
        assert!(config.show_line_numbers);
        assert!(config.show_status_bar);
        assert!(config.clear_on_exit);
        assert_eq!(config.status_bar_style, StatusBarStyle::Inverse);
        assert_eq!(config.unprintable_style, UnprintableStyle::Highlight);
        assert_eq!(config.scroll_left_hint.ch, '<');
        assert!(config.scroll_right_hint.attrs.flags.contains(AttrFlags::INVERSE));
        assert_eq!(config.log_level(), Level::INFO);
        assert!(config.files.is_empty());
    }

    #[test]
    fn test_command_line_overrides_environment() {
        let options = Options::new(None);
        let config = options
            .resolve(Some("-shift 4 -style monokai"), &args(&["-shift", "9", "-style=nord"]))
            .unwrap();
        assert_eq!(config.shift, 9);
        assert_eq!(config.style.name, "nord");
    }

    #[test]
    fn test_environment_alone_applies() {
        let config = Options::new(None)
            .resolve(Some("  -wrap   -no-statusbar "), &[])
            .unwrap();
        assert!(config.wrap);
        assert!(!config.show_status_bar);
    }

    #[test]
    fn test_later_command_line_occurrence_wins() {
        let config = Options::new(None)
            .resolve(None, &args(&["-statusbar", "plain", "-statusbar", "bold"]))
            .unwrap();
        assert_eq!(config.status_bar_style, StatusBarStyle::Bold);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let options = Options::new(Some("xterm-256color"));
        let argv = args(&["-colors", "auto", "-trace", "-scroll-left-hint", "ESC[2m…", "f"]);
        let first = options.resolve(Some("-wrap"), &argv).unwrap();
        let second = options.resolve(Some("-wrap"), &argv).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.colors, ColorDepth::Colors256);
        assert_eq!(first.log_level(), Level::TRACE);
        assert_eq!(first.files, ["f"]);
    }

    #[test]
    fn test_bad_values_abort() {
        let options = Options::new(None);

        let err = options.resolve(None, &args(&["-shift", "0"])).unwrap_err();
        assert!(err.to_string().contains("must be at least 1"));

        let err = options
            .resolve(None, &args(&["-style", "does-not-exist"]))
            .unwrap_err();
        assert!(err.to_string().contains("Styles"));

        // An environment error is still an error
        let err = options.resolve(Some("-colors 12"), &[]).unwrap_err();
        assert!(matches!(err, OptionError::InvalidValue { .. }));
    }

    #[test]
    fn test_help_and_unknown() {
        let options = Options::new(None);
        assert_eq!(
            options.resolve(None, &args(&["-help"])).unwrap_err(),
            OptionError::HelpRequested
        );
        assert_eq!(
            options.resolve(None, &args(&["-nope"])).unwrap_err(),
            OptionError::UnknownFlag("nope".to_string())
        );
    }

    #[test]
    fn test_merge_order() {
        assert_eq!(
            merge_tokens(Some(" -a  -b "), &args(&["-c"])),
            ["-a", "-b", "-c"]
        );
        assert_eq!(merge_tokens(None, &args(&["x"])), ["x"]);
    }

    #[test]
    fn test_usage_mentions_every_option() {
        let usage = Options::new(None).usage();
        for name in [
            "-colors", "-debug", "-follow", "-no-clear-on-exit", "-no-linenumbers",
            "-no-statusbar", "-quit-if-one-screen", "-render-unprintable",
            "-scroll-left-hint", "-scroll-right-hint", "-shift", "-statusbar", "-style",
            "-trace", "-version", "-wrap",
        ] {
            assert!(usage.contains(name), "missing {name}");
        }
    }
}
