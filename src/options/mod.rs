//! Typed command-line flags.
//!
//! Every option is registered once as an [`OptionSpec`]: a name, a default,
//! a usage line and a parser. Parsing a token stream yields [`Matches`], from
//! which each value is read back through the typed [`Key`] handed out at
//! registration.
//!
//! Occurrences are applied in stream order, so the last one wins. Callers
//! put lower-priority tokens (the environment) first.
//!
//! # Syntax
//!
//! ```text
//! -flag          boolean flags only
//! -flag=value
//! -flag value    non-boolean flags only
//! --flag ...     same as a single dash
//! --             end of flags
//! ```

pub mod parsers;

use std::any::Any;
use std::fmt::Write as _;
use std::marker::PhantomData;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    #[error("flag provided but not defined: -{0}")]
    UnknownFlag(String),

    #[error("flag needs an argument: -{0}")]
    MissingValue(String),

    #[error("invalid value \"{value}\" for flag -{flag}: {reason}")]
    InvalidValue {
        flag: String,
        value: String,
        reason: String,
    },

    #[error("bad flag syntax: {0}")]
    BadSyntax(String),

    /// `-h`, `-help` or `--help`; not a failure
    #[error("help requested")]
    HelpRequested,
}

pub type Result<T> = std::result::Result<T, OptionError>;

type Parser<T> = Box<dyn Fn(&str) -> std::result::Result<T, String>>;

/// A named, typed configuration item
pub struct OptionSpec<T> {
    name: &'static str,
    default: T,
    usage: &'static str,
    default_text: Option<String>,
    is_bool: bool,
    parse: Parser<T>,
}

impl<T: Clone + 'static> OptionSpec<T> {
    pub fn new<F>(name: &'static str, default: T, usage: &'static str, parse: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<T, String> + 'static,
    {
        Self {
            name,
            default,
            usage,
            default_text: None,
            is_bool: false,
            parse: Box::new(parse),
        }
    }

    /// Show `text` as the default in the usage listing
    pub fn default_text(mut self, text: impl Into<String>) -> Self {
        self.default_text = Some(text.into());
        self
    }
}

impl OptionSpec<bool> {
    /// A flag that is `false` unless given
    pub fn flag(name: &'static str, usage: &'static str) -> Self {
        Self {
            name,
            default: false,
            usage,
            default_text: None,
            is_bool: true,
            parse: Box::new(parse_bool),
        }
    }
}

fn parse_bool(value: &str) -> std::result::Result<bool, String> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        _ => Err("parse error".to_string()),
    }
}

/// Type-erased view of an [`OptionSpec`]
trait Registered {
    fn name(&self) -> &'static str;
    fn usage(&self) -> &'static str;
    fn default_text(&self) -> Option<&str>;
    fn is_bool(&self) -> bool;
    fn default_value(&self) -> Box<dyn Any>;
    fn parse_value(&self, raw: &str) -> std::result::Result<Box<dyn Any>, String>;
}

impl<T: Clone + 'static> Registered for OptionSpec<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn usage(&self) -> &'static str {
        self.usage
    }

    fn default_text(&self) -> Option<&str> {
        self.default_text.as_deref()
    }

    fn is_bool(&self) -> bool {
        self.is_bool
    }

    fn default_value(&self) -> Box<dyn Any> {
        Box::new(self.default.clone())
    }

    fn parse_value(&self, raw: &str) -> std::result::Result<Box<dyn Any>, String> {
        (self.parse)(raw).map(|v| Box::new(v) as Box<dyn Any>)
    }
}

/// Handle for reading one option's value out of [`Matches`]
pub struct Key<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

/// Registry of options
#[derive(Default)]
pub struct FlagSet {
    specs: Vec<Box<dyn Registered>>,
}

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<T: Clone + 'static>(&mut self, spec: OptionSpec<T>) -> Key<T> {
        debug_assert!(
            self.find(spec.name).is_none(),
            "flag redefined: {}",
            spec.name
        );
        self.specs.push(Box::new(spec));
        Key {
            index: self.specs.len() - 1,
            _marker: PhantomData,
        }
    }

    fn find(&self, name: &str) -> Option<usize> {
        self.specs.iter().position(|s| s.name() == name)
    }

    /// Parse `tokens` left to right.
    ///
    /// Parsing stops at the first non-flag token; it and everything after it
    /// become positional arguments.
    pub fn parse<I, S>(&self, tokens: I) -> Result<Matches>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut values: Vec<Box<dyn Any>> = self.specs.iter().map(|s| s.default_value()).collect();
        let mut positionals = Vec::new();
        let mut tokens = tokens.into_iter().map(|t| -> String { t.into() });

        while let Some(token) = tokens.next() {
            if token.len() < 2 || !token.starts_with('-') {
                positionals.push(token);
                break;
            }

            let mut body = &token[1..];
            if let Some(rest) = body.strip_prefix('-') {
                if rest.is_empty() {
                    // "--" terminates the flags
                    break;
                }
                body = rest;
            }
            if body.starts_with('-') || body.starts_with('=') {
                return Err(OptionError::BadSyntax(token.clone()));
            }

            let (name, inline_value) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (body, None),
            };

            let index = match self.find(name) {
                Some(index) => index,
                None if name == "h" || name == "help" => return Err(OptionError::HelpRequested),
                None => return Err(OptionError::UnknownFlag(name.to_string())),
            };
            let spec = &self.specs[index];

            let raw = match inline_value {
                Some(value) => value,
                None if spec.is_bool() => "true".to_string(),
                None => tokens
                    .next()
                    .ok_or_else(|| OptionError::MissingValue(name.to_string()))?,
            };

            values[index] = spec.parse_value(&raw).map_err(|reason| OptionError::InvalidValue {
                flag: name.to_string(),
                value: raw.clone(),
                reason,
            })?;
        }

        positionals.extend(tokens);
        Ok(Matches {
            values,
            positionals,
        })
    }

    /// Listing of all options, sorted by name
    pub fn usage(&self) -> String {
        let mut specs: Vec<&dyn Registered> = self.specs.iter().map(|s| s.as_ref()).collect();
        specs.sort_by_key(|s| s.name());

        let mut out = String::new();
        for spec in specs {
            let _ = write!(out, "  -{}", spec.name());
            if !spec.is_bool() {
                out.push_str(" value");
            }
            let _ = write!(out, "\n    \t{}", spec.usage());
            if let Some(default) = spec.default_text() {
                let _ = write!(out, " (default {})", default);
            }
            out.push('\n');
        }
        out
    }
}

/// Parsed option values plus the positional arguments
pub struct Matches {
    values: Vec<Box<dyn Any>>,
    positionals: Vec<String>,
}

impl Matches {
    pub fn get<T: 'static>(&self, key: Key<T>) -> &T {
        self.values[key.index]
            .downcast_ref::<T>()
            .expect("option key used with a different FlagSet")
    }

    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number_flags() -> (FlagSet, Key<u32>, Key<bool>) {
        let mut flags = FlagSet::new();
        let n = flags.add(OptionSpec::new("n", 7u32, "A number", |s| {
            s.parse::<u32>().map_err(|e| e.to_string())
        }));
        let wrap = flags.add(OptionSpec::flag("wrap", "Wrap"));
        (flags, n, wrap)
    }

    #[test]
    fn test_defaults() {
        let (flags, n, wrap) = number_flags();
        let matches = flags.parse(Vec::<String>::new()).unwrap();
        assert_eq!(*matches.get(n), 7);
        assert!(!*matches.get(wrap));
        assert!(matches.positionals().is_empty());
    }

    #[test]
    fn test_last_occurrence_wins() {
        let (flags, n, _) = number_flags();
        let matches = flags.parse(["-n", "1", "--n=2", "-n", "3"]).unwrap();
        assert_eq!(*matches.get(n), 3);
    }

    #[test]
    fn test_bool_forms() {
        let (flags, _, wrap) = number_flags();
        assert!(*flags.parse(["-wrap"]).unwrap().get(wrap));
        assert!(!*flags.parse(["-wrap", "-wrap=false"]).unwrap().get(wrap));
        assert!(matches!(
            flags.parse(["-wrap=maybe"]),
            Err(OptionError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_positionals_stop_parsing() {
        let (flags, n, _) = number_flags();
        let matches = flags.parse(["-n", "4", "file.txt", "-n", "5"]).unwrap();
        assert_eq!(*matches.get(n), 4);
        assert_eq!(matches.positionals(), ["file.txt", "-n", "5"]);
    }

    #[test]
    fn test_double_dash_terminates() {
        let (flags, _, wrap) = number_flags();
        let matches = flags.parse(["--", "-wrap"]).unwrap();
        assert!(!*matches.get(wrap));
        assert_eq!(matches.positionals(), ["-wrap"]);
    }

    #[test]
    fn test_lone_dash_is_positional() {
        let (flags, _, _) = number_flags();
        let matches = flags.parse(["-"]).unwrap();
        assert_eq!(matches.positionals(), ["-"]);
    }

    #[test]
    fn test_errors() {
        let (flags, _, _) = number_flags();
        assert_eq!(
            flags.parse(["-bogus"]).err(),
            Some(OptionError::UnknownFlag("bogus".to_string()))
        );
        assert_eq!(
            flags.parse(["-n"]).err(),
            Some(OptionError::MissingValue("n".to_string()))
        );
        assert_eq!(flags.parse(["-help"]).err(), Some(OptionError::HelpRequested));
        assert_eq!(flags.parse(["--h"]).err(), Some(OptionError::HelpRequested));
        assert!(matches!(flags.parse(["---n"]), Err(OptionError::BadSyntax(_))));

        let err = flags.parse(["-n", "x"]).err().unwrap();
        assert!(err.to_string().starts_with("invalid value \"x\" for flag -n:"));
    }

    #[test]
    fn test_usage_listing() {
        let mut flags = FlagSet::new();
        flags.add(OptionSpec::flag("zeta", "Last"));
        flags.add(OptionSpec::new("alpha", 1u8, "First", |_| Ok(1u8)).default_text("1"));
        let usage = flags.usage();
        assert_eq!(usage, "  -alpha value\n    \tFirst (default 1)\n  -zeta\n    \tLast\n");
    }
}
