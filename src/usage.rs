//! Usage text

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::app::Invocation;
use crate::config::{Options, OPTIONS_ENV};
use crate::style::HighlightStyle;

/// Print usage. With `print_command_line`, the offending command line and
/// options environment are shown first; used when reporting errors.
pub fn write_usage<W: Write + ?Sized>(
    out: &mut W,
    invocation: &Invocation,
    options: &Options,
    print_command_line: bool,
) -> io::Result<()> {
    let env_options = invocation.env_options.as_deref().unwrap_or_default();

    if print_command_line {
        writeln!(out, "Commandline: leaf {}", invocation.args.join(" "))?;
        writeln!(out, "Environment: {}=\"{}\"", OPTIONS_ENV, env_options)?;
        writeln!(out)?;
    }

    writeln!(out, "Usage:")?;
    writeln!(out, "  leaf [options] <file>")?;
    writeln!(out, "  ... | leaf")?;
    writeln!(out, "  leaf < file")?;
    writeln!(out)?;
    writeln!(out, "Shows file contents. Input is expected to be UTF-8 encoded text. Invalid /")?;
    writeln!(out, "non-printable characters are by default rendered highlighted.")?;
    writeln!(out)?;
    writeln!(out, "More information + source code:")?;
    writeln!(out, "  <https://github.com/user/leaf#readme>")?;
    writeln!(out)?;

    writeln!(out, "Environment:")?;
    if env_options.is_empty() {
        writeln!(out, "  Additional options are read from the {} environment variable if set.", OPTIONS_ENV)?;
        writeln!(out, "  But currently, the {} environment variable is not set.", OPTIONS_ENV)?;
    } else {
        writeln!(out, "  Additional options are read from the {} environment variable.", OPTIONS_ENV)?;
        writeln!(out, "  Current setting: {}=\"{}\"", OPTIONS_ENV, env_options)?;
    }

    match abs_look_path(&invocation.program) {
        Some(own_path) => {
            let pager_path = invocation.pager.as_deref().and_then(abs_look_path);
            if pager_path.as_deref() != Some(own_path.as_path()) {
                writeln!(out)?;
                writeln!(out, "Making leaf your default pager:")?;
                writeln!(out, "  Put the following line in your ~/.bashrc, ~/.bash_profile or ~/.zshrc")?;
                writeln!(out, "  and leaf will be used as the default pager in all new terminal windows:")?;
                writeln!(out)?;
                writeln!(out, "     export PAGER={}", display_path(&invocation.program))?;
            }
        }
        None => warn!("Unable to find leaf binary {}", invocation.program),
    }

    writeln!(out)?;
    writeln!(out, "Options:")?;
    write!(out, "{}", options.usage())?;

    writeln!(out)?;
    writeln!(out, "Styles:")?;
    writeln!(out, "  {}", HighlightStyle::list().join(", "))?;

    Ok(())
}

/// Absolute path of `program` as the shell would find it
fn abs_look_path(program: &str) -> Option<PathBuf> {
    if program.is_empty() {
        return None;
    }
    let found = which::which(program).ok()?;
    absolute(&found)
}

fn absolute(path: &Path) -> Option<PathBuf> {
    if path.is_absolute() {
        Some(path.to_path_buf())
    } else {
        std::env::current_dir().ok().map(|cwd| cwd.join(path))
    }
}

/// Bare name if we were found through `$PATH`, otherwise an absolute path
fn display_path(program: &str) -> String {
    let path = Path::new(program);
    if path.is_absolute() || !program.contains(std::path::MAIN_SEPARATOR) {
        return program.to_string();
    }

    absolute(path)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| program.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invocation(args: &[&str], env_options: Option<&str>) -> Invocation {
        Invocation {
            program: String::new(),
            args: args.iter().map(|s| s.to_string()).collect(),
            env_options: env_options.map(str::to_string),
            term: None,
            lang: None,
            pager: None,
        }
    }

    fn render(invocation: &Invocation, print_command_line: bool) -> String {
        let mut out = Vec::new();
        write_usage(&mut out, invocation, &Options::new(None), print_command_line).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_help_usage() {
        let text = render(&invocation(&["-help"], None), false);
        assert!(text.starts_with("Usage:\n"));
        assert!(text.contains("the LEAF environment variable is not set"));
        assert!(text.contains("Options:\n  -colors value\n"));
        assert!(text.contains("Styles:\n  native, monokai"));
    }

    #[test]
    fn test_error_usage_shows_command_line() {
        let text = render(&invocation(&["-shift", "0"], Some("-wrap")), true);
        assert!(text.starts_with("Commandline: leaf -shift 0\nEnvironment: LEAF=\"-wrap\"\n"));
        assert!(text.contains("Current setting: LEAF=\"-wrap\""));
    }

    #[test]
    fn test_display_path() {
        assert_eq!(display_path("leaf"), "leaf");
        assert_eq!(display_path("/usr/bin/leaf"), "/usr/bin/leaf");
        #[cfg(unix)]
        assert!(Path::new(&display_path("./target/leaf")).is_absolute());
    }
}
