//! Bug report header printed whenever something went wrong.

use std::fmt;

/// Version string from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const ISSUES_URL: &str = "https://github.com/user/leaf/issues";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticReport {
    pub version: &'static str,
    pub lang: String,
    pub term: String,
    pub os: &'static str,
    pub arch: &'static str,
    pub compiler: &'static str,
    pub cpus: usize,
}

impl DiagnosticReport {
    pub fn new(lang: Option<&str>, term: Option<&str>) -> Self {
        Self {
            version: VERSION,
            lang: lang.unwrap_or_default().to_string(),
            term: term.unwrap_or_default().to_string(),
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
            compiler: "rustc",
            cpus: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Please post the following report at <{}>.", ISSUES_URL)?;
        writeln!(f)?;
        writeln!(f, "Version: {}", self.version)?;
        writeln!(f, "LANG   : {}", self.lang)?;
        writeln!(f, "TERM   : {}", self.term)?;
        writeln!(f)?;
        writeln!(f, "OS      : {}", self.os)?;
        writeln!(f, "ARCH    : {}", self.arch)?;
        writeln!(f, "Compiler: {}", self.compiler)?;
        writeln!(f, "NumCPU  : {}", self.cpus)?;
        writeln!(f)
    }
}
