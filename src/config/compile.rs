//! Optional compile step, decided once at configuration time.

use std::fmt;

/// Whether a cycle runs a build command between kill and run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CompileStep {
    #[default]
    NoCompileConfigured,
    /// Argv-style tokens: program first, then its arguments.
    Command(Vec<String>),
}

impl CompileStep {
    /// Split a command string on whitespace into argv tokens.
    ///
    /// A missing, empty or whitespace-only command means no compile step.
    pub fn parse(command: Option<&str>) -> Self {
        let tokens: Vec<String> = command
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_owned)
            .collect();

        if tokens.is_empty() {
            Self::NoCompileConfigured
        } else {
            Self::Command(tokens)
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Command(_))
    }

    pub fn tokens(&self) -> Option<&[String]> {
        match self {
            Self::NoCompileConfigured => None,
            Self::Command(tokens) => Some(tokens),
        }
    }
}

impl fmt::Display for CompileStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCompileConfigured => f.write_str("none"),
            Self::Command(tokens) => f.write_str(&tokens.join(" ")),
        }
    }
}
