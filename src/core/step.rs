//! Step domain model

use crate::core::error::{StepConfigError, StepErrorKind};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A single step in a pipeline
///
/// Serialized as a record tagged with `kind` (`exec`, `args` or `store`)
/// next to the variant's own fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Step {
    /// Run an external program
    Exec(ExecStep),
    /// Split the data into extra arguments
    Args(ArgsStep),
    /// Write the data to a file and pass it on
    Store(StoreStep),
}

impl Step {
    /// Short name of the step kind
    pub fn kind(&self) -> &'static str {
        match self {
            Step::Exec(_) => "exec",
            Step::Args(_) => "args",
            Step::Store(_) => "store",
        }
    }

    /// Check constraints that deserialization cannot enforce
    pub fn validate(&self) -> Result<(), StepConfigError> {
        match self {
            Step::Exec(exec) if exec.program_args.is_empty() => Err(StepConfigError::EmptyProgram),
            _ => Ok(()),
        }
    }
}

impl From<ExecStep> for Step {
    fn from(step: ExecStep) -> Self {
        Step::Exec(step)
    }
}

impl From<ArgsStep> for Step {
    fn from(step: ArgsStep) -> Self {
        Step::Args(step)
    }
}

impl From<StoreStep> for Step {
    fn from(step: StoreStep) -> Self {
        Step::Store(step)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Exec(exec) => write!(f, "exec {}", exec.program_args.join(" ")),
            Step::Args(args) => match (&args.separator, args.regex) {
                (Some(sep), true) if !sep.is_empty() => write!(f, "args --regex {:?}", sep),
                (Some(sep), _) if !sep.is_empty() => write!(f, "args {:?}", sep),
                _ => write!(f, "args"),
            },
            Step::Store(store) => write!(f, "store {}", store.target_path.display()),
        }
    }
}

/// Runs a program; data goes to its stdin, its stdout becomes the new data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecStep {
    /// Command line template, extended with the accumulated arguments
    pub program_args: Vec<String>,
}

impl ExecStep {
    /// Create an exec step; the command line must name a program
    pub fn new<I, S>(program_args: I) -> Result<Self, StepConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let program_args: Vec<String> = program_args.into_iter().map(Into::into).collect();
        if program_args.is_empty() {
            return Err(StepConfigError::EmptyProgram);
        }
        Ok(Self { program_args })
    }

    /// The program name (first element of the template)
    pub fn program(&self) -> &str {
        self.program_args.first().map(String::as_str).unwrap_or_default()
    }

    /// Full command line: the template followed by `args`
    pub fn command_line(&self, args: &[String]) -> Vec<String> {
        self.program_args.iter().chain(args).cloned().collect()
    }
}

/// Splits the data into tokens appended to the argument list
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArgsStep {
    /// Literal separator; `None` or empty splits on whitespace runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,

    /// Treat the separator as a regular expression
    #[serde(default, skip_serializing_if = "is_false")]
    pub regex: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl ArgsStep {
    pub fn new(separator: Option<String>) -> Self {
        Self {
            separator,
            regex: false,
        }
    }

    /// Split on runs of whitespace
    pub fn whitespace() -> Self {
        Self::default()
    }

    /// Split on an exact literal string
    pub fn literal(separator: impl Into<String>) -> Self {
        Self::new(Some(separator.into()))
    }

    /// Split on matches of a regular expression
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self {
            separator: Some(pattern.into()),
            regex: true,
        }
    }

    /// Split `data` into argument tokens
    ///
    /// Whitespace splitting drops empty tokens; literal and pattern
    /// splitting keep the empty tokens between adjacent separators.
    pub fn tokenize(&self, data: &str) -> Result<Vec<String>, StepErrorKind> {
        let separator = match self.separator.as_deref() {
            Some(sep) if !sep.is_empty() => sep,
            _ => return Ok(data.split_whitespace().map(str::to_string).collect()),
        };

        if self.regex {
            let re = Regex::new(separator).map_err(|source| StepErrorKind::PatternError {
                pattern: separator.to_string(),
                source,
            })?;
            Ok(re.split(data).map(str::to_string).collect())
        } else {
            Ok(data.split(separator).map(str::to_string).collect())
        }
    }
}

/// Writes the data to a file, passing data and arguments through unchanged
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStep {
    pub target_path: PathBuf,
}

impl StoreStep {
    pub fn new(target_path: impl Into<PathBuf>) -> Self {
        Self {
            target_path: target_path.into(),
        }
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }
}
