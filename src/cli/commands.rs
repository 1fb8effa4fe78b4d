//! Shell command definitions and parsing

use std::path::PathBuf;
use thiserror::Error;

/// Number of runs `history` shows when no count is given
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// A command typed at the shell prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Append a program invocation
    Exec(Vec<String>),

    /// Append an argument split; `None` splits on whitespace
    Args {
        separator: Option<String>,
        regex: bool,
    },

    /// Append a file store
    Store(PathBuf),

    /// Show the steps
    List { json: bool },

    /// Remove the last step, or the one at the given index
    Remove(Option<usize>),

    /// Show or set the keep-going flag
    KeepGoing(Option<bool>),

    /// Run the pipeline
    Run,

    /// Save the pipeline
    Save,

    /// Show recent runs
    History(usize),

    Help,

    Quit,
}

/// Problems with a command line
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}' (type 'help' for a list)")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("unterminated quote")]
    UnterminatedQuote,

    #[error("expected a number, got '{0}'")]
    InvalidNumber(String),
}

/// One line of help per command
pub const HELP: &[(&str, &str)] = &[
    ("exec PROGRAM [ARGS...]", "Append a program invocation to the pipeline"),
    ("args [SEPARATOR]", "Split the prior output into arguments (whitespace by default)"),
    ("args --regex PATTERN", "Split the prior output on a regular expression"),
    ("store PATH", "Write the prior output to a file and pass it on"),
    ("list [--json]", "Show the pipeline's steps"),
    ("remove [INDEX]", "Remove the last step, or the step at INDEX"),
    ("keep-going [on|off]", "Show or set whether runs continue past failures"),
    ("run", "Run the pipeline"),
    ("save", "Save the pipeline"),
    ("history [COUNT]", "Show recent runs"),
    ("help", "Show this help"),
    ("quit", "Exit Pipeline"),
];

impl ShellCommand {
    /// Parse a command line; blank lines and `#` comments yield `None`
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let words = split_words(line)?;
        let Some((name, rest)) = words.split_first() else {
            return Ok(None);
        };
        if name.starts_with('#') {
            return Ok(None);
        }

        let command = match name.as_str() {
            "exec" => {
                if rest.is_empty() {
                    return Err(CommandError::Usage("exec PROGRAM [ARGS...]"));
                }
                ShellCommand::Exec(rest.to_vec())
            }
            "args" => match rest {
                [] => ShellCommand::Args {
                    separator: None,
                    regex: false,
                },
                [flag, pattern] if flag == "--regex" => ShellCommand::Args {
                    separator: Some(pattern.clone()),
                    regex: true,
                },
                [separator] if separator != "--regex" => ShellCommand::Args {
                    separator: Some(separator.clone()),
                    regex: false,
                },
                _ => return Err(CommandError::Usage("args [SEPARATOR] | args --regex PATTERN")),
            },
            "store" => match rest {
                [path] => ShellCommand::Store(PathBuf::from(path)),
                _ => return Err(CommandError::Usage("store PATH")),
            },
            "list" | "ls" => match rest {
                [] => ShellCommand::List { json: false },
                [flag] if flag == "--json" => ShellCommand::List { json: true },
                _ => return Err(CommandError::Usage("list [--json]")),
            },
            "remove" | "rm" => match rest {
                [] => ShellCommand::Remove(None),
                [index] => ShellCommand::Remove(Some(parse_number(index)?)),
                _ => return Err(CommandError::Usage("remove [INDEX]")),
            },
            "keep-going" => match rest {
                [] => ShellCommand::KeepGoing(None),
                [value] => match value.as_str() {
                    "on" | "true" | "yes" => ShellCommand::KeepGoing(Some(true)),
                    "off" | "false" | "no" => ShellCommand::KeepGoing(Some(false)),
                    _ => return Err(CommandError::Usage("keep-going [on|off]")),
                },
                _ => return Err(CommandError::Usage("keep-going [on|off]")),
            },
            "run" => ShellCommand::Run,
            "save" => ShellCommand::Save,
            "history" => match rest {
                [] => ShellCommand::History(DEFAULT_HISTORY_LIMIT),
                [count] => ShellCommand::History(parse_number(count)?),
                _ => return Err(CommandError::Usage("history [COUNT]")),
            },
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(Some(command))
    }
}

fn parse_number(s: &str) -> Result<usize, CommandError> {
    s.parse()
        .map_err(|_| CommandError::InvalidNumber(s.to_string()))
}

/// Split a line into words the way a POSIX shell would for simple input
///
/// Single quotes are literal, double quotes allow `\"` and `\\`, and a
/// backslash outside quotes escapes the next character.
pub fn split_words(line: &str) -> Result<Vec<String>, CommandError> {
    let mut words = Vec::new();
    let mut current = String::new();
    // Distinguishes `""` (an empty word) from no word at all
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => current.push(c),
                        None => return Err(CommandError::UnterminatedQuote),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(c @ ('"' | '\\')) => current.push(c),
                            Some(c) => {
                                current.push('\\');
                                current.push(c);
                            }
                            None => return Err(CommandError::UnterminatedQuote),
                        },
                        Some(c) => current.push(c),
                        None => return Err(CommandError::UnterminatedQuote),
                    }
                }
            }
            '\\' => {
                in_word = true;
                if let Some(c) = chars.next() {
                    current.push(c);
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }

    if in_word {
        words.push(current);
    }
    Ok(words)
}
