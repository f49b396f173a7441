use std::fmt;

use crate::{
    core::Ticks,
    error::{Result, SimError},
};

/// One workload command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ncores(u32),
    New(Ticks),
    Cpu(Ticks),
    Ssd,
    User,
    End,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Ncores(n) => write!(f, "NCORES {n}"),
            Command::New(start) => write!(f, "NEW {start}"),
            Command::Cpu(ms) => write!(f, "CPU {ms}"),
            Command::Ssd => f.write_str("SSD"),
            Command::User => f.write_str("USER"),
            Command::End => f.write_str("END"),
        }
    }
}

/// A command together with the 1-based line it started on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Located {
    pub line: usize,
    pub command: Command,
}

struct Tokens<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
    current: Option<(usize, std::str::SplitWhitespace<'a>)>,
    last_line: usize,
}

impl<'a> Tokens<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines().enumerate(),
            current: None,
            last_line: 1,
        }
    }

    fn next_token(&mut self) -> Option<(usize, &'a str)> {
        loop {
            if let Some((line, words)) = self.current.as_mut() {
                if let Some(word) = words.next() {
                    self.last_line = *line;
                    return Some((*line, word));
                }
            }
            let (index, text) = self.lines.next()?;
            self.current = Some((index + 1, text.split_whitespace()));
        }
    }

    fn number<T: std::str::FromStr>(&mut self, keyword: &str, line: usize) -> Result<T> {
        let Some((_, token)) = self.next_token() else {
            return Err(SimError::malformed(
                line,
                format!("{keyword} expects a numeric argument"),
            ));
        };
        token.parse().map_err(|_| {
            SimError::malformed(
                self.last_line,
                format!("{keyword} expects a non-negative integer, got `{token}`"),
            )
        })
    }
}

/// Parse commands up to and including `END`. Anything after `END` is ignored.
pub fn parse_commands(input: &str) -> Result<Vec<Located>> {
    let mut tokens = Tokens::new(input);
    let mut commands = Vec::new();

    while let Some((line, keyword)) = tokens.next_token() {
        let command = match keyword {
            "NCORES" => Command::Ncores(tokens.number(keyword, line)?),
            "NEW" => Command::New(tokens.number(keyword, line)?),
            "CPU" => Command::Cpu(tokens.number(keyword, line)?),
            "SSD" => Command::Ssd,
            "USER" => Command::User,
            "END" => Command::End,
            other => {
                return Err(SimError::malformed(
                    line,
                    format!("unknown command `{other}`"),
                ));
            }
        };
        commands.push(Located { line, command });
        if command == Command::End {
            return Ok(commands);
        }
    }

    Err(SimError::malformed(
        tokens.last_line,
        "input ended without END",
    ))
}
