use clap::{App, Arg, ArgMatches};
use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use crate::rom::Format;

/// Names of the boolean options, in usage order.
pub const OPTIONS: [&str; 4] = ["debug", "step", "screen", "keyboard"];

/// The four switches every run must set explicitly.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Options {
  /// Trace every instruction, the program counter and the count.
  pub debug: bool,
  /// Wait for the console between instructions.
  pub step: bool,
  /// Deliver write-screen output.
  pub screen: bool,
  /// Poll the keypad.
  pub keyboard: bool,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ConfigError {
  /// An option was never given.
  Missing(&'static str),
  /// An option was given as both true and false.
  Conflict(&'static str),
  /// A token that is not `<option>=<true|false>`.
  Unknown(String),
  /// An unknown `--format`.
  Format(String),
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::Missing(name) => {
        write!(f, "no {} status set. exiting interpreter...", name)
      }
      ConfigError::Conflict(name) => {
        write!(f, "{} is set both true and false", name)
      }
      ConfigError::Unknown(token) => write!(f, "unrecognised option '{}'", token),
      ConfigError::Format(msg) => write!(f, "{}", msg),
    }
  }
}

impl StdError for ConfigError {}

impl Options {
  /// Parse order-agnostic `name=true` / `name=false` tokens.
  pub fn from_tokens<I, S>(tokens: I) -> Result<Options, ConfigError>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut values: [Option<bool>; 4] = [None; 4];
    for token in tokens {
      let token = token.as_ref();
      let mut parts = token.splitn(2, '=');
      let key = parts.next().unwrap_or("");
      let value = match parts.next() {
        Some("true") => true,
        Some("false") => false,
        _ => return Err(ConfigError::Unknown(token.to_string())),
      };
      let idx = OPTIONS
        .iter()
        .position(|&name| name == key)
        .ok_or_else(|| ConfigError::Unknown(token.to_string()))?;
      if let Some(prev) = values[idx] {
        if prev != value {
          return Err(ConfigError::Conflict(OPTIONS[idx]));
        }
      }
      values[idx] = Some(value);
    }

    let get =
      |idx: usize| values[idx].ok_or(ConfigError::Missing(OPTIONS[idx]));
    Ok(Options {
      debug: get(0)?,
      step: get(1)?,
      screen: get(2)?,
      keyboard: get(3)?,
    })
  }
}

/// Everything the command line decides.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
  pub program: PathBuf,
  pub format: Format,
  /// Grow the address space for an oversized image without asking.
  pub grow: bool,
  pub options: Options,
}

pub fn app<'a, 'b>() -> App<'a, 'b> {
  App::new("index")
    .version(env!("CARGO_PKG_VERSION"))
    .about("Interpreter for the Index 0.5 virtual CPU")
    .arg(
      Arg::with_name("PROGRAM")
        .help("Program image, loaded at address 0")
        .required(true)
        .index(1),
    )
    .arg(
      Arg::with_name("OPTIONS")
        .help(
          "debug=<true|false> step=<true|false> screen=<true|false> \
           keyboard=<true|false>, in any order; all four are required",
        )
        .multiple(true)
        .index(2),
    )
    .arg(
      Arg::with_name("format")
        .long("format")
        .takes_value(true)
        .possible_values(&["raw", "hex"])
        .default_value("raw")
        .help("Encoding of the program image"),
    )
    .arg(
      Arg::with_name("grow")
        .long("grow")
        .help("Grow the address space for images larger than 64 KiB"),
    )
}

impl Config {
  pub fn from_matches(matches: &ArgMatches<'_>) -> Result<Config, ConfigError> {
    let program = PathBuf::from(matches.value_of("PROGRAM").unwrap_or(""));
    let format = matches
      .value_of("format")
      .unwrap_or("raw")
      .parse::<Format>()
      .map_err(ConfigError::Format)?;
    let tokens = matches
      .values_of("OPTIONS")
      .map(|v| v.collect::<Vec<_>>())
      .unwrap_or_default();
    Ok(Config {
      program,
      format,
      grow: matches.is_present("grow"),
      options: Options::from_tokens(tokens)?,
    })
  }
}
