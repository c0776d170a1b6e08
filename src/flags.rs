use std::{any::Any, time::Duration};

use clap::{parser::MatchesError, value_parser, Arg, ArgAction, ArgMatches, Command};

use crate::error::Error;

/// Declares typed options with defaults on a command-line parser.
///
/// Options are persistent: a subcommand accepts every option registered on its parents.
pub trait FlagRegistry {
    fn string_flag(&mut self, name: &'static str, default: &str, help: &'static str);
    fn int_flag(&mut self, name: &'static str, default: i64, help: &'static str);
    fn duration_flag(&mut self, name: &'static str, default: Duration, help: &'static str);
}

/// Reads back options declared through a [`FlagRegistry`] once arguments are parsed.
pub trait FlagValues {
    fn string(&self, name: &str) -> Result<String, Error>;
    fn int(&self, name: &str) -> Result<i64, Error>;
    fn duration(&self, name: &str) -> Result<Duration, Error>;
}

/// Parses durations such as `30s`, `500ms` or `1m 30s`.
pub fn parse_duration(s: &str) -> Result<Duration, humantime::DurationError> {
    let s = s.trim();
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    humantime::parse_duration(s)
}

fn persistent(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .global(true)
        .required(false)
        .action(ArgAction::Set)
        .help(help)
}

impl FlagRegistry for Command {
    fn string_flag(&mut self, name: &'static str, default: &str, help: &'static str) {
        let arg = persistent(name, help).default_value(default.to_string());
        *self = std::mem::take(self).arg(arg);
    }

    fn int_flag(&mut self, name: &'static str, default: i64, help: &'static str) {
        let arg = persistent(name, help)
            .value_parser(value_parser!(i64))
            .default_value(default.to_string());
        *self = std::mem::take(self).arg(arg);
    }

    fn duration_flag(&mut self, name: &'static str, default: Duration, help: &'static str) {
        let arg = persistent(name, help)
            .value_parser(parse_duration)
            .default_value(humantime::format_duration(default).to_string());
        *self = std::mem::take(self).arg(arg);
    }
}

fn lookup<'a, T>(matches: &'a ArgMatches, name: &str) -> Result<&'a T, Error>
where
    T: Any + Clone + Send + Sync + 'static,
{
    match matches.try_get_one::<T>(name) {
        Ok(Some(v)) => Ok(v),
        Ok(None) | Err(MatchesError::UnknownArgument { .. }) => Err(Error::MissingFlag {
            name: name.to_string(),
        }),
        Err(e) => Err(Error::InvalidFlag {
            name: name.to_string(),
            msg: e.to_string(),
        }),
    }
}

impl FlagValues for ArgMatches {
    fn string(&self, name: &str) -> Result<String, Error> {
        lookup::<String>(self, name).cloned()
    }

    fn int(&self, name: &str) -> Result<i64, Error> {
        lookup::<i64>(self, name).copied()
    }

    fn duration(&self, name: &str) -> Result<Duration, Error> {
        lookup::<Duration>(self, name).copied()
    }
}
