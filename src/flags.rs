//! Registering bridge settings as command-line flags.
//!
//! [`FlagSet`] and [`FlagValues`] only deal in strings and integers, so any flag library
//! can back them; `clap` implementations are provided.

use crate::config::{BridgeConfig, ConfigError, ConfigResult};
use clap::parser::ValueSource;
use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;

/// Something flags can be registered on.
pub trait FlagSet {
    fn string_var(&mut self, name: &str, default: &str, usage: &'static str);
    fn int_var(&mut self, name: &str, default: i64, usage: &'static str);
}

/// Parsed flag values, looked up by the names given to [`FlagSet`].
pub trait FlagValues {
    fn string_value(&self, name: &str) -> Option<String>;
    fn int_value(&self, name: &str) -> Option<i64>;
}

fn flag_name(prefix: &str, flag: &str) -> String {
    if prefix.is_empty() {
        flag.to_string()
    } else {
        format!("{prefix}-{flag}")
    }
}

impl BridgeConfig {
    /// Register `i`, `o`, `pid`, `socat`, `baudrate` and `opts`, defaulting to the current values.
    pub fn set_flags(&self, flags: &mut impl FlagSet) {
        self.set_flags_prefix(flags, "");
    }

    /// Like [`BridgeConfig::set_flags`], with every name prefixed by `<prefix>-`.
    pub fn set_flags_prefix(&self, flags: &mut impl FlagSet, prefix: &str) {
        let path_default = |path: Option<&PathBuf>| {
            path.map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default()
        };
        flags.string_var(
            &flag_name(prefix, "i"),
            &self.input_file.to_string_lossy(),
            "input file",
        );
        flags.string_var(
            &flag_name(prefix, "o"),
            &self.output_file.to_string_lossy(),
            "output file",
        );
        flags.string_var(
            &flag_name(prefix, "pid"),
            &path_default(self.pid_file.as_ref()),
            "pid of socat",
        );
        flags.string_var(
            &flag_name(prefix, "socat"),
            &path_default(self.socat_path.as_ref()),
            "path of socat executable",
        );
        flags.int_var(
            &flag_name(prefix, "baudrate"),
            i64::from(self.baud_rate),
            "baud rate",
        );
        flags.string_var(
            &flag_name(prefix, "opts"),
            &self.extra_opts,
            "extra options for socat",
        );
    }

    /// Copy the values registered by [`BridgeConfig::set_flags_prefix`] back in.
    ///
    /// Flags without a value leave the field untouched. An empty `pid` or
    /// `socat` restores the built-in default.
    pub fn apply_flags(&mut self, values: &impl FlagValues, prefix: &str) -> ConfigResult<()> {
        if let Some(v) = values.string_value(&flag_name(prefix, "i")) {
            self.input_file = PathBuf::from(v);
        }
        if let Some(v) = values.string_value(&flag_name(prefix, "o")) {
            self.output_file = PathBuf::from(v);
        }
        if let Some(v) = values.string_value(&flag_name(prefix, "pid")) {
            self.pid_file = (!v.is_empty()).then(|| PathBuf::from(v));
        }
        if let Some(v) = values.string_value(&flag_name(prefix, "socat")) {
            self.socat_path = (!v.is_empty()).then(|| PathBuf::from(v));
        }
        let baud_flag = flag_name(prefix, "baudrate");
        if let Some(v) = values.int_value(&baud_flag) {
            self.baud_rate = u32::try_from(v)
                .map_err(|_| ConfigError::validation(baud_flag, format!("{v} is out of range")))?;
        }
        if let Some(v) = values.string_value(&flag_name(prefix, "opts")) {
            self.extra_opts = v;
        }
        Ok(())
    }
}

/// [`FlagSet`] that adds long options to a `clap::Command`.
///
/// A flag named `baudrate` becomes `--baudrate`; with prefix `dev` it becomes
/// `--dev-baudrate`.
#[derive(Debug, Default)]
pub struct ClapFlags {
    command: Command,
}

impl ClapFlags {
    pub fn new(command: Command) -> Self {
        Self { command }
    }

    pub fn into_command(self) -> Command {
        self.command
    }

    fn add(&mut self, arg: Arg) {
        let command = std::mem::take(&mut self.command);
        self.command = command.arg(arg);
    }
}

impl FlagSet for ClapFlags {
    fn string_var(&mut self, name: &str, default: &str, usage: &'static str) {
        self.add(
            Arg::new(name.to_string())
                .long(name.to_string())
                .value_name("VALUE")
                .default_value(default.to_string())
                .help(usage),
        );
    }

    fn int_var(&mut self, name: &str, default: i64, usage: &'static str) {
        self.add(
            Arg::new(name.to_string())
                .long(name.to_string())
                .value_name("N")
                .value_parser(clap::value_parser!(i64))
                .default_value(default.to_string())
                .help(usage),
        );
    }
}

/// Only values given on the command line are reported, so registered
/// defaults never override settings loaded from elsewhere.
impl FlagValues for ArgMatches {
    fn string_value(&self, name: &str) -> Option<String> {
        let value = self.try_get_one::<String>(name).ok().flatten()?;
        from_command_line(self, name).then(|| value.clone())
    }

    fn int_value(&self, name: &str) -> Option<i64> {
        let value = self.try_get_one::<i64>(name).ok().flatten()?;
        from_command_line(self, name).then_some(*value)
    }
}

fn from_command_line(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}
