//! Command-line configuration.
//!
//! Grounded on the teacher's `config.rs`, which builds its argument parser
//! directly with `clap::{arg, Command}` rather than clap's derive macros.
//! Flags are renamed and extended to match the bootstrap/CLI surface
//! described in SPEC_FULL.md section 6: a debug level, an overridable
//! startup script path, a way to skip bootstrap entirely, and a
//! non-interactive script-then-exit mode.

use clap::{arg, Command};

use crate::messages::DebugLevel;

pub const VERSION: &str = "0.1.0";
pub const DEFAULT_STARTUP: &str = "startup.f";

pub struct Config {
    pub debug_level: DebugLevel,
    pub startup_path: String,
    pub no_startup: bool,
    pub script: Option<String>,
}

impl Config {
    pub fn new() -> Config {
        Config {
            debug_level: DebugLevel::Warning,
            startup_path: DEFAULT_STARTUP.to_owned(),
            no_startup: false,
            script: None,
        }
    }

    /// Parse `std::env::args()` into a `Config`, matching the teacher's
    /// `process_args` shape (build one `Command`, pull values back out of
    /// the match result).
    pub fn process_args(&mut self) -> &Config {
        let arguments = Command::new("tforth")
            .version(VERSION)
            .author("Tim Barnes")
            .about("A minimal, self-hosting Forth interpreter")
            .arg(
                arg!(--"debug-level" <VALUE>)
                    .required(false)
                    .value_parser(["error", "warning", "info", "debug"]),
            )
            .arg(arg!(--startup <PATH>).required(false))
            .arg(arg!(--"no-startup").required(false))
            .arg(arg!(--script <PATH>).required(false))
            .get_matches();

        if let Some(level) = arguments.get_one::<String>("debug-level") {
            self.debug_level = match level.as_str() {
                "error" => DebugLevel::Error,
                "info" => DebugLevel::Info,
                "debug" => DebugLevel::Debug,
                _ => DebugLevel::Warning,
            };
        }

        if let Some(path) = arguments.get_one::<String>("startup") {
            self.startup_path = path.clone();
        }

        if let Some(no_startup) = arguments.get_one::<bool>("no-startup") {
            self.no_startup = *no_startup;
        }

        if let Some(script) = arguments.get_one::<String>("script") {
            self.script = Some(script.clone());
        }

        self
    }
}

impl Default for Config {
    fn default() -> Config {
        Config::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_run_the_standard_startup_script() {
        let config = Config::new();
        assert_eq!(config.startup_path, DEFAULT_STARTUP);
        assert!(!config.no_startup);
        assert_eq!(config.script, None);
    }
}
