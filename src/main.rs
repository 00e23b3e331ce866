// tforth main program

use std::path::Path;
use std::process::ExitCode;

use tforth::builtins::install_core;
use tforth::config::Config;
use tforth::files::{FileHandle, FileMode};
use tforth::interpreter::outer;
use tforth::{Forth, ForthError};

fn main() -> ExitCode {
    let mut config = Config::new();
    config.process_args();

    let mut forth = Forth::new();
    forth.msg.set_level(config.debug_level);

    if let Err(e) = install_core(&mut forth) {
        eprintln!("fatal: could not install primitives: {e}");
        return ExitCode::FAILURE;
    }

    if !config.no_startup {
        match FileHandle::open(Path::new(&config.startup_path), FileMode::RO, &forth.msg) {
            Some(handle) => {
                let id = forth.files.len();
                forth.files.push(Some(handle));
                forth.input.push(id);
                // Run the bootstrap to completion (it drops its own stream
                // once exhausted) before falling through to stdin or a
                // `--script` file, so its `ok` prompt never leaks out mid
                // load.
                outer::run_until(&mut forth, 1);
            }
            None => {
                let err = ForthError::BootstrapFailed {
                    path: config.startup_path.clone(),
                    reason: "could not open file".to_string(),
                };
                forth.msg.error("main", &err.to_string(), None::<()>);
                return ExitCode::FAILURE;
            }
        }
    }

    if let Some(script) = &config.script {
        match FileHandle::open(Path::new(script), FileMode::RO, &forth.msg) {
            Some(handle) => {
                forth.files = vec![Some(handle)];
                forth.input = vec![0];
                forth.show_stack = false;
            }
            None => {
                eprintln!("fatal: could not open script {script}");
                return ExitCode::FAILURE;
            }
        }
    }

    outer::quit(&mut forth);
    ExitCode::SUCCESS
}
