//! Terminal-mode driver: boots a ROM image, then shuttles stdin lines into
//! the VM's receive-line entry point and drains its output buffer to
//! stdout, the way SPEC_FULL.md's "Command-line" section describes.

mod args;
mod symbols;

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use markab_vm::error::HostError;
use markab_vm::state::ProgramState;
use markab_vm::{Interpreter, VmConfig};

use args::Args;

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbosity.filter_directive());

    if args.irc {
        eprintln!("markab: --irc was selected, but this build has no IRC bridge configured");
        return ExitCode::FAILURE;
    }

    run(&args).unwrap_or_else(|code| code)
}

fn run(args: &Args) -> Result<ExitCode, ExitCode> {
    let image = std::fs::read(&args.rom).map_err(|err| {
        eprintln!("markab: could not read {:?}: {err}", args.rom);
        ExitCode::FAILURE
    })?;
    let table = symbols::load_sidecar(&args.rom);
    tracing::debug!(symbols = table.len(), "loaded debug symbols");

    let working_dir = args.rom.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    let config = VmConfig {
        working_dir: working_dir.to_path_buf(),
        ..VmConfig::default()
    };
    let mut vm = Interpreter::new(config);

    let boot_state = vm.boot(&image).map_err(|err| report_and_exit(&err))?;
    flush_output(&mut vm);
    if matches!(boot_state, ProgramState::Halted) || vm.halted() {
        return Ok(ExitCode::SUCCESS);
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.map_err(|err| report_and_exit(&HostError::Io(err)))?;
        let state = vm.receive_line(line.as_bytes()).map_err(|err| report_and_exit(&err))?;
        flush_output(&mut vm);
        if matches!(state, ProgramState::Halted) || vm.halted() {
            return Ok(ExitCode::SUCCESS);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn flush_output(vm: &mut Interpreter) {
    let bytes = vm.take_output();
    if bytes.is_empty() {
        return;
    }
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let _ = handle.write_all(&bytes);
    let _ = handle.flush();
}

fn report_and_exit(err: &HostError) -> ExitCode {
    eprintln!("markab: {err}");
    ExitCode::FAILURE
}

fn init_tracing(directive: &str) {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}
