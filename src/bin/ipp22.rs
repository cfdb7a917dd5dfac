//! `ipp22`: load an IPPcode22 XML source, execute it, exit with the mapped code.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;
use std::process::ExitCode;

use ipp22::cli::{Cli, ParseOutcome};
use ipp22::error::Error;
use ipp22::interp::Interpreter;
use ipp22::xml;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .with_writer(io::stderr)
        .try_init()
        .ok();

    match run() {
        Ok(code) => exit_code(code),
        Err(e) => {
            eprintln!("{e}");
            exit_code(e.exit_code())
        }
    }
}

fn run() -> Result<i32, Error> {
    let cli = match Cli::parse_from_args(std::env::args_os())? {
        ParseOutcome::Run(cli) => cli,
        ParseOutcome::Print(text) => {
            print!("{text}");
            return Ok(0);
        }
    };

    let program = {
        let source = open_reader(cli.source.as_deref())?;
        xml::load_program(source)?
    };

    let input = open_reader(cli.input.as_deref())?;
    let stdout = BufWriter::new(io::stdout());
    let stderr = io::stderr();

    let mut interp = Interpreter::new(program, input, stdout, stderr)?;
    interp.run()
}

/// Opens `path` for buffered reading, or stdin if `path` is `None`.
fn open_reader(path: Option<&Path>) -> Result<Box<dyn io::BufRead>, Error> {
    match path {
        Some(path) => {
            let file = File::open(path).map_err(|source| Error::FileOpen { path: path.to_path_buf(), source })?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(code.clamp(0, 255) as u8)
}
