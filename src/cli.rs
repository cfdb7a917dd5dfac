//! Command-line surface: `--source`/`--input`/`--help`.
//!
//! `clap`'s own exit-2-on-misuse behavior doesn't match IPPcode22's exit-code
//! contract (CLI misuse is 10, not 2), so the binary parses with
//! [`Cli::try_parse_from`] and maps genuine usage failures to
//! [`crate::error::Error::CliUsage`] itself. `--help`/`--version` are not
//! usage failures — clap reports them as an `Err` carrying the text to print,
//! but the outcome is "print this and exit 0", which [`ParseOutcome`] keeps
//! distinct from a real error.

use std::path::PathBuf;

use clap::Parser;

use crate::error::Error;

#[derive(Parser, Debug)]
#[command(name = "ipp22", about = "Interpreter for IPPcode22", disable_help_flag = false)]
pub struct Cli {
    /// XML source document; reads from stdin if omitted.
    #[arg(long, value_name = "PATH")]
    pub source: Option<PathBuf>,

    /// Input stream consumed by READ; reads from stdin if omitted.
    #[arg(long, value_name = "PATH")]
    pub input: Option<PathBuf>,
}

/// What came out of parsing: either a [`Cli`] ready to run, or text clap
/// wants printed (`--help`/`--version`) before exiting 0.
pub enum ParseOutcome {
    Run(Cli),
    Print(String),
}

impl Cli {
    /// Parses `args` (excluding argv[0]) and enforces the "at least one of
    /// `--source`/`--input`" rule that clap's derive can't express directly.
    pub fn parse_from_args<I, T>(args: I) -> Result<ParseOutcome, Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli = match Cli::try_parse_from(args) {
            Ok(cli) => cli,
            Err(e)
                if matches!(
                    e.kind(),
                    clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
                ) =>
            {
                return Ok(ParseOutcome::Print(e.to_string()));
            }
            Err(e) => return Err(Error::CliUsage(e.to_string())),
        };
        if cli.source.is_none() && cli.input.is_none() {
            return Err(Error::CliUsage(
                "at least one of --source/--input must be given (both default to stdin \
                 individually, but not simultaneously)"
                    .into(),
            ));
        }
        Ok(ParseOutcome::Run(cli))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unwrap_run(outcome: ParseOutcome) -> Cli {
        match outcome {
            ParseOutcome::Run(cli) => cli,
            ParseOutcome::Print(text) => panic!("expected ParseOutcome::Run, got Print({text:?})"),
        }
    }

    #[test]
    fn source_only_is_accepted() {
        let cli = unwrap_run(Cli::parse_from_args(["ipp22", "--source=prog.xml"]).unwrap());
        assert_eq!(cli.source, Some(PathBuf::from("prog.xml")));
        assert_eq!(cli.input, None);
    }

    #[test]
    fn both_flags_are_accepted() {
        let cli = unwrap_run(Cli::parse_from_args(["ipp22", "--source=a.xml", "--input=b.txt"]).unwrap());
        assert!(cli.source.is_some() && cli.input.is_some());
    }

    #[test]
    fn help_flag_is_a_print_outcome_not_an_error() {
        match Cli::parse_from_args(["ipp22", "--help"]).unwrap() {
            ParseOutcome::Print(text) => assert!(text.contains("--source")),
            ParseOutcome::Run(_) => panic!("expected ParseOutcome::Print for --help"),
        }
    }

    #[test]
    fn neither_flag_is_cli_usage_error() {
        let err = Cli::parse_from_args(["ipp22"]).unwrap_err();
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn unknown_flag_is_cli_usage_error() {
        let err = Cli::parse_from_args(["ipp22", "--bogus"]).unwrap_err();
        assert_eq!(err.exit_code(), 10);
    }

    #[test]
    fn extra_positional_argument_is_cli_usage_error() {
        let err = Cli::parse_from_args(["ipp22", "--source=a.xml", "extra"]).unwrap_err();
        assert_eq!(err.exit_code(), 10);
    }
}
