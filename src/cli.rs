//! Command-line interface for stack-explorer.
//!
//! Uses lexopt for minimal binary size overhead.

use std::ffi::OsString;
use std::path::PathBuf;

/// Command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Recorded call stack (JSON) to navigate.
    pub snapshot: Option<PathBuf>,
    /// Path to configuration file.
    pub config: Option<PathBuf>,
    /// Navigation commands to replay, in order.
    pub exec: Vec<String>,
    /// Frame to start on (overrides config file).
    pub initial_frame: Option<usize>,
    /// Do not capture the call stack on session start.
    pub no_capture: bool,
    /// Log level (error, warn, info, debug, trace).
    pub log_level: Option<String>,
    /// Show version and exit.
    pub version: bool,
    /// Show help and exit.
    pub help: bool,
}

/// Parse command-line arguments.
pub fn parse_args() -> Result<Args, ArgsError> {
    parse_args_from(std::env::args_os())
}

/// Parse arguments from an iterator (for testing).
pub fn parse_args_from<I>(args: I) -> Result<Args, ArgsError>
where
    I: IntoIterator<Item = OsString>,
{
    use lexopt::prelude::*;

    let mut result = Args::default();
    let mut parser = lexopt::Parser::from_iter(args);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('h') | Long("help") => {
                result.help = true;
            }
            Short('V') | Long("version") => {
                result.version = true;
            }
            Short('c') | Long("config") => {
                result.config = Some(parser.value()?.parse()?);
            }
            Short('e') | Long("exec") => {
                result.exec.push(parser.value()?.parse()?);
            }
            Short('f') | Long("frame") => {
                let value: String = parser.value()?.parse()?;
                result.initial_frame = Some(
                    value
                        .parse()
                        .map_err(|_| ArgsError::InvalidValue("frame", value))?,
                );
            }
            Long("no-capture") => {
                result.no_capture = true;
            }
            Short('l') | Long("log-level") => {
                result.log_level = Some(parser.value()?.parse()?);
            }
            Value(val) if result.snapshot.is_none() => {
                result.snapshot = Some(PathBuf::from(val));
            }
            Value(val) => {
                return Err(ArgsError::UnexpectedArgument(val.to_string_lossy().into()));
            }
            _ => return Err(arg.unexpected().into()),
        }
    }

    Ok(result)
}

/// Print help message.
pub fn print_help() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        r#"stack-explorer {version}
Navigate a recorded call stack the way a debugging session would

USAGE:
    stack-explorer [OPTIONS] <SNAPSHOT>

OPTIONS:
    -e, --exec <CMD>        Navigation command to replay (repeatable)
    -f, --frame <N>         Frame to start on [default: 0]
    -c, --config <FILE>     Path to configuration file (JSON)
    -l, --log-level <LVL>   Log level (error, warn, info, debug, trace)
        --no-capture        Do not capture the call stack on start
    -h, --help              Print help
    -V, --version           Print version

COMMANDS:
    up [N]                  Move N frames towards the callers
    down [N]                Move N frames towards the innermost frame
    frame <N>               Jump to frame N (negative counts from the end)
    show-stack              List all frames
    pop                     End the active navigation episode

ENVIRONMENT VARIABLES:
    STACK_EXPLORER_CAPTURE        Capture on start (true/false)
    STACK_EXPLORER_INITIAL_FRAME  Frame to start on
    STACK_EXPLORER_LOG_LEVEL      Log level (overrides config)
    RUST_LOG                      Alternative log level setting

EXAMPLES:
    # Show where a recorded stack starts
    stack-explorer stack.json

    # Walk two frames up and list the stack
    stack-explorer stack.json -e "up 2" -e show-stack
"#
    );
}

/// Print version.
pub fn print_version() {
    println!("stack-explorer {}", env!("CARGO_PKG_VERSION"));
}

/// Argument parsing errors.
#[derive(Debug, thiserror::Error)]
pub enum ArgsError {
    /// Lexopt parsing error.
    #[error("{0}")]
    Lexopt(#[from] lexopt::Error),
    /// Invalid argument value.
    #[error("invalid value for --{0}: '{1}'")]
    InvalidValue(&'static str, String),
    /// Unexpected positional argument.
    #[error("unexpected argument: '{0}'")]
    UnexpectedArgument(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(args: &[&str]) -> Vec<OsString> {
        std::iter::once("stack-explorer")
            .chain(args.iter().copied())
            .map(OsString::from)
            .collect()
    }

    #[test]
    fn test_default_args() {
        let result = parse_args_from(args(&[])).unwrap();
        assert!(result.snapshot.is_none());
        assert!(result.exec.is_empty());
        assert!(result.initial_frame.is_none());
        assert!(!result.no_capture);
    }

    #[test]
    fn test_snapshot_positional() {
        let result = parse_args_from(args(&["stack.json"])).unwrap();
        assert_eq!(result.snapshot, Some(PathBuf::from("stack.json")));
    }

    #[test]
    fn test_second_positional_rejected() {
        let result = parse_args_from(args(&["a.json", "b.json"]));
        assert!(matches!(result, Err(ArgsError::UnexpectedArgument(_))));
    }

    #[test]
    fn test_exec_repeatable() {
        let result =
            parse_args_from(args(&["s.json", "-e", "up 2", "--exec", "show-stack"])).unwrap();
        assert_eq!(result.exec, vec!["up 2".to_string(), "show-stack".to_string()]);
    }

    #[test]
    fn test_initial_frame() {
        let result = parse_args_from(args(&["-f", "2"])).unwrap();
        assert_eq!(result.initial_frame, Some(2));

        let result = parse_args_from(args(&["--frame", "x"]));
        assert!(matches!(result, Err(ArgsError::InvalidValue("frame", _))));
    }

    #[test]
    fn test_flags() {
        let result = parse_args_from(args(&["--no-capture", "-h", "-V"])).unwrap();
        assert!(result.no_capture);
        assert!(result.help);
        assert!(result.version);
    }

    #[test]
    fn test_config_and_log_level() {
        let result = parse_args_from(args(&["-c", "/etc/explorer.json", "-l", "debug"])).unwrap();
        assert_eq!(result.config, Some(PathBuf::from("/etc/explorer.json")));
        assert_eq!(result.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_unknown_option() {
        assert!(parse_args_from(args(&["--bogus"])).is_err());
    }
}
