//! Command-line parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "rillcat", version)]
#[command(about = "Stream files, stdin, HTTP bodies and literal text", long_about = None)]
#[command(after_help = "Origins: '-' is stdin, http(s)://... is the body of a GET request, \
text:LITERAL is the literal text, anything else is a file path.")]
pub struct Cli {
    /// TOML config file; built-in defaults apply when absent
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Copy the origin to stdout
    Cat { origin: String },

    /// Print each line with its 1-based number
    Lines { origin: String },

    /// Read the whole origin, print its size and UTF-8 content
    Drain { origin: String },

    /// Decode JSON values and print one per line
    Json {
        origin: String,

        /// Newline-delimited framing, one value per line
        #[arg(long)]
        lines: bool,
    },
}

impl Command {
    pub fn origin(&self) -> &str {
        match self {
            Command::Cat { origin }
            | Command::Lines { origin }
            | Command::Drain { origin }
            | Command::Json { origin, .. } => origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("rillcat").chain(args.iter().copied()))
    }

    #[test]
    fn test_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_basic() {
        let cli = parse(&["cat", "input.txt"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Cat {
                origin: "input.txt".to_string()
            }
        );
        assert_eq!(cli.command.origin(), "input.txt");
        assert_eq!(cli.config, None);
    }

    #[test]
    fn test_parse_config_before_and_after_command() {
        let cli = parse(&["--config", "rill.toml", "lines", "-"]).unwrap();
        assert_eq!(cli.command.origin(), "-");
        assert_eq!(cli.config, Some(PathBuf::from("rill.toml")));

        let cli = parse(&["drain", "-c", "rill.toml", "text:x"]).unwrap();
        assert_eq!(cli.command.origin(), "text:x");
        assert_eq!(cli.config, Some(PathBuf::from("rill.toml")));
    }

    #[test]
    fn test_parse_json_lines() {
        let cli = parse(&["json", "--lines", "text:{}"]).unwrap();
        assert!(matches!(cli.command, Command::Json { lines: true, .. }));

        let cli = parse(&["json", "text:{}"]).unwrap();
        assert!(matches!(cli.command, Command::Json { lines: false, .. }));
    }

    #[test]
    fn test_parse_errors() {
        let kind = |args: &[&str]| parse(args).unwrap_err().kind();
        assert_eq!(
            kind(&[]),
            ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        );
        assert_eq!(kind(&["cat"]), ErrorKind::MissingRequiredArgument);
        assert_eq!(kind(&["tac", "x"]), ErrorKind::InvalidSubcommand);
        assert_eq!(kind(&["cat", "a", "b"]), ErrorKind::UnknownArgument);
        assert_eq!(kind(&["cat", "--lines", "a"]), ErrorKind::UnknownArgument);
        assert_eq!(kind(&["cat", "a", "--config"]), ErrorKind::InvalidValue);
        assert_eq!(kind(&["--help"]), ErrorKind::DisplayHelp);
    }
}
