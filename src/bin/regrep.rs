use anyhow::{Context, Result};
use clap::Parser;
use pkghelper::grep::{SearchOptions, search};
use std::io::Read;
use std::path::PathBuf;

/// regrep - print the first regex match in a file or stdin
///
/// The match is printed with its capture groups; nothing is printed when
/// there is no match.
#[derive(Parser, Debug)]
#[command(author, version = env!("PKGHELPER_VERSION"), about)]
struct Cli {
    /// Case insensitive match
    #[arg(short = 'i', long = "ignore-case")]
    ignore_case: bool,

    /// Multiline match (^ and $ match at line boundaries)
    #[arg(short = 'm', long = "multiline")]
    multiline: bool,

    /// Regular expression to search for
    #[arg(value_name = "REGEX")]
    pattern: String,

    /// File to search (defaults to stdin)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let text = match &cli.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {:?}", path))?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            text
        }
    };

    let options = SearchOptions {
        ignore_case: cli.ignore_case,
        multiline: cli.multiline,
    };
    if let Some(report) = search(&cli.pattern, &text, options)? {
        println!("{}", report);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["regrep", "-i", "-m", "^id=(\\w+)", "/etc/os-release"]).unwrap();
        assert!(cli.ignore_case);
        assert!(cli.multiline);
        assert_eq!(cli.pattern, "^id=(\\w+)");
        assert_eq!(cli.file, Some(PathBuf::from("/etc/os-release")));
    }

    #[test]
    fn test_cli_requires_pattern() {
        assert!(Cli::try_parse_from(["regrep"]).is_err());
    }

    #[test]
    fn test_cli_rejects_extra_arguments() {
        assert!(Cli::try_parse_from(["regrep", "a", "b", "c"]).is_err());
    }
}
