use anyhow::Result;
use clap::Parser;
use pkghelper::commands::{Options, run};
use pkghelper::manager::ManagerRegistry;
use pkghelper::runtime::{RealRuntime, Runtime};
use std::path::PathBuf;
use std::sync::Arc;

/// pkghelper - Package Dependency Helper
///
/// Reconciles the apt and pip packages requested in one or more INI
/// configuration files against what is installed.
///
/// Examples:
///   pkghelper -l packages.conf        # Show packages that are not installed
///   pkghelper -i -d packages.conf     # Print the install commands only
#[derive(Parser, Debug)]
#[command(author, version = env!("PKGHELPER_VERSION"), about)]
struct Cli {
    /// List selected packages on stdout
    #[arg(short = 'l', long = "list")]
    list: bool,

    /// Verbose output
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Install selected packages
    #[arg(short = 'i', long = "install")]
    install: bool,

    /// Do not install as root
    #[arg(short = 'r', long = "noroot")]
    no_root: bool,

    /// Used with install, print commands but don't execute
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Configuration files, merged in order
    #[arg(value_name = "FILE")]
    configs: Vec<PathBuf>,
}

impl Cli {
    fn options(&self) -> Options {
        Options {
            list: self.list,
            verbose: self.verbose,
            install: self.install,
            no_root: self.no_root,
            debug: self.debug,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    println!("Package Dependency Helper v{}", env!("PKGHELPER_VERSION"));

    let runtime: Arc<dyn Runtime> = Arc::new(RealRuntime);
    let registry = ManagerRegistry::builtin();
    run(runtime, &registry, &cli.configs, &cli.options())
}
