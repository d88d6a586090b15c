#![forbid(unsafe_code)]
//! Sprout Command Line Interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

use sprout::commands::{execute_new, NewOptions};

#[derive(Parser)]
#[command(name = "sprout")]
#[command(about = "Template-driven project scaffolding")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold a new project from a template tree
    New {
        /// Project name (also the default destination directory)
        name: Option<String>,

        /// Destination root (defaults to ./<name>)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Template tree to scaffold from
        #[arg(short, long, default_value = "templates/app", env = "SPROUT_TEMPLATE")]
        template: PathBuf,

        /// Short project description
        #[arg(long)]
        description: Option<String>,

        /// Package manager used for the install step
        #[arg(long, env = "SPROUT_PACKAGE_MANAGER")]
        package_manager: Option<String>,

        /// Accept every default without prompting
        #[arg(short = 'y', long)]
        yes: bool,

        /// Skip the dependency install step
        #[arg(long)]
        no_install: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::New {
            name,
            root,
            template,
            description,
            package_manager,
            yes,
            no_install,
        } => {
            let root = root
                .or_else(|| name.as_deref().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("."));

            execute_new(NewOptions {
                name,
                root,
                template,
                description,
                package_manager,
                yes,
                no_install,
            })
        }
    };

    if let Err(err) = result {
        eprintln!("{} {err:#}", style("✗").red());
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "sprout=debug" } else { "sprout=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
