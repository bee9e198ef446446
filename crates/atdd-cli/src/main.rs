mod clipboard;
mod cmd;
mod output;
mod picker;
mod root;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "atdd-prompt",
    about = "Build ATDD test-authoring prompts and copy them to the clipboard",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from project-manifest.yaml or .git/)
    #[arg(long, global = true, env = "ATDD_ROOT")]
    root: Option<PathBuf>,

    /// Print the prompt to stdout instead of copying it to the clipboard
    #[arg(long, global = true)]
    print: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy the convention-scanner prompt and create project-test-lessons.md
    Init,

    /// Build the ATDD scenario prompt for a source file
    Atdd {
        /// Source file (omit to pick interactively)
        source: Option<PathBuf>,
    },

    /// Build the test-plan prompt from an existing ATDD scenario
    Plan {
        /// Source file (omit to pick interactively)
        source: Option<PathBuf>,
    },

    /// Build the test-code prompt from an existing test plan
    Gen {
        /// Source file (omit to pick interactively)
        source: Option<PathBuf>,

        /// Test type: ui or unit (default: ui, or inferred when picked interactively)
        #[arg(long = "type", short = 't')]
        test_type: Option<String>,
    },

    /// Run the test file and build a failure-analysis prompt if it fails
    Learn {
        /// Source file (omit to pick interactively)
        source: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let delivery = cmd::Delivery::new(cli.print);

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root, delivery),
        Commands::Atdd { source } => cmd::atdd::run(&root, source.as_deref(), delivery),
        Commands::Plan { source } => cmd::plan::run(&root, source.as_deref(), delivery),
        Commands::Gen { source, test_type } => {
            cmd::gen::run(&root, source.as_deref(), test_type.as_deref(), delivery)
        }
        Commands::Learn { source } => cmd::learn::run(&root, source.as_deref(), delivery),
    };

    if let Err(e) = result {
        output::report_error(&e);
        std::process::exit(1);
    }
}
