//! exampro CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "exampro", version, about = "Locked-down exam runner and scorer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config and example exam
    Init,

    /// Check exam TOML files for authoring mistakes
    Validate {
        /// Path to exam file or directory
        #[arg(long)]
        exam: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Add an exam file to the store (or replace an unlocked exam)
    Publish {
        /// Path to exam TOML file
        #[arg(long)]
        exam: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List published exams
    List {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Take an exam
    Take {
        /// Exam id or title (leave out to join by token alone)
        #[arg(long, conflicts_with = "link")]
        exam: Option<String>,

        /// Deep link such as "#/exam/<id>"
        #[arg(long)]
        link: Option<String>,

        /// Access token from the teacher
        #[arg(long)]
        token: String,

        /// Student name
        #[arg(long)]
        name: String,

        /// Student id (generated when omitted)
        #[arg(long)]
        student_id: Option<String>,

        /// Replay events from a JSON file instead of reading the terminal
        #[arg(long)]
        script: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show recorded results
    Results {
        /// Limit to one exam id
        #[arg(long)]
        exam: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Write a results report
    Report {
        /// Output format: html, json
        #[arg(long, default_value = "html")]
        format: String,

        /// Output file
        #[arg(long)]
        output: PathBuf,

        /// Limit to one exam id
        #[arg(long)]
        exam: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Delete an exam (its results are kept)
    Delete {
        /// Exam id
        #[arg(long)]
        exam: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("exampro=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { exam, config } => commands::validate::execute(exam, config),
        Commands::Publish { exam, config } => commands::publish::execute(exam, config),
        Commands::List { config } => commands::list::execute(config),
        Commands::Take {
            exam,
            link,
            token,
            name,
            student_id,
            script,
            config,
        } => {
            commands::take::execute(commands::take::TakeArgs {
                exam,
                link,
                token,
                name,
                student_id,
                script,
                config,
            })
            .await
        }
        Commands::Results { exam, config } => commands::results::execute(exam, config),
        Commands::Report {
            format,
            output,
            exam,
            config,
        } => commands::report::execute(format, output, exam, config),
        Commands::Delete { exam, config } => commands::delete::execute(exam, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
