//! dover-tutor CLI — runs the feedback server and manages submissions.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tutor_core::exercise::{is_known_tutor, TUTORS};
use tutor_core::submission::ALL_TUTORS;

mod commands;

#[derive(Parser)]
#[command(
    name = "dover-tutor",
    version,
    about = "Socratic feedback server for the Dover Forest exercise"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port (overrides config and PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Ask the configured provider for feedback on one answer
    Ask {
        /// Exercise field the answer belongs to (e.g. "partA")
        #[arg(long)]
        field_key: String,

        /// Descriptive context for the field
        #[arg(long, default_value = "")]
        context: String,

        /// The student's answer
        #[arg(long)]
        answer: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the prompt that would be sent for an answer
    Prompt {
        /// Exercise field the answer belongs to (e.g. "partA")
        #[arg(long)]
        field_key: String,

        /// Descriptive context for the field
        #[arg(long, default_value = "")]
        context: String,

        /// The student's answer
        #[arg(long)]
        answer: String,
    },

    /// Inspect and manage saved submissions
    Submissions {
        /// Submissions file (overrides config)
        #[arg(long, global = true)]
        store: Option<PathBuf>,

        /// Config file path
        #[arg(long, global = true)]
        config: Option<PathBuf>,

        #[command(subcommand)]
        action: SubmissionsAction,
    },

    /// Create a starter tutor.toml
    Init,
}

#[derive(Subcommand)]
enum SubmissionsAction {
    /// List submissions, newest first
    List {
        /// Only show one tutor's students ("All" shows everyone)
        #[arg(long, value_parser = parse_tutor_filter)]
        tutor: Option<String>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Print one submission as JSON
    Show {
        /// Submission id
        id: String,
    },

    /// Delete one submission
    Delete {
        /// Submission id
        id: String,
    },

    /// Delete every submission
    Clear {
        /// Skip the confirmation check
        #[arg(long)]
        yes: bool,
    },
}

fn parse_tutor_filter(name: &str) -> Result<String, String> {
    if name == ALL_TUTORS || is_known_tutor(name) {
        Ok(name.to_string())
    } else {
        Err(format!(
            "unknown tutor '{name}'. Expected \"{ALL_TUTORS}\" or one of: {}",
            TUTORS.join(", ")
        ))
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dover_tutor=info".parse().unwrap())
                .add_directive("tutor_server=info".parse().unwrap())
                .add_directive("tutor_core=info".parse().unwrap()),
        )
        .init();

    tutor_providers::config::load_dotenv();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve { host, port, config } => {
            commands::serve::execute(host, port, config).await
        }
        Commands::Ask {
            field_key,
            context,
            answer,
            config,
        } => commands::ask::execute(field_key, context, answer, config).await,
        Commands::Prompt {
            field_key,
            context,
            answer,
        } => commands::prompt::execute(&field_key, &context, &answer),
        Commands::Submissions {
            store,
            config,
            action,
        } => {
            let action = match action {
                SubmissionsAction::List { tutor, format } => {
                    commands::submissions::Action::List { tutor, format }
                }
                SubmissionsAction::Show { id } => commands::submissions::Action::Show { id },
                SubmissionsAction::Delete { id } => commands::submissions::Action::Delete { id },
                SubmissionsAction::Clear { yes } => commands::submissions::Action::Clear { yes },
            };
            commands::submissions::execute(store, config, action)
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
