use clap::{Args, Parser, Subcommand};
use neuron_archive::Result;
use neuron_archive::commands::{self, DocumentArgs};
use neuron_archive::config::{load_dotenv, run_interactive_config, show_config};
use neuron_archive::loader::DocumentKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "neuron-archive")]
#[command(about = "Ask questions about your documents using local embeddings and a hosted LLM")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure the embedding server, LLM and retrieval settings
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
    /// Load a document and chat about it in the terminal
    Chat {
        #[command(flatten)]
        document: DocumentFlags,
        /// Print the retrieved chunks after each answer
        #[arg(long)]
        sources: bool,
    },
    /// Load a document and answer a single question
    Ask {
        /// The question to answer
        question: String,
        #[command(flatten)]
        document: DocumentFlags,
        /// Print the retrieved chunks after the answer
        #[arg(long)]
        sources: bool,
    },
    /// Start the web interface
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to listen on
        #[arg(long, short, default_value_t = 8501)]
        port: u16,
    },
}

#[derive(Args)]
struct DocumentFlags {
    /// Document type: Text, PDF, DOCX, TXT or Link. Inferred when omitted.
    #[arg(long = "type", value_name = "TYPE")]
    kind: Option<DocumentKind>,
    /// Inline document text
    #[arg(long)]
    text: Option<String>,
    /// Path to a PDF, DOCX or TXT file
    #[arg(long)]
    file: Option<PathBuf>,
    /// Web page to load; repeat for several pages
    #[arg(long = "url", value_name = "URL")]
    urls: Vec<String>,
}

impl From<DocumentFlags> for DocumentArgs {
    fn from(flags: DocumentFlags) -> Self {
        Self {
            kind: flags.kind,
            text: flags.text,
            file: flags.file,
            urls: flags.urls,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    load_dotenv();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { show } => {
            if show {
                show_config()?;
            } else {
                run_interactive_config()?;
            }
        }
        Commands::Chat { document, sources } => {
            tokio::task::spawn_blocking(move || commands::chat(document.into(), sources))
                .await
                .map_err(anyhow::Error::from)??;
        }
        Commands::Ask {
            question,
            document,
            sources,
        } => {
            tokio::task::spawn_blocking(move || {
                commands::ask(document.into(), &question, sources)
            })
            .await
            .map_err(anyhow::Error::from)??;
        }
        Commands::Serve { host, port } => {
            commands::serve(&host, port).await?;
        }
    }

    Ok(())
}
