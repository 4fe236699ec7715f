use anyhow::{Context, Result, anyhow, bail};
use console::style;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::{Config, ConfigError};
use crate::embeddings::OllamaClient;
use crate::loader::{DocumentKind, DocumentPayload};
use crate::session::{ChatTurn, Session};
use crate::store::VectorRecord;
use crate::web::{self, AppState};

const QUIT_COMMANDS: [&str; 3] = ["/quit", "/exit", "/q"];

/// Where the document to index comes from, as given on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentArgs {
    pub kind: Option<DocumentKind>,
    pub text: Option<String>,
    pub file: Option<PathBuf>,
    pub urls: Vec<String>,
}

impl DocumentArgs {
    /// Turn the flags into a document kind and payload. Exactly one source
    /// must be given; a file's kind comes from `--type` or its extension.
    #[inline]
    pub fn resolve(self) -> Result<(DocumentKind, DocumentPayload)> {
        let sources = usize::from(self.text.is_some())
            + usize::from(self.file.is_some())
            + usize::from(!self.urls.is_empty());

        if sources == 0 {
            bail!("Provide a document with --text, --file or --url");
        }
        if sources > 1 {
            bail!("Only one of --text, --file or --url may be given");
        }

        if let Some(text) = self.text {
            let kind = self.kind.unwrap_or(DocumentKind::Text);
            return Ok((kind, DocumentPayload::Text(text)));
        }

        if let Some(path) = self.file {
            let kind = match self.kind {
                Some(kind) => kind,
                None => kind_from_extension(&path)?,
            };
            let bytes = std::fs::read(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            return Ok((kind, DocumentPayload::Bytes(bytes)));
        }

        let kind = self.kind.unwrap_or(DocumentKind::Link);
        Ok((kind, DocumentPayload::Urls(self.urls)))
    }
}

fn kind_from_extension(path: &Path) -> Result<DocumentKind> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| anyhow!("Cannot tell the type of {}; pass --type", path.display()))?;

    DocumentKind::ALL
        .into_iter()
        .find(|kind| {
            kind.file_extension()
                .is_some_and(|known| known.eq_ignore_ascii_case(extension))
        })
        .ok_or_else(|| {
            anyhow!(
                "Unsupported file extension '.{}' (expected .pdf, .docx or .txt)",
                extension
            )
        })
}

/// Load configuration and fail early when the LLM API key is missing
#[inline]
pub fn load_config() -> Result<Config> {
    let config = Config::load_default().context("Failed to load configuration")?;

    if let Err(e @ ConfigError::MissingApiKey(_)) = config.llm.api_key() {
        eprintln!("{}", style(format!("⚠️  {}", e)).red());
        return Err(e.into());
    }

    Ok(config)
}

/// Warn, without failing, when the embedding server is not ready
fn check_embedder(config: &Config) {
    match OllamaClient::new(&config.ollama).and_then(|client| client.health_check()) {
        Ok(()) => info!(
            "Ollama connected at {}:{} with model {}",
            config.ollama.host, config.ollama.port, config.ollama.model
        ),
        Err(e) => {
            warn!("Ollama is not ready: {:#}", e);
            eprintln!(
                "{}",
                style(format!(
                    "Warning: cannot reach Ollama at {}:{} with model {}. Processing documents will fail.",
                    config.ollama.host, config.ollama.port, config.ollama.model
                ))
                .yellow()
            );
            eprintln!("Use 'neuron-archive config' to update connection settings.");
        }
    }
}

fn spinner(message: &str) -> ProgressBar {
    let bar = if console::user_attended_stderr() {
        ProgressBar::new_spinner().with_style(
            ProgressStyle::with_template("{spinner} {msg}").expect("style template is valid"),
        )
    } else {
        ProgressBar::hidden()
    };
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn open_session(config: &Config, document: DocumentArgs) -> Result<Session> {
    let (kind, payload) = document.resolve()?;

    check_embedder(config);
    let mut session = Session::from_config(config)?;

    let bar = spinner("Processing document...");
    let result = session.process(kind, payload).cloned();
    bar.finish_and_clear();

    let summary = result?;
    eprintln!("{}", style("✅ Document processed successfully!").green());
    eprintln!(
        "{} document, {} characters in {} chunks",
        summary.kind, summary.characters, summary.chunks
    );

    Ok(session)
}

/// Where a retrieved chunk came from: page title and URL for links
fn source_label(record: &VectorRecord) -> String {
    match (record.title.as_deref(), record.source.as_deref()) {
        (Some(title), Some(url)) => format!("\"{}\" <{}>", title, url),
        (None, Some(url)) => url.to_string(),
        _ => "document".to_string(),
    }
}

fn print_turn(turn: &ChatTurn, show_sources: bool) {
    println!();
    println!("{}", style(&turn.answer).yellow());

    if show_sources {
        println!();
        for (rank, source) in turn.sources.iter().enumerate() {
            println!(
                "{}",
                style(format!(
                    "[{}] chunk {} of {} (distance {:.4})",
                    rank + 1,
                    source.record.chunk_index,
                    source_label(&source.record),
                    source.distance
                ))
                .dim()
            );
        }
    }
    println!();
}

/// Index a document and answer questions until an empty line or /quit
#[inline]
pub fn chat(document: DocumentArgs, show_sources: bool) -> Result<()> {
    let config = load_config()?;
    let mut session = open_session(&config, document)?;

    eprintln!(
        "{}",
        style("📚 Document ready for Q&A. Ask a question, or press Enter on an empty line to quit.")
            .cyan()
    );

    loop {
        let question: String = Input::new()
            .with_prompt("Question")
            .allow_empty(true)
            .interact_text()?;

        let question = question.trim();
        if question.is_empty() || QUIT_COMMANDS.contains(&question) {
            break;
        }

        let bar = spinner("🤖 Generating answer...");
        let result = session.ask(question).cloned();
        bar.finish_and_clear();

        match result {
            Ok(turn) => print_turn(&turn, show_sources),
            Err(e) => {
                error!("{}", e);
                eprintln!("{}", style(format!("❌ {}", e)).red());
            }
        }
    }

    info!(
        "Chat session ended after {} questions",
        session.transcript().len()
    );
    Ok(())
}

/// Index a document, answer one question and exit
#[inline]
pub fn ask(document: DocumentArgs, question: &str, show_sources: bool) -> Result<()> {
    let config = load_config()?;
    let mut session = open_session(&config, document)?;

    let bar = spinner("🤖 Generating answer...");
    let result = session.ask(question).cloned();
    bar.finish_and_clear();

    print_turn(&result?, show_sources);
    Ok(())
}

/// Start the web interface
#[inline]
pub async fn serve(host: &str, port: u16) -> Result<()> {
    let config = load_config()?;
    check_embedder(&config);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", host, port))?;

    let session = Session::from_config(&config)?;
    info!("Starting web interface with model {}", config.llm.model);

    web::serve(AppState::new(session, &config.llm.model), addr).await
}
