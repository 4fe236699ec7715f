// Web front end
// A single page form: upload or paste a document, then ask questions about it.
// Every action posts, mutates the shared session and redirects back to `/`.

mod render;


use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::extract::{DefaultBodyLimit, Form, Multipart, State};
use axum::response::{Html, IntoResponse, Json, Redirect};
use axum::routing::{get, post};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::loader::{DocumentKind, DocumentPayload};
use crate::session::{Notice, Session};

pub use render::{PageView, render_page};

/// Uploads larger than this are rejected before they reach the loader
const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

pub type SharedSession = Arc<Mutex<Session>>;

#[derive(Clone)]
pub struct AppState {
    session: SharedSession,
    llm_model: Arc<str>,
}

impl AppState {
    #[inline]
    pub fn new(session: Session, llm_model: &str) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            llm_model: Arc::from(llm_model),
        }
    }

    #[inline]
    pub fn session(&self) -> SharedSession {
        Arc::clone(&self.session)
    }
}

/// Build the application router
#[inline]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/process", post(process_document))
        .route("/ask", post(ask_question))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until the process is stopped
#[inline]
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    let local_addr = listener.local_addr()?;

    info!("Neuron Archive listening on http://{}", local_addr);
    println!("Neuron Archive is running at http://{}", local_addr);

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;

    Ok(())
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let mut session = state.session.lock().await;
    let notice = session.take_notice();

    let view = PageView {
        llm_model: &state.llm_model,
        document: session.document(),
        transcript: session.transcript(),
        notice: notice.as_ref(),
    };

    Html(render_page(&view))
}

/// Fields of the document form, as submitted
#[derive(Debug, Default)]
struct DocumentForm {
    kind: Option<String>,
    text: Option<String>,
    file: Option<Vec<u8>>,
    urls: Vec<String>,
}

impl DocumentForm {
    async fn read(mut multipart: Multipart) -> Result<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .context("Malformed form submission")?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "kind" => form.kind = Some(field.text().await?),
                "text" => form.text = Some(field.text().await?),
                "url" => form.urls.push(field.text().await?),
                "file" => {
                    let bytes = field.bytes().await.context("Failed to read upload")?;
                    form.file = Some(bytes.to_vec());
                }
                other => warn!("Ignoring unexpected form field '{}'", other),
            }
        }

        Ok(form)
    }

    fn into_request(self) -> crate::Result<(DocumentKind, DocumentPayload)> {
        let kind: DocumentKind = self.kind.unwrap_or_default().parse()?;

        let payload = match kind {
            DocumentKind::Text => DocumentPayload::Text(self.text.unwrap_or_default()),
            DocumentKind::Link => DocumentPayload::Urls(self.urls),
            DocumentKind::Pdf | DocumentKind::Docx | DocumentKind::Txt => {
                DocumentPayload::Bytes(self.file.unwrap_or_default())
            }
        };

        Ok((kind, payload))
    }
}

async fn process_document(State(state): State<AppState>, multipart: Multipart) -> Redirect {
    let request = DocumentForm::read(multipart)
        .await
        .map_err(crate::ArchiveError::from)
        .and_then(DocumentForm::into_request);

    let (kind, payload) = match request {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected document form: {}", e);
            state
                .session
                .lock()
                .await
                .set_notice(Notice::error(format!("Error processing document: {}", e)));
            return Redirect::to("/");
        }
    };

    let session = state.session();
    let outcome = tokio::task::spawn_blocking(move || {
        // Errors are recorded on the session as a notice
        let _ = session.blocking_lock().process(kind, payload);
    })
    .await;

    if let Err(e) = outcome {
        error!("Document processing task failed: {}", e);
    }

    Redirect::to("/")
}

#[derive(Debug, Deserialize)]
struct AskForm {
    question: String,
}

async fn ask_question(State(state): State<AppState>, Form(form): Form<AskForm>) -> Redirect {
    let session = state.session();
    let outcome = tokio::task::spawn_blocking(move || {
        let _ = session.blocking_lock().ask(&form.question);
    })
    .await;

    if let Err(e) = outcome {
        error!("Question task failed: {}", e);
    }

    Redirect::to("/")
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.lock().await;

    Json(json!({
        "status": "ok",
        "document_loaded": session.has_document(),
        "turns": session.transcript().len(),
        "model": &*state.llm_model,
    }))
}
