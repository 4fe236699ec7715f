use std::fmt::{self, Write as _};

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::loader::DocumentKind;
use crate::session::{ChatTurn, DocumentSummary, Notice, NoticeLevel};

/// Number of URL inputs offered for the Link document type
pub const URL_FIELDS: usize = 2;

const EXAMPLE_QUESTIONS: [&str; 5] = [
    "What is the main topic of this document?",
    "Can you summarize the key points?",
    "What are the important dates mentioned?",
    "Who are the main people discussed?",
    "What conclusions can be drawn?",
];

const STYLE: &str = r#"
body { margin: 0; font-family: system-ui, sans-serif; background: #ffffff; color: #1e1e1e; display: flex; min-height: 100vh; }
aside { width: 320px; background: #1e1e1e; color: #ffffff; padding: 2rem 1rem; box-sizing: border-box; }
aside label { display: block; margin-top: 1rem; font-size: 0.9rem; }
aside input, aside select, aside textarea { width: 100%; box-sizing: border-box; margin-top: 0.25rem; }
main { flex: 1; padding: 2rem; }
.caption { color: #808080; font-size: 0.9rem; }
.status { margin-top: 1.5rem; padding: 0.5rem; border-radius: 4px; }
.notice-success, .status-ready { background: #d4edda; color: #155724; }
.notice-error { background: #f8d7da; color: #721c24; }
.status-empty { background: #d1ecf1; color: #0c5460; }
.notice { padding: 0.75rem; border-radius: 4px; margin-bottom: 1rem; }
.chat { background: #000000; padding: 1rem; border-radius: 8px; overflow-y: auto; }
.user-message { background: #2c2c2c; color: #ffffff; padding: 1rem; border-radius: 15px 15px 5px 15px; margin: 1rem 0 1rem auto; max-width: 80%; white-space: pre-wrap; }
.assistant-message { background: #ffff00; color: #000000; padding: 1rem; border-radius: 15px 15px 15px 5px; margin: 1rem auto 1rem 0; max-width: 80%; white-space: pre-wrap; }
.ask { display: flex; gap: 1rem; margin-top: 1rem; }
.ask input { flex: 1; padding: 0.75rem 1.5rem; font-size: 1rem; }
button { background: #4caf50; color: #ffffff; border: none; border-radius: 20px; padding: 0 1.5rem; height: 45px; font-weight: 600; cursor: pointer; }
fieldset { border: none; padding: 0; margin: 0; }
"#;

const SCRIPT: &str = r#"
function showInputs() {
  var kind = document.getElementById('kind').value;
  document.querySelectorAll('fieldset[data-kinds]').forEach(function (set) {
    set.hidden = set.dataset.kinds.split(' ').indexOf(kind) < 0;
  });
  var file = document.getElementById('file');
  file.accept = '.' + kind.toLowerCase();
}
document.getElementById('kind').addEventListener('change', showInputs);
showInputs();
"#;

/// Everything the page needs to render
#[derive(Debug, Clone, Copy)]
pub struct PageView<'a> {
    pub llm_model: &'a str,
    pub document: Option<&'a DocumentSummary>,
    pub transcript: &'a [ChatTurn],
    pub notice: Option<&'a Notice>,
}

/// Render the single application page
#[inline]
pub fn render_page(view: &PageView<'_>) -> String {
    let mut html = String::with_capacity(8 * 1024);
    // Writing into a String cannot fail
    let _ = write_page(&mut html, view);
    html
}

fn write_page(html: &mut String, view: &PageView<'_>) -> fmt::Result {
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Neuron Archive</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");

    write_sidebar(html, view)?;
    write_main(html, view)?;

    html.push_str("<script>");
    html.push_str(SCRIPT);
    html.push_str("</script>\n</body>\n</html>\n");
    Ok(())
}

fn write_sidebar(html: &mut String, view: &PageView<'_>) -> fmt::Result {
    html.push_str("<aside>\n<h2>📄 Upload your doc here</h2>\n");
    writeln!(
        html,
        "<p class=\"caption\">Powered by Groq &amp; {}</p>",
        encode_text(view.llm_model)
    )?;

    html.push_str(
        "<form method=\"post\" action=\"/process\" enctype=\"multipart/form-data\">\n\
         <label for=\"kind\">Document Type</label>\n<select id=\"kind\" name=\"kind\">\n",
    );
    let selected = view.document.map_or(DocumentKind::Text, |d| d.kind);
    for kind in DocumentKind::ALL {
        let attr = if kind == selected { " selected" } else { "" };
        writeln!(
            html,
            "<option value=\"{label}\"{attr}>{label}</option>",
            label = kind.label()
        )?;
    }
    html.push_str("</select>\n");

    html.push_str(
        "<fieldset data-kinds=\"Text\">\n<label for=\"text\">Document Text</label>\n\
         <textarea id=\"text\" name=\"text\" rows=\"10\" placeholder=\"Paste or type your content here...\"></textarea>\n\
         </fieldset>\n",
    );

    let file_kinds: Vec<&str> = DocumentKind::ALL
        .into_iter()
        .filter(|kind| kind.is_file())
        .map(DocumentKind::label)
        .collect();
    writeln!(
        html,
        "<fieldset data-kinds=\"{}\">\n<label for=\"file\">Upload file</label>\n\
         <input id=\"file\" type=\"file\" name=\"file\">\n</fieldset>",
        file_kinds.join(" ")
    )?;

    html.push_str("<fieldset data-kinds=\"Link\">\n");
    for i in 1..=URL_FIELDS {
        writeln!(
            html,
            "<label for=\"url{i}\">URL {i}</label>\n\
             <input id=\"url{i}\" type=\"url\" name=\"url\" placeholder=\"https://example.com\">"
        )?;
    }
    html.push_str("</fieldset>\n");

    html.push_str("<p><button type=\"submit\">Process Document</button></p>\n</form>\n");

    if let Some(notice) = view.notice {
        let (class, icon) = match notice.level {
            NoticeLevel::Success => ("notice-success", "✅"),
            NoticeLevel::Error => ("notice-error", "❌"),
        };
        writeln!(
            html,
            "<div class=\"notice {}\" role=\"status\">{} {}</div>",
            class,
            icon,
            encode_text(&notice.message)
        )?;
    }

    match view.document {
        Some(document) => writeln!(
            html,
            "<div class=\"status status-ready\">📚 Document ready for Q&amp;A \
             <span class=\"caption\">({}, {} chunks)</span></div>",
            document.kind, document.chunks
        )?,
        None => html.push_str("<div class=\"status status-empty\">📝 No document loaded</div>\n"),
    }

    html.push_str("</aside>\n");
    Ok(())
}

fn write_main(html: &mut String, view: &PageView<'_>) -> fmt::Result {
    html.push_str(
        "<main>\n<h1>📚 Document Q&amp;A Assistant</h1>\n\
         <p class=\"caption\">Ask questions about your uploaded documents</p>\n",
    );

    if !view.transcript.is_empty() {
        html.push_str("<div class=\"chat\">\n");
        for turn in view.transcript {
            writeln!(
                html,
                "<div class=\"user-message\" title=\"{}\">{}</div>\n<div class=\"assistant-message\">{}</div>",
                encode_double_quoted_attribute(&turn.asked_at.to_rfc3339()),
                encode_text(&turn.question),
                encode_text(&turn.answer)
            )?;
        }
        html.push_str("</div>\n");
    }

    if view.document.is_some() {
        html.push_str(
            "<form class=\"ask\" method=\"post\" action=\"/ask\">\n\
             <input name=\"question\" aria-label=\"Ask a question\" placeholder=\"Ask a question about your document...\" autocomplete=\"off\" autofocus>\n\
             <button type=\"submit\">Send</button>\n</form>\n",
        );
    } else {
        html.push_str(
            "<div class=\"status status-empty\">👈 Please upload and process a document to start chatting</div>\n\
             <h3>💡 Example Questions:</h3>\n<ul>\n",
        );
        for question in EXAMPLE_QUESTIONS {
            writeln!(html, "<li>{}</li>", question)?;
        }
        html.push_str("</ul>\n");
    }

    html.push_str("</main>\n");
    Ok(())
}
