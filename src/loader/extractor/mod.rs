
use scraper::{ElementRef, Html, Node, Selector};
use tracing::debug;

const UNTITLED: &str = "Untitled Document";

/// Elements whose text never belongs in the extracted document
const NON_CONTENT_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "iframe", "svg", "button", "select", "textarea",
];

/// Page chrome, dropped unless it is all the page has
const CHROME_TAGS: &[&str] = &["nav", "header", "footer", "aside"];

/// Elements that start a new line in the extracted text
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "section", "article", "main", "br", "hr", "li", "ul", "ol", "dl", "dt", "dd",
    "tr", "table", "thead", "tbody", "pre", "blockquote", "h1", "h2", "h3", "h4", "h5", "h6",
    "figcaption", "caption",
];

/// Readable text pulled out of an HTML page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub title: String,
    pub text: String,
}

/// Extract the title and visible text of an HTML document
#[inline]
pub fn extract_page(html: &str) -> ExtractedPage {
    let document = Html::parse_document(html);
    let title = extract_title(&document);

    let cleaned = clean_content(&document);
    let mut text = visible_text(&cleaned, true);
    if text.is_empty() {
        debug!("No text outside page chrome, keeping header and sidebar content");
        text = visible_text(&cleaned, false);
    }

    debug!(
        "Extracted page: title='{}', {} chars of text",
        title,
        text.len()
    );

    ExtractedPage { title, text }
}

fn extract_title(document: &Html) -> String {
    let title_selector = Selector::parse("title").expect("valid selector");
    let heading_selector = Selector::parse("h1").expect("valid selector");

    [&title_selector, &heading_selector]
        .into_iter()
        .filter_map(|selector| document.select(selector).next())
        .map(|element| normalize_whitespace(&element.text().collect::<String>()))
        .find(|title| !title.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// Narrow the document to its main content area (or the body) with page
/// furniture such as ads and sidebars removed
fn clean_content(document: &Html) -> Html {
    let unwanted_selector = Selector::parse(
        ".advertisement, .ads, .sidebar, .menu, .navigation, .cookie-banner, [hidden], [aria-hidden=\"true\"]",
    )
    .expect("valid selector");

    let main_content_selector =
        Selector::parse("main, article, .content, .main-content, #content, #main")
            .expect("valid selector");

    let body_selector = Selector::parse("body").expect("valid selector");

    let region = document
        .select(&main_content_selector)
        .next()
        .or_else(|| document.select(&body_selector).next());

    let mut cleaned_doc = match region {
        Some(element) => Html::parse_fragment(&element.html()),
        None => document.clone(),
    };

    remove_unwanted_elements(&mut cleaned_doc, &unwanted_selector);
    cleaned_doc
}

fn remove_unwanted_elements(document: &mut Html, unwanted_selector: &Selector) {
    // Collect ids first; detaching while selecting would alias the tree
    let unwanted_node_ids: Vec<_> = document
        .select(unwanted_selector)
        .map(|element| element.id())
        .collect();

    for node_id in unwanted_node_ids {
        if let Some(mut node) = document.tree.get_mut(node_id) {
            node.detach();
        }
    }
}

fn visible_text(document: &Html, skip_chrome: bool) -> String {
    let mut raw = String::new();
    collect_text(document.root_element(), skip_chrome, &mut raw);
    normalize_whitespace(&raw)
}

fn collect_text(element: ElementRef<'_>, skip_chrome: bool, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(tag) => {
                let name = tag.name();
                if NON_CONTENT_TAGS.contains(&name)
                    || (skip_chrome && CHROME_TAGS.contains(&name))
                {
                    continue;
                }
                let Some(child_element) = ElementRef::wrap(child) else {
                    continue;
                };

                let block = BLOCK_TAGS.contains(&name);
                if block {
                    out.push('\n');
                }
                collect_text(child_element, skip_chrome, out);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

/// Collapse runs of whitespace inside each line and drop empty lines
#[inline]
pub fn normalize_whitespace(raw: &str) -> String {
    raw.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
