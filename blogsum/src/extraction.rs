//! Article extraction from arbitrary HTML.
//!
//! Content is located by an ordered fallback chain:
//! 1. candidate containers from `content_selectors`, first one whose text is long enough wins
//! 2. every sufficiently long `<p>` on the page, joined
//! 3. the whole `<body>` with page chrome ignored
//!
//! The selector lists and length thresholds come from `[extraction]` in the config,
//! falling back to the defaults below.

use common::ExtractionConfig;
use scraper::{ElementRef, Html, Node, Selector};
use std::iter;
use tracing::{debug, info};

use crate::errors::ExtractionError;

pub const UNTITLED: &str = "Untitled Article";
pub const TRUNCATION_MARKER: &str = "...";

pub const DEFAULT_MIN_TIER_LENGTH: usize = 200;
pub const DEFAULT_MIN_CONTENT_LENGTH: usize = 100;
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 10_000;
pub const DEFAULT_MIN_PARAGRAPH_LENGTH: usize = 50;

/// Candidate containers, highest priority first.
pub const DEFAULT_CONTENT_SELECTORS: &[&str] = &[
    // semantic article containers
    "article",
    "[role=\"article\"]",
    "main article",
    "[itemprop=\"articleBody\"]",
    "[role=\"main\"]",
    "main",
    // CMS / platform class names
    ".post-content",
    ".entry-content",
    ".article-content",
    ".article-body",
    ".post-body",
    ".blog-post",
    ".story-body",
    ".markdown-body",
    ".post",
    ".entry",
    // generic layout containers
    ".content",
    "#content",
    ".main-content",
    "#main",
    // last resort full-page containers
    "#page",
    "#wrapper",
    ".wrapper",
    ".container",
];

/// Nodes that never hold article text.
pub const DEFAULT_NOISE_SELECTORS: &[&str] = &[
    "script",
    "style",
    "noscript",
    "iframe",
    "form",
    "nav",
    "header",
    "footer",
    "aside",
    ".sidebar",
    "#sidebar",
    ".navigation",
    ".menu",
    ".ad",
    ".ads",
    ".advert",
    ".advertisement",
    "[class*=\"advertisement\"]",
    ".comments",
    "#comments",
    ".comment",
    ".social",
    ".social-share",
    ".share",
    ".share-buttons",
    ".related",
    ".related-posts",
];

/// Page chrome ignored by the full-page fallback.
pub const DEFAULT_CHROME_SELECTORS: &[&str] = &[
    "script",
    "style",
    "noscript",
    "nav",
    "header",
    "footer",
    "aside",
    ".sidebar",
    "#sidebar",
];

/// Elements that break text flow; their text is separated from surrounding text.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main", "nav",
    "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub title: String,
    pub content: String,
    pub source_url: String,
}

/// Which rung of the fallback ladder produced the content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    Container(String),
    Paragraphs,
    FullPage,
}

struct Selectors {
    h1: Selector,
    title: Selector,
    og_title: Selector,
    twitter_title: Selector,
    paragraph: Selector,
    body: Selector,
}

pub struct Extractor {
    content: Vec<(String, Selector)>,
    noise: Vec<Selector>,
    chrome: Vec<Selector>,
    fixed: Selectors,
    min_tier_length: usize,
    min_content_length: usize,
    max_content_length: usize,
    min_paragraph_length: usize,
}

fn parse_selector(raw: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(raw).map_err(|_| ExtractionError::InvalidSelector(raw.to_string()))
}

fn parse_list(configured: Option<&Vec<String>>, defaults: &[&str]) -> Result<Vec<(String, Selector)>, ExtractionError> {
    let raw: Vec<String> = match configured {
        Some(list) => list.clone(),
        None => defaults.iter().map(|s| s.to_string()).collect(),
    };
    raw.into_iter()
        .map(|s| parse_selector(&s).map(|sel| (s, sel)))
        .collect()
}

/// Collapse every whitespace run (including newlines) to one space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Append the text under `element` to `out`, skipping subtrees matched by `skip`.
fn collect_text(element: ElementRef<'_>, skip: &[Selector], out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                let Some(child_el) = ElementRef::wrap(child) else { continue };
                if skip.iter().any(|s| s.matches(&child_el)) {
                    continue;
                }
                let block = BLOCK_ELEMENTS.contains(&child_el.value().name());
                if block {
                    out.push(' ');
                }
                collect_text(child_el, skip, out);
                if block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

fn element_text(element: ElementRef<'_>, skip: &[Selector]) -> String {
    let mut out = String::new();
    collect_text(element, skip, &mut out);
    collapse_whitespace(&out)
}

impl Extractor {
    /// Build an extractor from configuration; omitted fields use the defaults.
    pub fn new(config: &ExtractionConfig) -> Result<Self, ExtractionError> {
        let content = parse_list(config.content_selectors.as_ref(), DEFAULT_CONTENT_SELECTORS)?;
        let noise = parse_list(config.noise_selectors.as_ref(), DEFAULT_NOISE_SELECTORS)?
            .into_iter()
            .map(|(_, s)| s)
            .collect();
        let chrome = parse_list(config.chrome_selectors.as_ref(), DEFAULT_CHROME_SELECTORS)?
            .into_iter()
            .map(|(_, s)| s)
            .collect();

        let fixed = Selectors {
            h1: parse_selector("h1")?,
            title: parse_selector("title")?,
            og_title: parse_selector("meta[property=\"og:title\"]")?,
            twitter_title: parse_selector("meta[name=\"twitter:title\"]")?,
            paragraph: parse_selector("p")?,
            body: parse_selector("body")?,
        };

        Ok(Self {
            content,
            noise,
            chrome,
            fixed,
            min_tier_length: config.min_tier_length.unwrap_or(DEFAULT_MIN_TIER_LENGTH),
            min_content_length: config.min_content_length.unwrap_or(DEFAULT_MIN_CONTENT_LENGTH),
            max_content_length: config.max_content_length.unwrap_or(DEFAULT_MAX_CONTENT_LENGTH),
            min_paragraph_length: config
                .min_paragraph_length
                .unwrap_or(DEFAULT_MIN_PARAGRAPH_LENGTH),
        })
    }

    /// Extract the article title and body text from `html`.
    pub fn extract(&self, html: &str, url: &str) -> Result<ExtractionResult, ExtractionError> {
        let document = Html::parse_document(html);
        let title = self.resolve_title(&document);
        let (strategy, raw) = self.resolve_content(&document);

        let content = collapse_whitespace(&raw);
        let length = char_len(&content);
        if length < self.min_content_length {
            info!(url, length, "extraction: insufficient content");
            return Err(ExtractionError::InsufficientContent {
                length,
                required: self.min_content_length,
            });
        }

        let content = if length > self.max_content_length {
            debug!(url, length, max = self.max_content_length, "extraction: truncating content");
            let mut truncated: String = content.chars().take(self.max_content_length).collect();
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        } else {
            content
        };

        info!(url, ?strategy, title = %title, chars = char_len(&content), "extraction: content found");
        Ok(ExtractionResult {
            title,
            content,
            source_url: url.to_string(),
        })
    }

    /// First non-empty of: `<h1>`, `<title>`, og:title, twitter:title.
    fn resolve_title(&self, document: &Html) -> String {
        let first_text = |selector: &Selector| {
            document
                .select(selector)
                .next()
                .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        };
        let meta_content = |selector: &Selector| {
            document
                .select(selector)
                .next()
                .and_then(|el| el.value().attr("content"))
                .map(collapse_whitespace)
        };

        first_text(&self.fixed.h1)
            .filter(|t| !t.is_empty())
            .or_else(|| first_text(&self.fixed.title).filter(|t| !t.is_empty()))
            .or_else(|| meta_content(&self.fixed.og_title).filter(|t| !t.is_empty()))
            .or_else(|| meta_content(&self.fixed.twitter_title).filter(|t| !t.is_empty()))
            .unwrap_or_else(|| UNTITLED.to_string())
    }

    /// Walk the fallback ladder lazily and stop at the first rung with enough text.
    fn resolve_content(&self, document: &Html) -> (Strategy, String) {
        let containers = self.content.iter().filter_map(|(name, selector)| {
            let element = document.select(selector).next()?;
            let text = element_text(element, &self.noise);
            debug!(selector = %name, chars = char_len(&text), "extraction: candidate container");
            Some((Strategy::Container(name.clone()), text))
        });
        let paragraphs = iter::once_with(|| (Strategy::Paragraphs, self.paragraph_text(document)));

        containers
            .chain(paragraphs)
            .find(|(_, text)| char_len(text) > self.min_tier_length)
            .unwrap_or_else(|| (Strategy::FullPage, self.full_page_text(document)))
    }

    fn paragraph_text(&self, document: &Html) -> String {
        document
            .select(&self.fixed.paragraph)
            .map(|p| element_text(p, &self.noise))
            .filter(|text| char_len(text) > self.min_paragraph_length)
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn full_page_text(&self, document: &Html) -> String {
        let root = document
            .select(&self.fixed.body)
            .next()
            .unwrap_or_else(|| document.root_element());
        element_text(root, &self.chrome)
    }
}
