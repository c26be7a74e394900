//! HTML to Markdown reduction
//!
//! Keeps the readable skeleton of a page (headings, paragraphs, list items,
//! code blocks and links) and drops navigation chrome and scripts.

use super::{TransformOutput, Transformer};
use crate::{Result, TransformError};
use scraper::{ElementRef, Html, Node, Selector};

/// Inputs longer than this are rejected without parsing
pub const DEFAULT_MAX_INPUT_CHARS: usize = 1_000_000;

/// Elements rendered as top-level blocks, in document order
const BLOCK_SELECTOR: &str = "h1, h2, h3, h4, h5, h6, p, li, pre";

/// Containers whose content never reaches the output
const SKIPPED_CONTAINERS: &[&str] = &["nav", "footer", "aside", "script", "style", "noscript"];

const BLOCK_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6", "p", "li", "pre"];

/// Local, credential-free transformer producing Markdown
#[derive(Debug, Clone)]
pub struct MarkdownTransformer {
    max_input_chars: usize,
}

impl Default for MarkdownTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownTransformer {
    pub fn new() -> Self {
        Self {
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }

    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars;
        self
    }

    fn render(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        let mut blocks = Vec::new();

        let Ok(block_selector) = Selector::parse(BLOCK_SELECTOR) else {
            return String::new();
        };

        let has_h1 = Selector::parse("h1")
            .map(|h1| document.select(&h1).next().is_some())
            .unwrap_or(false);

        if !has_h1 {
            if let Some(title) = Selector::parse("title")
                .ok()
                .and_then(|title| document.select(&title).next())
            {
                let title = collapse_whitespace(&title.text().collect::<String>());
                if !title.is_empty() {
                    blocks.push(format!("# {}", title));
                }
            }
        }

        for element in document.select(&block_selector) {
            if is_nested_or_hidden(&element) {
                continue;
            }

            if let Some(block) = render_block(&element) {
                blocks.push(block);
            }
        }

        blocks.join("\n\n")
    }
}

impl Transformer for MarkdownTransformer {
    fn transform(&self, content: &str) -> Result<TransformOutput> {
        let length = content.chars().count();
        if length > self.max_input_chars {
            return Err(TransformError::new(format!(
                "Input too large: {} characters exceeds the size limit of {}",
                length, self.max_input_chars
            ))
            .into());
        }

        Ok(TransformOutput::Text(self.render(content)))
    }
}

/// True if an ancestor is another block (rendered there) or a skipped container
fn is_nested_or_hidden(element: &ElementRef) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| {
            let name = ancestor.value().name();
            SKIPPED_CONTAINERS.contains(&name) || BLOCK_TAGS.contains(&name)
        })
}

fn render_block(element: &ElementRef) -> Option<String> {
    let name = element.value().name();

    if name == "pre" {
        let code = element.text().collect::<String>();
        let code = code.trim_matches('\n');
        if code.trim().is_empty() {
            return None;
        }
        return Some(format!("```\n{}\n```", code));
    }

    let mut inline = String::new();
    render_inline(element, &mut inline);
    let text = collapse_whitespace(&inline);
    if text.is_empty() {
        return None;
    }

    let rendered = match name {
        "li" => format!("- {}", text),
        heading if heading.len() == 2 && heading.starts_with('h') => {
            let level = heading[1..].parse::<usize>().unwrap_or(1);
            format!("{} {}", "#".repeat(level), text)
        }
        _ => text,
    };

    Some(rendered)
}

fn render_inline(element: &ElementRef, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                let Some(child) = ElementRef::wrap(child) else {
                    continue;
                };
                let name = child.value().name();
                if SKIPPED_CONTAINERS.contains(&name) {
                    continue;
                }

                let mut inner = String::new();
                render_inline(&child, &mut inner);
                let inner = collapse_whitespace(&inner);

                match name {
                    "a" => match child.value().attr("href") {
                        Some(href) if !inner.is_empty() => {
                            out.push_str(&format!(" [{}]({}) ", inner, href.trim()))
                        }
                        _ => out.push_str(&inner),
                    },
                    "code" if !inner.is_empty() => out.push_str(&format!("`{}`", inner)),
                    "strong" | "b" if !inner.is_empty() => {
                        out.push_str(&format!("**{}**", inner))
                    }
                    "em" | "i" if !inner.is_empty() => out.push_str(&format!("*{}*", inner)),
                    "br" => out.push(' '),
                    _ => {
                        out.push(' ');
                        out.push_str(&inner);
                        out.push(' ');
                    }
                }
            }
            _ => {}
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
