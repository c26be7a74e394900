//! Plain-text URL lists, one URL per line

use crate::retry::PersistOperation;
use crate::PersistError;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static URL_IN_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("URL regex is valid"));

/// Punctuation that ends a sentence rather than a URL
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Reads the URLs listed in `path`
///
/// Each non-empty line contributes the first `http(s)://` token found in it,
/// minus trailing sentence punctuation. Lines without a URL are skipped with a
/// warning.
///
/// # Returns
///
/// * `Ok(Vec<String>)` - URLs in file order
/// * `Err(PersistError)` - The file could not be read
pub fn read_urls_from_file(path: &Path) -> Result<Vec<String>, PersistError> {
    tracing::info!("Reading URLs from {}", path.display());

    let content = std::fs::read_to_string(path)
        .map_err(|e| PersistError::from_io(e, path, PersistOperation::Read))?;

    let mut urls = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match URL_IN_LINE.find(line) {
            Some(found) => {
                urls.push(found.as_str().trim_end_matches(TRAILING_PUNCTUATION).to_string())
            }
            None => tracing::warn!("Skipping line without a URL: '{}'", line),
        }
    }

    tracing::info!("Read {} URLs", urls.len());
    Ok(urls)
}

/// Writes `links` to `path`, one per line, in the given order
///
/// Missing parent directories are created. An empty list writes nothing.
pub fn save_links(links: &[String], path: &Path) -> Result<(), PersistError> {
    if links.is_empty() {
        tracing::warn!("No URLs to save, not writing {}", path.display());
        return Ok(());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| PersistError::from_io(e, parent, PersistOperation::Create))?;
    }

    std::fs::write(path, links.join("\n"))
        .map_err(|e| PersistError::from_io(e, path, PersistOperation::Write))?;

    tracing::info!("Saved {} URLs to {}", links.len(), path.display());
    Ok(())
}
