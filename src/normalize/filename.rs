use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Characters that are unsafe in file names on common filesystems
#[allow(clippy::expect_used)]
static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|]+"#).expect("unsafe-char regex is valid"));

#[allow(clippy::expect_used)]
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));

/// Derives a safe, deterministic file name for the page at `url`
///
/// The name has the form `page_{index:03}_{part}{extension}`, where `part` is
/// the URL path (or the host when the path is empty) with unsafe characters
/// and whitespace replaced by `_`, cut to `max_len` characters, and stripped
/// of trailing dots and underscores. An empty `part` becomes `url_{index}`.
/// When `url` cannot be parsed the name falls back to `page_{index:03}{extension}`.
///
/// # Examples
///
/// ```
/// use scroll_scribe::name_for;
///
/// assert_eq!(
///     name_for("https://docs.example.com/guide/intro/", 3, ".md", 100),
///     "page_003_guide_intro.md"
/// );
/// assert_eq!(name_for("not a url", 7, ".md", 100), "page_007.md");
/// ```
pub fn name_for(url: &str, index: usize, extension: &str, max_len: usize) -> String {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::warn!(
                "Could not derive a file name from {} ({}), using fallback",
                url,
                e
            );
            return format!("page_{:03}{}", index, extension);
        }
    };

    let path = parsed.path().trim_matches('/');
    let part = if path.is_empty() {
        host_with_port(&parsed)
    } else {
        path.to_string()
    };

    let safe = UNSAFE_CHARS.replace_all(&part, "_");
    let safe = WHITESPACE.replace_all(&safe, "_");
    let truncated: String = safe.chars().take(max_len).collect();
    let trimmed = truncated.trim_end_matches(['.', '_']);

    if trimmed.is_empty() {
        format!("page_{:03}_url_{}{}", index, index, extension)
    } else {
        format!("page_{:03}_{}{}", index, trimmed, extension)
    }
}

fn host_with_port(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}
