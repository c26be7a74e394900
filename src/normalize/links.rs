use regex::{Captures, Regex};
use std::sync::LazyLock;
use url::Url;

/// Markdown inline link: `[text](target)`
#[allow(clippy::expect_used)]
static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("markdown link regex is valid")
});

/// Inline HTML anchor: `<a ... href="target" ...>`
#[allow(clippy::expect_used)]
static HTML_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(<a\s+[^>]*href=["'])([^"']+)(["'][^>]*>)"#)
        .expect("html link regex is valid")
});

/// Link targets left untouched
const ABSOLUTE_PREFIXES: &[&str] = &["http://", "https://", "mailto:", "#", "data:"];

/// Rewrites relative link targets in `content` to absolute URLs resolved
/// against `base`
///
/// Both markdown links and inline HTML anchors are rewritten. Targets that are
/// already absolute, `mailto:`, `data:` or in-page fragments are kept, as is
/// any target that cannot be resolved. The result is stable: running it again
/// on its own output returns the same text.
///
/// # Examples
///
/// ```
/// use scroll_scribe::absolutify;
///
/// let doc = "See [setup](../setup/) and [home](https://example.com/).";
/// assert_eq!(
///     absolutify(doc, "https://example.com/docs/intro/"),
///     "See [setup](https://example.com/docs/setup/) and [home](https://example.com/)."
/// );
/// ```
pub fn absolutify(content: &str, base: &str) -> String {
    if base.trim().is_empty() {
        tracing::warn!("No base URL given, leaving links unchanged");
        return content.to_string();
    }

    let base = match Url::parse(base) {
        Ok(base) => base,
        Err(e) => {
            tracing::warn!("Cannot resolve links against {}: {}", base, e);
            return content.to_string();
        }
    };

    let rewritten = MARKDOWN_LINK.replace_all(content, |caps: &Captures| {
        match resolve(&base, &caps[2]) {
            Some(target) => format!("[{}]({})", &caps[1], target),
            None => caps[0].to_string(),
        }
    });

    HTML_LINK
        .replace_all(&rewritten, |caps: &Captures| {
            match resolve(&base, &caps[2]) {
                Some(target) => format!("{}{}{}", &caps[1], target, &caps[3]),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Absolute form of `link`, or `None` when it should be left as written
fn resolve(base: &Url, link: &str) -> Option<String> {
    let lower = link.to_ascii_lowercase();
    if ABSOLUTE_PREFIXES.iter().any(|prefix| lower.starts_with(prefix)) {
        return None;
    }

    match base.join(link.trim()) {
        Ok(target) => Some(target.to_string()),
        Err(e) => {
            tracing::debug!("Could not absolutify link '{}': {}", link, e);
            None
        }
    }
}
