use std::sync::OnceLock;

use chrono::{Local, NaiveTime};
use regex::{Captures, Regex};

/// Fenced block (optional language tag, lazy body) or a single-backtick span.
/// The fenced alternative is tried first at every position.
const FORMAT_PATTERN: &str = r"```([A-Za-z0-9_]*)([\s\S]*?)```|`([^`]*)`";

fn format_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(FORMAT_PATTERN).expect("format pattern is valid"))
}

/// Escape the five HTML-significant characters.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render raw message text to markup, stamped with the current local time.
pub fn render(raw: &str) -> String {
    render_at(raw, Local::now().time())
}

/// Render raw message text to markup, stamped with `time`.
///
/// Escaping runs over the whole input before any formatting, so the only
/// elements in the output are the ones introduced here.
pub fn render_at(raw: &str, time: NaiveTime) -> String {
    let escaped = escape_html(raw);
    let mut markup = apply_formatting(&escaped);
    markup.push_str(&format!(
        r#"<span class="message-time">{}</span>"#,
        time.format("%H:%M")
    ));
    markup
}

fn apply_formatting(escaped: &str) -> String {
    format_regex()
        .replace_all(escaped, |caps: &Captures| {
            // caps[1] is the language tag, reserved for syntax highlighting.
            if let Some(body) = caps.get(2).map(|m| m.as_str()).filter(|b| !b.is_empty()) {
                return format!(
                    r#"<pre class="code-block"><code>{}</code></pre>"#,
                    trim_fence_newlines(body)
                );
            }
            if let Some(code) = caps.get(3).map(|m| m.as_str()).filter(|c| !c.is_empty()) {
                return format!(r#"<code class="inline-code">{}</code>"#, code);
            }
            caps[0].to_string()
        })
        .into_owned()
}

/// Drop the line break that follows the opening fence and the one before the closing fence.
fn trim_fence_newlines(body: &str) -> &str {
    let body = body
        .strip_prefix("\r\n")
        .or_else(|| body.strip_prefix('\n'))
        .unwrap_or(body);
    body.strip_suffix("\r\n")
        .or_else(|| body.strip_suffix('\n'))
        .unwrap_or(body)
}
