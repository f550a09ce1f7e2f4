//! HTML to plain-text normalization.
//!
//! Pages are reduced to a single line of text: boilerplate blocks removed,
//! remaining tags dropped, a minimal entity set decoded, whitespace
//! collapsed, then truncated to a character budget.

use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

lazy_static! {
    static ref BOILERPLATE_BLOCKS: Vec<Regex> = ["script", "style", "nav", "footer", "header"]
        .iter()
        .map(|tag| Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).unwrap())
        .collect();
    static ref COMMENT: Regex = Regex::new(r"(?s)<!--.*?-->").unwrap();
    static ref TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref TITLE: Regex = Regex::new(r"(?is)<title[^>]*>(.*?)</title\s*>").unwrap();
    static ref HREF: Regex = Regex::new(r#"(?i)href\s*=\s*["']([^"']+)["']"#).unwrap();
}

/// Decode the entities reference sites actually emit in body text.
pub fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Collapse whitespace runs to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// Keep at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Full HTML normalization pipeline.
pub fn html_to_text(html: &str, max_chars: usize) -> String {
    let mut text = COMMENT.replace_all(html, " ").into_owned();
    for block in BOILERPLATE_BLOCKS.iter() {
        text = block.replace_all(&text, " ").into_owned();
    }
    let text = TAG.replace_all(&text, " ");
    let text = decode_entities(&text);
    truncate_chars(&collapse_whitespace(&text), max_chars)
}

/// Normalize text that is already tag-free (e.g. rendered markdown).
pub fn normalize_text(text: &str, max_chars: usize) -> String {
    truncate_chars(&collapse_whitespace(&decode_entities(text)), max_chars)
}

pub fn extract_title(html: &str) -> Option<String> {
    TITLE
        .captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| collapse_whitespace(&decode_entities(m.as_str())))
        .filter(|t| !t.is_empty())
}

/// Absolute http(s) links from `href` attributes, in document order.
pub fn extract_links(base_url: &Url, html: &str) -> Vec<String> {
    HREF.captures_iter(html)
        .filter_map(|cap| cap.get(1))
        .map(|m| decode_entities(m.as_str().trim()))
        .filter(|href| {
            !(href.starts_with('#')
                || href.starts_with("javascript:")
                || href.starts_with("mailto:")
                || href.starts_with("tel:"))
        })
        .filter_map(|href| base_url.join(&href).ok())
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .map(|url| url.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_boilerplate_blocks() {
        let html = r#"
            <html><head><title>Fasting</title><style>.x { color: red }</style></head>
            <body>
              <header><h1>Site Header</h1></header>
              <nav><a href="/">Home</a></nav>
              <p>Fasting is a <b>shield</b>.</p>
              <script>var tracking = "<p>not text</p>";</script>
              <footer>Copyright</footer>
            </body></html>
        "#;
        let text = html_to_text(html, 4000);
        assert_eq!(text, "Fasting Fasting is a shield .");
    }

    #[test]
    fn test_header_block_does_not_eat_head() {
        let html = "<head><title>T</title></head><header>H</header><p>Body</p>";
        assert_eq!(html_to_text(html, 100), "T Body");
    }

    #[test]
    fn test_decodes_minimal_entities() {
        let html = "<p>Q&amp;A: 5 &lt; 6 &amp;&nbsp;&quot;ok&quot; isn&#39;t</p>";
        assert_eq!(html_to_text(html, 100), "Q&A: 5 < 6 & \"ok\" isn't");
    }

    #[test]
    fn test_double_escaped_amp_decodes_once() {
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_truncates_by_characters() {
        let html = format!("<p>{}</p>", "ق".repeat(5000));
        let text = html_to_text(&html, 4000);
        assert_eq!(text.chars().count(), 4000);
    }

    #[test]
    fn test_extract_title() {
        assert_eq!(
            extract_title("<html><head><title>\n Sahih al-Bukhari &amp; more </title></head>"),
            Some("Sahih al-Bukhari & more".to_string())
        );
        assert_eq!(extract_title("<html><body>No title</body></html>"), None);
    }

    #[test]
    fn test_extract_links() {
        let base = Url::parse("https://sunnah.com/bukhari/1").unwrap();
        let html = r##"
            <a href="/bukhari/2">Next</a>
            <a href='https://islamqa.info/en/answers/1'>Answer</a>
            <a href="#section">Anchor</a>
            <a href="javascript:void(0)">JS</a>
            <a href="mailto:info@sunnah.com">Mail</a>
            <a href="ftp://sunnah.com/file">FTP</a>
        "##;
        let links = extract_links(&base, html);
        assert_eq!(
            links,
            vec![
                "https://sunnah.com/bukhari/2".to_string(),
                "https://islamqa.info/en/answers/1".to_string(),
            ]
        );
    }
}
