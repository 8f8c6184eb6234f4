// ABOUTME: Selector-based text and attribute extraction over a parsed scraper document.
// ABOUTME: Selectors are tried in order; the first one yielding a usable value wins.

//! Selector-based text extraction utilities.
//!
//! Key behaviors:
//! - Selectors are tried in order; first selector yielding matches wins.
//! - Element text is all descendant text, whitespace-normalized.
//! - A matched `<meta>` element contributes its `content` attribute instead.
//! - Invalid selectors are skipped.

use scraper::{ElementRef, Html, Node};

use crate::extractors::compiled;

/// Tags whose text content is never shown to a reader.
const HIDDEN_TEXT_TAGS: &[&str] = &["script", "style", "noscript", "template"];

/// Normalizes whitespace in a string by collapsing runs of whitespace into single spaces.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of a single element: `content` for meta tags, normalized inner text otherwise.
pub fn element_text(el: ElementRef<'_>) -> String {
    if el.value().name() == "meta" {
        return el
            .value()
            .attr("content")
            .map(normalize_whitespace)
            .unwrap_or_default();
    }
    normalize_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

/// Non-empty texts of every element matching `css`, in document order.
pub fn select_texts(doc: &Html, css: &str) -> Vec<String> {
    let Some(sel) = compiled::selector(css) else {
        return vec![];
    };
    doc.select(&sel)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Trimmed, non-empty values of `attr` on every element matching `css`.
pub fn select_attrs(doc: &Html, css: &str, attr: &str) -> Vec<String> {
    let Some(sel) = compiled::selector(css) else {
        return vec![];
    };
    doc.select(&sel)
        .filter_map(|el| el.value().attr(attr))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Returns the first non-empty element text across `selectors`, tried in order.
pub fn first_text(doc: &Html, selectors: &[String]) -> Option<String> {
    selectors
        .iter()
        .find_map(|css| select_texts(doc, css).into_iter().next())
}

/// Returns the entries of the first selector yielding at least one entry of
/// `min_chars` characters or more; shorter entries are dropped.
pub fn first_list(doc: &Html, selectors: &[String], min_chars: usize) -> Vec<String> {
    for css in selectors {
        let kept: Vec<String> = select_texts(doc, css)
            .into_iter()
            .filter(|t| t.chars().count() >= min_chars)
            .collect();
        if !kept.is_empty() {
            return kept;
        }
    }
    vec![]
}

/// Elements that start a new line of rendered text.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "br", "dd", "details", "div", "dl",
    "dt", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "head",
    "header", "hr", "html", "li", "main", "nav", "ol", "p", "pre", "section", "summary", "table",
    "tbody", "thead", "tfoot", "title", "tr", "ul",
];

/// Visible text under `root`, one line per block-level element, skipping
/// script, style, noscript and template content.
///
/// Inline markup stays on its line, so `Cuisson : <span>40 min</span>`
/// renders as `Cuisson : 40 min`.
pub fn visible_text(root: ElementRef<'_>) -> String {
    let mut lines = Vec::new();
    let mut current = String::new();
    collect_lines(root, &mut current, &mut lines);
    flush_line(&mut current, &mut lines);
    lines.join("\n")
}

fn collect_lines(el: ElementRef<'_>, current: &mut String, lines: &mut Vec<String>) {
    let name = el.value().name();
    if HIDDEN_TEXT_TAGS.contains(&name) {
        return;
    }
    let block = BLOCK_TAGS.contains(&name);
    if block {
        flush_line(current, lines);
    }
    for child in el.children() {
        match child.value() {
            Node::Text(text) => current.push_str(text),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    collect_lines(child_el, current, lines);
                }
            }
            _ => {}
        }
    }
    if block {
        flush_line(current, lines);
    }
}

fn flush_line(current: &mut String, lines: &mut Vec<String>) {
    let line = normalize_whitespace(current);
    if !line.is_empty() {
        lines.push(line);
    }
    current.clear();
}

/// Visible text of the whole document.
pub fn page_text(doc: &Html) -> String {
    visible_text(doc.root_element())
}

/// Visible text of `<body>`, or of the whole document if there is no body.
pub fn body_text(doc: &Html) -> String {
    compiled::selector("body")
        .and_then(|sel| doc.select(&sel).next())
        .map(visible_text)
        .unwrap_or_else(|| page_text(doc))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
        <!DOCTYPE html>
        <html>
        <head>
            <title>Test Page</title>
            <meta itemprop="prepTime" content="  PT15M ">
            <style>h1 { color: red; }</style>
        </head>
        <body>
            <h1>  Tarte   <em>aux</em> pommes  </h1>
            <ul class="items">
                <li>4 pommes</li>
                <li>ok</li>
                <li>200 g de farine</li>
            </ul>
            <div class="empty"></div>
            <a class="next" href=" /page/2 ">Suivant</a>
            <script>var preparation = "99 min";</script>
            <p class="intro">Hello world</p>
        </body>
        </html>
    "#;

    fn parse_html() -> Html {
        Html::parse_document(SAMPLE_HTML)
    }

    #[test]
    fn test_element_text_joins_descendants() {
        let doc = parse_html();
        assert_eq!(select_texts(&doc, "h1"), vec!["Tarte aux pommes"]);
    }

    #[test]
    fn test_meta_uses_content_attribute() {
        let doc = parse_html();
        assert_eq!(select_texts(&doc, "[itemprop=\"prepTime\"]"), vec!["PT15M"]);
    }

    #[test]
    fn test_first_text_skips_empty_and_missing() {
        let doc = parse_html();
        let selectors = vec![
            "section.nonexistent".to_string(),
            "div.empty".to_string(),
            "p.intro".to_string(),
        ];
        assert_eq!(first_text(&doc, &selectors), Some("Hello world".to_string()));
    }

    #[test]
    fn test_first_text_no_match() {
        let doc = parse_html();
        let selectors = vec![".foo".to_string(), "[[[invalid".to_string()];
        assert!(first_text(&doc, &selectors).is_none());
    }

    #[test]
    fn test_first_list_drops_short_entries() {
        let doc = parse_html();
        let selectors = vec!["ul.items li".to_string()];
        assert_eq!(
            first_list(&doc, &selectors, 3),
            vec!["4 pommes", "200 g de farine"]
        );
    }

    #[test]
    fn test_first_list_moves_on_when_all_entries_too_short() {
        let doc = parse_html();
        let selectors = vec!["ul.items li".to_string(), "p.intro".to_string()];
        assert_eq!(first_list(&doc, &selectors, 12), vec!["200 g de farine"]);
        assert!(first_list(&doc, &selectors, 16).is_empty());
    }

    #[test]
    fn test_select_attrs_trims() {
        let doc = parse_html();
        assert_eq!(select_attrs(&doc, "a.next", "href"), vec!["/page/2"]);
        assert!(select_attrs(&doc, "a.next", "title").is_empty());
    }

    #[test]
    fn test_visible_text_skips_scripts_and_styles() {
        let doc = parse_html();
        let text = page_text(&doc);
        assert!(text.contains("Tarte aux pommes\n4 pommes\nok\n200 g de farine"));
        assert!(text.contains("200 g de farine"));
        assert!(!text.contains("99 min"));
        assert!(!text.contains("color: red"));
    }

    #[test]
    fn test_visible_text_keeps_inline_markup_on_one_line() {
        let doc = Html::parse_document(
            r#"<html><body>
            <p>Cuisson : <span class="v">40 minutes</span></p>
            <p>Préparation : <strong>25</strong> min<br>Repos : 1 h</p>
            <div>Cr<b>ê</b>pes</div>
            </body></html>"#,
        );
        assert_eq!(
            body_text(&doc),
            "Cuisson : 40 minutes\nPréparation : 25 min\nRepos : 1 h\nCrêpes"
        );
    }

    #[test]
    fn test_body_text_excludes_head() {
        let doc = parse_html();
        let text = body_text(&doc);
        assert!(!text.contains("Test Page"));
        assert!(text.starts_with("Tarte"));
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  hello   world  "), "hello world");
        assert_eq!(normalize_whitespace("no\textra\nspaces"), "no extra spaces");
        assert_eq!(normalize_whitespace(""), "");
    }
}
