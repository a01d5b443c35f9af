//! Cleanup of HTML bodies embedded from third-party platforms
//!
//! Sanitizing only ever removes markup: platform chrome that the reading view
//! already renders (title, byline, tags, meta), dead interactive affordances
//! and repeated cover images. Anchors that point at such affordances keep
//! their visible text. The pass never fails and a second pass is a no-op.

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

use crate::model::ExternalPost;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Elements whose text the parser keeps verbatim, without entity decoding
const RAW_TEXT_ELEMENTS: &[&str] = &["iframe", "noembed", "noframes", "xmp"];

/// Blocks duplicating what the reading view shows on its own
const STRUCTURAL_DENYLIST: &str = "script, style, noscript, \
    .author, .byline, .post-author, .author-info, .author-bio, .article-author, \
    [rel=\"author\"], [itemprop=\"author\"], \
    .tags, .tag-list, .post-tags, .article-tags, \
    .post-meta, .article-meta, .entry-meta, .meta";

/// Controls that have no handler outside their home platform
const INTERACTIVE_DENYLIST: &str = ".like-button, .share-button, .follow-button, \
    .comment-button, .subscribe-button, .reply-button, .reactions, .crayons-btn";

const BYLINE_MAX: usize = 80;

/// Post attributes used to detect duplicated information
#[derive(Debug, Clone, Copy, Default)]
pub struct SanitizeContext<'a> {
    pub title: &'a str,
    pub author: Option<&'a str>,
    pub cover_image: Option<&'a str>,
}

impl<'a> From<&'a ExternalPost> for SanitizeContext<'a> {
    fn from(post: &'a ExternalPost) -> Self {
        Self {
            title: &post.title,
            author: post.author.as_deref(),
            cover_image: post.image.as_deref(),
        }
    }
}

/// Subtractive HTML sanitizer
#[derive(Debug, Clone)]
pub struct ContentSanitizer {
    structural: Selector,
    interactive: Selector,
    action_words: Regex,
    action_label: Regex,
    dead_href: Regex,
}

#[derive(Default)]
struct WalkState {
    cover_seen: bool,
}

impl ContentSanitizer {
    pub fn new() -> Self {
        Self {
            structural: Selector::parse(STRUCTURAL_DENYLIST).expect("Valid structural selector"),
            interactive: Selector::parse(INTERACTIVE_DENYLIST)
                .expect("Valid interactive selector"),
            action_words: Regex::new(
                r"(?i)\b(comments?|discuss(ion)?|repl(y|ies)|likes?|share|follow|subscribe|log ?in|sign ?in|sign ?up)\b",
            )
            .expect("Valid regex"),
            // The whole anchor text must be the call to action, e.g. "Follow Jane"
            action_label: Regex::new(
                r"(?i)^(\d+\s+)?(comments?|discuss(ion)?|repl(y|ies)|likes?|share|follow|subscribe|log ?in|sign ?in|sign ?up)(\s+(this( post)?|now|me|\w+))?[.!]?$",
            )
            .expect("Valid regex"),
            dead_href: Regex::new(
                r"(?i)(#comments?\b|/comments?\b|/signin\b|/login\b|/signup\b|/enter\b|/subscribe\b|/follow\b)",
            )
            .expect("Valid regex"),
        }
    }

    /// Clean `html` and return the serialized inner HTML of the fragment
    pub fn sanitize(&self, html: &str, ctx: &SanitizeContext<'_>) -> String {
        if html.trim().is_empty() {
            return String::new();
        }

        let fragment = Html::parse_fragment(html);
        let mut out = String::with_capacity(html.len());
        let mut state = WalkState::default();
        self.write_children(fragment.root_element(), ctx, &mut state, &mut out);
        out
    }

    fn write_children(
        &self,
        parent: ElementRef<'_>,
        ctx: &SanitizeContext<'_>,
        state: &mut WalkState,
        out: &mut String,
    ) {
        let raw_text = RAW_TEXT_ELEMENTS.contains(&parent.value().name());
        for child in parent.children() {
            match child.value() {
                Node::Text(text) if raw_text => out.push_str(text),
                Node::Text(text) => out.push_str(&html_escape::encode_text(&**text)),
                Node::Element(_) => {
                    if let Some(element) = ElementRef::wrap(child) {
                        self.write_element(element, ctx, state, out);
                    }
                }
                // Comments, doctypes and processing instructions are dropped
                _ => {}
            }
        }
    }

    fn write_element(
        &self,
        element: ElementRef<'_>,
        ctx: &SanitizeContext<'_>,
        state: &mut WalkState,
        out: &mut String,
    ) {
        if self.is_dropped(element, ctx) {
            return;
        }

        let name = element.value().name();

        if name == "img" && is_cover_image(element, ctx) {
            if state.cover_seen {
                return;
            }
            state.cover_seen = true;
        }

        if name == "a" && self.is_dead_link(element) {
            let text = self.visible_text(element, ctx);
            out.push_str(&html_escape::encode_text(&text));
            return;
        }

        out.push('<');
        out.push_str(name);

        let mut attrs: Vec<(&str, &str)> = element
            .value()
            .attrs()
            .filter(|(key, value)| is_safe_attribute(key, value))
            .collect();
        attrs.sort_by(|a, b| a.0.cmp(b.0));
        for (key, value) in attrs {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&html_escape::encode_double_quoted_attribute(value));
            out.push('"');
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&name) {
            return;
        }

        self.write_children(element, ctx, state, out);
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }

    /// Whether the element and its subtree are removed entirely
    fn is_dropped(&self, element: ElementRef<'_>, ctx: &SanitizeContext<'_>) -> bool {
        if self.structural.matches(&element) {
            return true;
        }

        let name = element.value().name();

        if name != "a" && self.interactive.matches(&element) {
            return true;
        }

        if name == "button" {
            let label = element.value().attr("aria-label").unwrap_or_default();
            let text: String = element.text().collect();
            if self.action_words.is_match(&text) || self.action_words.is_match(label) {
                return true;
            }
        }

        if HEADINGS.contains(&name) {
            let title = normalize_text(ctx.title);
            if !title.is_empty() && normalize_text(&self.visible_text(element, ctx)) == title {
                return true;
            }
        }

        if name == "p" {
            if let Some(author) = ctx.author.filter(|a| !a.trim().is_empty()) {
                let text = normalize_text(&self.visible_text(element, ctx));
                let byline = format!("by {}", normalize_text(author));
                if text.len() <= BYLINE_MAX && text.starts_with(&byline) {
                    return true;
                }
            }
        }

        false
    }

    /// Anchors pointing at comment/like/share/follow/login style actions
    fn is_dead_link(&self, anchor: ElementRef<'_>) -> bool {
        if self.interactive.matches(&anchor) {
            return true;
        }

        if let Some(href) = anchor.value().attr("href") {
            if self.dead_href.is_match(href) {
                return true;
            }
        }

        let text: String = anchor.text().collect();
        self.action_label.is_match(&normalize_text(&text))
    }

    /// Text of the element as it would survive sanitization
    fn visible_text(&self, element: ElementRef<'_>, ctx: &SanitizeContext<'_>) -> String {
        let mut text = String::new();
        for child in element.children() {
            match child.value() {
                Node::Text(t) => text.push_str(t),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        if !self.is_dropped(child, ctx) {
                            text.push_str(&self.visible_text(child, ctx));
                        }
                    }
                }
                _ => {}
            }
        }
        text
    }
}

impl Default for ContentSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_cover_image(img: ElementRef<'_>, ctx: &SanitizeContext<'_>) -> bool {
    match (img.value().attr("src"), ctx.cover_image) {
        (Some(src), Some(cover)) => !cover.trim().is_empty() && src.trim() == cover.trim(),
        _ => false,
    }
}

fn is_safe_attribute(key: &str, value: &str) -> bool {
    if key.to_ascii_lowercase().starts_with("on") {
        return false;
    }
    if matches!(key, "href" | "src")
        && value
            .trim_start()
            .to_ascii_lowercase()
            .starts_with("javascript:")
    {
        return false;
    }
    true
}

fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Strip tags and truncate to `max_chars` characters, appending `...`
pub fn plain_text_excerpt(html: &str, max_chars: usize) -> String {
    let fragment = Html::parse_fragment(html);
    let text = fragment
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");

    if text.chars().count() <= max_chars {
        return text;
    }

    let truncated: String = text.chars().take(max_chars).collect();
    format!("{}...", truncated.trim_end())
}

/// Best-guess main content region of a full article page
pub fn extract_article_region(page_html: &str) -> Option<String> {
    let document = Html::parse_document(page_html);

    let candidates = [
        "article",
        ".post-content, .article-content, .entry-content, .post-body, .article-body, .content",
        "main",
    ];

    for candidate in candidates {
        let Ok(selector) = Selector::parse(candidate) else {
            continue;
        };
        let found = document
            .select(&selector)
            .find(|el| el.text().any(|t| !t.trim().is_empty()));
        if let Some(element) = found {
            return Some(element.inner_html());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const COVER: &str = "https://cdn.example.com/cover.png";

    fn ctx() -> SanitizeContext<'static> {
        SanitizeContext {
            title: "Understanding Async Rust",
            author: Some("Jane Doe"),
            cover_image: Some(COVER),
        }
    }

    fn platform_html() -> String {
        format!(
            r#"<h1>Understanding  async rust</h1>
<div class="author-info"><img src="https://cdn.example.com/jane.png">Jane Doe</div>
<p>By Jane Doe</p>
<img src="{cover}">
<p>Futures are lazy. <a href="https://doc.rust-lang.org">Read the docs</a>.</p>
<img src="{cover}">
<ul class="tags"><li>rust</li></ul>
<button class="btn">Like</button>
<p><a href="https://example.com/post#comments">3 comments</a></p>
<p><a class="follow-button" href="/jane">Follow Jane</a></p>
<script>alert(1)</script>
<h2>Polling</h2>
<img src="{cover}">"#,
            cover = COVER
        )
    }

    #[test]
    fn test_removes_platform_chrome() {
        let sanitizer = ContentSanitizer::new();
        let out = sanitizer.sanitize(&platform_html(), &ctx());

        assert!(!out.contains("<h1>"));
        assert!(!out.contains("author-info"));
        assert!(!out.contains("By Jane Doe"));
        assert!(!out.contains("class=\"tags\""));
        assert!(!out.contains("<button"));
        assert!(!out.contains("<script"));
        assert!(out.contains("<h2>Polling</h2>"));
        assert!(out.contains("<a href=\"https://doc.rust-lang.org\">Read the docs</a>"));
    }

    #[test]
    fn test_dead_links_become_text() {
        let sanitizer = ContentSanitizer::new();
        let out = sanitizer.sanitize(&platform_html(), &ctx());

        assert!(out.contains("<p>3 comments</p>"));
        assert!(out.contains("<p>Follow Jane</p>"));
        assert!(!out.contains("#comments"));
        assert!(!out.contains("follow-button"));
    }

    #[test]
    fn test_links_merely_mentioning_actions_are_kept() {
        let sanitizer = ContentSanitizer::new();
        let html = r#"<p><a href="https://blog.example.com/part-2">Read the follow-up</a> and <a href="https://docs.example.com/auth">how to log in with SSO</a>.</p>"#;

        assert_eq!(sanitizer.sanitize(html, &ctx()), html);
    }

    #[test]
    fn test_short_call_to_action_links_become_text() {
        let sanitizer = ContentSanitizer::new();
        let html = r#"<p><a href="https://example.com/u/jane">Follow Jane</a> <a href="https://example.com/x">Subscribe now!</a></p>"#;

        assert_eq!(
            sanitizer.sanitize(html, &ctx()),
            "<p>Follow Jane Subscribe now!</p>"
        );
    }

    #[test]
    fn test_raw_text_elements_are_idempotent() {
        let sanitizer = ContentSanitizer::new();
        let html = "<p>a &lt; b</p><xmp>&lt;b&gt; stays</xmp><noembed>x &amp; y</noembed>";
        let once = sanitizer.sanitize(html, &ctx());

        assert!(once.contains("<xmp>&lt;b&gt; stays</xmp>"));
        assert!(!once.contains("&amp;lt;"));
        assert_eq!(sanitizer.sanitize(&once, &ctx()), once);
    }

    #[test]
    fn test_keeps_only_first_cover_image() {
        let sanitizer = ContentSanitizer::new();
        let out = sanitizer.sanitize(&platform_html(), &ctx());

        assert_eq!(out.matches(COVER).count(), 1);
    }

    #[test]
    fn test_two_duplicate_cover_images_leave_at_most_one() {
        let sanitizer = ContentSanitizer::new();
        let html = format!(r#"<img src="{c}"><p>text</p><img src="{c}">"#, c = COVER);
        let out = sanitizer.sanitize(&html, &ctx());

        assert!(out.matches("<img").count() <= 1);
        assert!(out.contains("<p>text</p>"));
    }

    #[test]
    fn test_second_pass_is_noop() {
        let sanitizer = ContentSanitizer::new();
        let once = sanitizer.sanitize(&platform_html(), &ctx());
        let twice = sanitizer.sanitize(&once, &ctx());

        assert_eq!(once, twice);
    }

    #[test]
    fn test_heading_hidden_chrome_is_idempotent() {
        let sanitizer = ContentSanitizer::new();
        let html = r#"<h2>Understanding Async Rust <span class="tags">rust</span></h2><p>x</p>"#;
        let once = sanitizer.sanitize(html, &ctx());

        assert!(!once.contains("<h2>"));
        assert_eq!(sanitizer.sanitize(&once, &ctx()), once);
    }

    #[test]
    fn test_clean_html_is_untouched() {
        let sanitizer = ContentSanitizer::new();
        let html = r#"<p>Hello <strong>world</strong> &amp; friends</p><pre><code>let x = 1 &lt; 2;</code></pre>"#;

        assert_eq!(sanitizer.sanitize(html, &ctx()), html);
    }

    #[test]
    fn test_event_handlers_and_script_urls_dropped() {
        let sanitizer = ContentSanitizer::new();
        let html = r#"<p onclick="steal()">hi <a href="javascript:void(0)">docs page</a></p>"#;
        let out = sanitizer.sanitize(html, &SanitizeContext::default());

        assert_eq!(out, "<p>hi <a>docs page</a></p>");
    }

    #[test]
    fn test_empty_input() {
        let sanitizer = ContentSanitizer::new();
        assert_eq!(sanitizer.sanitize("   ", &ctx()), "");
    }

    #[test]
    fn test_plain_text_excerpt_truncates() {
        let html = "<p>Hello   <b>brave</b></p>\n<p>new world</p>";
        assert_eq!(plain_text_excerpt(html, 100), "Hello brave new world");
        assert_eq!(plain_text_excerpt(html, 11), "Hello brave...");
    }

    #[test]
    fn test_extract_article_region_prefers_article() {
        let page = r#"<html><body><nav>menu</nav>
<main><article><p>Body text</p></article></main></body></html>"#;
        assert_eq!(
            extract_article_region(page).as_deref(),
            Some("<p>Body text</p>")
        );
    }

    #[test]
    fn test_extract_article_region_falls_back() {
        let page = r#"<html><body><div class="entry-content"><p>Entry</p></div></body></html>"#;
        assert_eq!(extract_article_region(page).as_deref(), Some("<p>Entry</p>"));

        let page = r#"<html><body><main><p>Main</p></main></body></html>"#;
        assert_eq!(extract_article_region(page).as_deref(), Some("<p>Main</p>"));

        assert_eq!(extract_article_region("<html><body></body></html>"), None);
    }
}
