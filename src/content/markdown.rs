//! Markdown rendering with syntax highlighting

use lazy_static::lazy_static;
use pulldown_cmark::{
    html, CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd,
    TextMergeStream,
};
use regex::Regex;
use serde::Serialize;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::{styled_line_to_highlighted_html, IncludeBackground};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::error::{Error, Result};
use crate::helpers::escape_html;

lazy_static! {
    static ref BARE_URL: Regex = Regex::new(r"(?:https?://|www\.)[^\s<>]+").unwrap();
}

/// A heading collected for the table of contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub id: String,
    pub text: String,
    pub level: u8,
}

/// Rendered HTML plus the headings it contains
#[derive(Debug, Clone, Default)]
pub struct RenderedMarkdown {
    pub html: String,
    pub toc: Vec<TocEntry>,
}

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
}

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self::with_theme("base16-ocean.dark")
    }

    /// Create with a specific syntect theme
    pub fn with_theme(theme: &str) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: theme.to_string(),
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String> {
        Ok(self.render_document(markdown)?.html)
    }

    /// Render markdown to HTML, collecting h1-h3 headings on the way
    pub fn render_document(&self, markdown: &str) -> Result<RenderedMarkdown> {
        // Front-matter is stripped before we get here, so no metadata blocks
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES
            | Options::ENABLE_GFM;
        let parser = TextMergeStream::new(Parser::new_ext(markdown, options));

        let mut events: Vec<Event> = Vec::new();
        let mut toc: Vec<TocEntry> = Vec::new();

        let mut code_block: Option<Option<String>> = None;
        let mut code_block_content = String::new();
        let mut link_depth = 0usize;
        // Image alt text is written as plain text, so no links in there
        let mut image_depth = 0usize;
        let mut heading_count = 0usize;
        let mut current_heading: Option<TocEntry> = None;

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .map(|lang| lang.to_string()),
                        CodeBlockKind::Indented => None,
                    };
                    code_block = Some(lang);
                    code_block_content.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let lang = code_block.take().flatten();
                    let highlighted = self.highlight_code(&code_block_content, lang.as_deref());
                    events.push(Event::Html(CowStr::from(highlighted)));
                }
                Event::Text(text) if code_block.is_some() => {
                    code_block_content.push_str(&text);
                }
                Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                }) => {
                    let rank = heading_rank(level);
                    let id = if rank <= 3 {
                        let id = id.unwrap_or_else(|| {
                            CowStr::from(format!("heading-{}", heading_count))
                        });
                        heading_count += 1;
                        current_heading = Some(TocEntry {
                            id: id.to_string(),
                            text: String::new(),
                            level: rank,
                        });
                        Some(id)
                    } else {
                        id
                    };
                    events.push(Event::Start(Tag::Heading {
                        level,
                        id,
                        classes,
                        attrs,
                    }));
                }
                Event::End(TagEnd::Heading(level)) => {
                    if let Some(mut entry) = current_heading.take() {
                        entry.text = entry.text.trim().to_string();
                        toc.push(entry);
                    }
                    events.push(Event::End(TagEnd::Heading(level)));
                }
                Event::Start(Tag::Link { .. }) => {
                    link_depth += 1;
                    events.push(event);
                }
                Event::End(TagEnd::Link) => {
                    link_depth = link_depth.saturating_sub(1);
                    events.push(event);
                }
                Event::Start(Tag::Image { .. }) => {
                    image_depth += 1;
                    events.push(event);
                }
                Event::End(TagEnd::Image) => {
                    image_depth = image_depth.saturating_sub(1);
                    events.push(event);
                }
                // Raw HTML in the source is dropped
                Event::Html(_) | Event::InlineHtml(_) => {}
                Event::Text(text) => {
                    if let Some(heading) = current_heading.as_mut() {
                        heading.text.push_str(&text);
                    }
                    if link_depth == 0 && image_depth == 0 {
                        push_autolinked(&mut events, text);
                    } else {
                        events.push(Event::Text(text));
                    }
                }
                Event::Code(code) => {
                    if let Some(heading) = current_heading.as_mut() {
                        heading.text.push_str(&code);
                    }
                    events.push(Event::Code(code));
                }
                _ => events.push(event),
            }
        }

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());

        Ok(RenderedMarkdown {
            html: html_output,
            toc,
        })
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let Some(lang) = lang else {
            return format!("<pre><code>{}</code></pre>\n", escape_html(code));
        };

        let class = escape_html(lang);
        match self.highlight_lines(code, lang) {
            Ok(highlighted) => format!(
                r#"<pre><code class="language-{}">{}</code></pre>"#,
                class, highlighted
            ) + "\n",
            Err(e) => {
                tracing::debug!("Highlighting failed for {}: {}", lang, e);
                format!(
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    class,
                    escape_html(code)
                ) + "\n"
            }
        }
    }

    fn highlight_lines(&self, code: &str, lang: &str) -> Result<String> {
        // Try to find syntax for the language
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = self
            .theme()
            .ok_or_else(|| Error::Render(format!("unknown theme {}", self.theme_name)))?;

        let mut highlighter = HighlightLines::new(syntax, theme);
        let mut output = String::with_capacity(code.len() * 2);
        for line in LinesWithEndings::from(code) {
            let regions = highlighter
                .highlight_line(line, &self.syntax_set)
                .map_err(|e| Error::Render(e.to_string()))?;
            let html = styled_line_to_highlighted_html(&regions[..], IncludeBackground::No)
                .map_err(|e| Error::Render(e.to_string()))?;
            output.push_str(&html);
        }
        Ok(output)
    }

    fn theme(&self) -> Option<&Theme> {
        self.theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn heading_rank(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Push a text event, turning bare URLs into links
fn push_autolinked<'a>(events: &mut Vec<Event<'a>>, text: CowStr<'a>) {
    if !BARE_URL.is_match(&text) {
        events.push(Event::Text(text));
        return;
    }

    let mut last = 0;
    for m in BARE_URL.find_iter(&text) {
        let url = trim_url(m.as_str());
        if url.is_empty() || url == "www." {
            continue;
        }
        let start = m.start();
        let end = start + url.len();

        if start > last {
            events.push(Event::Text(CowStr::from(text[last..start].to_string())));
        }
        let href = if url.starts_with("www.") {
            format!("http://{}", url)
        } else {
            url.to_string()
        };
        events.push(Event::Html(CowStr::from(format!(
            r#"<a href="{}">{}</a>"#,
            escape_html(&href),
            escape_html(url)
        ))));
        last = end;
    }

    if last < text.len() {
        events.push(Event::Text(CowStr::from(text[last..].to_string())));
    }
}

/// Drop trailing punctuation that belongs to the sentence, not the URL
fn trim_url(url: &str) -> &str {
    let mut url = url;
    loop {
        let Some(last) = url.chars().last() else {
            return url;
        };
        let unbalanced_paren =
            last == ')' && url.matches(')').count() > url.matches('(').count();
        if matches!(last, '.' | ',' | ':' | ';' | '!' | '?' | '"' | '\'') || unbalanced_paren {
            url = &url[..url.len() - last.len_utf8()];
        } else {
            return url;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("Hello **World**\n\nThis is a test.").unwrap();
        assert!(html.contains("<strong>World</strong>"));
        assert!(html.contains("<p>This is a test.</p>"));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```").unwrap();
        assert!(html.contains(r#"<pre><code class="language-rust">"#));
        assert!(html.contains("<span"));
        assert!(!html.contains("line-number"));
    }

    #[test]
    fn test_render_untagged_code_block_is_escaped() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```\n<b>x</b>\n```").unwrap();
        assert!(html.contains("<pre><code>&lt;b&gt;x&lt;/b&gt;"));
    }

    #[test]
    fn test_unknown_language_still_renders() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```nosuchlang\na < b\n```").unwrap();
        assert!(html.contains(r#"class="language-nosuchlang""#));
        assert!(html.contains("a &lt; b"));
    }

    #[test]
    fn test_gfm_extensions() {
        let renderer = MarkdownRenderer::new();
        let markdown = "| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n\n- [x] done\n- [ ] todo\n";
        let html = renderer.render(markdown).unwrap();
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains(r#"type="checkbox""#));
    }

    #[test]
    fn test_autolinks() {
        let renderer = MarkdownRenderer::new();
        let html = renderer
            .render("See https://example.com/a_b. Or www.rust-lang.org!")
            .unwrap();
        assert!(html.contains(r#"<a href="https://example.com/a_b">https://example.com/a_b</a>."#));
        assert!(html.contains(r#"<a href="http://www.rust-lang.org">www.rust-lang.org</a>!"#));
    }

    #[test]
    fn test_no_autolink_inside_links_or_code() {
        let renderer = MarkdownRenderer::new();
        let html = renderer
            .render("[https://a.com](https://b.com) and `https://c.com`")
            .unwrap();
        assert_eq!(html.matches("<a ").count(), 1);
        assert!(html.contains("<code>https://c.com</code>"));
    }

    #[test]
    fn test_image_alt_keeps_urls() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("![see https://x.com now](a.png)").unwrap();
        assert!(html.contains(r#"alt="see https://x.com now""#));
        assert!(!html.contains("<a "));
    }

    #[test]
    fn test_raw_html_is_dropped() {
        let renderer = MarkdownRenderer::new();
        let html = renderer
            .render("<script>alert(1)</script>\n\nText with <b>inline</b> tag")
            .unwrap();
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<b>"));
        assert!(html.contains("inline"));
    }

    #[test]
    fn test_heading_ids_and_toc() {
        let renderer = MarkdownRenderer::new();
        let doc = renderer
            .render_document("# Intro\n\n## Setup `cargo`\n\n#### Deep\n\n### Custom {#mine}\n")
            .unwrap();
        assert!(doc.html.contains(r#"<h1 id="heading-0">Intro</h1>"#));
        assert!(doc.html.contains(r#"<h2 id="heading-1">"#));
        assert!(doc.html.contains("<h4>Deep</h4>"));
        assert!(doc.html.contains(r#"<h3 id="mine">"#));
        assert_eq!(
            doc.toc,
            vec![
                TocEntry {
                    id: "heading-0".into(),
                    text: "Intro".into(),
                    level: 1
                },
                TocEntry {
                    id: "heading-1".into(),
                    text: "Setup cargo".into(),
                    level: 2
                },
                TocEntry {
                    id: "mine".into(),
                    text: "Custom".into(),
                    level: 3
                },
            ]
        );
    }

    #[test]
    fn test_trim_url() {
        assert_eq!(trim_url("https://a.com/x)."), "https://a.com/x");
        assert_eq!(trim_url("https://en.wikipedia.org/wiki/Rust_(language)"), "https://en.wikipedia.org/wiki/Rust_(language)");
    }
}
