/// Turns sanitized article HTML into markdown for text-only surfaces
/// (terminal reader, speech input).
pub trait MarkdownConverter: Send + Sync {
    fn to_markdown(&self, html: &str) -> String;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Html2MdConverter;

impl MarkdownConverter for Html2MdConverter {
    fn to_markdown(&self, html: &str) -> String {
        collapse_blank_lines(&html2md::parse_html(html))
    }
}

/// At most one empty line between blocks; trailing spaces removed.
fn collapse_blank_lines(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    let mut blank_run = 0usize;
    for line in markdown.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    out.trim().to_string()
}
