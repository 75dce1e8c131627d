use zenread_core::{
    AppViewModel, ArticleView, FontPreferences, Screen, SummaryEntryView, SummaryPanelView,
};
use zenread_engine::MarkdownConverter;

const RULE_WIDTH: usize = 60;

/// Terminal rendition of the current screen.
pub fn render(view: &AppViewModel, converter: &dyn MarkdownConverter) -> String {
    match (view.screen, &view.article) {
        (Screen::Reader, Some(article)) => {
            let mut out = render_article(article, view.fonts, converter);
            let summary = render_summary(&view.summary);
            if !summary.is_empty() {
                out.push_str("\n\n");
                out.push_str(&summary);
            }
            out
        }
        _ => render_url_entry(view),
    }
}

pub fn render_url_entry(view: &AppViewModel) -> String {
    if view.loading {
        return format!("Fetching {} ...", view.url_input.trim());
    }
    match &view.error {
        Some(error) => format!("Error: {error}"),
        None => "Enter a URL to read.".to_string(),
    }
}

pub fn render_article(
    article: &ArticleView,
    fonts: FontPreferences,
    converter: &dyn MarkdownConverter,
) -> String {
    let mut lines = vec![article.title.clone(), "=".repeat(RULE_WIDTH)];

    let attribution: Vec<&str> = [article.byline.as_deref(), article.site_name.as_deref()]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect();
    if !attribution.is_empty() {
        lines.push(attribution.join(" | "));
    }
    lines.push(format!(
        "{} words | {} min read | {} {}pt",
        article.word_count,
        article.time_to_read_minutes,
        fonts.family(),
        fonts.size()
    ));
    lines.push(String::new());
    lines.push(converter.to_markdown(&article.content));
    lines.join("\n")
}

/// Empty when no summary was requested.
pub fn render_summary(panel: &SummaryPanelView) -> String {
    panel
        .entries
        .iter()
        .map(render_summary_entry)
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn render_summary_entry(entry: &SummaryEntryView) -> String {
    let label = entry.kind.label();
    if entry.loading {
        return format!("Generating {label} summary ...");
    }
    if let Some(error) = &entry.error {
        return format!("Summary ({label}) failed: {error}");
    }
    format!(
        "## Summary: {label} ({} words)\n{}\n{}",
        entry.word_count,
        "-".repeat(RULE_WIDTH),
        entry.text.as_deref().unwrap_or_default()
    )
}
