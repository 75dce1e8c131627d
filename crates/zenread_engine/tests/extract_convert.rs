use zenread_engine::{
    plain_text, ExtractError, Extractor, Html2MdConverter, MarkdownConverter, ReadabilityExtractor,
    WhitespaceWordCounter, WordCounter,
};

const SENTENCE: &str = "The quick brown fox jumps over the lazy dog, again.";

/// A paragraph of exactly `sentences * 10` words.
fn paragraph(sentences: usize) -> String {
    let body = vec![SENTENCE; sentences].join(" ");
    format!("<p>{body}</p>")
}

fn article_page(paragraphs: usize) -> String {
    let body: Vec<String> = (0..paragraphs).map(|_| paragraph(10)).collect();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <title>Six Hundred Words</title>
  <meta name="author" content="Jane Writer">
</head>
<body>
  <nav><a href="/">Home</a> <a href="/about">About</a> <a href="/contact">Contact</a></nav>
  <article>
    {}
  </article>
  <script>trackVisitor();</script>
</body>
</html>"#,
        body.join("\n    ")
    )
}

#[test]
fn six_hundred_word_article_takes_three_minutes() {
    let extractor = ReadabilityExtractor::new();
    let article = extractor
        .extract(&article_page(6), Some("https://example.com/post"))
        .expect("article found");

    assert_eq!(article.title, "Six Hundred Words");
    assert_eq!(article.word_count, 600);
    assert_eq!(article.time_to_read_minutes, 3);
    assert!(!article.content.is_empty());
    assert!(!article.content.contains("trackVisitor"));
}

#[test]
fn word_count_matches_plain_text_of_content() {
    let extractor = ReadabilityExtractor::new();
    let article = extractor.extract(&article_page(3), None).expect("article found");

    let counted = WhitespaceWordCounter.count(&plain_text(&article.content));
    assert_eq!(article.word_count, counted);
    assert_eq!(article.time_to_read_minutes, counted.div_ceil(200));
}

#[test]
fn empty_body_has_no_article() {
    let extractor = ReadabilityExtractor::new();
    let html = "<html><head><title>Empty</title></head><body></body></html>";
    assert_eq!(extractor.extract(html, None), Err(ExtractError::NoArticleFound));
}

#[test]
fn script_only_page_has_no_article() {
    let extractor = ReadabilityExtractor::new();
    let html = "<html><head><title>App</title></head><body><script>render()</script><noscript></noscript></body></html>";
    assert_eq!(extractor.extract(html, None), Err(ExtractError::NoArticleFound));
}

#[test]
fn extracted_content_is_sanitized() {
    let extractor = ReadabilityExtractor::new();
    let tainted = paragraph(10).replace("<p>", r#"<p onclick="steal()">"#);
    let html = format!(
        "<html><head><title>Tainted</title></head><body><article>{}{}{}<p><a href=\"javascript:alert(1)\">more</a></p></article></body></html>",
        tainted,
        paragraph(10),
        paragraph(10)
    );
    let article = extractor.extract(&html, None).expect("article found");

    assert!(!article.content.contains("onclick"));
    assert!(!article.content.to_ascii_lowercase().contains("javascript:"));
}

#[test]
fn converter_turns_html_into_markdown() {
    let html = r#"<h1>Hello</h1><p>world</p>"#;
    let md = Html2MdConverter.to_markdown(html);
    assert!(
        md.starts_with("# Hello") || md.starts_with("Hello\n=="),
        "unexpected markdown output: {md:?}"
    );
    assert!(md.contains("world"));
}
