use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::Html;

/// Fixed reading speed used for the reading-time estimate.
pub const WORDS_PER_MINUTE: u32 = 200;

pub trait WordCounter: Send + Sync {
    fn count(&self, text: &str) -> u32;
}

/// Counts runs of non-whitespace characters.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceWordCounter;

impl WordCounter for WhitespaceWordCounter {
    fn count(&self, text: &str) -> u32 {
        text.split_whitespace().count() as u32
    }
}

/// `ceil(words / 200)`; zero words read in zero minutes.
pub fn reading_time_minutes(word_count: u32) -> u32 {
    word_count.div_ceil(WORDS_PER_MINUTE)
}

/// Plain-text rendition of an HTML fragment.
///
/// Block-level elements are separated by whitespace so that adjacent
/// paragraphs never glue their boundary words together, while inline
/// markup (`<b>`, `<a>`, ...) stays inside the word it decorates.
pub fn plain_text(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let mut out = String::new();
    for child in fragment.root_element().children() {
        collect_text(child, &mut out);
    }
    out.trim().to_string()
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(text),
        Node::Element(element) => {
            let name = element.name();
            if matches!(name, "script" | "style" | "template" | "noscript") {
                return;
            }
            let block = is_block(name);
            if block {
                out.push('\n');
            }
            for child in node.children() {
                collect_text(child, out);
            }
            if block {
                out.push('\n');
            }
        }
        _ => {
            for child in node.children() {
                collect_text(child, out);
            }
        }
    }
}

fn is_block(name: &str) -> bool {
    matches!(
        name,
        "p" | "div"
            | "section"
            | "article"
            | "header"
            | "footer"
            | "aside"
            | "main"
            | "nav"
            | "figure"
            | "figcaption"
            | "blockquote"
            | "pre"
            | "ul"
            | "ol"
            | "li"
            | "dl"
            | "dt"
            | "dd"
            | "table"
            | "thead"
            | "tbody"
            | "tr"
            | "td"
            | "th"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "hr"
            | "br"
            | "address"
    )
}

#[cfg(test)]
mod tests {
    use super::{plain_text, reading_time_minutes, WhitespaceWordCounter, WordCounter};

    #[test]
    fn reading_time_rounds_up() {
        assert_eq!(reading_time_minutes(0), 0);
        assert_eq!(reading_time_minutes(1), 1);
        assert_eq!(reading_time_minutes(200), 1);
        assert_eq!(reading_time_minutes(201), 2);
        assert_eq!(reading_time_minutes(600), 3);
    }

    #[test]
    fn whitespace_runs_count_once() {
        let counter = WhitespaceWordCounter;
        assert_eq!(counter.count(""), 0);
        assert_eq!(counter.count("   \n\t "), 0);
        assert_eq!(counter.count("  one\n\ntwo\tthree  "), 3);
    }

    #[test]
    fn adjacent_paragraphs_do_not_merge_words() {
        let text = plain_text("<p>alpha beta</p><p>gamma</p><ul><li>one</li><li>two</li></ul>");
        assert_eq!(WhitespaceWordCounter.count(&text), 5);
    }

    #[test]
    fn inline_markup_stays_inside_words() {
        let text = plain_text("<p>un<b>believ</b>able <a href=\"#\">link</a></p>");
        assert_eq!(text, "unbelievable link");
    }

    #[test]
    fn scripts_are_not_text() {
        let text = plain_text("<p>visible</p><script>var hidden = 1;</script>");
        assert_eq!(text, "visible");
    }
}
