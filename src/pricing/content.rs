use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use scraper::{ElementRef, Html, Node, Selector};

/// Chrome elements whose text never describes the page's own offering
const EXCLUDED_TAGS: &[&str] = &[
    "script", "style", "noscript", "header", "footer", "nav", "aside", "iframe",
];

/// Evidence that a page talks about concrete prices: currency amounts,
/// ranges, "from $X" phrasing, and percentage discounts
static PRICE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\$\s*\d+(?:,\d{3})*(?:\.\d{2})?",
        r"\d+(?:,\d{3})*(?:\.\d{2})?\s*(?:USD|dollars?)",
        r"from\s+\$\d+",
        r"starting\s+(?:at\s+)?\$\d+",
        r"\$\d+\s*[-\u{2013}]\s*\$\d+",
        r"(?:only|just)\s+\$\d+",
        r"\d+%\s*off",
        r"save\s+\$?\d+",
    ]
    .iter()
    .map(|pattern| {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .unwrap()
    })
    .collect()
});

/// Distilled text of one page
#[derive(Debug, Clone, Default)]
pub struct PageText {
    pub title: String,
    pub description: String,
    pub content: String,
}

/// Returns true when the text carries at least one price pattern
pub fn has_price_content(text: &str) -> bool {
    PRICE_PATTERNS.iter().any(|pattern| pattern.is_match(text))
}

/// Extracts the title, meta description, and body text of a page
///
/// Body text skips script/style/navigation chrome, and consecutive
/// duplicate lines (menus repeated for mobile layouts, mostly) collapse to
/// one.
pub fn extract_page_text(html: &str) -> PageText {
    let document = Html::parse_document(html);

    let title_selector = Selector::parse("title").unwrap();
    let title = document
        .select(&title_selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let meta_selector = Selector::parse(r#"meta[name="description"]"#).unwrap();
    let description = document
        .select(&meta_selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|value| value.trim().to_string())
        .unwrap_or_default();

    let body_selector = Selector::parse("body").unwrap();
    let scope = document
        .select(&body_selector)
        .next()
        .unwrap_or_else(|| document.root_element());

    let mut lines = Vec::new();
    collect_text(scope, &mut lines);

    let mut content_lines: Vec<&str> = Vec::new();
    for line in &lines {
        if content_lines.last() != Some(&line.as_str()) {
            content_lines.push(line);
        }
    }

    PageText {
        title,
        description,
        content: content_lines.join("\n"),
    }
}

fn collect_text(element: ElementRef, out: &mut Vec<String>) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.text.trim();
                if !trimmed.is_empty() {
                    out.push(trimmed.to_string());
                }
            }
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    if !EXCLUDED_TAGS.contains(&child_element.value().name()) {
                        collect_text(child_element, out);
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dollar_amounts_detected() {
        assert!(has_price_content("A relaxing massage for $99"));
        assert!(has_price_content("Full package: $1,250.00 per month"));
        assert!(has_price_content("facial from $45"));
        assert!(has_price_content("Starting at $30 per session"));
    }

    #[test]
    fn test_ranges_and_discounts_detected() {
        assert!(has_price_content("Treatments run $100 - $200"));
        assert!(has_price_content("Summer special: 20% off all services"));
        assert!(has_price_content("Save $50 on your first visit"));
        assert!(has_price_content("only $75 this week"));
        assert!(has_price_content("120 USD per hour"));
    }

    #[test]
    fn test_plain_text_not_detected() {
        assert!(!has_price_content("Contact us to learn about our services"));
        assert!(!has_price_content("Open Monday through Saturday"));
        assert!(!has_price_content(""));
    }

    #[test]
    fn test_title_and_description_extracted() {
        let html = r#"<html><head>
            <title> Acme Spa - Pricing </title>
            <meta name="description" content="Spa services and prices">
        </head><body><p>Welcome</p></body></html>"#;

        let page = extract_page_text(html);
        assert_eq!(page.title, "Acme Spa - Pricing");
        assert_eq!(page.description, "Spa services and prices");
        assert_eq!(page.content, "Welcome");
    }

    #[test]
    fn test_chrome_elements_stripped() {
        let html = r#"<html><body>
            <nav>Home | About | Contact</nav>
            <script>var x = "$999 fake";</script>
            <style>.price { color: red; }</style>
            <main><p>Massage $80</p></main>
            <footer>Copyright</footer>
        </body></html>"#;

        let page = extract_page_text(html);
        assert_eq!(page.content, "Massage $80");
    }

    #[test]
    fn test_consecutive_duplicate_lines_collapsed() {
        let html = r#"<html><body>
            <div>Book now</div>
            <div>Book now</div>
            <div>Gift cards</div>
        </body></html>"#;

        let page = extract_page_text(html);
        assert_eq!(page.content, "Book now\nGift cards");
    }

    #[test]
    fn test_missing_head_yields_empty_title() {
        let page = extract_page_text("<html><body><p>Just a body</p></body></html>");
        assert!(page.title.is_empty());
        assert!(page.description.is_empty());
        assert_eq!(page.content, "Just a body");
    }
}
