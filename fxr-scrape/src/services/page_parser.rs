//! HTML parsing for article and index pages
//!
//! Article pages carry the title in `h1.entry-title` and the body in
//! `div.entry-content`; settings live in its `<p>` and `<li>` elements, often
//! separated by `<br>`. Each text node of a block becomes its own line so the
//! extractor sees one `Key: Value` per line.

use crate::types::Article;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use scraper::{Html, Selector};
use std::collections::BTreeSet;

/// Title used when the page has no `h1.entry-title`
pub const UNKNOWN_TITLE: &str = "Unknown Recipe";

/// Path segments that mark archive and navigation pages
const EXCLUDED_SEGMENTS: [&str; 3] = ["/tag/", "/category/", "/author/"];

static DATE_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\d{4}/\d{2}/\d{2}/").expect("date path pattern"));

struct PageSelectors {
    title: Selector,
    content: Selector,
    blocks: Selector,
    links: Selector,
}

static SELECTORS: Lazy<PageSelectors> = Lazy::new(|| PageSelectors {
    title: Selector::parse("h1.entry-title").expect("title selector"),
    content: Selector::parse("div.entry-content").expect("content selector"),
    blocks: Selector::parse("p, li").expect("block selector"),
    links: Selector::parse("a[href]").expect("link selector"),
});

/// Parse an article page; `None` when it has no entry content
pub fn parse_article(html: &str) -> Option<Article> {
    let document = Html::parse_document(html);

    let title = document
        .select(&SELECTORS.title)
        .next()
        .map(|el| el.text().collect::<String>().replace('\u{a0}', " ").trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

    let content = document.select(&SELECTORS.content).next()?;

    let blocks = content
        .select(&SELECTORS.blocks)
        .map(|el| el.text().collect::<Vec<_>>().join("\n"))
        .collect();

    Some(Article { title, blocks })
}

/// Recipe links found in an index page's entry content
///
/// Relative links are resolved against the index URL and fragments dropped.
/// Only links on the index page's host that look like dated recipe posts are
/// kept.
pub fn parse_index_links(html: &str, index_url: &str) -> BTreeSet<String> {
    let Ok(base) = Url::parse(index_url) else {
        return BTreeSet::new();
    };
    let document = Html::parse_document(html);
    let Some(content) = document.select(&SELECTORS.content).next() else {
        return BTreeSet::new();
    };

    content
        .select(&SELECTORS.links)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| base.join(href.trim()).ok())
        .filter(|url| url.host_str().is_some() && url.host_str() == base.host_str())
        .map(|mut url| {
            url.set_fragment(None);
            url.to_string()
        })
        .filter(|href| is_likely_recipe(href, index_url))
        .collect()
}

/// Whether a link looks like a recipe post rather than a navigation page
///
/// Recipe posts carry their publication date in the path (`/2023/05/12/`).
pub fn is_likely_recipe(href: &str, index_url: &str) -> bool {
    if href == index_url {
        return false;
    }
    if EXCLUDED_SEGMENTS.iter().any(|segment| href.contains(segment)) {
        return false;
    }
    DATE_PATH_RE.is_match(href)
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = "https://fujixweekly.com/fujifilm-x-trans-v-recipes/";

    #[test]
    fn test_parse_article_splits_br_lines() {
        let html = r#"
            <html><body>
            <h1 class="entry-title">Kodak&nbsp;Portra 400 v2</h1>
            <div class="entry-content">
              <p>Intro paragraph with no settings.</p>
              <p>Film Simulation: Classic Chrome<br>Dynamic Range: DR400<br>Highlight: -2</p>
              <ul><li>Grain Effect: Strong, Small</li></ul>
            </div>
            </body></html>
        "#;

        let article = parse_article(html).unwrap();

        assert_eq!(article.title, "Kodak Portra 400 v2");
        assert_eq!(article.blocks.len(), 3);
        assert_eq!(
            article.blocks[1],
            "Film Simulation: Classic Chrome\nDynamic Range: DR400\nHighlight: -2"
        );
        assert_eq!(article.blocks[2], "Grain Effect: Strong, Small");
    }

    #[test]
    fn test_parse_article_without_title_uses_fallback() {
        let html = r#"<div class="entry-content"><p>Shadow: +1</p></div>"#;
        let article = parse_article(html).unwrap();
        assert_eq!(article.title, UNKNOWN_TITLE);
        assert_eq!(article.blocks, vec!["Shadow: +1".to_string()]);
    }

    #[test]
    fn test_parse_article_without_content_is_none() {
        let html = r#"<h1 class="entry-title">About</h1><div class="sidebar"><p>x</p></div>"#;
        assert!(parse_article(html).is_none());
    }

    #[test]
    fn test_recipe_link_heuristic() {
        assert!(is_likely_recipe(
            "https://fujixweekly.com/2023/05/12/kodak-portra-400/",
            INDEX
        ));
        assert!(!is_likely_recipe(INDEX, INDEX));
        assert!(!is_likely_recipe("https://fujixweekly.com/tag/2023/05/12/", INDEX));
        assert!(!is_likely_recipe("https://fujixweekly.com/category/recipes/", INDEX));
        assert!(!is_likely_recipe("https://fujixweekly.com/author/ritchie/", INDEX));
        assert!(!is_likely_recipe("https://fujixweekly.com/about/", INDEX));
    }

    #[test]
    fn test_parse_index_links_filters_and_dedupes() {
        let html = r#"
            <div class="entry-content">
              <a href="https://fujixweekly.com/2023/05/12/portra/">Portra</a>
              <a href="https://fujixweekly.com/2023/05/12/portra/#comments">Portra comments</a>
              <a href="/2022/01/03/kodachrome-64/">Kodachrome</a>
              <a href="https://fujixweekly.com/tag/2023/05/12/x/">Tag</a>
              <a href="https://other.example.com/2023/05/12/copy/">Elsewhere</a>
              <a href="https://fujixweekly.com/fujifilm-x-trans-v-recipes/">Index</a>
            </div>
            <div class="sidebar">
              <a href="https://fujixweekly.com/2021/01/01/sidebar/">Sidebar</a>
            </div>
        "#;

        let links = parse_index_links(html, INDEX);

        let expected: BTreeSet<String> = [
            "https://fujixweekly.com/2022/01/03/kodachrome-64/",
            "https://fujixweekly.com/2023/05/12/portra/",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        assert_eq!(links, expected);
    }

    #[test]
    fn test_parse_index_links_without_content_is_empty() {
        assert!(parse_index_links("<p>nothing</p>", INDEX).is_empty());
        assert!(parse_index_links("<p>nothing</p>", "not a url").is_empty());
    }
}
