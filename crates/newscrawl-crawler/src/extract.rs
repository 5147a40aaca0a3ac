//! Declarative article-body extraction.
//!
//! Each source describes where its body lives and what to throw away as an
//! [`ExtractionProfile`]; [`ExtractionProfile::extract`] is the only routine
//! that interprets one. Selectors are plain CSS strings; one that fails to
//! parse is logged and skipped rather than aborting the page.

use scraper::{ElementRef, Html, Selector};

const DEFAULT_EXCLUDED: &[&str] = &["aside", "footer", "script", "style", "figure"];

/// A deny rule for paragraph lines that are site chrome, not article text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boilerplate {
    StartsWith(&'static str),
    StartsWithIgnoreCase(&'static str),
    Contains(&'static str),
}

impl Boilerplate {
    #[must_use]
    pub fn matches(&self, line: &str) -> bool {
        match self {
            Self::StartsWith(prefix) => line.starts_with(prefix),
            Self::StartsWithIgnoreCase(prefix) => line
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix)),
            Self::Contains(needle) => line.contains(needle),
        }
    }
}

/// Where to read one optional field (author, section) from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    /// Text of the first matching element.
    Text(&'static str),
    /// Attribute value of the first matching element.
    Attr(&'static str, &'static str),
    /// Text of the n-th (zero-based) matching element, e.g. a breadcrumb level.
    NthText(&'static str, usize),
}

/// Secondary block selector for containers that hold no paragraph elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockFallback {
    pub selector: &'static str,
    /// Blocks shorter than this many characters are ignored.
    pub min_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionProfile {
    /// Tried in order; the first selector matching any element wins.
    pub containers: Vec<&'static str>,
    pub paragraph: &'static str,
    pub excluded_ancestors: Vec<&'static str>,
    pub boilerplate: Vec<Boilerplate>,
    pub block_fallback: Option<BlockFallback>,
    pub author: Vec<FieldRule>,
    pub section: Vec<FieldRule>,
}

/// What one profile pulled out of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub body_text: String,
    pub author: Option<String>,
    pub section: Option<String>,
}

impl ExtractionProfile {
    /// A profile reading `<p>` elements from the first matching container,
    /// ignoring the usual non-article ancestors.
    #[must_use]
    pub fn new(containers: &[&'static str]) -> Self {
        Self {
            containers: containers.to_vec(),
            paragraph: "p",
            excluded_ancestors: DEFAULT_EXCLUDED.to_vec(),
            boilerplate: Vec::new(),
            block_fallback: None,
            author: Vec::new(),
            section: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_boilerplate(mut self, rules: &[Boilerplate]) -> Self {
        self.boilerplate = rules.to_vec();
        self
    }

    #[must_use]
    pub fn with_block_fallback(mut self, selector: &'static str, min_len: usize) -> Self {
        self.block_fallback = Some(BlockFallback { selector, min_len });
        self
    }

    #[must_use]
    pub fn with_author(mut self, rules: &[FieldRule]) -> Self {
        self.author = rules.to_vec();
        self
    }

    #[must_use]
    pub fn with_section(mut self, rules: &[FieldRule]) -> Self {
        self.section = rules.to_vec();
        self
    }

    /// Every CSS selector this profile references, for validation.
    #[must_use]
    pub fn selectors(&self) -> Vec<&'static str> {
        let mut all = self.containers.clone();
        all.push(self.paragraph);
        all.extend(self.block_fallback.map(|fb| fb.selector));
        all.extend(self.author.iter().chain(&self.section).map(|rule| match rule {
            FieldRule::Text(css) | FieldRule::Attr(css, _) | FieldRule::NthText(css, _) => *css,
        }));
        all
    }

    /// Extract the article body and optional fields from an HTML page.
    ///
    /// Returns `None` when no container matches or no text survives the
    /// exclusion and boilerplate rules.
    #[must_use]
    pub fn extract(&self, html: &str) -> Option<Extracted> {
        let document = Html::parse_document(html);

        let container = self
            .containers
            .iter()
            .filter_map(|css| parse_selector(css))
            .find_map(|selector| document.select(&selector).next())?;

        let mut lines = self.paragraph_lines(container);
        if lines.is_empty() {
            lines = self.fallback_lines(container);
        }
        if lines.is_empty() {
            return None;
        }

        Some(Extracted {
            body_text: lines.join("\n"),
            author: first_field(&document, &self.author),
            section: first_field(&document, &self.section),
        })
    }

    fn paragraph_lines(&self, container: ElementRef<'_>) -> Vec<String> {
        let Some(paragraph) = parse_selector(self.paragraph) else {
            return Vec::new();
        };
        container
            .select(&paragraph)
            .filter(|p| !self.is_excluded(*p, container))
            .map(element_text)
            .filter(|line| self.keep_line(line))
            .collect()
    }

    fn fallback_lines(&self, container: ElementRef<'_>) -> Vec<String> {
        let Some(fallback) = self.block_fallback else {
            return Vec::new();
        };
        let Some(selector) = parse_selector(fallback.selector) else {
            return Vec::new();
        };
        container
            .select(&selector)
            .filter(|block| !self.is_excluded(*block, container))
            .map(element_text)
            .filter(|line| line.chars().count() >= fallback.min_len && self.keep_line(line))
            .collect()
    }

    fn keep_line(&self, line: &str) -> bool {
        !line.is_empty() && !self.boilerplate.iter().any(|rule| rule.matches(line))
    }

    /// Whether an excluded element sits between `element` and `container`.
    fn is_excluded(&self, element: ElementRef<'_>, container: ElementRef<'_>) -> bool {
        for node in element.ancestors() {
            if node.id() == container.id() {
                return false;
            }
            if let Some(el) = node.value().as_element() {
                if self.excluded_ancestors.contains(&el.name()) {
                    return true;
                }
            }
        }
        false
    }
}

fn parse_selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::warn!(selector = css, error = %e, "invalid CSS selector skipped");
            None
        }
    }
}

/// Element text with runs of whitespace collapsed to single spaces.
fn element_text(element: ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<String>())
}

pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_field(document: &Html, rules: &[FieldRule]) -> Option<String> {
    rules.iter().find_map(|rule| {
        let value = match *rule {
            FieldRule::Text(css) => {
                let selector = parse_selector(css)?;
                document.select(&selector).next().map(element_text)
            }
            FieldRule::Attr(css, attr) => {
                let selector = parse_selector(css)?;
                document
                    .select(&selector)
                    .find_map(|el| el.value().attr(attr))
                    .map(normalize_whitespace)
            }
            FieldRule::NthText(css, n) => {
                let selector = parse_selector(css)?;
                document.select(&selector).nth(n).map(element_text)
            }
        }?;
        (!value.is_empty()).then_some(value)
    })
}
