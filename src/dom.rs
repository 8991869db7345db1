//! Narrow structured-document capability over the `scraper` crate.
//!
//! Extraction code goes through `Page`/`Node` only: find descendants by CSS
//! selector, read normalized text, read attributes, walk up to an ancestor.
//! Nothing outside this module names a `scraper` type.

use scraper::{ElementRef, Html, Selector};

/// A parsed HTML document.
pub struct Page {
    html: Html,
}

impl Page {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    pub fn root(&self) -> Node<'_> {
        Node {
            element: self.html.root_element(),
        }
    }
}

/// One element in the parsed tree.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    element: ElementRef<'a>,
}

impl<'a> Node<'a> {
    /// Descendants matching a CSS selector. An unparseable selector yields
    /// nothing, matching the never-fails contract of the extractors.
    pub fn find_all(&self, selector: &str) -> Vec<Node<'a>> {
        let Ok(selector) = Selector::parse(selector) else {
            return Vec::new();
        };
        self.element
            .select(&selector)
            .map(|element| Node { element })
            .collect()
    }

    pub fn find_first(&self, selector: &str) -> Option<Node<'a>> {
        self.find_all(selector).into_iter().next()
    }

    /// Text content with every fragment trimmed and joined by single spaces.
    pub fn text(&self) -> String {
        self.element
            .text()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.value().attr(name)
    }

    /// Nearest enclosing element with the given tag name.
    pub fn ancestor(&self, tag: &str) -> Option<Node<'a>> {
        self.element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|element| element.value().name() == tag)
            .map(|element| Node { element })
    }
}
