use anyhow::Result;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

lazy_static! {
    static ref ROLE_SELECTOR: Regex =
        Regex::new(r#"^role=([a-z]+)(?:\[name="([^"]*)"\])?$"#).expect("valid role pattern");
}

/// Query language a locator resolves through
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Query {
    Css(String),
    XPath(String),
}

/// Re-resolvable reference to zero or more elements on the page.
///
/// Locators are written as selector strings in the configuration:
///
/// - `role=menuitem[name="Dark"]` matches by ARIA role and accessible name
/// - `text="No project found."` matches an element whose own text equals the value
/// - `xpath=//table//td` (or any string starting with `//`) is passed through as XPath
/// - anything else, optionally prefixed with `css=`, is a CSS selector
///
/// An optional exact-text filter narrows the matches to elements whose trimmed
/// text equals the given string (case sensitive, whole string).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locator {
    source: String,
    query: Query,
    exact_text: Option<String>,
}

impl Locator {
    /// Parse a selector string
    pub fn parse(selector: &str) -> Result<Self> {
        let selector = selector.trim();
        if selector.is_empty() {
            anyhow::bail!("Empty selector");
        }

        let query = if let Some(rest) = selector.strip_prefix("xpath=") {
            Query::XPath(rest.to_string())
        } else if selector.starts_with("//") {
            Query::XPath(selector.to_string())
        } else if selector.starts_with("role=") {
            let captures = ROLE_SELECTOR
                .captures(selector)
                .ok_or_else(|| anyhow::anyhow!("Invalid role selector: {}", selector))?;
            let role = &captures[1];
            let name = captures.get(2).map(|m| m.as_str());
            Query::XPath(role_xpath(role, name))
        } else if let Some(rest) = selector.strip_prefix("text=") {
            let text = rest.trim_matches('"');
            Query::XPath(format!(
                "//*[normalize-space(text())={}]",
                xpath_literal(text)
            ))
        } else {
            let css = selector.strip_prefix("css=").unwrap_or(selector);
            Query::Css(css.to_string())
        };

        Ok(Locator {
            source: selector.to_string(),
            query,
            exact_text: None,
        })
    }

    /// CSS selector locator
    pub fn css(selector: &str) -> Self {
        Locator {
            source: selector.to_string(),
            query: Query::Css(selector.to_string()),
            exact_text: None,
        }
    }

    /// ARIA role locator with an optional accessible name
    pub fn role(role: &str, name: Option<&str>) -> Self {
        let source = match name {
            Some(name) => format!("role={}[name=\"{}\"]", role, name),
            None => format!("role={}", role),
        };
        Locator {
            source,
            query: Query::XPath(role_xpath(role, name)),
            exact_text: None,
        }
    }

    /// Locator for an element whose own text equals `text`
    pub fn text(text: &str) -> Self {
        Locator {
            source: format!("text=\"{}\"", text),
            query: Query::XPath(format!(
                "//*[normalize-space(text())={}]",
                xpath_literal(text)
            )),
            exact_text: None,
        }
    }

    /// Narrow this locator to elements whose full trimmed text equals `text`
    pub fn with_exact_text(&self, text: &str) -> Self {
        Locator {
            source: self.source.clone(),
            query: self.query.clone(),
            exact_text: Some(text.to_string()),
        }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn exact_text(&self) -> Option<&str> {
        self.exact_text.as_deref()
    }

    /// JavaScript expression evaluating to the first element the query matches, or null.
    /// The exact-text filter is not applied.
    pub fn js_lookup(&self) -> String {
        match &self.query {
            Query::Css(css) => format!(
                "document.querySelector({})",
                serde_json::Value::String(css.clone())
            ),
            Query::XPath(xpath) => format!(
                "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
                serde_json::Value::String(xpath.clone())
            ),
        }
    }

    /// Whether an element with the given text passes the exact-text filter
    pub fn accepts_text(&self, text: &str) -> bool {
        match &self.exact_text {
            Some(expected) => text.trim() == expected,
            None => true,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.exact_text {
            Some(text) => write!(f, "{} >> text=\"{}\"", self.source, text),
            None => f.write_str(&self.source),
        }
    }
}

impl TryFrom<String> for Locator {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        Locator::parse(&value)
    }
}

impl From<Locator> for String {
    fn from(locator: Locator) -> Self {
        locator.source
    }
}

/// Build an XPath matching an explicit or implicit ARIA role and accessible name
fn role_xpath(role: &str, name: Option<&str>) -> String {
    let role_literal = xpath_literal(role);
    let implicit = match role {
        "radio" => " or (local-name()='input' and @type='radio')",
        "button" => " or local-name()='button'",
        "option" => " or local-name()='option'",
        "table" => " or local-name()='table'",
        "listbox" => " or local-name()='select'",
        _ => "",
    };
    let role_test = format!("(@role={}{})", role_literal, implicit);

    match name {
        Some(name) => {
            let name_literal = xpath_literal(name);
            format!(
                "//*[{} and (@aria-label={} or @title={} or normalize-space(.)={})]",
                role_test, name_literal, name_literal, name_literal
            )
        }
        None => format!("//*[{}]", role_test),
    }
}

/// Quote a string as an XPath 1.0 literal
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{}'", value)
    } else if !value.contains('"') {
        format!("\"{}\"", value)
    } else {
        let parts: Vec<String> = value.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

#[cfg(test)]
#[path = "locator_test.rs"]
mod locator_test;
