use anyhow::{Context, Result};
use std::fmt;
use tracing::{debug, info};

use super::PageDriver;
use crate::config::{SearchBarSelectors, Timeouts};
use crate::locator::Locator;

/// Search bar elements addressable through [`SearchBar::get_element`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchBarElement {
    Container,
    Input,
    Dropdown,
    Results,
    NoResults,
}

impl fmt::Display for SearchBarElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchBarElement::Container => "container",
            SearchBarElement::Input => "input",
            SearchBarElement::Dropdown => "dropdown",
            SearchBarElement::Results => "results",
            SearchBarElement::NoResults => "no results",
        };
        f.write_str(name)
    }
}

/// Project search form
pub struct SearchBar<'a> {
    driver: &'a dyn PageDriver,
    selectors: &'a SearchBarSelectors,
    timeouts: &'a Timeouts,
}

impl<'a> SearchBar<'a> {
    pub fn new(
        driver: &'a dyn PageDriver,
        selectors: &'a SearchBarSelectors,
        timeouts: &'a Timeouts,
    ) -> Self {
        Self {
            driver,
            selectors,
            timeouts,
        }
    }

    /// Type `name` into the search input and wait for the result whose text is
    /// exactly `name`. Returns a locator for that result.
    ///
    /// `react` never matches `react-dom` or `preact`; the comparison is on the
    /// whole trimmed text and is case sensitive.
    pub async fn search_for_project(&self, name: &str) -> Result<Locator> {
        let action = self.timeouts.action();
        let poll = self.timeouts.poll_interval();

        let result: Result<Locator> = async {
            self.driver
                .wait_for_visible(&self.selectors.input, action, poll)
                .await?;
            self.driver.fill(&self.selectors.input, name).await?;
            self.driver.click(&self.selectors.input).await?;

            self.driver
                .wait_for_visible(&self.selectors.dropdown, action, poll)
                .await?;

            let exact = self.selectors.results.with_exact_text(name);
            debug!("Waiting for search result {}", exact);
            self.driver.wait_for_visible(&exact, action, poll).await?;
            Ok(exact)
        }
        .await;

        result.with_context(|| format!("Failed to search for project {}", name))
    }

    /// Search for `name` and click the exact match
    pub async fn select_project(&self, name: &str) -> Result<()> {
        info!("Selecting project {}", name);
        let result: Result<()> = async {
            let project = self.search_for_project(name).await?;
            self.driver.click(&project).await
        }
        .await;

        result.with_context(|| format!("Failed to select project {}", name))
    }

    pub async fn is_search_bar_visible(&self) -> bool {
        self.driver
            .wait_for_visible(
                &self.selectors.container,
                self.timeouts.fast(),
                self.timeouts.poll_interval(),
            )
            .await
            .is_ok()
    }

    pub async fn get_element(&self, element: SearchBarElement) -> Result<Locator> {
        let locator = match element {
            SearchBarElement::Container => &self.selectors.container,
            SearchBarElement::Input => &self.selectors.input,
            SearchBarElement::Dropdown => &self.selectors.dropdown,
            SearchBarElement::Results => &self.selectors.results,
            SearchBarElement::NoResults => &self.selectors.no_results,
        };

        self.driver
            .wait_for_visible(locator, self.timeouts.fast(), self.timeouts.poll_interval())
            .await
            .with_context(|| format!("Could not get element {}", element))?;
        Ok(locator.clone())
    }
}

#[cfg(test)]
#[path = "search_bar_test.rs"]
mod search_bar_test;
