use anyhow::{Context, Result};
use url::Url;

use super::{Footer, Header, PackageCard, PageDriver, SearchBar};
use crate::config::SuiteConfig;
use crate::types::LoadState;

/// Dashboard landing page, composing its sections over one driver
pub struct HomePage<'a> {
    driver: &'a dyn PageDriver,
    config: &'a SuiteConfig,
    pub header: Header<'a>,
    pub search_bar: SearchBar<'a>,
    pub package_card: PackageCard<'a>,
    pub footer: Footer<'a>,
}

impl<'a> HomePage<'a> {
    pub fn new(driver: &'a dyn PageDriver, config: &'a SuiteConfig) -> Self {
        let selectors = &config.selectors;
        let timeouts = &config.timeouts;
        Self {
            driver,
            config,
            header: Header::new(driver, &selectors.header, timeouts),
            search_bar: SearchBar::new(driver, &selectors.search_bar, timeouts),
            package_card: PackageCard::new(driver, &selectors.package_card, timeouts),
            footer: Footer::new(driver, &selectors.footer, timeouts),
        }
    }

    /// Navigate to `path` under the configured base URL and wait for the DOM
    pub async fn open(&self, path: &str) -> Result<()> {
        let url = self.config.url_for(path);
        self.driver.goto(&url).await?;
        self.driver
            .wait_for_load_state(LoadState::DomContentLoaded, self.config.timeouts.slow())
            .await
    }

    /// URL of the page once network activity has settled
    pub async fn current_url(&self) -> Result<String> {
        let result: Result<String> = async {
            self.driver
                .wait_for_load_state(LoadState::NetworkIdle, self.config.timeouts.slow())
                .await?;
            let url = self.driver.current_url().await?;
            if url.is_empty() {
                anyhow::bail!("Could not get current URL");
            }
            Ok(url)
        }
        .await;

        result.context("Failed to get current URL")
    }

    /// Projects encoded in the `projects` query parameter, in selection order
    pub async fn selected_projects(&self) -> Result<Vec<String>> {
        let url = self.current_url().await?;
        projects_from_url(&url)
    }
}

/// Parse the comma separated `projects` query parameter
pub fn projects_from_url(url: &str) -> Result<Vec<String>> {
    let parsed = Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;
    let projects = parsed
        .query_pairs()
        .find(|(key, _)| key == "projects")
        .map(|(_, value)| {
            value
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();
    Ok(projects)
}

#[cfg(test)]
#[path = "home_page_test.rs"]
mod home_page_test;
