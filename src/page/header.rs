use anyhow::{Context, Result};
use std::fmt;
use tracing::{debug, info};

use super::PageDriver;
use crate::config::{HeaderSelectors, Timeouts};
use crate::errors::PulseprobeError;
use crate::locator::Locator;
use crate::types::{ColorScheme, Theme};

/// Header elements addressable through [`Header::get_element`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderElement {
    Container,
    /// Caption of the theme dropdown
    ThemeLabel,
}

impl fmt::Display for HeaderElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderElement::Container => f.write_str("container"),
            HeaderElement::ThemeLabel => f.write_str("theme label"),
        }
    }
}

/// Page header with the theme switcher
pub struct Header<'a> {
    driver: &'a dyn PageDriver,
    selectors: &'a HeaderSelectors,
    timeouts: &'a Timeouts,
}

impl<'a> Header<'a> {
    pub fn new(
        driver: &'a dyn PageDriver,
        selectors: &'a HeaderSelectors,
        timeouts: &'a Timeouts,
    ) -> Self {
        Self {
            driver,
            selectors,
            timeouts,
        }
    }

    fn theme_option(&self, theme: Theme) -> &'a Locator {
        match theme {
            Theme::System => &self.selectors.theme_system,
            Theme::Light => &self.selectors.theme_light,
            Theme::Dark => &self.selectors.theme_dark,
        }
    }

    /// Open the theme dropdown and pick `theme`, then let the page re-render
    pub async fn select_theme(&self, theme: Theme) -> Result<()> {
        info!("Selecting {} theme", theme);
        let result: Result<()> = async {
            self.driver
                .wait_for_visible(
                    &self.selectors.theme_dropdown,
                    self.timeouts.action(),
                    self.timeouts.poll_interval(),
                )
                .await?;
            self.driver.click(&self.selectors.theme_dropdown).await?;

            let option = self.theme_option(theme);
            self.driver
                .wait_for_visible(option, self.timeouts.action(), self.timeouts.poll_interval())
                .await?;
            self.driver.click(option).await?;

            tokio::time::sleep(self.timeouts.theme_settle()).await;
            Ok(())
        }
        .await;

        result.with_context(|| format!("Failed to select theme {}", theme))
    }

    /// Color scheme computed on the root element
    pub async fn current_theme(&self) -> Result<ColorScheme> {
        let value = self
            .driver
            .evaluate(
                "return window.getComputedStyle(document.documentElement).colorScheme;",
                vec![],
            )
            .await
            .context("Failed to get current theme")?;

        let scheme = value.as_str().unwrap_or_default().trim().to_string();
        debug!("Computed color scheme: {:?}", scheme);
        match scheme.as_str() {
            "light" => Ok(ColorScheme::Light),
            "dark" => Ok(ColorScheme::Dark),
            _ => Err(PulseprobeError::UnexpectedTheme(scheme).into()),
        }
    }

    pub async fn is_header_visible(&self) -> bool {
        self.driver
            .wait_for_visible(
                &self.selectors.container,
                self.timeouts.fast(),
                self.timeouts.poll_interval(),
            )
            .await
            .is_ok()
    }

    /// Locator for `element` once it is visible
    pub async fn get_element(&self, element: HeaderElement) -> Result<Locator> {
        let locator = match element {
            HeaderElement::Container => &self.selectors.container,
            HeaderElement::ThemeLabel => &self.selectors.theme_label,
        };

        self.driver
            .wait_for_visible(locator, self.timeouts.fast(), self.timeouts.poll_interval())
            .await
            .with_context(|| format!("Could not get element {}", element))?;
        Ok(locator.clone())
    }
}

#[cfg(test)]
#[path = "header_test.rs"]
mod header_test;
