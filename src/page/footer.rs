use anyhow::{Context, Result};
use std::fmt;

use super::PageDriver;
use crate::config::{FooterSelectors, Timeouts};
use crate::locator::Locator;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FooterElement {
    Container,
}

impl fmt::Display for FooterElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FooterElement::Container => f.write_str("container"),
        }
    }
}

pub struct Footer<'a> {
    driver: &'a dyn PageDriver,
    selectors: &'a FooterSelectors,
    timeouts: &'a Timeouts,
}

impl<'a> Footer<'a> {
    pub fn new(
        driver: &'a dyn PageDriver,
        selectors: &'a FooterSelectors,
        timeouts: &'a Timeouts,
    ) -> Self {
        Self {
            driver,
            selectors,
            timeouts,
        }
    }

    pub async fn is_footer_visible(&self) -> bool {
        self.driver
            .wait_for_visible(
                &self.selectors.container,
                self.timeouts.fast(),
                self.timeouts.poll_interval(),
            )
            .await
            .is_ok()
    }

    pub async fn get_element(&self, element: FooterElement) -> Result<Locator> {
        let locator = match element {
            FooterElement::Container => &self.selectors.container,
        };

        self.driver
            .wait_for_visible(locator, self.timeouts.fast(), self.timeouts.poll_interval())
            .await
            .with_context(|| format!("Could not get element {}", element))?;
        Ok(locator.clone())
    }
}
