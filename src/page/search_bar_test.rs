// Unit tests for project search

use super::*;
use crate::config::Selectors;
use crate::page::fake::{FakePage, Reaction, short_timeouts};
use pretty_assertions::assert_eq;

fn searchable_page(selectors: &SearchBarSelectors, results: &[&str]) -> FakePage {
    let page = FakePage::new();
    page.show(&selectors.container);
    page.show(&selectors.input);

    let mut reactions = vec![Reaction::Show(selectors.dropdown.clone())];
    for result in results {
        reactions.push(Reaction::Show(selectors.results.with_exact_text(result)));
    }
    page.on_click(&selectors.input, reactions);
    page
}

#[tokio::test]
async fn test_search_returns_exact_match() {
    let selectors = Selectors::default().search_bar;
    let timeouts = short_timeouts();
    let page = searchable_page(&selectors, &["react", "react-dom", "preact"]);

    let search = SearchBar::new(&page, &selectors, &timeouts);
    let result = search.search_for_project("react").await.unwrap();

    assert_eq!(result.exact_text(), Some("react"));
    assert!(!result.accepts_text("react-dom"));
    assert_eq!(
        page.state().fills,
        vec![(selectors.input.to_string(), "react".to_string())]
    );
}

#[tokio::test]
async fn test_select_project_clicks_result() {
    let selectors = Selectors::default().search_bar;
    let timeouts = short_timeouts();
    let page = searchable_page(&selectors, &["vue"]);
    page.on_click(
        &selectors.results.with_exact_text("vue"),
        vec![Reaction::SetUrl("https://www.package-pulse.com/?projects=vue".to_string())],
    );

    let search = SearchBar::new(&page, &selectors, &timeouts);
    search.select_project("vue").await.unwrap();

    assert_eq!(
        page.clicks().last().unwrap(),
        &selectors.results.with_exact_text("vue").to_string()
    );
    assert_eq!(page.state().url, "https://www.package-pulse.com/?projects=vue");
}

#[tokio::test]
async fn test_search_without_exact_match_fails() {
    let selectors = Selectors::default().search_bar;
    let timeouts = short_timeouts();
    // Only partial matches are listed
    let page = searchable_page(&selectors, &["react-dom", "preact"]);

    let search = SearchBar::new(&page, &selectors, &timeouts);
    let err = search.select_project("react").await.unwrap_err();

    assert_eq!(err.to_string(), "Failed to select project react");
    let chain: Vec<String> = err.chain().map(|c| c.to_string()).collect();
    assert!(chain.contains(&"Failed to search for project react".to_string()));
    assert!(chain.iter().any(|c| c.contains("did not become visible")));
}

#[tokio::test]
async fn test_get_element_maps_every_identifier() {
    let selectors = Selectors::default().search_bar;
    let timeouts = short_timeouts();
    let page = FakePage::new();
    let search = SearchBar::new(&page, &selectors, &timeouts);

    let cases = [
        (SearchBarElement::Container, &selectors.container),
        (SearchBarElement::Input, &selectors.input),
        (SearchBarElement::Dropdown, &selectors.dropdown),
        (SearchBarElement::Results, &selectors.results),
        (SearchBarElement::NoResults, &selectors.no_results),
    ];
    for (element, locator) in cases {
        assert!(search.get_element(element).await.is_err());
        page.show(locator);
        assert_eq!(&search.get_element(element).await.unwrap(), locator);
    }

    assert!(search.is_search_bar_visible().await);
    assert_eq!(SearchBarElement::NoResults.to_string(), "no results");
}
