// Unit tests for selector parsing

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_css_selectors() {
    let locator = Locator::parse("header.flex").unwrap();
    assert_eq!(locator.query(), &Query::Css("header.flex".to_string()));
    assert_eq!(locator.to_string(), "header.flex");

    let locator = Locator::parse("css=#search").unwrap();
    assert_eq!(locator.query(), &Query::Css("#search".to_string()));
}

#[test]
fn test_role_selector_with_name() {
    let locator = Locator::parse(r#"role=menuitem[name="Dark"]"#).unwrap();
    match locator.query() {
        Query::XPath(xpath) => {
            assert!(xpath.contains("@role='menuitem'"));
            assert!(xpath.contains("normalize-space(.)='Dark'"));
            assert!(xpath.contains("@aria-label='Dark'"));
        }
        other => panic!("expected xpath, got {other:?}"),
    }
    assert_eq!(
        Locator::role("menuitem", Some("Dark")).query(),
        locator.query()
    );
}

#[test]
fn test_role_selector_includes_implicit_roles() {
    let locator = Locator::parse(r#"role=radio[name="Toggle stats"]"#).unwrap();
    match locator.query() {
        Query::XPath(xpath) => {
            assert!(xpath.contains("local-name()='input' and @type='radio'"));
            assert!(xpath.contains("'Toggle stats'"));
        }
        other => panic!("expected xpath, got {other:?}"),
    }
}

#[test]
fn test_text_selector() {
    let locator = Locator::parse(r#"text="No project found.""#).unwrap();
    assert_eq!(
        locator.query(),
        &Query::XPath("//*[normalize-space(text())='No project found.']".to_string())
    );
}

#[test]
fn test_xpath_passthrough() {
    let locator = Locator::parse("//table//td").unwrap();
    assert_eq!(locator.query(), &Query::XPath("//table//td".to_string()));

    let locator = Locator::parse("xpath=//footer").unwrap();
    assert_eq!(locator.query(), &Query::XPath("//footer".to_string()));
}

#[test]
fn test_invalid_selectors() {
    assert!(Locator::parse("").is_err());
    assert!(Locator::parse("   ").is_err());
    assert!(Locator::parse("role=menuitem[name=Dark]").is_err());
}

#[test]
fn test_exact_text_filter() {
    let options = Locator::css(r#"[role="option"]"#).with_exact_text("react");

    assert!(options.accepts_text("react"));
    assert!(options.accepts_text("  react \n"));
    assert!(!options.accepts_text("react-dom"));
    assert!(!options.accepts_text("preact"));
    assert!(!options.accepts_text("React"));
    assert_eq!(options.exact_text(), Some("react"));
    assert_eq!(options.to_string(), r#"[role="option"] >> text="react""#);

    // Unfiltered locators accept anything
    assert!(Locator::css("li").accepts_text("whatever"));
}

#[test]
fn test_xpath_literal_quoting() {
    assert_eq!(xpath_literal("plain"), "'plain'");
    assert_eq!(xpath_literal("it's"), "\"it's\"");
    assert_eq!(
        xpath_literal(r#"it's "quoted""#),
        r#"concat('it', "'", 's "quoted"')"#
    );
}

#[test]
fn test_js_lookup_quotes_query() {
    let css = Locator::css(r#"[role="application"]"#);
    assert_eq!(
        css.js_lookup(),
        r#"document.querySelector("[role=\"application\"]")"#
    );

    let xpath = Locator::parse("//footer").unwrap();
    assert!(xpath.js_lookup().starts_with(r#"document.evaluate("//footer", document"#));
    assert!(xpath.js_lookup().ends_with(".singleNodeValue"));
}

#[test]
fn test_serde_uses_selector_string() {
    let locator: Locator = serde_json::from_str(r#""role=radio[name=\"Toggle info\"]""#).unwrap();
    assert_eq!(locator.to_string(), r#"role=radio[name="Toggle info"]"#);

    let json = serde_json::to_string(&Locator::css("table")).unwrap();
    assert_eq!(json, r#""table""#);

    assert!(serde_json::from_str::<Locator>(r#""""#).is_err());
}
