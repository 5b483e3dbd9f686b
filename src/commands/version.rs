use anyhow::Result;

use crate::config::{DEFAULT_BASE_URL, SuiteConfig};

pub async fn handle_version() -> Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const NAME: &str = env!("CARGO_PKG_NAME");
    const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

    println!("{} v{}", NAME, VERSION);
    println!("{}", DESCRIPTION);
    println!("Default dashboard: {}", DEFAULT_BASE_URL);

    if let Some(path) = SuiteConfig::default_path() {
        let state = if path.exists() { "found" } else { "not found" };
        println!("Config file: {} ({})", path.display(), state);
    }
    Ok(())
}
