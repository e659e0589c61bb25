use super::load_session;
use anyhow::Result;
use std::path::Path;
use varview::Config;

/// Stylesheet for the tree at `path`.
pub fn run(config: &Config, path: &Path) -> Result<String> {
    let (_host, session) = load_session(config, path)?;
    Ok(session.stylesheet().unwrap_or_default().to_string())
}
