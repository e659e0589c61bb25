use super::load_session;
use anyhow::Result;
use std::{fmt::Write as _, path::Path};
use varview::{Config, Visibility};

/// Directive rows for the tree at `path`, one per line with their visibility.
pub fn run(config: &Config, path: &Path) -> Result<String> {
    let (_host, session) = load_session(config, path)?;
    let predicates = session.predicates();

    let mut out = String::new();
    for row in predicates.tracked_rows() {
        let state = match predicates.visibility(row) {
            Some(Visibility::Hidden) => "hidden",
            Some(Visibility::Shown) => "shown",
            None => continue,
        };
        writeln!(out, "{row}\t{state}")?;
    }
    Ok(out)
}
