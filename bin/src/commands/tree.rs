use super::load_session;
use anyhow::Result;
use std::path::Path;
use varview::Config;

/// Indented outline of the decoration forest for the tree at `path`.
pub fn run(config: &Config, path: &Path) -> Result<String> {
    let (_host, session) = load_session(config, path)?;
    Ok(session.forest().outline())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{write_tree, DOCUMENT};

    #[test]
    fn outlines_nested_branches() {
        let (_dir, path) = write_tree(DOCUMENT);
        let outline = run(&Config::default(), &path).unwrap();
        assert_eq!(
            outline,
            "[2, 5) DEC defbranch dimension-marker-DEC-defbranch\n  \
             [3, 4) INNER ndefbranch dimension-marker-DEC-defbranch-INNER-ndefbranch\n\
             [6, 7) DEC ndefbranch dimension-marker-DEC-ndefbranch\n"
        );
    }
}
