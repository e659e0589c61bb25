//! Headless renderings of a parser tree against [`MemoryHost`].

pub mod css;
pub mod predicates;
pub mod tree;

use anyhow::{Context, Result};
use std::path::Path;
use varview::{parse_tree, Config, MemoryHost, VariationalSession};

/// Parse the tree at `path` and resync a fresh session against it.
pub fn load_session(
    config: &Config,
    path: &Path,
) -> Result<(MemoryHost, VariationalSession<MemoryHost>)> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read tree file: {}", path.display()))?;
    let region = parse_tree(&json)
        .with_context(|| format!("Failed to parse tree file: {}", path.display()))?;

    let mut host = MemoryHost::new();
    let mut session = VariationalSession::from_config(&mut host, config);
    session
        .resync(&mut host, &region)
        .with_context(|| format!("Failed to decorate {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        decorations = session.forest().len(),
        dimensions = session.palette().len(),
        "loaded tree"
    );
    Ok((host, session))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// `#ifdef DEC` on row 1, `#else` on row 5, `#endif` on row 7, with a
    /// nested `#ifndef INNER` from row 2 to its `#endif` on row 4.
    pub const DOCUMENT: &str = r#"{
        "type": "region",
        "segments": [
            { "type": "text", "content": "int x;\n", "span": { "start": [0, 0], "end": [1, 0] } },
            {
                "type": "choice",
                "name": "DEC",
                "kind": "positive",
                "thenbranch": {
                    "type": "region",
                    "segments": [
                        {
                            "type": "choice",
                            "name": "INNER",
                            "kind": "contrapositive",
                            "thenbranch": {
                                "type": "region",
                                "segments": [{ "type": "text", "content": "y\n" }],
                                "span": { "start": [2, 0], "end": [4, 0] }
                            },
                            "elsebranch": { "type": "region", "segments": [] },
                            "span": { "start": [2, 0], "end": [4, 6] }
                        }
                    ],
                    "span": { "start": [1, 0], "end": [5, 0] }
                },
                "elsebranch": {
                    "type": "region",
                    "segments": [{ "type": "text", "content": "x--;\n" }],
                    "span": { "start": [5, 0], "end": [7, 0] }
                },
                "span": { "start": [1, 0], "end": [7, 6] }
            }
        ]
    }"#;

    pub fn write_tree(json: &str) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.json");
        std::fs::write(&path, json).unwrap();
        (dir, path)
    }
}
