//! Relocate a subtree's files up to the tree root.
//!
//! Template authors keep dotfiles under a `dotfiles/` subfolder so the
//! distributed template tree ships no literal leading-dot filenames; this
//! stage drops the leading path segment of every match, preserving the
//! relative sub-path underneath it.

use glob::Pattern;
use serde_json::Value;

use crate::error::Result;
use crate::pipeline::{FileMap, Metadata, Stage};

const DOTFILES_PATTERN: &str = "dotfiles/*";

pub struct MoveUp {
    pattern: Pattern,
}

impl MoveUp {
    pub fn new(pattern: Pattern) -> Self {
        MoveUp { pattern }
    }
}

impl Default for MoveUp {
    fn default() -> Self {
        MoveUp {
            pattern: Pattern::new(DOTFILES_PATTERN).expect("builtin pattern parses"),
        }
    }
}

impl Stage for MoveUp {
    fn name(&self) -> &'static str {
        "move-up"
    }

    fn transform(&self, files: &mut FileMap, _metadata: &mut Metadata) -> Result<()> {
        let matches: Vec<String> = files
            .keys()
            .filter(|path| self.pattern.matches(path))
            .cloned()
            .collect();

        for path in matches {
            // Drop the leading segment; a match without one stays put.
            let Some((_, rest)) = path.split_once('/') else {
                continue;
            };
            let target = rest.to_string();

            if let Some(mut record) = files.remove(&path) {
                record
                    .metadata
                    .insert("movedFrom".to_string(), Value::String(path));
                files.insert(target, record);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::FileRecord;

    #[test]
    fn test_moves_subtree_to_root() {
        let mut files = FileMap::new();
        files.insert("dotfiles/npmrc".into(), FileRecord::new("registry=x\n"));
        files.insert("dotfiles/ci/lint.yml".into(), FileRecord::new("steps: []\n"));
        files.insert("src/index.js".into(), FileRecord::new("code"));

        MoveUp::default()
            .transform(&mut files, &mut Metadata::new())
            .unwrap();

        let keys: Vec<_> = files.keys().cloned().collect();
        assert_eq!(keys, ["ci/lint.yml", "npmrc", "src/index.js"]);
        assert_eq!(
            files["npmrc"].metadata["movedFrom"],
            serde_json::json!("dotfiles/npmrc")
        );
    }

    #[test]
    fn test_contents_survive_the_move() {
        let mut files = FileMap::new();
        files.insert("dotfiles/npmrc".into(), FileRecord::new("registry=x\n"));

        MoveUp::default()
            .transform(&mut files, &mut Metadata::new())
            .unwrap();

        assert_eq!(files["npmrc"].contents, b"registry=x\n");
    }

    #[test]
    fn test_non_matching_files_untouched() {
        let mut files = FileMap::new();
        files.insert("README.md".into(), FileRecord::new("hi"));

        MoveUp::default()
            .transform(&mut files, &mut Metadata::new())
            .unwrap();

        assert!(files.contains_key("README.md"));
        assert_eq!(files.len(), 1);
    }
}
