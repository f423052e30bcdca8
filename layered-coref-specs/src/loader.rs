//! Fixture file loading.

use crate::{CorefFixture, SpecError};
use std::fs;
use std::path::Path;

/// Load a single fixture file.
pub fn load_fixture(path: &Path) -> Result<CorefFixture, SpecError> {
    let content = fs::read_to_string(path).map_err(|e| SpecError::Load {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    CorefFixture::from_toml_str(&content).map_err(|e| SpecError::Load {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Load all fixtures from a directory (glob: **/*.toml), sorted by path.
pub fn load_all_fixtures(dir: &Path) -> Result<Vec<(String, CorefFixture)>, SpecError> {
    let mut fixtures = Vec::new();
    load_fixtures_recursive(dir, dir, &mut fixtures)?;
    fixtures.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(fixtures)
}

fn load_fixtures_recursive(
    base: &Path,
    dir: &Path,
    fixtures: &mut Vec<(String, CorefFixture)>,
) -> Result<(), SpecError> {
    if !dir.is_dir() {
        return Ok(());
    }

    for entry in fs::read_dir(dir).map_err(|e| SpecError::Load {
        path: dir.display().to_string(),
        message: e.to_string(),
    })? {
        let entry = entry.map_err(|e| SpecError::Load {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;
        let path = entry.path();

        if path.is_dir() {
            load_fixtures_recursive(base, &path, fixtures)?;
        } else if path.extension().map_or(false, |e| e == "toml") {
            let relative = path.strip_prefix(base).unwrap_or(&path);
            let fixture = load_fixture(&path)?;
            fixtures.push((relative.display().to_string(), fixture));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_fixture() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("fixtures")
            .join("pronoun-to-name.toml");
        let fixture = load_fixture(&path).unwrap();
        assert_eq!(fixture.title.as_deref(), Some("Pronoun resolves to a preceding name"));
        assert_eq!(fixture.sentences.len(), 2);
    }

    #[test]
    fn test_load_all_fixtures() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
        let fixtures = load_all_fixtures(&dir).unwrap();
        assert!(fixtures.len() >= 5);
    }

    #[test]
    fn test_nested_and_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        let mut file = fs::File::create(dir.path().join("nested").join("one.toml")).unwrap();
        writeln!(file, "[[sentence]]\ntext = \"Hi .\"").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a fixture").unwrap();

        let fixtures = load_all_fixtures(dir.path()).unwrap();
        assert_eq!(fixtures.len(), 1);
        assert!(fixtures[0].0.ends_with("one.toml"));
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "sentence = 3").unwrap();
        assert!(matches!(load_fixture(&path), Err(SpecError::Load { .. })));
        assert!(matches!(
            load_fixture(&dir.path().join("missing.toml")),
            Err(SpecError::Load { .. })
        ));
    }
}
