//! Shared helpers for the council integration tests
//!
//! Fixtures live in `tests/fixtures`. `valid_config.toml` runs debates against
//! the mock provider; `invalid_config.toml` fails validation.

use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding the TOML fixtures
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// Offline config: mock provider, one round, technical voice
pub fn valid_config_fixture() -> PathBuf {
    fixture_path("valid_config.toml")
}

/// Config with a non-http base URL and zero rounds
pub fn invalid_config_fixture() -> PathBuf {
    fixture_path("invalid_config.toml")
}

/// Write a config whose Ollama discovery can only fail
pub fn write_unreachable_ollama_config(dir: &Path) -> PathBuf {
    let path = dir.join("unreachable_ollama.toml");
    fs::write(
        &path,
        r#"
[model]
provider = "openai"
discovery = "ollama-cli"
ollama_bin = "/nonexistent/bin/ollama"

[logging]
level = "error"
"#,
    )
    .unwrap();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_dir_exists() {
        assert!(fixtures_dir().exists(), "Fixtures directory should exist");
    }

    #[test]
    fn test_fixtures_parse_as_toml() {
        for fixture in [valid_config_fixture(), invalid_config_fixture()] {
            let content = fs::read_to_string(&fixture).unwrap();
            assert!(
                content.parse::<toml::Table>().is_ok(),
                "{} should be well-formed TOML",
                fixture.display()
            );
        }
    }
}
