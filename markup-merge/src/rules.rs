use std::fs;
use std::path::Path;

use markup_tree::ComparatorRules;
use thiserror::Error;

/// Errors returned when loading comparator rules.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("failed to read rules file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse rules file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid key rule '{0}': expected TAG=ATTRIBUTE")]
    InvalidKey(String),
}

/// Load comparator rules from a TOML file.
///
/// ```toml
/// deep = ["choose"]
///
/// [keys]
/// when = "condition"
/// ```
pub fn load_rules(path: &Path) -> Result<ComparatorRules, RulesError> {
    let raw = fs::read_to_string(path).map_err(|source| RulesError::Io {
        path: path.display().to_string(),
        source,
    })?;

    parse_rules(&raw, path.display().to_string())
}

/// Parse comparator rules from TOML text. `origin` names the source in errors.
pub fn parse_rules(raw: &str, origin: String) -> Result<ComparatorRules, RulesError> {
    toml::from_str(raw).map_err(|source| RulesError::Parse {
        path: origin,
        source,
    })
}

/// Split a `TAG=ATTRIBUTE` command-line rule.
pub fn parse_key_rule(raw: &str) -> Result<(String, String), RulesError> {
    match raw.split_once('=') {
        Some((tag, attribute)) if !tag.trim().is_empty() && !attribute.trim().is_empty() => {
            Ok((tag.trim().to_string(), attribute.trim().to_string()))
        }
        _ => Err(RulesError::InvalidKey(raw.to_string())),
    }
}

/// Combine an optional rules file with command-line keys and deep tags.
/// Command-line keys override the file on collision.
pub fn resolve_rules(
    path: Option<&Path>,
    keys: &[(String, String)],
    deep: &[String],
) -> Result<ComparatorRules, RulesError> {
    let mut rules = match path {
        Some(path) => load_rules(path)?,
        None => ComparatorRules::default(),
    };

    let mut overrides = ComparatorRules::default();
    for (tag, attribute) in keys {
        overrides = overrides.with_key(tag.as_str(), attribute.as_str());
    }
    for tag in deep {
        overrides = overrides.with_deep(tag.as_str());
    }
    rules.extend(overrides);

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::{parse_key_rule, parse_rules, resolve_rules, RulesError};

    #[test]
    fn parses_keys_and_deep_tags() {
        let rules = parse_rules(
            "deep = [\"choose\"]\n\n[keys]\nwhen = \"condition\"\n",
            "inline".to_string(),
        )
        .expect("rules");

        assert_eq!(rules.keys.get("when").map(String::as_str), Some("condition"));
        assert!(rules.deep.contains("choose"));
    }

    #[test]
    fn empty_document_yields_empty_rules() {
        let rules = parse_rules("", "inline".to_string()).expect("rules");
        assert!(rules.is_empty());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = parse_rules("keyz = 1\n", "inline".to_string()).expect_err("unknown");
        assert!(matches!(err, RulesError::Parse { .. }));
        assert!(err.to_string().contains("inline"));
    }

    #[test]
    fn key_rules_require_both_halves() {
        assert_eq!(
            parse_key_rule("layer=id").expect("valid"),
            ("layer".to_string(), "id".to_string())
        );
        assert!(parse_key_rule("layer").is_err());
        assert!(parse_key_rule("=id").is_err());
        assert!(parse_key_rule("layer=").is_err());
    }

    #[test]
    fn command_line_keys_override_file_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("rules.toml");
        fs::write(&path, "[keys]\nlayer = \"id\"\nwhen = \"condition\"\n").expect("write");

        let rules = resolve_rules(
            Some(path.as_path()),
            &[("layer".to_string(), "name".to_string())],
            &["choose".to_string()],
        )
        .expect("resolve");

        assert_eq!(rules.keys.get("layer").map(String::as_str), Some("name"));
        assert_eq!(rules.keys.get("when").map(String::as_str), Some("condition"));
        assert!(rules.deep.contains("choose"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = resolve_rules(Some(Path::new("/nonexistent/rules.toml")), &[], &[])
            .expect_err("missing");
        assert!(matches!(err, RulesError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/rules.toml"));
    }
}
