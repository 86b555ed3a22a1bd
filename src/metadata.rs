//! Page metadata decoded from front matter.
//!
//! Front matter is YAML. Recognized keys:
//!
//! ```yaml
//! title: Hello World          # defaults to the humanized filename
//! date: 2024-03-01            # any scalar, kept verbatim as text
//! tags: [rust, web]           # a single scalar is a one-element list
//! template: ../layouts/post.template   # bypasses directory templates
//! ```
//!
//! Unknown keys are ignored so authors can stash their own values. The
//! resolved metadata is exposed to templates as `page.meta`.

use serde::{Deserialize, Deserializer, Serialize};

/// Decoded front matter of a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, deserialize_with = "scalar_text")]
    pub title: String,
    #[serde(default, deserialize_with = "scalar_text")]
    pub date: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "optional_text")]
    pub template: Option<String>,
}

impl Metadata {
    /// Decode raw front-matter bytes.
    ///
    /// An empty (or whitespace-only) block yields default metadata.
    pub fn decode(meta: &[u8]) -> Result<Self, serde_yaml::Error> {
        if meta.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_yaml::from_slice(meta)
    }

    /// Decode and fill in the title from `file_name` when none was given.
    pub fn resolve(meta: &[u8], file_name: &str) -> Result<Self, serde_yaml::Error> {
        let mut metadata = Self::decode(meta)?;
        if metadata.title.trim().is_empty() {
            metadata.title = crate::naming::display_title(file_name);
        }
        Ok(metadata)
    }
}

fn scalar_to_text(value: serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Null => None,
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s),
        _ => None,
    }
}

fn expect_scalar<E: serde::de::Error>(value: serde_yaml::Value) -> Result<Option<String>, E> {
    match value {
        serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => {
            Err(E::custom("expected a scalar value"))
        }
        serde_yaml::Value::Tagged(tagged) => expect_scalar(tagged.value),
        other => Ok(scalar_to_text(other)),
    }
}

fn scalar_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = serde_yaml::Value::deserialize(deserializer)?;
    Ok(expect_scalar::<D::Error>(value)?.unwrap_or_default())
}

fn optional_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = serde_yaml::Value::deserialize(deserializer)?;
    Ok(expect_scalar::<D::Error>(value)?.filter(|s| !s.trim().is_empty()))
}

fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    use serde::de::Error;

    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::Sequence(items) => items
            .into_iter()
            .filter_map(|item| expect_scalar::<D::Error>(item).transpose())
            .collect::<Result<Vec<_>, D::Error>>(),
        serde_yaml::Value::Mapping(_) => Err(D::Error::custom("tags must be a list of strings")),
        other => Ok(expect_scalar::<D::Error>(other)?.into_iter().collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_all_known_fields() {
        let meta = Metadata::decode(
            b"title: Hello\ndate: 2024-03-01\ntags: [rust, web]\ntemplate: post.template\n",
        )
        .unwrap();
        assert_eq!(meta.title, "Hello");
        assert_eq!(meta.date, "2024-03-01");
        assert_eq!(meta.tags, vec!["rust", "web"]);
        assert_eq!(meta.template.as_deref(), Some("post.template"));
    }

    #[test]
    fn empty_block_is_default() {
        assert_eq!(Metadata::decode(b"").unwrap(), Metadata::default());
        assert_eq!(Metadata::decode(b"  \n").unwrap(), Metadata::default());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let meta = Metadata::decode(b"title: X\nauthor: someone\n").unwrap();
        assert_eq!(meta.title, "X");
    }

    #[test]
    fn numeric_date_kept_as_text() {
        let meta = Metadata::decode(b"date: 2024\n").unwrap();
        assert_eq!(meta.date, "2024");
    }

    #[test]
    fn single_tag_becomes_list() {
        let meta = Metadata::decode(b"tags: rust\n").unwrap();
        assert_eq!(meta.tags, vec!["rust"]);
    }

    #[test]
    fn empty_template_means_none() {
        let meta = Metadata::decode(b"template: ''\n").unwrap();
        assert_eq!(meta.template, None);
    }

    #[test]
    fn malformed_yaml_is_error() {
        assert!(Metadata::decode(b"title: [unclosed\n").is_err());
    }

    #[test]
    fn nested_title_is_error() {
        assert!(Metadata::decode(b"title:\n  nested: true\n").is_err());
    }

    #[test]
    fn title_defaults_to_filename() {
        let meta = Metadata::resolve(b"tags: [a]\n", "my-post_name.md").unwrap();
        assert_eq!(meta.title, "My Post Name");
    }

    #[test]
    fn declared_title_wins_over_filename() {
        let meta = Metadata::resolve(b"title: Declared\n", "my-post.md").unwrap();
        assert_eq!(meta.title, "Declared");
    }
}
