//! Front matter block written ahead of the exported Markdown body.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("Invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Missing front matter fence")]
    MissingFence,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontMatter {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bibliography: Option<String>,
}

impl FrontMatter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            bibliography: None,
        }
    }

    /// Render as `---` fenced `key: value` lines, followed by a newline.
    ///
    /// Values are written bare unless YAML would read them back differently
    /// (a title like `a: b` or `true`), in which case they are quoted.
    pub fn render(&self) -> String {
        let mut out = String::from("---\n");
        push_entry(&mut out, "title", &self.title);
        if let Some(bibliography) = &self.bibliography {
            push_entry(&mut out, "bibliography", bibliography);
        }
        out.push_str("---\n");
        out
    }

    /// Split rendered Markdown into its front matter and body.
    pub fn parse(content: &str) -> Result<(Self, &str), FrontMatterError> {
        let rest = content
            .strip_prefix("---\n")
            .ok_or(FrontMatterError::MissingFence)?;
        let end = rest
            .find("\n---\n")
            .ok_or(FrontMatterError::MissingFence)?;
        let front_matter = serde_yaml::from_str(&rest[..=end])?;
        Ok((front_matter, &rest[end + 5..]))
    }
}

fn push_entry(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    out.push_str(": ");
    if reads_back_as(value) {
        out.push_str(value);
    } else {
        out.push_str(&quote(value));
    }
    out.push('\n');
}

fn reads_back_as(value: &str) -> bool {
    !value.contains('\n')
        && matches!(
            serde_yaml::from_str::<serde_yaml::Value>(&format!("v: {value}")),
            Ok(serde_yaml::Value::Mapping(map))
                if map.get("v").and_then(serde_yaml::Value::as_str) == Some(value)
        )
}

fn quote(value: &str) -> String {
    match serde_yaml::to_string(value) {
        Ok(yaml) => yaml.trim_end_matches('\n').to_string(),
        Err(_) => format!("{value:?}"),
    }
}
