use serde::{Deserialize, Serialize};

/// Free text submitted for a typo check.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LintRequest {
    #[serde(default, alias = "workoutName")]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl LintRequest {
    /// Non-blank parts joined by a blank line, or `None` when there is nothing to check.
    pub fn combined_text(&self) -> Option<String> {
        let parts: Vec<&str> = [self.name.as_deref(), self.description.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }
}

/// A single issue reported by the grammar checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrammarFinding {
    pub message: String,
    #[serde(default)]
    pub short_message: String,
    /// The sentence containing the problem.
    #[serde(default)]
    pub sentence: String,
    pub offset: usize,
    pub length: usize,
    /// Suggested fixes, best first.
    #[serde(default)]
    pub replacements: Vec<Replacement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replacement {
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_text_skips_blank_parts() {
        let req = LintRequest {
            name: Some("  ".into()),
            description: Some("Pushups with a clap ".into()),
        };
        assert_eq!(req.combined_text().as_deref(), Some("Pushups with a clap"));

        let req = LintRequest {
            name: Some("Squat".into()),
            description: Some("Keep you're back straight".into()),
        };
        assert_eq!(
            req.combined_text().as_deref(),
            Some("Squat\n\nKeep you're back straight")
        );
    }

    #[test]
    fn test_combined_text_none_when_everything_blank() {
        assert!(LintRequest::default().combined_text().is_none());
        let req = LintRequest {
            name: Some(String::new()),
            description: Some(" \n ".into()),
        };
        assert!(req.combined_text().is_none());
    }
}
