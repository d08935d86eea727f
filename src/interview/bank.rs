//! Role-keyed question bank.
//!
//! The bank is a JSON document mapping a role key to its display name and an
//! ordered list of base questions:
//!
//! ```json
//! {
//!   "software_engineer": {
//!     "display_name": "Software Engineer",
//!     "base_questions": ["Tell me about yourself.", "Explain a project you built."]
//!   }
//! }
//! ```
//!
//! Loading never fails: a missing or malformed document falls back to
//! [`QuestionBank::builtin`].

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Asked when the selected role is not in the bank.
pub const UNKNOWN_ROLE_QUESTION: &str = "Tell me about yourself.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleQuestions {
    pub display_name: String,
    pub base_questions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBank {
    roles: BTreeMap<String, RoleQuestions>,
    unknown_role: Vec<String>,
}

impl QuestionBank {
    /// A single software-engineering role with three generic questions.
    pub fn builtin() -> Self {
        let mut roles = BTreeMap::new();
        roles.insert(
            "software_engineer".to_string(),
            RoleQuestions {
                display_name: "Software Engineer".into(),
                base_questions: vec![
                    "Tell me about yourself.".into(),
                    "Explain a project you built.".into(),
                    "What are your strengths?".into(),
                ],
            },
        );
        Self::from_roles(roles)
    }

    /// Parse a bank document.  A document with no roles is rejected.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let roles: BTreeMap<String, RoleQuestions> = serde_json::from_str(text)?;
        if roles.is_empty() {
            return Err(serde::de::Error::custom("question bank has no roles"));
        }
        Ok(Self::from_roles(roles))
    }

    /// Load the bank from `path`, falling back to [`builtin`](Self::builtin).
    pub fn load_from(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                log::warn!(
                    "question bank {} unreadable ({e}); using built-in questions",
                    path.display()
                );
                return Self::builtin();
            }
        };
        match Self::from_json(&text) {
            Ok(bank) => {
                log::info!("question bank loaded: {} role(s)", bank.roles.len());
                bank
            }
            Err(e) => {
                log::warn!(
                    "question bank {} is malformed ({e}); using built-in questions",
                    path.display()
                );
                Self::builtin()
            }
        }
    }

    fn from_roles(roles: BTreeMap<String, RoleQuestions>) -> Self {
        Self {
            roles,
            unknown_role: vec![UNKNOWN_ROLE_QUESTION.to_string()],
        }
    }

    pub fn get(&self, role: &str) -> Option<&RoleQuestions> {
        self.roles.get(role)
    }

    pub fn contains(&self, role: &str) -> bool {
        self.roles.contains_key(role)
    }

    /// Role keys with their entries, sorted by key.
    pub fn roles(&self) -> impl Iterator<Item = (&str, &RoleQuestions)> {
        self.roles.iter().map(|(key, role)| (key.as_str(), role))
    }

    /// Base questions for `role`; unknown roles and empty lists get a single
    /// generic question.
    pub fn questions_for(&self, role: &str) -> &[String] {
        match self.roles.get(role) {
            Some(entry) if !entry.base_questions.is_empty() => &entry.base_questions,
            _ => &self.unknown_role,
        }
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::builtin()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const DOC: &str = r#"{
        "product_manager": {
            "display_name": "Product Manager",
            "base_questions": ["How do you prioritise?", "Tell me about a launch."]
        },
        "empty_role": {"display_name": "Empty", "base_questions": []}
    }"#;

    #[test]
    fn builtin_has_three_generic_questions() {
        let bank = QuestionBank::builtin();
        assert_eq!(bank.questions_for("software_engineer").len(), 3);
        assert_eq!(
            bank.get("software_engineer").map(|r| r.display_name.as_str()),
            Some("Software Engineer")
        );
    }

    #[test]
    fn parses_document_in_order() {
        let bank = QuestionBank::from_json(DOC).unwrap();
        assert_eq!(
            bank.questions_for("product_manager"),
            ["How do you prioritise?", "Tell me about a launch."]
        );
        assert!(!bank.contains("software_engineer"));
    }

    #[test]
    fn unknown_or_empty_role_gets_generic_question() {
        let bank = QuestionBank::from_json(DOC).unwrap();
        assert_eq!(bank.questions_for("astronaut"), [UNKNOWN_ROLE_QUESTION]);
        assert_eq!(bank.questions_for("empty_role"), [UNKNOWN_ROLE_QUESTION]);
    }

    #[test]
    fn empty_document_is_rejected() {
        assert!(QuestionBank::from_json("{}").is_err());
    }

    #[test]
    fn missing_file_falls_back_to_builtin() {
        let dir = tempdir().unwrap();
        let bank = QuestionBank::load_from(&dir.path().join("roles.json"));
        assert_eq!(bank, QuestionBank::builtin());
    }

    #[test]
    fn corrupt_file_falls_back_to_builtin() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roles.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(QuestionBank::load_from(&path), QuestionBank::builtin());
    }

    #[test]
    fn valid_file_is_loaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roles.json");
        std::fs::write(&path, DOC).unwrap();
        let bank = QuestionBank::load_from(&path);
        let keys: Vec<&str> = bank.roles().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["empty_role", "product_manager"]);
    }
}
