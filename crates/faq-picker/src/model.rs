use serde::{Deserialize, Serialize};

use faq_common::picker_api::{CategorySummary, QuestionEntry};

/// Audience a rule or FAQ is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    User,
    Guest,
}

impl UserType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Self::User),
            "guest" => Some(Self::Guest),
            _ => None,
        }
    }
}

/// A stored question/response pair from the backend rule store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// Backend identifier (UUID string), when the store sent one
    pub id: Option<String>,
    pub question: String,
    /// Sent as either `response` or `answer`
    pub response: String,
    pub user_type: UserType,
    /// Category key the rule was filed under, e.g. "SOICT", "Registrar"
    pub category: String,
}

/// Rules grouped by category key, in backend order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RuleSet {
    pub user_type: Option<UserType>,
    pub categories: Vec<(String, Vec<Rule>)>,
}

impl RuleSet {
    pub fn empty(user_type: UserType) -> Self {
        Self {
            user_type: Some(user_type),
            categories: Vec::new(),
        }
    }

    pub fn rule_count(&self) -> usize {
        self.categories.iter().map(|(_, rules)| rules.len()).sum()
    }
}

/// A place record answering "where is X" questions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Location {
    /// Alternative keyword sets; each one yields its own display question
    pub keywords: Vec<Vec<String>>,
    pub description: String,
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
    pub user_type: Option<UserType>,
}

/// A question as shown in the picker, with its normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedQuestion {
    pub original: String,
    pub preprocessed: String,
}

impl NormalizedQuestion {
    /// Text handed to the chat-send flow: the normalized form, falling back to the
    /// original when normalization left nothing.
    pub fn send_text(&self) -> &str {
        if self.preprocessed.is_empty() {
            &self.original
        } else {
            &self.preprocessed
        }
    }

    pub fn to_entry(&self) -> QuestionEntry {
        QuestionEntry {
            original: self.original.clone(),
            preprocessed: self.preprocessed.clone(),
            send_text: self.send_text().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryBucket {
    pub name: String,
    pub questions: Vec<NormalizedQuestion>,
}

/// Category buckets in seed order, built once per load and never mutated afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub buckets: Vec<CategoryBucket>,
    pub fingerprint: String,
}

impl Catalog {
    pub fn bucket(&self, name: &str) -> Option<&CategoryBucket> {
        self.buckets.iter().find(|b| b.name == name)
    }

    /// Case-insensitive lookup, the way the picker's category selector matches names.
    pub fn find_bucket(&self, name: &str) -> Option<&CategoryBucket> {
        let name = name.trim();
        self.bucket(name).or_else(|| {
            let lowered = name.to_lowercase();
            self.buckets.iter().find(|b| b.name.to_lowercase() == lowered)
        })
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|b| b.name.as_str())
    }

    pub fn question_count(&self) -> usize {
        self.buckets.iter().map(|b| b.questions.len()).sum()
    }

    pub fn summaries(&self) -> Vec<CategorySummary> {
        self.buckets
            .iter()
            .map(|b| CategorySummary {
                name: b.name.clone(),
                question_count: b.questions.len(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_text_falls_back_to_original() {
        let q = NormalizedQuestion {
            original: "Who are you?".to_string(),
            preprocessed: String::new(),
        };
        assert_eq!(q.send_text(), "Who are you?");

        let q = NormalizedQuestion {
            original: "Where is the library?".to_string(),
            preprocessed: "where library?".to_string(),
        };
        assert_eq!(q.send_text(), "where library?");
    }

    #[test]
    fn find_bucket_ignores_case() {
        let catalog = Catalog {
            buckets: vec![CategoryBucket {
                name: "SOICT".to_string(),
                questions: Vec::new(),
            }],
            fingerprint: String::new(),
        };
        assert!(catalog.find_bucket("soict").is_some());
        assert!(catalog.find_bucket(" SOICT ").is_some());
        assert!(catalog.find_bucket("soit").is_none());
        assert!(catalog.bucket("soict").is_none());
    }

    #[test]
    fn find_bucket_folds_non_ascii_case() {
        let catalog = Catalog {
            buckets: vec![CategoryBucket {
                name: "Économie".to_string(),
                questions: Vec::new(),
            }],
            fingerprint: String::new(),
        };
        assert!(catalog.find_bucket("économie").is_some());
        assert!(catalog.find_bucket("ÉCONOMIE").is_some());
    }

    #[test]
    fn user_type_parse() {
        assert_eq!(UserType::parse("Guest"), Some(UserType::Guest));
        assert_eq!(UserType::parse("user"), Some(UserType::User));
        assert_eq!(UserType::parse("both"), None);
    }
}
