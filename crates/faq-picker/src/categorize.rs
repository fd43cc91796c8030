use std::collections::HashMap;

use tracing::debug;

use crate::model::{CategoryBucket, Faq, Location, NormalizedQuestion, RuleSet};
use crate::normalize::normalize;

pub const LOCATIONS: &str = "Locations";
pub const FACULTIES: &str = "Faculties";
pub const GENERAL: &str = "General";

/// Bucket every known question under its category.
///
/// Buckets are seeded from the rule sets' category keys (user and guest sets share a
/// bucket when they use the same key), then `Locations`, `Faculties` and `General`.
/// Questions keep insertion order: rules, then synthesized location questions, then
/// FAQs. A FAQ lands in every category whose name occurs in its lowercased text, or in
/// `General` when none does. Nothing is sorted or deduplicated.
pub fn categorize(
    rule_sets: &[RuleSet],
    locations: &[Location],
    faqs: &[Faq],
) -> Vec<CategoryBucket> {
    let mut buckets = BucketBuilder::default();

    for set in rule_sets {
        for (category, _) in &set.categories {
            buckets.ensure(category);
        }
    }
    buckets.ensure(LOCATIONS);
    buckets.ensure(FACULTIES);
    buckets.ensure(GENERAL);

    for set in rule_sets {
        for (category, rules) in &set.categories {
            for rule in rules {
                buckets.push(category, question(&rule.question));
            }
        }
    }

    for location in locations {
        for keyword_set in &location.keywords {
            buckets.push(LOCATIONS, question(&location_question(keyword_set)));
        }
    }

    let matchable: Vec<(String, String)> = buckets
        .names()
        .filter(|name| !name.is_empty() && *name != GENERAL)
        .map(|name| (name.to_string(), name.to_lowercase()))
        .collect();

    for faq in faqs {
        let lowered = faq.question.to_lowercase();
        let normalized = question(&faq.question);
        let mut filed = false;
        for (name, needle) in &matchable {
            if lowered.contains(needle.as_str()) {
                buckets.push(name, normalized.clone());
                filed = true;
            }
        }
        if !filed {
            buckets.push(GENERAL, normalized);
        }
    }

    let buckets = buckets.finish();
    debug!(
        categories = buckets.len(),
        questions = buckets.iter().map(|b| b.questions.len()).sum::<usize>(),
        "categorized questions"
    );
    buckets
}

/// Display question for one keyword set of a location: `Where is <keywords>?`.
pub fn location_question(keywords: &[String]) -> String {
    format!("Where is {}?", keywords.join(" "))
}

fn question(original: &str) -> NormalizedQuestion {
    NormalizedQuestion {
        original: original.to_string(),
        preprocessed: normalize(original),
    }
}

#[derive(Default)]
struct BucketBuilder {
    buckets: Vec<CategoryBucket>,
    index: HashMap<String, usize>,
}

impl BucketBuilder {
    fn ensure(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.buckets.len();
        self.buckets.push(CategoryBucket {
            name: name.to_string(),
            questions: Vec::new(),
        });
        self.index.insert(name.to_string(), idx);
        idx
    }

    fn push(&mut self, name: &str, question: NormalizedQuestion) {
        let idx = self.ensure(name);
        self.buckets[idx].questions.push(question);
    }

    fn names(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|b| b.name.as_str())
    }

    fn finish(self) -> Vec<CategoryBucket> {
        self.buckets
    }
}
