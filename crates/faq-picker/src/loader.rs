/// Catalog loading from the chatbot backend.
///
/// The four source documents are fetched concurrently and joined; a source that fails
/// to fetch or parse is replaced by an empty collection so a catalog is always built.
/// Runs at startup and again whenever the `refresh_catalog` tool is called.
use std::sync::Arc;

use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::cache::PickerCache;
use crate::categorize::categorize;
use crate::error::AppError;
use crate::model::{Catalog, Faq, Location, Rule, RuleSet, UserType};
use crate::normalize::{field_text, json_kind};
use faq_common::source_client::{SourceClient, SourceClientError, SourceDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    GuestRules,
    UserRules,
    Locations,
    Faqs,
}

impl SourceKind {
    pub fn path(self) -> &'static str {
        match self {
            SourceKind::GuestRules => "/database/guest_database/all_guest_rules.json",
            SourceKind::UserRules => "/database/user_database/all_user_rules.json",
            SourceKind::Locations => "/database/locations/locations.json",
            SourceKind::Faqs => "/database/faqs.json",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SourceKind::GuestRules => "guest_rules",
            SourceKind::UserRules => "user_rules",
            SourceKind::Locations => "locations",
            SourceKind::Faqs => "faqs",
        }
    }
}

/// What one source contributed to a load.
#[derive(Debug, Clone)]
pub struct SourceStatus {
    pub kind: SourceKind,
    /// False when the fetch failed or the body was not JSON.
    pub fetched: bool,
    pub entries: usize,
    /// Entries dropped because they violated the data contract.
    pub skipped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Sources {
    pub guest_rules: RuleSet,
    pub user_rules: RuleSet,
    pub locations: Vec<Location>,
    pub faqs: Vec<Faq>,
    pub statuses: Vec<SourceStatus>,
    pub fingerprint: String,
}

/// Fetch all four sources behind one barrier. Never fails.
pub async fn load_sources(client: &SourceClient) -> Sources {
    let (guest, user, locations, faqs) = futures::join!(
        client.get_json(SourceKind::GuestRules.path()),
        client.get_json(SourceKind::UserRules.path()),
        client.get_json(SourceKind::Locations.path()),
        client.get_json(SourceKind::Faqs.path()),
    );

    let guest = document_or_warn(SourceKind::GuestRules, guest);
    let user = document_or_warn(SourceKind::UserRules, user);
    let locations = document_or_warn(SourceKind::Locations, locations);
    let faqs = document_or_warn(SourceKind::Faqs, faqs);

    let fingerprint = fingerprint(&[
        (SourceKind::GuestRules, guest.as_ref()),
        (SourceKind::UserRules, user.as_ref()),
        (SourceKind::Locations, locations.as_ref()),
        (SourceKind::Faqs, faqs.as_ref()),
    ]);

    let mut sources = Sources {
        fingerprint,
        ..Sources::default()
    };

    let (rules, skipped) = decode_rule_set(value_of(&guest), UserType::Guest);
    sources.statuses.push(status(SourceKind::GuestRules, &guest, rules.rule_count(), skipped));
    sources.guest_rules = rules;

    let (rules, skipped) = decode_rule_set(value_of(&user), UserType::User);
    sources.statuses.push(status(SourceKind::UserRules, &user, rules.rule_count(), skipped));
    sources.user_rules = rules;

    let (decoded, skipped) = decode_locations(value_of(&locations));
    sources.statuses.push(status(SourceKind::Locations, &locations, decoded.len(), skipped));
    sources.locations = decoded;

    let (decoded, skipped) = decode_faqs(value_of(&faqs));
    sources.statuses.push(status(SourceKind::Faqs, &faqs, decoded.len(), skipped));
    sources.faqs = decoded;

    sources
}

fn document_or_warn(
    kind: SourceKind,
    result: Result<SourceDocument, SourceClientError>,
) -> Option<SourceDocument> {
    result
        .inspect_err(|e| {
            warn!(error = %e, source = kind.name(), path = kind.path(), "source unavailable, treating as empty")
        })
        .ok()
}

static MISSING: Value = Value::Null;

fn value_of(doc: &Option<SourceDocument>) -> &Value {
    doc.as_ref().map(|d| &d.value).unwrap_or(&MISSING)
}

fn status(kind: SourceKind, doc: &Option<SourceDocument>, entries: usize, skipped: usize) -> SourceStatus {
    SourceStatus {
        kind,
        fetched: doc.is_some(),
        entries,
        skipped,
    }
}

/// SHA-256 over the raw source bodies in fixed order. A missing source hashes
/// differently from an empty one.
pub fn fingerprint(documents: &[(SourceKind, Option<&SourceDocument>)]) -> String {
    let mut hasher = Sha256::new();
    for (kind, doc) in documents {
        hasher.update(kind.name().as_bytes());
        match doc {
            Some(doc) => {
                hasher.update(b"=");
                hasher.update(doc.raw.as_bytes());
            }
            None => hasher.update(b"!missing"),
        }
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}

/// Decode a `{category: [rule, ...]}` document. A wrong top-level shape yields an empty
/// set; a category whose value is not a list is kept with no rules.
pub fn decode_rule_set(value: &Value, user_type: UserType) -> (RuleSet, usize) {
    let mut set = RuleSet::empty(user_type);
    let Some(groups) = value.as_object() else {
        if !value.is_null() {
            warn!(found = json_kind(value), ?user_type, "rule document is not an object, ignoring");
        }
        return (set, 0);
    };

    let mut skipped = 0;
    for (category, entries) in groups {
        let mut rules = Vec::new();
        match entries.as_array() {
            Some(entries) => {
                for entry in entries {
                    match decode_rule(category, user_type, entry) {
                        Ok(rule) => rules.push(rule),
                        Err(e) => {
                            skipped += 1;
                            warn!(error = %e, category = %category, "skipping malformed rule");
                        }
                    }
                }
            }
            None if entries.is_null() => {}
            None => warn!(found = json_kind(entries), category = %category, "rule category is not a list"),
        }
        set.categories.push((category.clone(), rules));
    }
    (set, skipped)
}

fn decode_rule(category: &str, default_type: UserType, entry: &Value) -> Result<Rule, AppError> {
    if !entry.is_object() {
        return Err(AppError::InvalidInput {
            found: json_kind(entry),
        });
    }
    let question = field_text(entry.get("question"))?.to_string();
    let response = entry
        .get("response")
        .or_else(|| entry.get("answer"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let user_type = user_type_of(entry).unwrap_or(default_type);

    Ok(Rule {
        id: entry.get("id").and_then(Value::as_str).map(str::to_string),
        question,
        response,
        user_type,
        category: category.to_string(),
    })
}

/// Decode a `[location, ...]` document. Each keyword set may be a list of strings or a
/// single string.
pub fn decode_locations(value: &Value) -> (Vec<Location>, usize) {
    let Some(entries) = list_or_warn(value, "locations") else {
        return (Vec::new(), 0);
    };

    let mut skipped = 0;
    let mut locations = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(obj) = entry.as_object() else {
            skipped += 1;
            warn!(found = json_kind(entry), "skipping malformed location");
            continue;
        };

        let keywords = obj
            .get("keywords")
            .and_then(Value::as_array)
            .map(|sets| sets.iter().filter_map(keyword_set).collect())
            .unwrap_or_default();

        locations.push(Location {
            keywords,
            description: string_of(obj.get("description")),
            images: obj
                .get("images")
                .and_then(Value::as_array)
                .map(|imgs| imgs.iter().filter_map(Value::as_str).map(str::to_string).collect())
                .unwrap_or_default(),
        });
    }
    (locations, skipped)
}

fn keyword_set(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(s) => Some(vec![s.clone()]),
        Value::Array(words) => Some(
            words
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
        ),
        _ => None,
    }
}

/// Decode a `[faq, ...]` document.
pub fn decode_faqs(value: &Value) -> (Vec<Faq>, usize) {
    let Some(entries) = list_or_warn(value, "faqs") else {
        return (Vec::new(), 0);
    };

    let mut skipped = 0;
    let mut faqs = Vec::with_capacity(entries.len());
    for entry in entries {
        match decode_faq(entry) {
            Ok(faq) => faqs.push(faq),
            Err(e) => {
                skipped += 1;
                warn!(error = %e, "skipping malformed faq");
            }
        }
    }
    (faqs, skipped)
}

fn decode_faq(entry: &Value) -> Result<Faq, AppError> {
    if !entry.is_object() {
        return Err(AppError::InvalidInput {
            found: json_kind(entry),
        });
    }
    Ok(Faq {
        question: field_text(entry.get("question"))?.to_string(),
        answer: string_of(entry.get("answer")),
        user_type: user_type_of(entry),
    })
}

fn list_or_warn<'a>(value: &'a Value, source: &str) -> Option<&'a Vec<Value>> {
    match value {
        Value::Array(entries) => Some(entries),
        Value::Null => None,
        other => {
            warn!(found = json_kind(other), source, "document is not a list, ignoring");
            None
        }
    }
}

fn user_type_of(entry: &Value) -> Option<UserType> {
    entry
        .get("userType")
        .or_else(|| entry.get("user_type"))
        .and_then(Value::as_str)
        .and_then(UserType::parse)
}

fn string_of(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Result of a refresh.
pub struct RefreshOutcome {
    pub catalog: Catalog,
    /// False when the sources hash to the fingerprint stored by the previous build.
    pub updated: bool,
    pub statuses: Vec<SourceStatus>,
}

impl RefreshOutcome {
    pub fn failed_sources(&self) -> Vec<String> {
        self.statuses
            .iter()
            .filter(|s| !s.fetched)
            .map(|s| s.kind.name().to_string())
            .collect()
    }
}

pub struct CatalogLoader {
    client: SourceClient,
    cache: Arc<PickerCache>,
}

impl CatalogLoader {
    pub fn new(client: SourceClient, cache: Arc<PickerCache>) -> Self {
        Self { client, cache }
    }

    /// Fetch and categorize. The catalog is rebuilt from scratch every time.
    pub async fn build(&self) -> (Catalog, Vec<SourceStatus>) {
        let sources = load_sources(&self.client).await;
        let buckets = categorize(
            &[sources.guest_rules, sources.user_rules],
            &sources.locations,
            &sources.faqs,
        );
        let catalog = Catalog {
            buckets,
            fingerprint: sources.fingerprint,
        };

        for s in &sources.statuses {
            info!(
                source = s.kind.name(),
                fetched = s.fetched,
                entries = s.entries,
                skipped = s.skipped,
                "source loaded"
            );
        }
        info!(
            fingerprint = %catalog.fingerprint,
            categories = catalog.buckets.len(),
            questions = catalog.question_count(),
            "catalog built"
        );
        (catalog, sources.statuses)
    }

    /// Build, then compare against and record the stored fingerprint. Cached search
    /// results are dropped when the content changed.
    pub async fn refresh(&self) -> RefreshOutcome {
        let (catalog, statuses) = self.build().await;
        let previous = self.cache.get_fingerprint().await;
        let updated = previous.as_deref() != Some(catalog.fingerprint.as_str());

        if updated {
            self.cache.invalidate_searches().await;
            self.cache.set_fingerprint(&catalog.fingerprint).await;
        } else {
            info!(fingerprint = %catalog.fingerprint, "backend content unchanged");
        }

        RefreshOutcome {
            catalog,
            updated,
            statuses,
        }
    }
}
