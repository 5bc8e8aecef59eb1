use finboard_core::category::{
    BILLS_AND_UTILITIES, ENTERTAINMENT, FOOD_AND_DINING, HEALTH_AND_WELLNESS, OTHER, SHOPPING,
    TRANSPORTATION,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Built-in rule table, evaluated top to bottom. The first label with a keyword
/// contained in the lowercased text wins, so order matters: keyword sets
/// overlap ("bar" vs. "barber", "car" vs. "card").
///
/// Keywords are lowercase substrings. Some are generic, some are specific
/// merchants seen in real statements; both are data and stay here.
pub const DEFAULT_CATEGORY_RULES: &[(&str, &[&str])] = &[
    (
        FOOD_AND_DINING,
        &[
            "restaurant", "cafe", "coffee", "dining", "starbucks", "dunkin", "mcdonald",
            "pizza", "burger", "subway", "chipotle", "food", "bar", "bakery", "doordash",
            "ubereats", "grubhub", "postmates", "noodle", "noodles", "dumpling", "hot pot",
            "beef", "poke", "ai ki ya", "jollibee", "chahalo", "chief beef", "guo bao",
            "mala hotpot", "teapsy", "kung fu tea", "hi tea", "flower and dessert", "popeyes",
            "wegmans", "schine", "fantuan", "chowbus",
        ],
    ),
    (
        SHOPPING,
        &[
            "amazon", "target", "walmart", "best buy", "costco", "store", "mall", "shop",
            "retail", "market", "grocery", "uniqlo", "miniso", "jewelry", "luk fook", "loewe",
            "arcteryx",
        ],
    ),
    (
        TRANSPORTATION,
        &["uber", "lyft", "gas", "fuel", "shell", "parking", "transit", "metro", "car"],
    ),
    (
        ENTERTAINMENT,
        &[
            "spotify", "movie", "regal", "amc", "theater", "game", "concert", "ticket",
            "entertainment",
        ],
    ),
    (
        BILLS_AND_UTILITIES,
        &[
            "electric", "water", "internet", "phone", "utility", "insurance", "rent",
            "payment", "ach deposit", "anthropic",
        ],
    ),
    (
        HEALTH_AND_WELLNESS,
        &[
            "pharmacy", "cvs", "walgreens", "clinic", "hospital", "health", "doctor", "dentist",
        ],
    ),
];

#[derive(Error, Debug)]
pub enum RulesError {
    #[error("Failed to read rule table: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse rule table: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Rule '{0}' has no keywords")]
    EmptyRule(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub label: String,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new<L, K, I>(label: L, keywords: I) -> Self
    where
        L: Into<String>,
        K: AsRef<str>,
        I: IntoIterator<Item = K>,
    {
        CategoryRule {
            label: label.into(),
            keywords: normalize_keywords(keywords),
        }
    }
}

fn normalize_keywords<K: AsRef<str>>(keywords: impl IntoIterator<Item = K>) -> Vec<String> {
    keywords
        .into_iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

#[derive(Debug, Deserialize)]
struct RuleTable {
    rules: Vec<CategoryRule>,
}

/// Ordered keyword rules with an `"Other"` fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct Categorizer {
    rules: Vec<CategoryRule>,
}

impl Default for Categorizer {
    fn default() -> Self {
        Self::new(
            DEFAULT_CATEGORY_RULES
                .iter()
                .map(|(label, keywords)| CategoryRule::new(*label, keywords.iter()))
                .collect(),
        )
    }
}

impl Categorizer {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        let rules = rules
            .into_iter()
            .map(|r| CategoryRule::new(r.label, r.keywords))
            .collect();
        Self { rules }
    }

    /// Parses a table of `[[rules]]` entries, each with `label` and `keywords`.
    pub fn from_toml(toml_content: &str) -> Result<Self, RulesError> {
        let table: RuleTable = toml::from_str(toml_content)?;
        let categorizer = Self::new(table.rules);
        if let Some(empty) = categorizer.rules.iter().find(|r| r.keywords.is_empty()) {
            return Err(RulesError::EmptyRule(empty.label.clone()));
        }
        Ok(categorizer)
    }

    pub fn from_file(path: &Path) -> Result<Self, RulesError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Appends a rule after every existing one.
    pub fn with_rule(mut self, rule: CategoryRule) -> Self {
        self.rules.push(CategoryRule::new(rule.label, rule.keywords));
        self
    }

    /// Adds keywords to the rule labelled `label`. Returns false if there is none.
    pub fn extend_keywords<K: AsRef<str>>(
        &mut self,
        label: &str,
        keywords: impl IntoIterator<Item = K>,
    ) -> bool {
        match self.rules.iter_mut().find(|r| r.label == label) {
            Some(rule) => {
                rule.keywords.extend(normalize_keywords(keywords));
                true
            }
            None => false,
        }
    }

    pub fn categorize(&self, description: &str, merchant: Option<&str>) -> &str {
        let text = match_text(description, merchant);
        first_match(
            &text,
            self.rules
                .iter()
                .map(|r| (r.label.as_str(), r.keywords.as_slice())),
        )
        .unwrap_or(OTHER)
    }
}

/// Categorizes against [`DEFAULT_CATEGORY_RULES`].
pub fn categorize(description: &str, merchant: Option<&str>) -> &'static str {
    let text = match_text(description, merchant);
    first_match(&text, DEFAULT_CATEGORY_RULES.iter().copied()).unwrap_or(OTHER)
}

fn match_text(description: &str, merchant: Option<&str>) -> String {
    format!("{} {}", description, merchant.unwrap_or_default()).to_lowercase()
}

fn first_match<'a, K, I>(text: &str, rules: I) -> Option<&'a str>
where
    K: AsRef<str> + 'a,
    I: IntoIterator<Item = (&'a str, &'a [K])>,
{
    rules
        .into_iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k.as_ref())))
        .map(|(label, _)| label)
}
