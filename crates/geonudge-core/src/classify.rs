//! Keyword classifier mapping reminder text to a category.
//!
//! Rules are an ordered list of keyword sets evaluated top-to-bottom over
//! the lowercased text; the first rule with a matching keyword wins.
//! Order matters: a text like "dress for the fruit market" could match
//! several rules. The rule list lives in [`crate::storage::Config`] so
//! deployments and tests can override it; classification happens once at
//! task creation and the category is frozen onto the record.

use serde::{Deserialize, Serialize};

use crate::task::Category;

/// A single classification rule: any keyword substring match assigns
/// the category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierRule {
    pub category: Category,
    pub keywords: Vec<String>,
}

/// Ordered rule list, first match wins, fallback `general`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassifierRules {
    pub rules: Vec<ClassifierRule>,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        let rule = |category: Category, keywords: &[&str]| ClassifierRule {
            category,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        };
        ClassifierRules {
            rules: vec![
                rule(Category::Clothing, &["shirt", "clothes", "dress"]),
                rule(Category::Grocery, &["apple", "milk", "fruit"]),
                rule(Category::Pharmacy, &["medicine", "tablet"]),
            ],
        }
    }
}

impl ClassifierRules {
    /// Classify free text. Matching is case-insensitive substring
    /// membership; rules are tried in list order.
    pub fn classify(&self, text: &str) -> Category {
        let text = text.to_lowercase();
        for rule in &self.rules {
            if rule.keywords.iter().any(|k| text.contains(k.as_str())) {
                return rule.category;
            }
        }
        Category::General
    }
}
