//! Batch construction for newly triggered tasks.
//!
//! Batches are transient engine output, rebuilt on every pass and never
//! persisted. Categories appear in first-fire order; items within a
//! batch are sorted `high`, `medium`, `low` with encounter order
//! preserved on ties. The emitted list is capped, while `count` reports
//! the pre-cap total.

use std::collections::HashMap;

use serde::Serialize;

use crate::task::{Category, Priority};

/// One newly triggered task inside a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    pub task_id: String,
    pub text: String,
    pub place_name: String,
    pub priority: Priority,
}

/// Per-category grouping of newly triggered tasks.
#[derive(Debug, Clone, Serialize)]
pub struct Batch {
    pub category: Category,
    /// Pre-truncation total, may exceed `tasks.len()`.
    pub count: usize,
    pub tasks: Vec<BatchItem>,
}

/// Accumulates fired tasks per category during one pass.
#[derive(Debug, Default)]
pub struct BatchAccumulator {
    order: Vec<Category>,
    items: HashMap<Category, Vec<BatchItem>>,
}

impl BatchAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Append an item to its category, registering the category on
    /// first fire.
    pub fn push(&mut self, category: Category, item: BatchItem) {
        if !self.items.contains_key(&category) {
            self.order.push(category);
        }
        self.items.entry(category).or_default().push(item);
    }

    /// Emit batches in first-fire category order.
    pub fn into_batches(self, cap: usize) -> Vec<Batch> {
        let BatchAccumulator { order, mut items } = self;
        order
            .into_iter()
            .map(|category| {
                let mut tasks = items.remove(&category).unwrap_or_default();
                // Stable sort: ties keep encounter order.
                tasks.sort_by_key(|item| item.priority.rank());
                let count = tasks.len();
                tasks.truncate(cap);
                Batch {
                    category,
                    count,
                    tasks,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn item(task_id: &str, priority: Priority) -> BatchItem {
        BatchItem {
            task_id: task_id.to_string(),
            text: format!("text for {task_id}"),
            place_name: "Corner Grocer".to_string(),
            priority,
        }
    }

    #[test]
    fn batches_keep_first_fire_order() {
        let mut acc = BatchAccumulator::new();
        acc.push(Category::Pharmacy, item("t1", Priority::Low));
        acc.push(Category::Grocery, item("t2", Priority::High));
        acc.push(Category::Pharmacy, item("t3", Priority::High));

        let batches = acc.into_batches(5);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].category, Category::Pharmacy);
        assert_eq!(batches[1].category, Category::Grocery);
    }

    #[test]
    fn items_sort_by_priority_with_stable_ties() {
        let mut acc = BatchAccumulator::new();
        acc.push(Category::Clothing, item("low", Priority::Low));
        acc.push(Category::Clothing, item("med-1", Priority::Medium));
        acc.push(Category::Clothing, item("high", Priority::High));
        acc.push(Category::Clothing, item("med-2", Priority::Medium));

        let batches = acc.into_batches(5);
        let ids: Vec<&str> = batches[0].tasks.iter().map(|t| t.task_id.as_str()).collect();
        assert_eq!(ids, ["high", "med-1", "med-2", "low"]);
    }

    #[test]
    fn cap_truncates_but_count_reports_total() {
        let mut acc = BatchAccumulator::new();
        for i in 0..7 {
            let priority = match i % 3 {
                0 => Priority::Low,
                1 => Priority::High,
                _ => Priority::Medium,
            };
            acc.push(Category::Clothing, item(&format!("t{i}"), priority));
        }

        let batches = acc.into_batches(5);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].count, 7);
        assert_eq!(batches[0].tasks.len(), 5);
        assert_eq!(batches[0].tasks[0].priority, Priority::High);
    }

    #[test]
    fn empty_accumulator_emits_nothing() {
        let acc = BatchAccumulator::new();
        assert!(acc.is_empty());
        assert!(acc.into_batches(5).is_empty());
    }

    proptest! {
        #[test]
        fn batch_shape_invariants(priorities in prop::collection::vec(0u8..3, 0..20)) {
            let mut acc = BatchAccumulator::new();
            for (i, p) in priorities.iter().enumerate() {
                let priority = match p {
                    0 => Priority::High,
                    1 => Priority::Medium,
                    _ => Priority::Low,
                };
                acc.push(Category::Grocery, item(&format!("t{i}"), priority));
            }

            let batches = acc.into_batches(5);
            if priorities.is_empty() {
                prop_assert!(batches.is_empty());
            } else {
                prop_assert_eq!(batches.len(), 1);
                let batch = &batches[0];
                prop_assert_eq!(batch.count, priorities.len());
                prop_assert!(batch.tasks.len() <= 5);
                prop_assert!(batch
                    .tasks
                    .windows(2)
                    .all(|w| w[0].priority.rank() <= w[1].priority.rank()));
            }
        }
    }
}
