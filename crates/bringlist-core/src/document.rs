//! Compiled bringlist documents.
//!
//! A [`BringList`] is the compiled form of a template: an ordered list of
//! [`Category`] values, each holding an ordered list of [`Item`]s. The
//! whole document is rebuilt on every compile; nothing here is mutated in
//! place.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::expr::TagExpr;

/// The smallest nights value a trip can have.
///
/// The consistency checker seeds its boundary set with this value so that
/// duplicates without any range condition are still sampled.
pub const LOWEST_POSSIBLE_NIGHTS: i64 = 1;

/// A single packing-list entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Display text, free-form except the bracket delimiters.
    pub name: String,
    /// Replenishment cadence: one of these items per `n` nights.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub every_n_nights: Option<f64>,
    /// Visibility condition for this item.
    pub tags: TagExpr,
}

impl Item {
    /// How many of this item to bring for a trip of `nights` nights.
    ///
    /// Returns `None` for items without a cadence; otherwise
    /// `nights / every_n_nights`, rounded up.
    pub fn quantity(&self, nights: i64) -> Option<i64> {
        self.every_n_nights
            .map(|n| (nights as f64 / n).ceil() as i64)
    }
}

/// A named group of items with its own visibility condition.
///
/// The category condition gates the whole group: an item is visible only
/// when its own expression and its category's expression both match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub tags: TagExpr,
    pub items: Vec<Item>,
}

/// A compiled template: categories in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BringList {
    categories: Vec<Category>,
}

impl BringList {
    /// Wrap an ordered list of categories.
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    /// The categories in display (source) order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Iterate over the categories in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, Category> {
        self.categories.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Every tag referenced by any category or item expression, in first
    /// occurrence order.
    pub fn collect_tags(&self) -> IndexSet<String> {
        let mut tags = IndexSet::new();
        for category in &self.categories {
            tags.extend(category.tags.collect_tags());
            for item in &category.items {
                tags.extend(item.tags.collect_tags());
            }
        }
        tags
    }

    /// Every nights bound appearing anywhere in the document, plus
    /// [`LOWEST_POSSIBLE_NIGHTS`], deduplicated and sorted ascending.
    ///
    /// Range expressions only change their verdict at these values, so
    /// exhaustive analysis need only sample them.
    pub fn night_bounds(&self) -> Vec<i64> {
        let mut bounds = vec![LOWEST_POSSIBLE_NIGHTS];
        for category in &self.categories {
            bounds.extend(category.tags.night_bounds());
            for item in &category.items {
                bounds.extend(item.tags.night_bounds());
            }
        }
        bounds.sort_unstable();
        bounds.dedup();
        bounds
    }
}

impl IntoIterator for BringList {
    type Item = Category;
    type IntoIter = std::vec::IntoIter<Category>;

    fn into_iter(self) -> Self::IntoIter {
        self.categories.into_iter()
    }
}

impl<'a> IntoIterator for &'a BringList {
    type Item = &'a Category;
    type IntoIter = std::slice::Iter<'a, Category>;

    fn into_iter(self) -> Self::IntoIter {
        self.categories.iter()
    }
}
