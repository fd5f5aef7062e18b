//! Static consistency analysis over a compiled document.
//!
//! Hand-authored templates accumulate accidental duplicates: two lines with
//! the same display name whose conditions are not actually disjoint, so
//! both show up for some trip. The checker finds those by sampling.
//!
//! Range expressions only change their verdict at the bounds that appear in
//! the document, so it is enough to test every subset of the relevant tags
//! against every such bound. The powerset is exponential in the number of
//! distinct tags mentioned by one duplicated name; real templates keep that
//! small, and callers with hostile inputs should bound it themselves.

use std::collections::BTreeSet;
use std::fmt;

use indexmap::{IndexMap, IndexSet};
use log::debug;

use bringlist_core::{BringList, Filter, TagExpr};

/// A likely authoring mistake found by [`check_consistency`].
///
/// The `Display` text is the warning shown verbatim to the template author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Two items with the same name can be visible at the same time.
    DuplicateItem {
        item: String,
        /// The active tags of the first collision found.
        tags: Vec<String>,
        /// Smallest nights value the collision was observed at.
        nights_lo: i64,
        /// Largest nights value the collision was observed at.
        nights_hi: i64,
    },
    /// Two categories with the same name can be visible at the same time.
    DuplicateCategory {
        category: String,
        tags: Vec<String>,
        nights_lo: i64,
        nights_hi: i64,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::DuplicateItem {
                item,
                tags,
                nights_lo,
                nights_hi,
            } => write!(
                f,
                "duplicate item: {item} when {} and nights is {}",
                tag_phrase(tags),
                nights_phrase(*nights_lo, *nights_hi),
            ),
            Warning::DuplicateCategory {
                category,
                nights_lo,
                nights_hi,
                ..
            } => write!(
                f,
                "duplicate category: {category} when nights is {}",
                nights_phrase(*nights_lo, *nights_hi),
            ),
        }
    }
}

fn tag_phrase(tags: &[String]) -> String {
    match tags {
        [] => "no tags are active".to_string(),
        [tag] => format!("'{tag}' tag is active"),
        many => format!("'{}' tags are active", many.join(" & ")),
    }
}

fn nights_phrase(lo: i64, hi: i64) -> String {
    if lo == hi {
        format!("{lo}")
    } else {
        format!("between {lo}\u{2013}{hi}")
    }
}

/// A duplicate candidate: its own condition and its owner's condition.
/// Both must match for the entry to be visible.
type Candidate<'a> = (&'a TagExpr, &'a TagExpr);

const ALWAYS: TagExpr = TagExpr::Empty;

/// Check a compiled document for same-named entries that can be visible
/// simultaneously. Pure and total; an empty result is the common case.
pub fn check_consistency(list: &BringList) -> Vec<Warning> {
    let bounds = list.night_bounds();
    let mut warnings = Vec::new();

    let mut items: IndexMap<&str, Vec<Candidate<'_>>> = IndexMap::new();
    let mut categories: IndexMap<&str, Vec<Candidate<'_>>> = IndexMap::new();
    for category in list {
        categories
            .entry(category.name.as_str())
            .or_default()
            .push((&category.tags, &ALWAYS));
        for item in &category.items {
            items
                .entry(item.name.as_str())
                .or_default()
                .push((&item.tags, &category.tags));
        }
    }

    for (name, candidates) in &items {
        if let Some((tags, nights_lo, nights_hi)) = find_collision(candidates, &bounds) {
            warnings.push(Warning::DuplicateItem {
                item: name.to_string(),
                tags,
                nights_lo,
                nights_hi,
            });
        }
    }
    for (name, candidates) in &categories {
        if let Some((tags, nights_lo, nights_hi)) = find_collision(candidates, &bounds) {
            warnings.push(Warning::DuplicateCategory {
                category: name.to_string(),
                tags,
                nights_lo,
                nights_hi,
            });
        }
    }

    warnings
}

/// Sample every subset of the candidates' tags against every interesting
/// nights value; report the first colliding tag set and the nights range
/// the collision spans.
fn find_collision(
    candidates: &[Candidate<'_>],
    bounds: &[i64],
) -> Option<(Vec<String>, i64, i64)> {
    if candidates.len() < 2 {
        return None;
    }

    let mut tag_union: IndexSet<String> = IndexSet::new();
    for (own, owner) in candidates {
        tag_union.extend(own.collect_tags());
        tag_union.extend(owner.collect_tags());
    }

    debug!(
        candidates = candidates.len(),
        tags = tag_union.len(),
        bounds = bounds.len();
        "sampling duplicate candidates"
    );

    // Powerset, smallest subsets first, so the recorded witness is minimal.
    let mut subsets: Vec<Vec<&str>> = vec![Vec::new()];
    for tag in &tag_union {
        let extended: Vec<Vec<&str>> = subsets
            .iter()
            .map(|subset| {
                let mut subset = subset.clone();
                subset.push(tag.as_str());
                subset
            })
            .collect();
        subsets.extend(extended);
    }
    subsets.sort_by_key(|subset| subset.len());

    let mut found: Option<(Vec<String>, i64, i64)> = None;
    for subset in &subsets {
        let active: BTreeSet<String> = subset.iter().map(|tag| tag.to_string()).collect();
        for &nights in bounds {
            let filter = Filter {
                tags: active.clone(),
                nights,
            };
            let visible = candidates
                .iter()
                .filter(|(own, owner)| own.matches(&filter) && owner.matches(&filter))
                .count();
            if visible > 1 {
                match &mut found {
                    None => {
                        found = Some((
                            subset.iter().map(|tag| tag.to_string()).collect(),
                            nights,
                            nights,
                        ));
                    }
                    Some((_, lo, hi)) => {
                        *lo = (*lo).min(nights);
                        *hi = (*hi).max(nights);
                    }
                }
            }
        }
    }
    found
}
