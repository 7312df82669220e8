//! Case-insensitive, AND-combined event filtering.

use crate::criteria::SearchCriterion;
use crate::event::Event;

/// A criterion with every term lower-cased once up front.
#[derive(Debug, Clone)]
pub struct Matcher {
    title: String,
    location: String,
    category: String,
    tags: Vec<String>,
}

impl Matcher {
    pub fn new(criterion: &SearchCriterion) -> Self {
        Matcher {
            title: criterion.title.to_lowercase(),
            location: criterion.location.to_lowercase(),
            category: criterion.category.to_lowercase(),
            tags: criterion
                .tags
                .iter()
                .filter(|t| !t.is_empty())
                .map(|t| t.to_lowercase())
                .collect(),
        }
    }

    /// Every supplied term must match; empty terms match everything.
    pub fn matches(&self, event: &Event) -> bool {
        contains(&self.title, event.title())
            && contains(&self.location, event.location())
            && contains(&self.category, event.category_name())
            && self.tags_match(event)
    }

    fn tags_match(&self, event: &Event) -> bool {
        if self.tags.is_empty() {
            return true;
        }

        event.tag_names().any(|name| {
            let name = name.to_lowercase();
            self.tags.iter().any(|term| name.contains(term.as_str()))
        })
    }
}

fn contains(term: &str, field: &str) -> bool {
    term.is_empty() || field.to_lowercase().contains(term)
}

/// Events matching `criterion`, in input order.
///
/// A criterion without any terms returns every event untouched.
pub fn filter<'a>(events: &'a [Event], criterion: &SearchCriterion) -> Vec<&'a Event> {
    if criterion.is_wildcard() {
        return events.iter().collect();
    }

    let matcher = Matcher::new(criterion);
    events.iter().filter(|e| matcher.matches(e)).collect()
}

/// Run every criterion and collect matches per target calendar.
///
/// Calendars appear in the order they are first named. Matches are
/// concatenated, so an event hit by two criteria appears twice until
/// deduplicated. Criteria without a calendar name route nowhere.
pub fn group_by_calendar<'a>(
    events: &'a [Event],
    criteria: &[SearchCriterion],
) -> Vec<(String, Vec<&'a Event>)> {
    let mut groups: Vec<(String, Vec<&'a Event>)> = Vec::new();

    for criterion in criteria {
        let matches = filter(events, criterion);

        if matches.is_empty() {
            tracing::info!(criterion = %criterion, "No events found for search criteria");
            continue;
        }
        tracing::debug!(criterion = %criterion, count = matches.len(), "Matched events");

        if criterion.calendar.is_empty() {
            continue;
        }

        match groups.iter_mut().find(|(name, _)| *name == criterion.calendar) {
            Some((_, group)) => group.extend(matches),
            None => groups.push((criterion.calendar.clone(), matches)),
        }
    }

    groups
}
