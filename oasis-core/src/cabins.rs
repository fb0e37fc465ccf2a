use std::fmt;
use std::str::FromStr;

use crate::models::Cabin;
use crate::CoreError;

/// Capacity bucket used by the cabin listing page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CapacityFilter {
    #[default]
    All,
    /// Up to 3 guests
    Small,
    /// 4 to 7 guests
    Medium,
    /// 8 guests or more
    Large,
}

impl CapacityFilter {
    pub fn matches(&self, cabin: &Cabin) -> bool {
        match self {
            CapacityFilter::All => true,
            CapacityFilter::Small => cabin.max_capacity <= 3,
            CapacityFilter::Medium => (4..=7).contains(&cabin.max_capacity),
            CapacityFilter::Large => cabin.max_capacity >= 8,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CapacityFilter::All => "all",
            CapacityFilter::Small => "small",
            CapacityFilter::Medium => "medium",
            CapacityFilter::Large => "large",
        }
    }
}

impl fmt::Display for CapacityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CapacityFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(CapacityFilter::All),
            "small" => Ok(CapacityFilter::Small),
            "medium" => Ok(CapacityFilter::Medium),
            "large" => Ok(CapacityFilter::Large),
            other => Err(CoreError::ValidationError(format!("Unknown capacity filter: {}", other))),
        }
    }
}

/// Cabins matching `filter`, in their original order.
pub fn filter_cabins(cabins: &[Cabin], filter: CapacityFilter) -> Vec<&Cabin> {
    cabins.iter().filter(|cabin| filter.matches(cabin)).collect()
}

/// Like [`filter_cabins`], but `None` when there are no cabins at all.
///
/// A filter that matches nothing in a non-empty collection still yields `Some(vec![])`.
pub fn list_cabins(cabins: &[Cabin], filter: CapacityFilter) -> Option<Vec<&Cabin>> {
    if cabins.is_empty() {
        return None;
    }
    Some(filter_cabins(cabins, filter))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cabin(id: i64, max_capacity: i32) -> Cabin {
        Cabin {
            id,
            name: format!("{:03}", id),
            max_capacity,
            regular_price: 250,
            discount: 0,
            description: None,
            image: None,
        }
    }

    fn population(n: i32) -> Vec<Cabin> {
        (1..=n).map(|c| cabin(c as i64, c)).collect()
    }

    #[test]
    fn test_buckets_respect_capacity() {
        let cabins = population(12);

        for c in filter_cabins(&cabins, CapacityFilter::Small) {
            assert!(c.max_capacity <= 3);
        }
        for c in filter_cabins(&cabins, CapacityFilter::Medium) {
            assert!(c.max_capacity >= 4 && c.max_capacity <= 7);
        }
        for c in filter_cabins(&cabins, CapacityFilter::Large) {
            assert!(c.max_capacity >= 8);
        }

        assert_eq!(filter_cabins(&cabins, CapacityFilter::Small).len(), 3);
        assert_eq!(filter_cabins(&cabins, CapacityFilter::Medium).len(), 4);
        assert_eq!(filter_cabins(&cabins, CapacityFilter::Large).len(), 5);
    }

    #[test]
    fn test_bucket_union_equals_all() {
        let cabins = population(10);

        let mut union: Vec<i64> = [CapacityFilter::Small, CapacityFilter::Medium, CapacityFilter::Large]
            .iter()
            .flat_map(|f| filter_cabins(&cabins, *f))
            .map(|c| c.id)
            .collect();
        union.sort();

        let all: Vec<i64> = filter_cabins(&cabins, CapacityFilter::All).iter().map(|c| c.id).collect();
        assert_eq!(union, all);
    }

    #[test]
    fn test_filter_preserves_order() {
        let cabins = vec![cabin(7, 2), cabin(3, 8), cabin(5, 1), cabin(1, 3)];
        let ids: Vec<i64> = filter_cabins(&cabins, CapacityFilter::Small).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![7, 5, 1]);
    }

    #[test]
    fn test_empty_collection_is_nothing_to_render() {
        for filter in [CapacityFilter::All, CapacityFilter::Small, CapacityFilter::Medium, CapacityFilter::Large] {
            assert!(list_cabins(&[], filter).is_none());
        }

        let cabins = vec![cabin(1, 2)];
        assert_eq!(list_cabins(&cabins, CapacityFilter::Large), Some(vec![]));
    }

    #[test]
    fn test_unknown_tag_is_rejected() {
        assert_eq!("medium".parse::<CapacityFilter>().unwrap(), CapacityFilter::Medium);
        assert!(matches!("huge".parse::<CapacityFilter>(), Err(CoreError::ValidationError(_))));
        assert_eq!(CapacityFilter::default(), CapacityFilter::All);
    }

    #[test]
    fn test_tag_display_parses_back() {
        for filter in [
            CapacityFilter::All,
            CapacityFilter::Small,
            CapacityFilter::Medium,
            CapacityFilter::Large,
        ] {
            assert_eq!(filter.to_string().parse::<CapacityFilter>(), Ok(filter));
        }
    }
}
