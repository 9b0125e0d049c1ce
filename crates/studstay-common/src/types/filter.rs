/// A named group of listing tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilterCategory {
    /// Heading shown above the group
    pub title: &'static str,
    /// Tags in display order
    pub filters: &'static [&'static str],
}

/// Every tag the creation form offers, grouped as the form shows them
pub const FILTER_CATEGORIES: &[FilterCategory] = &[
    FilterCategory {
        title: "General Living",
        filters: &[
            "Furnished",
            "Unfurnished",
            "Private Bathroom",
            "Shared Bathroom",
            "Private Kitchen",
            "Shared Kitchen",
            "Balcony",
            "Garden Access",
            "Wheelchair Accessible",
            "Elevator in Building",
        ],
    },
    FilterCategory {
        title: "Roommate Preferences",
        filters: &[
            "Only Girls",
            "Only Boys",
            "Mixed Gender",
            "Couples Allowed",
            "No Roommates",
            "Max 1 Roommate",
            "Social Roommates",
            "Quiet Roommates",
        ],
    },
    FilterCategory {
        title: "Lifestyle",
        filters: &[
            "Smoking Allowed",
            "No Smoking",
            "Animals Allowed",
            "No Animals",
            "Parties Allowed",
            "No Parties",
        ],
    },
    FilterCategory {
        title: "Utilities & Extras",
        filters: &[
            "Wi-Fi Included",
            "Bills Included",
            "Washing Machine",
            "Dryer",
            "Dishwasher",
            "Cleaning Service Included",
        ],
    },
    FilterCategory {
        title: "Location & Access",
        filters: &[
            "Close to University",
            "Close to Public Transport",
            "City Center",
            "Quiet Neighborhood",
            "Supermarket Nearby",
            "24/7 Access",
        ],
    },
];

/// Category a tag belongs to, matched exactly
pub fn category_of(tag: &str) -> Option<&'static FilterCategory> {
    FILTER_CATEGORIES
        .iter()
        .find(|category| category.filters.contains(&tag))
}

/// True if the creation form offers `tag`
pub fn is_known(tag: &str) -> bool {
    category_of(tag).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup() {
        assert_eq!(category_of("Balcony").map(|c| c.title), Some("General Living"));
        assert_eq!(category_of("24/7 Access").map(|c| c.title), Some("Location & Access"));
        assert!(!is_known("balcony"));
        assert!(!is_known("Heated Pool"));
    }

    #[test]
    fn tags_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for category in FILTER_CATEGORIES {
            for tag in category.filters {
                assert!(seen.insert(*tag), "duplicate tag {tag}");
            }
        }
    }
}
