use std::fmt;
use std::str::FromStr;

use crate::models::Category;

/// Icon shown for categories without one.
pub const DEFAULT_CATEGORY_ICON: &str = "\u{1f4dd}";

/// The categories the PayWise backend is seeded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownCategory {
    Food,
    Entertainment,
    Transport,
    Shopping,
    Bills,
    Healthcare,
    Education,
    Travel,
    Home,
    Other,
}

impl KnownCategory {
    pub const ALL: [Self; 10] = [
        Self::Food,
        Self::Entertainment,
        Self::Transport,
        Self::Shopping,
        Self::Bills,
        Self::Healthcare,
        Self::Education,
        Self::Travel,
        Self::Home,
        Self::Other,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Entertainment => "Entertainment",
            Self::Transport => "Transport",
            Self::Shopping => "Shopping",
            Self::Bills => "Bills",
            Self::Healthcare => "Healthcare",
            Self::Education => "Education",
            Self::Travel => "Travel",
            Self::Home => "Home",
            Self::Other => "Other",
        }
    }

    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Self::Food => "\u{1f355}",
            Self::Entertainment => "\u{1f3ac}",
            Self::Transport => "\u{1f697}",
            Self::Shopping => "\u{1f6cd}\u{fe0f}",
            Self::Bills => "\u{1f4c4}",
            Self::Healthcare => "\u{1f3e5}",
            Self::Education => "\u{1f4da}",
            Self::Travel => "\u{2708}\u{fe0f}",
            Self::Home => "\u{1f3e0}",
            Self::Other => DEFAULT_CATEGORY_ICON,
        }
    }

    /// Hex colour the backend seeds the category with.
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            Self::Food => "#FF6B6B",
            Self::Entertainment => "#4ECDC4",
            Self::Transport => "#45B7D1",
            Self::Shopping => "#96CEB4",
            Self::Bills => "#FFEAA7",
            Self::Healthcare => "#DDA0DD",
            Self::Education => "#98D8C8",
            Self::Travel => "#F7DC6F",
            Self::Home => "#BB8FCE",
            Self::Other => "#667eea",
        }
    }

    /// Exact, case-sensitive name lookup.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }
}

impl fmt::Display for KnownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for KnownCategory {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownCategory(s.to_owned()))
    }
}

// Checked in order; the first category with a matching keyword wins.
const KEYWORDS: &[(KnownCategory, &[&str])] = &[
    (
        KnownCategory::Food,
        &["food", "restaurant", "dinner", "lunch", "breakfast", "grocery"],
    ),
    (
        KnownCategory::Entertainment,
        &["movie", "cinema", "game", "concert", "party"],
    ),
    (
        KnownCategory::Transport,
        &["uber", "taxi", "fuel", "parking", "bus"],
    ),
    (
        KnownCategory::Shopping,
        &["shirt", "shoes", "dress", "shopping", "clothes"],
    ),
    (
        KnownCategory::Bills,
        &["electricity", "water", "internet", "rent", "bill"],
    ),
    (
        KnownCategory::Healthcare,
        &["medicine", "doctor", "hospital", "pharmacy"],
    ),
];

/// Keyword fallback for when the server-side detector is unavailable.
///
/// Substring match on the lower-cased description, so `"Business lunch"`
/// is Food and `"business class"` is Transport.
#[must_use]
pub fn guess_category(description: &str) -> KnownCategory {
    let description = description.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| description.contains(w)))
        .map_or(KnownCategory::Other, |(category, _)| *category)
}

/// Icon for a category name: the server's icon if the category list has
/// one, else the seeded icon, else [`DEFAULT_CATEGORY_ICON`].
#[must_use]
pub fn category_icon<'a>(name: &str, categories: &'a [Category]) -> &'a str {
    categories
        .iter()
        .find(|c| c.name == name)
        .and_then(|c| c.icon.as_deref())
        .filter(|icon| !icon.is_empty())
        .or_else(|| KnownCategory::from_name(name).map(KnownCategory::icon))
        .unwrap_or(DEFAULT_CATEGORY_ICON)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn keywords_map_to_categories() {
        assert_eq!(guess_category("Team DINNER at Toit"), KnownCategory::Food);
        assert_eq!(guess_category("movie tickets"), KnownCategory::Entertainment);
        assert_eq!(guess_category("Uber to airport"), KnownCategory::Transport);
        assert_eq!(guess_category("new shoes"), KnownCategory::Shopping);
        assert_eq!(guess_category("Internet recharge"), KnownCategory::Bills);
        assert_eq!(guess_category("pharmacy run"), KnownCategory::Healthcare);
        assert_eq!(guess_category("gift for Anu"), KnownCategory::Other);
        assert_eq!(guess_category(""), KnownCategory::Other);
    }

    #[test]
    fn earlier_category_wins() {
        // "party" (Entertainment) and "food" (Food) both match
        assert_eq!(guess_category("party food"), KnownCategory::Food);
        // "bus" is a substring of "business"
        assert_eq!(guess_category("business class"), KnownCategory::Transport);
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for category in KnownCategory::ALL {
            assert_eq!(category.name().parse::<KnownCategory>(), Ok(category));
        }
        assert_eq!(
            "food".parse::<KnownCategory>(),
            Err(UnknownCategory("food".to_owned()))
        );
    }

    #[test]
    fn icon_prefers_server_value() {
        let categories = vec![Category {
            id: 1,
            name: "Food".to_owned(),
            icon: Some("F".to_owned()),
            color: None,
            extra: serde_json::Map::new(),
        }];
        assert_eq!(category_icon("Food", &categories), "F");
        assert_eq!(category_icon("Travel", &categories), "\u{2708}\u{fe0f}");
        assert_eq!(category_icon("Pets", &categories), DEFAULT_CATEGORY_ICON);
    }
}
