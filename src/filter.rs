//! # Variable Filter
//!
//! Selects which discovered variables are polled.
//!
//! Patterns are historically called "prefixes" in configuration, but they
//! match anywhere in the name, case-insensitively. Exclusion always wins
//! over inclusion; an empty include list admits everything not excluded.
//!
//! ```rust
//! use plccoms::VariableFilter;
//!
//! let filter = VariableFilter::from_config("TEPLOTY", "TEPLOTY_OLD");
//! assert!(filter.matches("teploty_kitchen"));
//! assert!(!filter.matches("TEPLOTY_OLD_1"));
//! assert!(!filter.matches("SVETLO_1"));
//! ```

use std::collections::BTreeSet;
use std::fmt;

/// Include/exclude pattern sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableFilter {
    include: Vec<String>,
    exclude: Vec<String>,
    include_folded: Vec<String>,
    exclude_folded: Vec<String>,
}

impl VariableFilter {
    /// Filter that admits every variable.
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn new<I, E, S, T>(include: I, exclude: E) -> Self
    where
        I: IntoIterator<Item = S>,
        E: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let include = clean_patterns(include);
        let exclude = clean_patterns(exclude);
        Self {
            include_folded: include.iter().map(|p| p.to_lowercase()).collect(),
            exclude_folded: exclude.iter().map(|p| p.to_lowercase()).collect(),
            include,
            exclude,
        }
    }

    /// Build from the comma-separated configuration strings.
    pub fn from_config(include: &str, exclude: &str) -> Self {
        Self::new(include.split(','), exclude.split(','))
    }

    pub fn include(&self) -> &[String] {
        &self.include
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Whether `name` should be polled.
    pub fn matches(&self, name: &str) -> bool {
        let folded = name.to_lowercase();
        if self.exclude_folded.iter().any(|p| folded.contains(p.as_str())) {
            return false;
        }
        self.include_folded.is_empty()
            || self.include_folded.iter().any(|p| folded.contains(p.as_str()))
    }

    /// Apply the filter, returning each admitted name once, sorted.
    pub fn apply<I, S>(&self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .filter(|n| self.matches(n.as_ref()))
            .map(|n| n.as_ref().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

impl fmt::Display for VariableFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "include={:?} exclude={:?}",
            self.include, self.exclude
        )
    }
}

fn clean_patterns<I, S>(patterns: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    patterns
        .into_iter()
        .map(|p| p.as_ref().trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclude_wins_over_include() {
        let filter = VariableFilter::new(["TEPLOTY"], ["TEPLOTY_OLD"]);
        assert!(!filter.matches("TEPLOTY_OLD_1"));
        assert!(filter.matches("teploty_kitchen"));
        assert!(filter.matches("TEPLOTY_NEW"));
        assert!(!filter.matches("VLHKOST"));
    }

    #[test]
    fn test_empty_include_allows_all_but_excluded() {
        let filter = VariableFilter::new(Vec::<String>::new(), ["TEST"]);
        assert!(!filter.matches("SENSOR_TEST_1"));
        assert!(!filter.matches("test"));
        assert!(filter.matches("SENSOR_1"));
        assert!(filter.matches("ANYTHING"));
    }

    #[test]
    fn test_substring_not_anchored() {
        let filter = VariableFilter::from_config("kitchen", "");
        assert!(filter.matches("TEMP_KITCHEN_FLOOR"));
        assert!(filter.matches("Kitchen"));
        assert!(!filter.matches("KITCHE"));
    }

    #[test]
    fn test_from_config_trims_and_drops_empty() {
        let filter = VariableFilter::from_config(" TEMP , ,POWER,", "");
        assert_eq!(filter.include(), &["TEMP".to_string(), "POWER".to_string()]);
        assert!(filter.exclude().is_empty());

        let all = VariableFilter::from_config("", "");
        assert_eq!(all, VariableFilter::allow_all());
        assert!(all.matches("X"));
    }

    #[test]
    fn test_apply_dedupes_and_sorts() {
        let filter = VariableFilter::from_config("TEMP,ROOM", "OLD");
        let names = ["TEMP_ROOM", "B_TEMP", "TEMP_ROOM", "ROOM_OLD", "LIGHT"];
        assert_eq!(filter.apply(names), vec!["B_TEMP", "TEMP_ROOM"]);
    }

    #[test]
    fn test_display_names_lists() {
        let filter = VariableFilter::from_config("A", "B");
        assert_eq!(filter.to_string(), r#"include=["A"] exclude=["B"]"#);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn excluded_names_never_pass(
                name in "[A-Za-z_]{0,12}",
                pattern in "[A-Za-z_]{1,4}",
            ) {
                let filter = VariableFilter::new([name.clone()], [pattern.clone()]);
                if name.to_lowercase().contains(&pattern.to_lowercase()) {
                    prop_assert!(!filter.matches(&name));
                }
            }

            #[test]
            fn apply_output_is_unique_subset(
                names in proptest::collection::vec("[A-C]{1,3}", 0..20),
            ) {
                let filter = VariableFilter::from_config("A", "CC");
                let out = filter.apply(&names);
                let unique: BTreeSet<_> = out.iter().collect();
                prop_assert_eq!(unique.len(), out.len());
                for n in &out {
                    prop_assert!(names.contains(n));
                    prop_assert!(filter.matches(n));
                }
            }
        }
    }
}
