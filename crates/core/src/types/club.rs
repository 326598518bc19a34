//! Club membership selection.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Names in the external club directory, in display order.
///
/// Membership entries are compared against these by exact string match. No
/// case or whitespace normalization is applied, so a stored value that
/// diverges from this list (e.g. `"acm"`) is treated as a different club.
pub const CLUB_DIRECTORY: &[&str] = &[
    "GDSC",
    "GFG",
    "Hackhound",
    "ACM",
    "BitBucks",
    "Kalamgiri",
    "CSI",
    "I.S.T.E",
    "Genesis",
    "Aarzoo",
    "Magan",
];

/// Returns true if `name` is one of the directory's club names.
#[must_use]
pub fn is_directory_club(name: &str) -> bool {
    CLUB_DIRECTORY.contains(&name)
}

/// The set of clubs a profile belongs to.
///
/// Uniqueness is enforced by the set itself rather than by callers. The
/// order in which clubs were added is kept separately for display.
#[derive(Debug, Clone, Default)]
pub struct ClubSet {
    order: Vec<String>,
    members: HashSet<String>,
}

impl ClubSet {
    /// Create an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `name` if absent, remove it if present.
    ///
    /// Applying the same toggle twice restores the original set.
    pub fn toggle(&mut self, name: &str) -> &Self {
        if self.members.remove(name) {
            self.order.retain(|club| club != name);
        } else {
            self.members.insert(name.to_owned());
            self.order.push(name.to_owned());
        }
        self
    }

    /// Whether `name` is currently selected.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.members.contains(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate clubs in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Clubs as an owned list in insertion order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.order.clone()
    }

    /// Stored form of the selection: `None` is the explicit "no clubs"
    /// marker, never an empty list.
    #[must_use]
    pub fn to_stored(&self) -> Option<Vec<String>> {
        if self.is_empty() {
            None
        } else {
            Some(self.to_vec())
        }
    }

    /// Rebuild from a stored column, where `None` means "no clubs".
    #[must_use]
    pub fn from_stored(stored: Option<Vec<String>>) -> Self {
        stored.unwrap_or_default().into_iter().collect()
    }
}

impl PartialEq for ClubSet {
    // Membership is unordered.
    fn eq(&self, other: &Self) -> bool {
        self.members == other.members
    }
}

impl Eq for ClubSet {}

impl<S: Into<String>> FromIterator<S> for ClubSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for name in iter {
            let name = name.into();
            if set.members.insert(name.clone()) {
                set.order.push(name);
            }
        }
        set
    }
}

impl Serialize for ClubSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.order.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ClubSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        Ok(names.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn has_duplicates(set: &ClubSet) -> bool {
        let mut seen = HashSet::new();
        set.iter().any(|club| !seen.insert(club))
    }

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut clubs = ClubSet::new();
        clubs.toggle("ACM");
        assert!(clubs.contains("ACM"));
        clubs.toggle("ACM");
        assert!(clubs.is_empty());
    }

    #[test]
    fn test_toggle_sequence_acm_gfk_acm() {
        let mut clubs = ClubSet::new();
        clubs.toggle("ACM");
        clubs.toggle("GFK");
        clubs.toggle("ACM");
        assert_eq!(clubs.to_vec(), vec!["GFK".to_string()]);
    }

    #[test]
    fn test_toggle_is_involutive_for_every_directory_club() {
        let starts = [
            ClubSet::new(),
            ClubSet::from_iter(["GDSC", "ACM"]),
            CLUB_DIRECTORY.iter().copied().collect(),
        ];

        for start in &starts {
            for club in CLUB_DIRECTORY.iter().chain(&["not-a-club"]) {
                let mut set = start.clone();
                set.toggle(club);
                set.toggle(club);
                assert_eq!(&set, start, "toggling {club} twice changed the set");
            }
        }
    }

    #[test]
    fn test_toggle_sequences_never_duplicate() {
        // Every prefix of a long interleaved sequence, including repeats.
        let mut set = ClubSet::new();
        for step in 0..200 {
            let club = CLUB_DIRECTORY[(step * 7 + step / 3) % CLUB_DIRECTORY.len()];
            set.toggle(club);
            assert!(!has_duplicates(&set));
            assert_eq!(set.len(), set.members.len());
        }
    }

    #[test]
    fn test_no_normalization() {
        let mut set = ClubSet::from_iter(["ACM"]);
        set.toggle("acm");
        assert_eq!(set.len(), 2);
        assert!(!is_directory_club("acm"));
        assert!(is_directory_club("ACM"));
    }

    #[test]
    fn test_insertion_order_is_preserved() {
        let mut set = ClubSet::new();
        set.toggle("Magan");
        set.toggle("CSI");
        set.toggle("GDSC");
        set.toggle("CSI");
        assert_eq!(set.to_vec(), vec!["Magan", "GDSC"]);
    }

    #[test]
    fn test_equality_ignores_order() {
        let a = ClubSet::from_iter(["ACM", "CSI"]);
        let b = ClubSet::from_iter(["CSI", "ACM"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_stored_marker_for_empty_set() {
        assert_eq!(ClubSet::new().to_stored(), None);
        assert_eq!(
            ClubSet::from_iter(["ACM"]).to_stored(),
            Some(vec!["ACM".to_string()])
        );
        assert!(ClubSet::from_stored(None).is_empty());
    }

    #[test]
    fn test_deserialize_drops_duplicates() {
        let set: ClubSet = serde_json::from_str(r#"["ACM","GFG","ACM"]"#).unwrap();
        assert_eq!(set.to_vec(), vec!["ACM", "GFG"]);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["ACM","GFG"]"#);
    }
}
