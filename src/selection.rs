//! Helpers describing which entry points are written into the manifest.

use serde::Deserialize;

/// Keyword accepted in place of an explicit list to select every entry point.
pub const ALL_ENTRIES_KEYWORD: &str = "all";

/// Entry point selection policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "EntrySelectionValue")]
pub enum EntrySelection {
  /// Every entry point known to the build, in the build's own order.
  #[default]
  All,
  /// Only the listed entry points, in list order.
  Named(Vec<String>),
}

/// Raw option value: either the `"all"` keyword or a list of names.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EntrySelectionValue {
  Keyword(String),
  Names(Vec<String>),
}

impl EntrySelection {
  /// Select only the given entry points.
  pub fn named<I, S>(names: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self::Named(names.into_iter().map(Into::into).collect())
  }

  /// Returns true when every known entry point is selected.
  pub fn is_all(&self) -> bool {
    matches!(self, Self::All)
  }

  /// Position of the first empty name in an explicit list.
  pub(crate) fn first_empty_name(&self) -> Option<usize> {
    match self {
      Self::All => None,
      Self::Named(names) => names.iter().position(|name| name.is_empty()),
    }
  }
}

impl TryFrom<EntrySelectionValue> for EntrySelection {
  type Error = String;

  fn try_from(value: EntrySelectionValue) -> Result<Self, Self::Error> {
    match value {
      EntrySelectionValue::Keyword(keyword) if keyword == ALL_ENTRIES_KEYWORD => Ok(Self::All),
      EntrySelectionValue::Keyword(keyword) => Err(format!(
        "unknown entries keyword `{keyword}`, expected `{ALL_ENTRIES_KEYWORD}` or a list of names"
      )),
      EntrySelectionValue::Names(names) => Ok(Self::Named(names)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_to_all_entries() {
    assert!(EntrySelection::default().is_all());
  }

  #[test]
  fn parses_keyword() {
    let selection: EntrySelection = serde_json::from_str(r#""all""#).unwrap();
    assert_eq!(selection, EntrySelection::All);
  }

  #[test]
  fn parses_name_list_in_order() {
    let selection: EntrySelection = serde_json::from_str(r#"["vendor", "app"]"#).unwrap();
    assert_eq!(selection, EntrySelection::named(["vendor", "app"]));
  }

  #[test]
  fn rejects_unknown_keyword() {
    let result = serde_json::from_str::<EntrySelection>(r#""some""#);
    assert!(result.is_err());
  }

  #[test]
  fn reports_empty_names_only() {
    let selection = EntrySelection::named(["app", "", "admin"]);
    assert_eq!(selection.first_empty_name(), Some(1));
    assert_eq!(EntrySelection::named([" ", "\t"]).first_empty_name(), None);
    assert_eq!(EntrySelection::All.first_empty_name(), None);
  }
}
