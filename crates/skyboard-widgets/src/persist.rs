//! JSON list persistence and id lookup shared by the widgets.

use serde::de::DeserializeOwned;
use serde::Serialize;
use skyboard_core::PreferenceStore;

use crate::error::{WidgetError, WidgetResult};

/// Read the list stored under `key`. Missing, unreadable or malformed data
/// gives an empty list.
pub(crate) fn load_list<T: DeserializeOwned>(store: &dyn PreferenceStore, key: &str) -> Vec<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", key, e);
            return Vec::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!("Ignoring malformed {}: {}", key, e);
            Vec::new()
        }
    }
}

pub(crate) fn save_list<T: Serialize>(
    store: &dyn PreferenceStore,
    key: &str,
    items: &[T],
) -> WidgetResult<()> {
    let json = serde_json::to_string(items).map_err(anyhow::Error::from)?;
    store
        .set(key, &json)
        .map_err(|e| WidgetError::storage(format!("{:#}", e)))?;
    tracing::debug!("Saved {} items under {}", items.len(), key);
    Ok(())
}

/// Position of the item whose id is `id`, or the only one starting with it.
pub(crate) fn find_index<T>(items: &[T], id: &str, item_id: impl Fn(&T) -> &str) -> WidgetResult<usize> {
    let id = id.trim();
    if id.is_empty() {
        return Err(WidgetError::validation("An id is required"));
    }

    if let Some(index) = items.iter().position(|item| item_id(item) == id) {
        return Ok(index);
    }

    let mut matches = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item_id(item).starts_with(id))
        .map(|(index, _)| index);

    match (matches.next(), matches.next()) {
        (Some(index), None) => Ok(index),
        (Some(_), Some(_)) => Err(WidgetError::validation(format!(
            "More than one item starts with {}",
            id
        ))),
        (None, _) => Err(WidgetError::not_found(id)),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use skyboard_core::MemoryStore;

    fn ids() -> Vec<String> {
        vec!["a1b2".into(), "a1c3".into(), "ff00".into()]
    }

    #[test]
    fn test_find_index_exact_and_prefix() {
        let items = ids();
        assert_eq!(find_index(&items, "a1c3", |s| s.as_str()).unwrap(), 1);
        assert_eq!(find_index(&items, "f", |s| s.as_str()).unwrap(), 2);
    }

    #[test]
    fn test_find_index_ambiguous_prefix() {
        let items = ids();
        assert!(matches!(
            find_index(&items, "a1", |s| s.as_str()),
            Err(WidgetError::Validation(_))
        ));
    }

    #[test]
    fn test_find_index_missing() {
        let items = ids();
        assert!(matches!(
            find_index(&items, "zz", |s| s.as_str()),
            Err(WidgetError::NotFound(id)) if id == "zz"
        ));
        assert!(matches!(
            find_index(&items, "  ", |s| s.as_str()),
            Err(WidgetError::Validation(_))
        ));
    }

    #[test]
    fn test_malformed_list_loads_empty() {
        let store = MemoryStore::new();
        store.set("list", "{\"not\": \"a list\"}").unwrap();
        let items: Vec<String> = load_list(&store, "list");
        assert!(items.is_empty());
    }
}
