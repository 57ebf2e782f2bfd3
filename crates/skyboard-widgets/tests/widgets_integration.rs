//! Integration tests for the to-do and notes widgets over a file-backed store.

use skyboard_widgets::{
    FileStore, NoteBook, Priority, PreferenceStore, SortDirection, SortField, TodoFilter,
    TodoList, WidgetError,
};
use std::fs;
use std::sync::Arc;

#[test]
fn test_widgets_share_one_preferences_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::in_dir(dir.path()).unwrap());
    store.set("weather-unit-preference", "celsius").unwrap();

    let mut todos = TodoList::load(store.clone());
    let mut notes = NoteBook::load(store.clone());
    todos.add("Renew passport", Priority::High, None).unwrap();
    notes.create("Packing", "charger, umbrella").unwrap();

    let reopened = Arc::new(FileStore::in_dir(dir.path()).unwrap());
    assert_eq!(
        reopened.get("weather-unit-preference").unwrap().as_deref(),
        Some("celsius")
    );
    assert_eq!(TodoList::load(reopened.clone()).items()[0].title, "Renew passport");
    assert_eq!(NoteBook::load(reopened).list()[0].title, "Packing");
}

#[test]
fn test_todo_view_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(FileStore::in_dir(dir.path()).unwrap());

    let mut todos = TodoList::load(store);
    let low = todos.add("Sweep", Priority::Low, None).unwrap();
    todos.add("Taxes", Priority::High, None).unwrap();
    todos.add("Email", Priority::Medium, None).unwrap();
    todos.toggle(&low.id).unwrap();

    let reloaded = TodoList::load(Arc::new(FileStore::in_dir(dir.path()).unwrap()));
    let titles: Vec<_> = reloaded
        .view(TodoFilter::All, SortField::Priority, SortDirection::Asc)
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["Taxes", "Email", "Sweep"]);
    assert_eq!(
        reloaded
            .view(TodoFilter::Active, SortField::CreatedAt, SortDirection::Desc)
            .len(),
        2
    );
}

#[test]
fn test_failed_save_leaves_list_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let store_dir = dir.path().join("store");
    let store = Arc::new(FileStore::in_dir(&store_dir).unwrap());

    let mut notes = NoteBook::load(store);
    let kept = notes.create("Kept", "still here").unwrap();

    // Replace the store's directory with a file so writes fail
    fs::remove_dir_all(&store_dir).unwrap();
    fs::write(&store_dir, "blocked").unwrap();

    let err = notes.create("Lost", "never saved").unwrap_err();
    assert!(matches!(err, WidgetError::Storage(_)));
    assert_eq!(notes.list().len(), 1);
    assert_eq!(notes.list()[0].id, kept.id);
}
