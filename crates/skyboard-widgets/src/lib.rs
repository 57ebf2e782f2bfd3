//! Dashboard to-do and notes widgets.
//!
//! Both keep their whole collection as one JSON array in a
//! [`PreferenceStore`], next to the weather preferences.

pub mod error;
pub mod notes;
mod persist;
pub mod todo;

pub use error::{WidgetError, WidgetResult};
pub use notes::{Note, NoteBook, NOTES_STORAGE_KEY};
pub use skyboard_core::{FileStore, MemoryStore, PreferenceStore};
pub use todo::{
    sort_todos, Priority, SortDirection, SortField, Todo, TodoEdit, TodoFilter, TodoList,
    TODO_STORAGE_KEY,
};
