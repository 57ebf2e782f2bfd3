//! Titled notes kept newest first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skyboard_core::PreferenceStore;
use std::sync::Arc;

use crate::error::{WidgetError, WidgetResult};
use crate::persist;

pub const NOTES_STORAGE_KEY: &str = "dashboard-notes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

pub struct NoteBook {
    store: Arc<dyn PreferenceStore>,
    notes: Vec<Note>,
}

impl NoteBook {
    pub fn load(store: Arc<dyn PreferenceStore>) -> Self {
        let notes = persist::load_list(store.as_ref(), NOTES_STORAGE_KEY);
        Self { store, notes }
    }

    pub fn list(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: &str) -> WidgetResult<&Note> {
        let index = self.index_of(id)?;
        Ok(&self.notes[index])
    }

    /// Both title and content are required.
    pub fn create(&mut self, title: &str, content: &str) -> WidgetResult<Note> {
        validate(title, content)?;

        let note = Note {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        };

        let mut notes = Vec::with_capacity(self.notes.len() + 1);
        notes.push(note.clone());
        notes.extend(self.notes.iter().cloned());
        self.commit(notes)?;

        tracing::info!("Created note {}", note.id);
        Ok(note)
    }

    /// Replace title and content. The creation time is kept.
    pub fn update(&mut self, id: &str, title: &str, content: &str) -> WidgetResult<Note> {
        let index = self.index_of(id)?;
        validate(title, content)?;

        let mut notes = self.notes.clone();
        notes[index].title = title.to_string();
        notes[index].content = content.to_string();
        let updated = notes[index].clone();

        self.commit(notes)?;
        Ok(updated)
    }

    pub fn delete(&mut self, id: &str) -> WidgetResult<Note> {
        let index = self.index_of(id)?;
        let mut notes = self.notes.clone();
        let removed = notes.remove(index);
        self.commit(notes)?;
        Ok(removed)
    }

    fn index_of(&self, id: &str) -> WidgetResult<usize> {
        persist::find_index(&self.notes, id, |note| note.id.as_str())
    }

    fn commit(&mut self, notes: Vec<Note>) -> WidgetResult<()> {
        persist::save_list(self.store.as_ref(), NOTES_STORAGE_KEY, &notes)?;
        self.notes = notes;
        Ok(())
    }
}

fn validate(title: &str, content: &str) -> WidgetResult<()> {
    if title.trim().is_empty() {
        return Err(WidgetError::validation("A note needs a title"));
    }
    if content.trim().is_empty() {
        return Err(WidgetError::validation("A note needs some content"));
    }
    Ok(())
}
