//! Persisted to-do list with priorities, due dates, filtering and sorting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use skyboard_core::PreferenceStore;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{WidgetError, WidgetResult};
use crate::persist;

pub const TODO_STORAGE_KEY: &str = "weather-app-todos";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Sort rank: high first.
    fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    /// Next priority in the medium, high, low cycle.
    pub fn cycle(self) -> Self {
        match self {
            Priority::Medium => Priority::High,
            Priority::High => Priority::Low,
            Priority::Low => Priority::Medium,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(WidgetError::validation(format!("Unknown priority: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
}

/// Replacement values for [`TodoList::edit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoEdit {
    pub title: String,
    pub priority: Priority,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    DueDate,
    Priority,
}

impl FromStr for SortField {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created" | "createdat" | "created-at" => Ok(SortField::CreatedAt),
            "due" | "duedate" | "due-date" => Ok(SortField::DueDate),
            "priority" => Ok(SortField::Priority),
            other => Err(WidgetError::validation(format!("Unknown sort field: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(WidgetError::validation(format!("Unknown sort direction: {}", other))),
        }
    }
}

/// Which to-dos a view shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TodoFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl TodoFilter {
    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            TodoFilter::All => true,
            TodoFilter::Active => !todo.completed,
            TodoFilter::Completed => todo.completed,
        }
    }
}

impl FromStr for TodoFilter {
    type Err = WidgetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(TodoFilter::All),
            "active" => Ok(TodoFilter::Active),
            "completed" | "done" => Ok(TodoFilter::Completed),
            other => Err(WidgetError::validation(format!("Unknown filter: {}", other))),
        }
    }
}

/// Stable sort by `field`, then flipped for [`SortDirection::Desc`].
///
/// On a due date sort, to-dos without a due date stay last in both
/// directions.
pub fn sort_todos(todos: &mut [Todo], field: SortField, direction: SortDirection) {
    todos.sort_by(|a, b| {
        let ordering = match field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::Priority => a.priority.rank().cmp(&b.priority.rank()),
            SortField::DueDate => match (a.due_date, b.due_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (None, None) => return Ordering::Equal,
                (None, Some(_)) => return Ordering::Greater,
                (Some(_), None) => return Ordering::Less,
            },
        };

        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// The to-do list, persisted as a JSON array after every change.
///
/// A change only lands in memory once the store accepted it.
pub struct TodoList {
    store: Arc<dyn PreferenceStore>,
    items: Vec<Todo>,
}

impl TodoList {
    /// Load the saved list. Malformed data starts an empty list.
    pub fn load(store: Arc<dyn PreferenceStore>) -> Self {
        let items = persist::load_list(store.as_ref(), TODO_STORAGE_KEY);
        Self { store, items }
    }

    /// Stored order: newest first.
    pub fn items(&self) -> &[Todo] {
        &self.items
    }

    pub fn get(&self, id: &str) -> WidgetResult<&Todo> {
        let index = self.index_of(id)?;
        Ok(&self.items[index])
    }

    /// Filtered and sorted copy of the list.
    pub fn view(&self, filter: TodoFilter, field: SortField, direction: SortDirection) -> Vec<Todo> {
        let mut todos: Vec<Todo> = self
            .items
            .iter()
            .filter(|todo| filter.matches(todo))
            .cloned()
            .collect();
        sort_todos(&mut todos, field, direction);
        todos
    }

    /// Add an open to-do at the top of the list. Blank titles are rejected.
    pub fn add(
        &mut self,
        title: &str,
        priority: Priority,
        due_date: Option<DateTime<Utc>>,
    ) -> WidgetResult<Todo> {
        let title = required_title(title)?;

        let todo = Todo {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            completed: false,
            created_at: Utc::now(),
            priority,
            due_date,
        };

        let mut items = Vec::with_capacity(self.items.len() + 1);
        items.push(todo.clone());
        items.extend(self.items.iter().cloned());
        self.commit(items)?;

        tracing::info!("Added to-do {}", todo.id);
        Ok(todo)
    }

    /// Flip completion. Returns the new state.
    pub fn toggle(&mut self, id: &str) -> WidgetResult<bool> {
        let index = self.index_of(id)?;
        let mut items = self.items.clone();
        items[index].completed = !items[index].completed;
        let completed = items[index].completed;
        self.commit(items)?;
        Ok(completed)
    }

    pub fn delete(&mut self, id: &str) -> WidgetResult<Todo> {
        let index = self.index_of(id)?;
        let mut items = self.items.clone();
        let removed = items.remove(index);
        self.commit(items)?;
        Ok(removed)
    }

    /// Replace title, priority and due date. The title is trimmed and must
    /// not be blank.
    pub fn edit(&mut self, id: &str, edit: TodoEdit) -> WidgetResult<Todo> {
        let index = self.index_of(id)?;
        let title = required_title(&edit.title)?;

        let mut items = self.items.clone();
        let todo = &mut items[index];
        todo.title = title;
        todo.priority = edit.priority;
        todo.due_date = edit.due_date;
        let updated = todo.clone();

        self.commit(items)?;
        Ok(updated)
    }

    /// Drop every completed to-do. Returns how many went; zero writes nothing.
    pub fn delete_completed(&mut self) -> WidgetResult<usize> {
        let remaining: Vec<Todo> = self.items.iter().filter(|t| !t.completed).cloned().collect();
        let removed = self.items.len() - remaining.len();
        if removed == 0 {
            return Ok(0);
        }

        self.commit(remaining)?;
        Ok(removed)
    }

    /// Complete every open to-do. Returns how many changed; zero writes nothing.
    pub fn mark_all_completed(&mut self) -> WidgetResult<usize> {
        let open = self.items.iter().filter(|t| !t.completed).count();
        if open == 0 {
            return Ok(0);
        }

        let items = self
            .items
            .iter()
            .cloned()
            .map(|mut todo| {
                todo.completed = true;
                todo
            })
            .collect();
        self.commit(items)?;
        Ok(open)
    }

    fn index_of(&self, id: &str) -> WidgetResult<usize> {
        persist::find_index(&self.items, id, |todo| todo.id.as_str())
    }

    fn commit(&mut self, items: Vec<Todo>) -> WidgetResult<()> {
        persist::save_list(self.store.as_ref(), TODO_STORAGE_KEY, &items)?;
        self.items = items;
        Ok(())
    }
}

fn required_title(title: &str) -> WidgetResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(WidgetError::validation("A title is required"));
    }
    Ok(title.to_string())
}
