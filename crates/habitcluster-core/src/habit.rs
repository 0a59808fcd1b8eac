//! Habit definitions and the registry that owns them.
//!
//! A habit is plain data: an id, a display name and a category label.
//! Presentation layers attach their own rendering to habits by id.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{NotFoundError, ValidationError};

/// Category label for habits and clusters.
///
/// The set of categories is open; any non-empty label is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A single trackable recurring action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub category: Category,
}

/// Authoritative set of habit definitions, in registration order.
#[derive(Debug, Default, Clone)]
pub struct HabitRegistry {
    habits: Vec<Habit>,
    index: HashMap<String, usize>,
}

impl HabitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a habit.
    ///
    /// # Errors
    /// Returns [`ValidationError::DuplicateHabit`] if the id is taken and
    /// [`ValidationError::EmptyField`] for an empty id or category.
    pub fn register(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<Category>,
    ) -> Result<&Habit, ValidationError> {
        let id = id.into();
        let category = category.into();

        if id.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "id" });
        }
        if category.as_str().trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "category" });
        }
        if self.index.contains_key(&id) {
            return Err(ValidationError::DuplicateHabit(id));
        }

        let position = self.habits.len();
        self.index.insert(id.clone(), position);
        self.habits.push(Habit {
            id,
            name: name.into(),
            category,
        });
        Ok(&self.habits[position])
    }

    /// Look up a habit by id.
    pub fn get(&self, id: &str) -> Result<&Habit, NotFoundError> {
        self.index
            .get(id)
            .map(|&i| &self.habits[i])
            .ok_or_else(|| NotFoundError::Habit(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Iterate habits in registration order.
    ///
    /// The iterator is `Clone`, so a caller can restart it cheaply.
    pub fn all(&self) -> impl Iterator<Item = &Habit> + Clone + '_ {
        self.habits.iter()
    }

    /// Registration position of a habit, used for stable tie-breaking.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.habits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.habits.is_empty()
    }
}
