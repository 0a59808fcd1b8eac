//! Cluster definitions: named groups of habits with an M-of-N threshold.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::error::{NotFoundError, ValidationError};
use crate::habit::{Category, HabitRegistry};

/// A group of habits satisfied on a day when at least `required` members
/// were checked in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    pub id: String,
    pub name: String,
    pub category: Category,
    members: Vec<String>,
    required: usize,
}

impl Cluster {
    /// Member habit ids, in declaration order.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Number of members that must be checked in for a satisfied day.
    pub fn required(&self) -> usize {
        self.required
    }

    pub fn contains(&self, habit_id: &str) -> bool {
        self.members.iter().any(|m| m == habit_id)
    }
}

/// Every registered cluster, validated against a [`HabitRegistry`].
#[derive(Debug, Default, Clone)]
pub struct ClusterDefinitionSet {
    clusters: Vec<Cluster>,
    index: HashMap<String, usize>,
}

impl ClusterDefinitionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cluster.
    ///
    /// All checks run here; a rejected cluster leaves the set untouched.
    ///
    /// # Errors
    /// - [`ValidationError::DuplicateCluster`] if the id is taken
    /// - [`ValidationError::UnknownMember`] if a member is not in `habits`
    /// - [`ValidationError::DuplicateMember`] if a member repeats
    /// - [`ValidationError::RequiredOutOfRange`] unless `1 <= required <= members`
    pub fn register(
        &mut self,
        habits: &HabitRegistry,
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<Category>,
        member_ids: Vec<String>,
        required: usize,
    ) -> Result<&Cluster, ValidationError> {
        let id = id.into();
        let category = category.into();

        if id.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "id" });
        }
        if category.as_str().trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "category" });
        }
        if self.index.contains_key(&id) {
            return Err(ValidationError::DuplicateCluster(id));
        }

        let mut seen = HashSet::with_capacity(member_ids.len());
        for member in &member_ids {
            if !habits.contains(member) {
                return Err(ValidationError::UnknownMember {
                    cluster: id,
                    habit: member.clone(),
                });
            }
            if !seen.insert(member.as_str()) {
                return Err(ValidationError::DuplicateMember {
                    cluster: id,
                    habit: member.clone(),
                });
            }
        }

        if required < 1 || required > member_ids.len() {
            return Err(ValidationError::RequiredOutOfRange {
                cluster: id,
                required,
                members: member_ids.len(),
            });
        }

        let position = self.clusters.len();
        self.index.insert(id.clone(), position);
        self.clusters.push(Cluster {
            id,
            name: name.into(),
            category,
            members: member_ids,
            required,
        });
        Ok(&self.clusters[position])
    }

    /// Look up a cluster by id.
    pub fn get(&self, id: &str) -> Result<&Cluster, NotFoundError> {
        self.index
            .get(id)
            .map(|&i| &self.clusters[i])
            .ok_or_else(|| NotFoundError::Cluster(id.to_string()))
    }

    /// Iterate clusters in registration order.
    pub fn all(&self) -> impl Iterator<Item = &Cluster> + Clone + '_ {
        self.clusters.iter()
    }

    /// Clusters that list `habit_id` as a member.
    pub fn clusters_containing<'a>(
        &'a self,
        habit_id: &'a str,
    ) -> impl Iterator<Item = &'a Cluster> + 'a {
        self.clusters.iter().filter(move |c| c.contains(habit_id))
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }
}
