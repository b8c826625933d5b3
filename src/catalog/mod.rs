use crate::rates::TierHours;
use serde::{Deserialize, Serialize};

mod library;

/// Immutable task library entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub name: String,
    pub domain: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>,
    #[serde(default)]
    pub default_hours: TierHours,
    #[serde(default)]
    pub default_additional_costs: f64,
    /// Lowercase terms matched against a simulation theme.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_weeks: Option<f64>,
    /// Names of tasks that should be in the plan before this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prerequisites: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TaskTemplate {
    pub fn new(
        domain: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        default_hours: TierHours,
    ) -> Self {
        Self {
            name: name.into(),
            domain: domain.into(),
            description: description.into(),
            long_description: None,
            default_hours,
            default_additional_costs: 0.0,
            keywords: Vec::new(),
            duration_weeks: None,
            prerequisites: Vec::new(),
            notes: None,
        }
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords
            .into_iter()
            .map(|k| k.into().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        self
    }

    pub fn with_prerequisites<I, S>(mut self, prerequisites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prerequisites = prerequisites.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_additional_costs(mut self, additional_costs: f64) -> Self {
        self.default_additional_costs = additional_costs;
        self
    }

    /// True when every tier has zero default hours (advisory-only tasks).
    pub fn is_advisory_only(&self) -> bool {
        self.default_hours.iter().all(|(_, hours)| hours == 0.0)
    }
}

/// Ordered, read-only sequence of task templates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskCatalog {
    tasks: Vec<TaskTemplate>,
}

impl TaskCatalog {
    pub fn new(tasks: Vec<TaskTemplate>) -> Self {
        Self { tasks }
    }

    /// The built-in six-domain research task library.
    pub fn default_library() -> Self {
        Self::new(library::default_tasks())
    }

    pub fn tasks(&self) -> &[TaskTemplate] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TaskTemplate> {
        self.tasks.get(index)
    }

    /// Case-insensitive lookup by task name.
    pub fn find(&self, name: &str) -> Option<&TaskTemplate> {
        let needle = name.trim();
        self.tasks
            .iter()
            .find(|task| task.name.eq_ignore_ascii_case(needle))
    }

    /// Domains in order of first appearance.
    pub fn domains(&self) -> Vec<&str> {
        let mut domains: Vec<&str> = Vec::new();
        for task in &self.tasks {
            if !domains.contains(&task.domain.as_str()) {
                domains.push(task.domain.as_str());
            }
        }
        domains
    }

    pub fn tasks_in_domain<'a>(&'a self, domain: &'a str) -> impl Iterator<Item = &'a TaskTemplate> {
        self.tasks
            .iter()
            .filter(move |task| task.domain.eq_ignore_ascii_case(domain))
    }
}

impl FromIterator<TaskTemplate> for TaskCatalog {
    fn from_iter<T: IntoIterator<Item = TaskTemplate>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
