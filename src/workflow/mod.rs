// wfrun — Workflow model and registry

pub mod discovery;
pub mod parser;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named, ordered list of raw (unresolved) script lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub name: String,
    pub description: Option<String>,
    pub lines: Vec<String>,
}

impl Workflow {
    pub fn new(name: impl Into<String>, description: Option<String>) -> Self {
        Self {
            name: name.into(),
            description,
            lines: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Every invocable workflow of a run, keyed by name.
///
/// Built once from the parsed scripts and never mutated afterwards. Scripts are
/// merged in the order they are given: a workflow in a later script replaces a
/// same-named workflow from an earlier one as a whole record (lines are never
/// concatenated across scripts). Workflows without lines are not invocable and
/// are dropped before merging, so they never shadow an earlier definition.
#[derive(Debug, Clone, Default)]
pub struct WorkflowRegistry {
    workflows: BTreeMap<String, Workflow>,
}

impl WorkflowRegistry {
    pub fn from_parsed<I>(scripts: I) -> Self
    where
        I: IntoIterator<Item = BTreeMap<String, Workflow>>,
    {
        let mut workflows = BTreeMap::new();
        for script in scripts {
            for (name, workflow) in script {
                if workflow.is_empty() {
                    tracing::debug!(workflow = %name, "Skipping workflow without lines");
                    continue;
                }
                if workflows.insert(name.clone(), workflow).is_some() {
                    tracing::debug!(workflow = %name, "Workflow redefined by a later script");
                }
            }
        }
        Self { workflows }
    }

    /// Parse each script text and merge the results in order.
    pub fn from_scripts<'a, I>(texts: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self::from_parsed(texts.into_iter().map(parser::parse))
    }

    pub fn get(&self, name: &str) -> Option<&Workflow> {
        self.workflows.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.workflows.contains_key(name)
    }

    /// Workflows in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Workflow> {
        self.workflows.values()
    }

    pub fn names(&self) -> Vec<&str> {
        self.workflows.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_drops_empty_workflows() {
        let registry = WorkflowRegistry::from_scripts(["[empty]\n[full]\necho hi\n"]);
        assert!(!registry.contains("empty"));
        assert!(registry.contains("full"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_later_script_replaces_whole_workflow() {
        let first = "[build]\necho one\necho two\n[lint]\necho lint\n";
        let second = "[build] # rebuilt\necho three\n";
        let registry = WorkflowRegistry::from_scripts([first, second]);

        let build = registry.get("build").unwrap();
        assert_eq!(build.lines, vec!["echo three"]);
        assert_eq!(build.description.as_deref(), Some("rebuilt"));
        assert!(registry.contains("lint"));
    }

    #[test]
    fn test_empty_redefinition_does_not_shadow() {
        let first = "[build]\necho one\n";
        let second = "[build] # nothing here\n";
        let registry = WorkflowRegistry::from_scripts([first, second]);
        assert_eq!(registry.get("build").unwrap().lines, vec!["echo one"]);
    }

    #[test]
    fn test_names_are_sorted() {
        let registry = WorkflowRegistry::from_scripts(["[zeta]\necho z\n[alpha]\necho a\n"]);
        assert_eq!(registry.names(), vec!["alpha", "zeta"]);
    }
}
