//! Reconstruction of the project tree from a build's event stream.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

/// Build-tool identifier of one project instance.
pub type ProjectId = u32;

/// One notification from the external build tool.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BuildEvent {
    ProjectStarted {
        project_id: ProjectId,
        /// The project that requested this one, if any.
        parent_id: Option<ProjectId>,
        file: PathBuf,
    },
    TargetStarted {
        /// The file declaring the target.
        target_file: PathBuf,
    },
}

/// A project instance the build tool started.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BuiltProject {
    pub id: ProjectId,
    pub file: PathBuf,
    /// Only set when the parent had already started when this project did.
    pub parent: Option<ProjectId>,
}

/// Collects [`BuildEvent`]s into the set of projects built and the target
/// files they used.
#[derive(Clone, Debug, Default)]
pub struct BuildEventRecorder {
    projects: BTreeMap<ProjectId, BuiltProject>,
    target_files: BTreeSet<PathBuf>,
}

impl BuildEventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: BuildEvent) {
        match event {
            BuildEvent::ProjectStarted {
                project_id,
                parent_id,
                file,
            } => {
                let parent = parent_id.filter(|parent| self.projects.contains_key(parent));
                // A restarted id replaces the earlier instance.
                self.projects.insert(
                    project_id,
                    BuiltProject {
                        id: project_id,
                        file,
                        parent,
                    },
                );
            }
            BuildEvent::TargetStarted { target_file } => {
                self.target_files.insert(target_file);
            }
        }
    }

    pub fn project(&self, id: ProjectId) -> Option<&BuiltProject> {
        self.projects.get(&id)
    }

    /// Projects in id order.
    pub fn projects(&self) -> impl Iterator<Item = &BuiltProject> {
        self.projects.values()
    }

    /// The chain from `id` up to its root project, starting with `id`.
    pub fn ancestry(&self, id: ProjectId) -> Vec<&BuiltProject> {
        let mut chain = Vec::new();
        let mut next = self.projects.get(&id);
        while let Some(project) = next {
            // A restarted id can close a loop.
            if chain.len() >= self.projects.len() {
                break;
            }
            chain.push(project);
            next = project.parent.and_then(|parent| self.projects.get(&parent));
        }
        chain
    }

    pub fn target_files(&self) -> impl Iterator<Item = &Path> {
        self.target_files.iter().map(PathBuf::as_path)
    }

    pub fn into_parts(self) -> (Vec<BuiltProject>, Vec<PathBuf>) {
        (
            self.projects.into_values().collect(),
            self.target_files.into_iter().collect(),
        )
    }
}

impl Extend<BuildEvent> for BuildEventRecorder {
    fn extend<I: IntoIterator<Item = BuildEvent>>(&mut self, events: I) {
        for event in events {
            self.record(event);
        }
    }
}
