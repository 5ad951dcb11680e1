//! Building the solution whose assemblies get translated.
//!
//! The translator does not compile anything itself. A [`BuildBackend`] wraps
//! the external build tool; [`SolutionBuilder`] drives it over every project
//! the solution expands to, keeps going past failed projects, and collects
//! the produced assemblies plus the project tree from the tool's events.

mod recorder;

pub use recorder::{BuildEvent, BuildEventRecorder, BuiltProject, ProjectId};

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Marker the build tool ignores; solutions relying on it may build out of order.
const PROJECT_DEPENDENCIES_SECTION: &str = "ProjectSection(ProjectDependencies)";

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("cannot read solution file {}", .path.display())]
    ReadSolution {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot generate projects for {}: {message}", .solution.display())]
    Generate { solution: PathBuf, message: String },
    #[error("build of {} failed: {message}", .project.display())]
    Project { project: PathBuf, message: String },
}

/// What to build.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BuildRequest {
    pub solution: PathBuf,
    /// Solution configuration; the solution's default when `None`.
    pub configuration: Option<String>,
    /// Solution platform; the solution's default when `None`.
    pub platform: Option<String>,
    pub target: String,
}

impl BuildRequest {
    pub const DEFAULT_TARGET: &'static str = "Build";

    pub fn new(solution: impl Into<PathBuf>) -> Self {
        BuildRequest {
            solution: solution.into(),
            configuration: None,
            platform: None,
            target: Self::DEFAULT_TARGET.to_owned(),
        }
    }

    #[must_use]
    pub fn with_configuration(mut self, configuration: impl Into<String>) -> Self {
        self.configuration = Some(configuration.into());
        self
    }

    #[must_use]
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = Some(platform.into());
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// `Configuration|Platform`, with `<default>` for either part left unset.
    pub fn configuration_label(&self) -> String {
        format!(
            "{}|{}",
            self.configuration.as_deref().unwrap_or("<default>"),
            self.platform.as_deref().unwrap_or("<default>"),
        )
    }
}

/// A buildable project the backend generated from the solution.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GeneratedProject {
    pub path: PathBuf,
    /// Project file text, saved next to the solution for inspection.
    pub contents: String,
}

/// Outcome of one target of one project.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TargetResult {
    Success { outputs: Vec<PathBuf> },
    Failure { message: Option<String> },
}

/// Per-target outcomes of one project build, in the order the tool reported them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProjectBuild {
    pub targets: Vec<(String, TargetResult)>,
}

/// The external build tool.
pub trait BuildBackend {
    /// Expand the solution into the projects to build.
    fn generate_projects(
        &mut self,
        request: &BuildRequest,
    ) -> Result<Vec<GeneratedProject>, BuildError>;

    /// Run `target` of one project, reporting the tool's events to `events`.
    fn build_project(
        &mut self,
        project: &GeneratedProject,
        target: &str,
        events: &mut BuildEventRecorder,
    ) -> Result<ProjectBuild, BuildError>;
}

/// Everything a solution build produced.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SolutionBuildResult {
    /// Produced files, each listed once, sorted.
    pub output_files: Vec<PathBuf>,
    /// Projects the tool started, in id order.
    pub projects_built: Vec<BuiltProject>,
    /// Target files the tool loaded, sorted.
    pub target_files_used: Vec<PathBuf>,
}

pub struct SolutionBuilder<B> {
    backend: B,
}

impl<B: BuildBackend> SolutionBuilder<B> {
    pub fn new(backend: B) -> Self {
        SolutionBuilder { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Build every project of the solution.
    ///
    /// Only failing to read or expand the solution is an error. A project or
    /// target that fails is logged and skipped.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(solution = %request.solution.display(), build_target = %request.target)
    )]
    pub fn build(&mut self, request: &BuildRequest) -> Result<SolutionBuildResult, BuildError> {
        tracing::info!(
            configuration = %request.configuration_label(),
            "running target {:?} of {}",
            request.target,
            request.solution.display()
        );

        let solution_text =
            fs::read_to_string(&request.solution).map_err(|source| BuildError::ReadSolution {
                path: request.solution.clone(),
                source,
            })?;
        if solution_text.contains(PROJECT_DEPENDENCIES_SECTION) {
            tracing::warn!(
                "solution declares project dependencies, which the build tool ignores; \
                 the build may fail until they are resolved elsewhere"
            );
        }

        let projects = self.backend.generate_projects(request)?;
        tracing::info!(count = projects.len(), "projects generated");

        let mut events = BuildEventRecorder::new();
        let mut outputs = BTreeSet::new();
        for project in &projects {
            save_generated(project);
            tracing::info!(project = %project.path.display(), "building project");

            let build = match self
                .backend
                .build_project(project, &request.target, &mut events)
            {
                Ok(build) => build,
                Err(error) => {
                    tracing::error!(%error, "compilation failed");
                    continue;
                }
            };

            for (target, result) in build.targets {
                match result {
                    TargetResult::Failure { message } => tracing::error!(
                        build_target = %target,
                        message = message.as_deref().unwrap_or("unknown error"),
                        "compilation failed for target"
                    ),
                    TargetResult::Success { outputs: files } if !files.is_empty() => {
                        tracing::info!(
                            build_target = %target,
                            count = files.len(),
                            "target produced outputs"
                        );
                        outputs.extend(files);
                    }
                    TargetResult::Success { .. } => {}
                }
            }
        }

        let (projects_built, target_files_used) = events.into_parts();
        Ok(SolutionBuildResult {
            output_files: outputs.into_iter().collect(),
            projects_built,
            target_files_used,
        })
    }
}

/// Write a generated project to disk; failure only costs the debugging aid.
fn save_generated(project: &GeneratedProject) {
    if let Err(error) = fs::write(&project.path, &project.contents) {
        tracing::warn!(
            project = %file_name(&project.path),
            %error,
            "failed to save generated project"
        );
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}
