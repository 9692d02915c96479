//! Local steps: name validation, the project directory and generated files.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::{
    application::ports::{Artifact, Features, Filesystem, ScaffoldTemplates},
    domain::{FsEntry, ProjectStructure, RunContext, TaskAction, TaskError, naming},
};

/// Checks the name against package-registry naming rules.
pub struct ValidatePackageName;

#[async_trait]
impl TaskAction for ValidatePackageName {
    async fn run(&self, ctx: &mut RunContext) -> Result<(), TaskError> {
        naming::validate_package_name(ctx.name())
    }
}

/// Creates `<parent>/<name>`; refuses to reuse an existing directory.
pub struct CreateProjectDirectory {
    filesystem: Arc<dyn Filesystem>,
}

impl CreateProjectDirectory {
    pub fn new(filesystem: Arc<dyn Filesystem>) -> Self {
        Self { filesystem }
    }
}

#[async_trait]
impl TaskAction for CreateProjectDirectory {
    async fn run(&self, ctx: &mut RunContext) -> Result<(), TaskError> {
        let dir = ctx.project_dir();
        if self.filesystem.exists(&dir) {
            return Err(TaskError::AlreadyExists { path: dir });
        }
        self.filesystem.create_dir_all(&dir)?;
        info!(path = %dir.display(), "Project directory created");
        Ok(())
    }
}

/// Renders one [`Artifact`] and writes it under the project directory.
pub struct WriteArtifact {
    artifact: Artifact,
    filesystem: Arc<dyn Filesystem>,
    templates: Arc<dyn ScaffoldTemplates>,
}

impl WriteArtifact {
    pub fn new(
        artifact: Artifact,
        filesystem: Arc<dyn Filesystem>,
        templates: Arc<dyn ScaffoldTemplates>,
    ) -> Self {
        Self {
            artifact,
            filesystem,
            templates,
        }
    }
}

#[async_trait]
impl TaskAction for WriteArtifact {
    #[instrument(skip_all, fields(artifact = %self.artifact))]
    async fn run(&self, ctx: &mut RunContext) -> Result<(), TaskError> {
        let features = Features {
            react: ctx.project.react,
            app: ctx.is_app(),
        };
        let structure = self
            .templates
            .render(self.artifact, &ctx.render_context(), features)?;
        structure.validate()?;

        write_structure(self.filesystem.as_ref(), &ctx.project_dir(), &structure)?;
        debug!(entries = structure.entry_count(), "Artifact written");
        Ok(())
    }
}

/// Materialize a rendered structure under `root`.
pub(crate) fn write_structure(
    filesystem: &dyn Filesystem,
    root: &Path,
    structure: &ProjectStructure,
) -> Result<(), TaskError> {
    for entry in structure.entries() {
        match entry {
            FsEntry::Directory(dir) => filesystem.create_dir_all(&root.join(&dir.path))?,
            FsEntry::File(file) => {
                let path = root.join(&file.path);
                if let Some(parent) = path.parent() {
                    filesystem.create_dir_all(parent)?;
                }
                filesystem.write_file(&path, &file.content)?;
                if file.executable {
                    filesystem.set_executable(&path)?;
                }
            }
        }
    }
    Ok(())
}
