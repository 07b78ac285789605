//! Generate files use case.

use std::path::PathBuf;

use jadegen_domain::CompiledUnit;
use tracing::info;

use super::GenerateFile;
use crate::error::ApplicationResult;
use crate::ports::{FileSystem, SourceFormatter};

/// Input for generating a batch of files.
#[derive(Debug, Clone)]
pub struct GenerateFilesInput {
    /// Directory the generated files are written to.
    pub out_dir: PathBuf,
    /// Compiled templates, generated in order.
    pub units: Vec<CompiledUnit>,
}

/// Output from generating a batch of files.
#[derive(Debug, Clone, Default)]
pub struct GenerateFilesOutput {
    /// Paths of the written files, in generation order.
    pub written: Vec<PathBuf>,
}

/// Use case generating and writing one file per compiled template.
pub struct GenerateFiles<F: SourceFormatter, S: FileSystem> {
    generate: GenerateFile<F>,
    fs: S,
}

impl<F: SourceFormatter, S: FileSystem> GenerateFiles<F, S> {
    /// Creates a new `GenerateFiles` use case.
    #[must_use]
    pub const fn new(generate: GenerateFile<F>, fs: S) -> Self {
        Self { generate, fs }
    }

    /// Generates every unit in order and writes it to the output directory.
    ///
    /// Units are processed one after another; the first failure stops the
    /// batch and files written before it are kept.
    ///
    /// # Errors
    /// - Returns error if a unit fails to generate
    /// - Returns error if the output directory or a file cannot be written
    pub async fn execute(&self, input: GenerateFilesInput) -> ApplicationResult<GenerateFilesOutput> {
        if !self.fs.exists(&input.out_dir).await {
            self.fs.create_dir_all(&input.out_dir).await?;
        }

        let mut output = GenerateFilesOutput::default();
        for unit in input.units {
            let file = self.generate.execute(unit)?;
            let path = input.out_dir.join(&file.file_name);

            self.fs.write_file(&path, file.source.as_bytes()).await?;
            info!(
                path = %path.display(),
                function = %file.function,
                bytes = file.len(),
                "generated"
            );
            output.written.push(path);
        }

        Ok(output)
    }
}
