//! Jadegen - command-line front end
//!
//! Reads manifests of compiled templates and writes one Go source file per
//! template.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use jadegen_application::{GenerateFile, GenerateFiles, GenerateFilesInput, GenerateFilesOutput};
use jadegen_domain::GeneratorSettings;
use jadegen_infrastructure::{
    GoFormatter, TokioFileSystem, apply_env_overrides, load_manifest, load_settings,
};
use tracing::info;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "jadegen",
    version,
    about = "Generate Go sources from compiled jade templates",
    arg_required_else_help = true
)]
pub struct Cli {
    /// Manifests of compiled templates (YAML or JSON)
    #[arg(value_name = "MANIFEST", required = true)]
    pub manifests: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub out: PathBuf,

    /// Settings file (YAML or JSON)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Go package name of the generated files
    #[arg(long, value_name = "NAME")]
    pub pkg: Option<String>,

    /// Generate inline code without package level definitions
    #[arg(long, default_value_t = false)]
    pub inline: bool,

    /// Use bytes.Buffer instead of the pooled buffer
    #[arg(long, default_value_t = false)]
    pub stdbuf: bool,

    /// Pretty-print the rendered HTML at run time
    #[arg(long = "fmt", default_value_t = false)]
    pub format: bool,

    /// Skip import resolution and only check the generated syntax
    #[arg(long, default_value_t = false)]
    pub no_imports: bool,
}

impl Cli {
    /// Applies the command-line flags on top of `settings`.
    pub fn apply(&self, settings: &mut GeneratorSettings) {
        if let Some(pkg) = &self.pkg {
            settings.package.clone_from(pkg);
        }
        settings.inline |= self.inline;
        settings.stdbuf |= self.stdbuf;
        settings.format |= self.format;
        if self.no_imports {
            settings.imports = false;
        }
    }
}

/// Resolves the settings and generates every unit of every manifest.
///
/// `env` holds the environment variables consulted for `JADEGEN_*`
/// overrides.
///
/// # Errors
///
/// Returns an error if the settings or a manifest cannot be loaded, or a
/// unit fails to generate or be written.
pub async fn run<I>(cli: Cli, env: I) -> anyhow::Result<GenerateFilesOutput>
where
    I: IntoIterator<Item = (String, String)>,
{
    let fs = TokioFileSystem::new();

    let mut settings = load_settings(&fs, cli.config.as_deref())
        .await
        .context("failed to load settings")?;
    apply_env_overrides(&mut settings, env)?;
    cli.apply(&mut settings);
    settings.validate().context("invalid settings")?;

    let mut units = Vec::new();
    for path in &cli.manifests {
        let manifest = load_manifest(&fs, path).await?;
        units.extend(manifest.units);
    }
    info!(
        manifests = cli.manifests.len(),
        units = units.len(),
        package = %settings.package,
        "generating"
    );

    let formatter = GoFormatter::with_packages(&settings.known_packages);
    let generate = GenerateFiles::new(GenerateFile::new(formatter, settings), fs);
    let output = generate
        .execute(GenerateFilesInput {
            out_dir: cli.out,
            units,
        })
        .await
        .context("generation failed")?;
    Ok(output)
}
