use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use indexmap::IndexMap;

use ocg_core::config::{self, CONFIG_FILE_NAME, OcgConfig};
use ocg_core::ir::IrSpec;
use ocg_core::parse::{self, spec::OpenApiSpec};
use ocg_core::transform;
use ocg_core::{CodeGenerator, GeneratedFile};
use ocg_php_client::PhpClientGenerator;

#[derive(Parser)]
#[command(name = "ocg", about = "OpenAPI 3.1 to PHP client generator", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a PHP client from an OpenAPI document
    Generate {
        /// Path to the OpenAPI document (YAML or JSON)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Root PHP namespace, e.g. `Acme\Petstore`
        #[arg(long)]
        namespace: Option<String>,
    },

    /// Validate an OpenAPI document
    Validate {
        /// Path to the OpenAPI document
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Inspect the descriptors built from an OpenAPI document
    Inspect {
        /// Path to the OpenAPI document
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "yaml")]
        format: InspectFormat,
    },

    /// Initialize a new ocg configuration
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, ValueEnum)]
enum InspectFormat {
    Yaml,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            input,
            output,
            namespace,
        } => cmd_generate(input, output, namespace),

        Commands::Validate { input } => cmd_validate(&input),

        Commands::Inspect { input, format } => cmd_inspect(&input, format),

        Commands::Init { force } => cmd_init(Path::new(CONFIG_FILE_NAME), force),

        Commands::Completions { shell } => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            clap_complete::generate(shell, &mut cmd, "ocg", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// Try to load the project config file from the current directory.
fn try_load_config() -> Result<Option<OcgConfig>> {
    let config_path = PathBuf::from(CONFIG_FILE_NAME);
    config::load_config(&config_path).map_err(|e| anyhow::anyhow!(e))
}

fn load_document(path: &Path) -> Result<OpenApiSpec> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    let parsed = match ext {
        "json" => parse::from_json(&content),
        _ => parse::from_yaml(&content),
    }
    .with_context(|| format!("failed to parse {}", path.display()))?;

    Ok(parsed)
}

fn load_spec(path: &Path, cfg: &OcgConfig) -> Result<IrSpec> {
    let parsed = load_document(path)?;
    let ir = transform::transform_with_options(&parsed, &cfg.transform_options())
        .with_context(|| format!("failed to build descriptors for {}", path.display()))?;
    Ok(ir)
}

/// Write generated files to disk under the given base directory.
fn write_files(base: &Path, files: &[GeneratedFile]) -> Result<()> {
    for file in files {
        let path = base.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        fs::write(&path, &file.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::debug!("wrote {}", path.display());
    }
    Ok(())
}

/// Generate the "do not edit" README.
fn readme_content() -> &'static str {
    r#"# Generated Code - Do Not Edit

This directory is **auto-generated** by ocg.
Any manual changes will be overwritten the next time `ocg generate` is run.

To regenerate, run:
```
ocg generate
```

Install the client's PSR-18 and PSR-17 dependencies with `composer install`.
To customize the generated output, edit your `.ocg.yaml` configuration file.
"#
}

/// Run the whole pipeline and write the client into `output_dir`.
/// Returns the number of files written, README included.
fn generate_into(input: &Path, output_dir: &Path, cfg: &OcgConfig) -> Result<usize> {
    let ir = load_spec(input, cfg)?;

    let files = PhpClientGenerator
        .generate(&ir, cfg)
        .with_context(|| format!("failed to generate a client for {}", input.display()))?;

    fs::create_dir_all(output_dir).with_context(|| {
        format!("failed to create output directory {}", output_dir.display())
    })?;
    write_files(output_dir, &files)?;

    let readme_path = output_dir.join("README.md");
    fs::write(&readme_path, readme_content())
        .with_context(|| format!("failed to write {}", readme_path.display()))?;

    Ok(files.len() + 1)
}

fn cmd_generate(
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    namespace: Option<String>,
) -> Result<()> {
    let mut cfg = try_load_config()?.unwrap_or_default();
    if let Some(namespace) = namespace {
        cfg.namespace = namespace;
    }
    let input = input.unwrap_or_else(|| PathBuf::from(&cfg.input));
    let output_dir = output.unwrap_or_else(|| PathBuf::from(&cfg.output));

    eprintln!(
        "Generating {} → {} ({})",
        input.display(),
        output_dir.display(),
        cfg.namespace
    );
    let written = generate_into(&input, &output_dir, &cfg)?;
    eprintln!("Generated {} files in {}", written, output_dir.display());

    eprintln!("\nThe generated directory should not be edited manually; changes will be overwritten.");
    Ok(())
}

fn cmd_validate(input: &Path) -> Result<()> {
    let parsed = load_document(input)?;

    eprintln!(
        "Valid OpenAPI {} document: {}",
        parsed.openapi, parsed.info.title
    );
    eprintln!("  Version: {}", parsed.info.version);
    eprintln!("  Paths: {}", parsed.paths.len());

    if let Some(ref components) = parsed.components {
        eprintln!("  Component schemas: {}", components.schemas.len());
    }

    // Naming and cycle checks only run during the transform
    let ir = transform::transform(&parsed)?;
    eprintln!("  Operations: {}", ir.operations.len());
    eprintln!("  Models: {}", ir.entities.len());
    eprintln!("  Responses: {}", ir.responses.len());
    eprintln!("  APIs: {}", ir.apis.len());

    eprintln!("Validation successful.");
    Ok(())
}

fn cmd_inspect(input: &Path, format: InspectFormat) -> Result<()> {
    let cfg = try_load_config()?.unwrap_or_default();
    let ir = load_spec(input, &cfg)?;

    let summary = build_inspect_summary(&ir);

    match format {
        InspectFormat::Yaml => {
            let yaml = serde_yaml_ng::to_string(&summary)?;
            print!("{}", yaml);
        }
        InspectFormat::Json => {
            let json = serde_json::to_string_pretty(&summary)?;
            println!("{}", json);
        }
    }

    Ok(())
}

fn build_inspect_summary(ir: &IrSpec) -> serde_json::Value {
    let entities: Vec<serde_json::Value> = ir
        .entities
        .iter()
        .map(|entity| {
            serde_json::json!({
                "name": entity.name,
                "kind": entity.kind.as_str(),
                "properties": entity
                    .properties
                    .iter()
                    .map(|p| &p.original_name)
                    .collect::<Vec<_>>(),
            })
        })
        .collect();

    let responses: Vec<serde_json::Value> = ir
        .responses
        .iter()
        .map(|response| {
            serde_json::json!({
                "name": response.name,
                "status": response.status,
                "body": response.body.as_ref().map(|b| b.hints.to_string()),
            })
        })
        .collect();

    let operations: Vec<serde_json::Value> = ir
        .operations
        .iter()
        .map(|op| {
            serde_json::json!({
                "name": op.method_name,
                "method": op.http_method.as_str(),
                "path": op.path,
                "tags": op.tags,
                "responses": op
                    .responses
                    .iter()
                    .map(|r| (r.status.as_str(), r.class_name.as_str()))
                    .collect::<IndexMap<_, _>>(),
            })
        })
        .collect();

    let apis: IndexMap<&str, Vec<&str>> = ir
        .apis
        .iter()
        .map(|api| {
            let methods = api
                .operations
                .iter()
                .filter_map(|&i| ir.operations.get(i))
                .map(|op| op.method_name.as_str())
                .collect();
            (api.class_name.as_str(), methods)
        })
        .collect();

    serde_json::json!({
        "info": {
            "title": ir.info.title,
            "version": ir.info.version,
        },
        "namespace": ir.namespace,
        "servers": ir.servers.iter().map(|s| &s.url).collect::<Vec<_>>(),
        "entities": entities,
        "responses": responses,
        "operations": operations,
        "apis": apis,
    })
}

fn cmd_init(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(config_path, config::default_config_content())
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    eprintln!("Created {}", config_path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PETSTORE: &str = include_str!("../../ocg-core/tests/fixtures/petstore.yaml");

    fn petstore_file(dir: &Path) -> PathBuf {
        let path = dir.join("petstore.yaml");
        fs::write(&path, PETSTORE).unwrap();
        path
    }

    #[test]
    fn test_generate_writes_client_tree() {
        let dir = tempfile::tempdir().unwrap();
        let input = petstore_file(dir.path());
        let out = dir.path().join("client");

        let written = generate_into(&input, &out, &OcgConfig::default()).unwrap();

        assert!(written > 1);
        assert!(out.join("README.md").exists());
        assert!(out.join("composer.json").exists());
        assert!(out.join("src/Configuration.php").exists());
        assert!(out.join("src/AbstractApi.php").exists());
        assert!(out.join("src/Model/Pet.php").exists());
        assert!(out.join("src/Api/PetApi.php").exists());

        let pet = fs::read_to_string(out.join("src/Model/Pet.php")).unwrap();
        assert!(pet.contains("namespace Api\\Client\\Model;"));
    }

    #[test]
    fn test_generate_honours_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let input = petstore_file(dir.path());
        let out = dir.path().join("client");
        let cfg = OcgConfig {
            namespace: "Acme\\Petstore".to_string(),
            ..OcgConfig::default()
        };

        generate_into(&input, &out, &cfg).unwrap();

        let api = fs::read_to_string(out.join("src/Api/PetApi.php")).unwrap();
        assert!(api.contains("namespace Acme\\Petstore\\Api;"));
    }

    #[test]
    fn test_generate_reports_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = generate_into(
            &dir.path().join("missing.yaml"),
            &dir.path().join("out"),
            &OcgConfig::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn test_load_json_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("api.json");
        fs::write(
            &path,
            r#"{"openapi":"3.1.0","info":{"title":"Tiny","version":"1"},"paths":{}}"#,
        )
        .unwrap();

        let ir = load_spec(&path, &OcgConfig::default()).unwrap();
        assert_eq!(ir.info.title, "Tiny");
        assert!(ir.operations.is_empty());
    }

    #[test]
    fn test_inspect_summary_lists_apis() {
        let dir = tempfile::tempdir().unwrap();
        let input = petstore_file(dir.path());
        let ir = load_spec(&input, &OcgConfig::default()).unwrap();

        let summary = build_inspect_summary(&ir);

        assert_eq!(summary["namespace"], "Api\\Client");
        assert_eq!(summary["entities"][0]["name"], "Pet");
        assert_eq!(summary["entities"][0]["kind"], "object");
        assert!(summary["apis"]["PetApi"].as_array().unwrap().len() == 4);
        assert_eq!(summary["apis"]["StoreApi"][0], "getInventory");
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        cmd_init(&path, false).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("namespace"));

        assert!(cmd_init(&path, false).is_err());
        cmd_init(&path, true).unwrap();
    }
}
