use crate::config::GatewayConfig;
use crate::openapi::{InitOutcome, OpenApi};
use crate::plugin::{DocumentPlugin, PluginCatalog};
use crate::spec::{parse_method, SpecFlags};
use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(author, version, about = "Inspect, route and merge OpenAPI plugin documents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand: which documents to load and how.
#[derive(Args, Debug, Clone)]
pub struct DocumentArgs {
    /// OpenAPI documents (`.json`, `.yaml`); each becomes one plugin named
    /// after its file stem
    #[arg(short, long = "spec", required = true)]
    pub specs: Vec<PathBuf>,

    /// Comma-separated plugins to load, or `list`
    #[arg(short, long, env = "OASMUX_PLUGINS")]
    pub plugins: Option<String>,

    /// Mangle operation ids with the server path prefix
    #[arg(long)]
    pub mangle: bool,

    /// Synthesize missing operation ids
    #[arg(long)]
    pub set_opid: bool,
}

impl DocumentArgs {
    fn flags(&self) -> SpecFlags {
        let mut flags = SpecFlags::empty();
        flags.set(SpecFlags::MANGLE_OPID, self.mangle);
        flags.set(SpecFlags::SET_OPID, self.set_opid);
        flags
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the merged specification as JSON
    Merge {
        #[command(flatten)]
        documents: DocumentArgs,

        /// Leading part of `info.version`
        #[arg(long, env = "OASMUX_VERSION_LABEL")]
        version_label: Option<String>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Register every path and print `<tag> <METHOD> <path>` per method
    Routes {
        #[command(flatten)]
        documents: DocumentArgs,
    },
    /// Match one request and print the tag with its typed path parameters
    Match {
        #[command(flatten)]
        documents: DocumentArgs,

        /// HTTP method, e.g. GET
        method: String,

        /// Request path, e.g. /slurm/v0.0.40/job/7
        path: String,
    },
}

fn catalog_from(args: &DocumentArgs) -> anyhow::Result<PluginCatalog> {
    let flags = args.flags();
    let mut catalog = PluginCatalog::new();
    for path in &args.specs {
        let plugin = DocumentPlugin::from_file(path, flags)
            .with_context(|| format!("failed to load {}", path.display()))?;
        catalog.register(Arc::new(plugin));
    }
    Ok(catalog)
}

/// Build the context; `Ok(None)` means the plugin list was printed instead.
fn open(args: &DocumentArgs, version_label: Option<&str>) -> anyhow::Result<Option<OpenApi>> {
    let catalog = catalog_from(args)?;
    let mut config = GatewayConfig {
        plugins: args.plugins.clone(),
        ..GatewayConfig::default()
    };
    if let Some(label) = version_label {
        config.version_label = label.to_string();
    }

    match OpenApi::init(&catalog, &config, &[])? {
        InitOutcome::Listed(types) => {
            println!("Possible OpenAPI plugins:");
            for plugin_type in types {
                println!("{plugin_type}");
            }
            Ok(None)
        }
        InitOutcome::Ready(openapi) => Ok(Some(openapi)),
    }
}

/// Run one parsed command.
///
/// # Errors
///
/// Returns an error when a document cannot be loaded, the documents are
/// inconsistent, or the output cannot be written.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Merge {
            documents,
            version_label,
            output,
        } => {
            let Some(openapi) = open(&documents, version_label.as_deref())? else {
                return Ok(());
            };
            let merged = serde_json::to_string_pretty(&openapi.specification()?)?;
            match output {
                Some(path) => std::fs::write(&path, merged)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{merged}"),
            }
            Ok(())
        }
        Commands::Routes { documents } => {
            let Some(openapi) = open(&documents, None)? else {
                return Ok(());
            };
            let registered = openapi.register_all_paths()?;
            let routes = openapi.routes();
            for (_, tag) in registered {
                for line in routes.describe(tag).unwrap_or_default() {
                    println!("{tag} {line}");
                }
            }
            Ok(())
        }
        Commands::Match {
            documents,
            method,
            path,
        } => {
            let method = parse_method(&method)
                .ok_or_else(|| anyhow!("unsupported HTTP method: {method}"))?;
            let Some(openapi) = open(&documents, None)? else {
                return Ok(());
            };
            openapi.register_all_paths()?;
            match openapi.find_path_tag(&method, &path) {
                Some(matched) => {
                    let template = openapi
                        .routes()
                        .template_of(matched.tag)
                        .map(str::to_string)
                        .unwrap_or_default();
                    let report = serde_json::json!({
                        "tag": matched.tag.to_string(),
                        "template": template,
                        "parameters": matched.params.to_value(),
                    });
                    println!("{}", serde_json::to_string_pretty(&report)?);
                    Ok(())
                }
                None => Err(anyhow!("no route for {method} {path}")),
            }
        }
    }
}
