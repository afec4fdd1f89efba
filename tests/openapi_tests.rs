mod common;

use common::{JOBS_YAML, NODES_YAML};
use http::Method;
use oasmux::config::GatewayConfig;
use oasmux::openapi::{InitOutcome, OpenApi};
use oasmux::plugin::{
    DocumentPlugin, OpenApiPlugin, PluginCatalog, SchemaSpecifier, SpecifyError,
};
use oasmux::router::ParamValue;
use oasmux::spec::{parse_document, SpecError, SpecFlags};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Plugin whose document can be replaced between reconfigurations.
struct MutablePlugin {
    plugin_type: String,
    document: Mutex<Option<Value>>,
    flags: SpecFlags,
    fail_init: bool,
    inits: AtomicUsize,
    finis: AtomicUsize,
}

impl MutablePlugin {
    fn new(plugin_type: &str, yaml: &str) -> Self {
        Self {
            plugin_type: plugin_type.to_string(),
            document: Mutex::new(Some(parse_document(yaml).unwrap())),
            flags: SpecFlags::empty(),
            fail_init: false,
            inits: AtomicUsize::new(0),
            finis: AtomicUsize::new(0),
        }
    }

    fn replace(&self, document: Option<Value>) {
        *self.document.lock().unwrap() = document;
    }
}

impl OpenApiPlugin for MutablePlugin {
    fn plugin_type(&self) -> &str {
        &self.plugin_type
    }

    fn init(&self) -> anyhow::Result<()> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        if self.fail_init {
            anyhow::bail!("database unreachable");
        }
        Ok(())
    }

    fn fini(&self) {
        self.finis.fetch_add(1, Ordering::SeqCst);
    }

    fn specification(&self, flags: &mut SpecFlags) -> Option<Value> {
        *flags = self.flags;
        self.document.lock().unwrap().clone()
    }
}

fn ready(catalog: &PluginCatalog, plugins: Option<&str>) -> OpenApi {
    let config = GatewayConfig {
        plugins: plugins.map(str::to_string),
        ..GatewayConfig::default()
    };
    match OpenApi::init(catalog, &config, &[]).unwrap() {
        InitOutcome::Ready(openapi) => openapi,
        InitOutcome::Listed(_) => panic!("expected plugins to load"),
    }
}

fn yaml_plugin(plugin_type: &str, yaml: &str) -> Arc<DocumentPlugin> {
    Arc::new(DocumentPlugin::new(
        plugin_type,
        parse_document(yaml).unwrap(),
        SpecFlags::empty(),
    ))
}

#[test]
fn test_list_mode_loads_nothing() {
    let jobs = yaml_plugin("openapi/jobs", JOBS_YAML);
    let catalog = PluginCatalog::new()
        .with(jobs.clone())
        .with(yaml_plugin("openapi/nodes", NODES_YAML));
    let config = GatewayConfig {
        plugins: Some("LIST".into()),
        ..GatewayConfig::default()
    };

    match OpenApi::init(&catalog, &config, &[]).unwrap() {
        InitOutcome::Listed(types) => assert_eq!(types, ["openapi/jobs", "openapi/nodes"]),
        InitOutcome::Ready(_) => panic!("list mode must not load plugins"),
    }
    assert!(!jobs.is_initialized());
}

#[test]
fn test_selection_errors() {
    let catalog = PluginCatalog::new().with(yaml_plugin("openapi/jobs", JOBS_YAML));
    let config = GatewayConfig {
        plugins: Some("jobs,accounts".into()),
        ..GatewayConfig::default()
    };
    let err = OpenApi::init(&catalog, &config, &[]).unwrap_err();
    assert!(
        matches!(&err, SpecError::UnknownPlugin { name } if name == "openapi/accounts"),
        "{err}"
    );

    let empty = PluginCatalog::new();
    assert!(matches!(
        OpenApi::init(&empty, &GatewayConfig::default(), &[]),
        Err(SpecError::NoPlugins)
    ));
}

#[test]
fn test_register_find_and_describe() {
    let catalog = PluginCatalog::new()
        .with(yaml_plugin("openapi/jobs", JOBS_YAML))
        .with(yaml_plugin("openapi/nodes", NODES_YAML));
    let openapi = ready(&catalog, Some("openapi/jobs, nodes"));
    assert_eq!(openapi.plugin_types(), ["openapi/jobs", "openapi/nodes"]);

    let tag = openapi
        .register_path("/slurm/v0.0.40/job/{job_id}")
        .unwrap()
        .unwrap();
    assert_eq!(openapi.register_path("/nowhere/{x}").unwrap(), None);

    let matched = openapi
        .find_path_tag(&Method::DELETE, "/slurm/v0.0.40/job/12")
        .unwrap();
    assert_eq!(matched.tag, tag);
    assert_eq!(matched.params.get("job_id"), Some(&ParamValue::Integer(12)));

    assert_eq!(
        openapi.routes().describe(tag).unwrap(),
        [
            "GET /slurm/v0.0.40/job/{job_id}",
            "DELETE /slurm/v0.0.40/job/{job_id}"
        ]
    );
    openapi.log_path_tag_methods(tag);

    openapi.unregister_path(tag);
    assert!(openapi
        .find_path_tag(&Method::GET, "/slurm/v0.0.40/job/12")
        .is_none());
}

#[test]
fn test_register_all_paths_skips_duplicates() {
    let catalog = PluginCatalog::new()
        .with(yaml_plugin("openapi/jobs", JOBS_YAML))
        .with(yaml_plugin("openapi/jobs_copy", JOBS_YAML));
    let openapi = ready(&catalog, None);

    let registered = openapi.register_all_paths().unwrap();
    assert_eq!(registered.len(), 4);
    assert_eq!(openapi.routes().len(), 4);
    assert_eq!(registered[0].0, "/slurm/v0.0.40/jobs");
}

#[test]
fn test_specification_uses_configured_label() {
    let catalog = PluginCatalog::new().with(yaml_plugin("openapi/jobs", JOBS_YAML));
    let config = GatewayConfig {
        plugins: None,
        version_label: "Slurm-24.05".into(),
    };
    let InitOutcome::Ready(openapi) = OpenApi::init(&catalog, &config, &[]).unwrap() else {
        panic!("expected plugins to load");
    };
    let spec = openapi.specification().unwrap();
    assert_eq!(spec["info"]["version"], "Slurm-24.05&openapi/jobs");
}

#[test]
fn test_missing_document_is_fatal() {
    let plugin = Arc::new(MutablePlugin::new("openapi/jobs", JOBS_YAML));
    plugin.replace(None);
    let catalog = PluginCatalog::new().with(plugin.clone());

    assert!(matches!(
        OpenApi::init(&catalog, &GatewayConfig::default(), &[]),
        Err(SpecError::PluginIncomplete { .. })
    ));
    assert_eq!(plugin.inits.load(Ordering::SeqCst), 0);
}

#[test]
fn test_failed_init_finalizes_earlier_plugins() {
    let first = Arc::new(MutablePlugin::new("openapi/jobs", JOBS_YAML));
    let mut failing = MutablePlugin::new("openapi/nodes", NODES_YAML);
    failing.fail_init = true;
    let failing = Arc::new(failing);
    let catalog = PluginCatalog::new().with(first.clone()).with(failing.clone());

    let err = OpenApi::init(&catalog, &GatewayConfig::default(), &[]).unwrap_err();
    assert!(matches!(&err, SpecError::PluginInit { plugin, .. } if plugin == "openapi/nodes"));
    assert_eq!(first.finis.load(Ordering::SeqCst), 1);
    assert_eq!(failing.finis.load(Ordering::SeqCst), 0);
}

#[test]
fn test_shutdown_runs_once() {
    let plugin = Arc::new(MutablePlugin::new("openapi/jobs", JOBS_YAML));
    let catalog = PluginCatalog::new().with(plugin.clone());
    let openapi = ready(&catalog, None);
    assert_eq!(plugin.inits.load(Ordering::SeqCst), 1);

    openapi.shutdown();
    openapi.shutdown();
    drop(openapi);
    assert_eq!(plugin.finis.load(Ordering::SeqCst), 1);
}

#[test]
fn test_reconfigure_keeps_tags() {
    let plugin = Arc::new(MutablePlugin::new("openapi/jobs", JOBS_YAML));
    let catalog = PluginCatalog::new().with(plugin.clone());
    let openapi = ready(&catalog, None);
    let registered = openapi.register_all_paths().unwrap();
    let job_tag = registered
        .iter()
        .find(|(t, _)| t == "/slurm/v0.0.40/job/{job_id}")
        .unwrap()
        .1;

    // job_id becomes a string and the submit path disappears
    let updated = JOBS_YAML
        .replace("      schema:\n        type: integer\n  schemas:", "      schema:\n        type: string\n  schemas:")
        .replace("  /job/submit:\n    post:\n      summary: submit a job\n", "");
    plugin.replace(Some(parse_document(&updated).unwrap()));

    assert_eq!(openapi.reconfigure(&[]).unwrap(), 3);
    let matched = openapi
        .find_path_tag(&Method::GET, "/slurm/v0.0.40/job/abc")
        .unwrap();
    assert_eq!(matched.tag, job_tag);
    assert_eq!(
        matched.params.get("job_id"),
        Some(&ParamValue::String("abc".into()))
    );
    assert!(openapi
        .find_path_tag(&Method::POST, "/slurm/v0.0.40/job/submit")
        .is_none());
}

#[test]
fn test_failed_reconfigure_keeps_previous_state() {
    let plugin = Arc::new(MutablePlugin::new("openapi/jobs", JOBS_YAML));
    let catalog = PluginCatalog::new().with(plugin.clone());
    let openapi = ready(&catalog, None);
    openapi.register_all_paths().unwrap();

    plugin.replace(None);
    assert!(openapi.reconfigure(&[]).is_err());

    let broken = JOBS_YAML.replace("type: integer", "type: text");
    plugin.replace(Some(parse_document(&broken).unwrap()));
    assert!(openapi.reconfigure(&[]).is_err());

    assert!(openapi
        .find_path_tag(&Method::GET, "/slurm/v0.0.40/job/5")
        .is_some());
    assert_eq!(
        openapi.specification().unwrap()["paths"]["/slurm/v0.0.40/job/{job_id}"]["parameters"][0]
            ["$ref"],
        "#/components/parameters/job_id"
    );
}

struct QueryPaths;

impl SchemaSpecifier for QueryPaths {
    fn name(&self) -> &str {
        "data_parser/v0.0.40"
    }

    fn specify(&self, document: &mut Value) -> Result<(), SpecifyError> {
        let Some(paths) = document.get_mut("paths").and_then(Value::as_object_mut) else {
            return Err(SpecifyError::NotSupported);
        };
        paths.insert("/jobs/query".to_string(), json!({"get": {}}));
        Ok(())
    }
}

struct Broken;

impl SchemaSpecifier for Broken {
    fn name(&self) -> &str {
        "data_parser/broken"
    }

    fn specify(&self, _document: &mut Value) -> Result<(), SpecifyError> {
        Err(SpecifyError::Failed("schema conflict".into()))
    }
}

const TEMPLATED_YAML: &str = r#"
servers:
  - url: /slurm/v0.0.40
paths:
  /jobs/:
    get: {}
  /jobs/{data_parser}/query:
    get: {}
"#;

#[test]
fn test_specifiers_run_then_template_paths_are_pruned() {
    let plugin = Arc::new(DocumentPlugin::new(
        "openapi/jobs",
        parse_document(TEMPLATED_YAML).unwrap(),
        SpecFlags::APPLY_EXTERNAL_SCHEMA,
    ));
    let catalog = PluginCatalog::new().with(plugin);
    let specifiers: Vec<Arc<dyn SchemaSpecifier>> = vec![Arc::new(QueryPaths)];

    let InitOutcome::Ready(openapi) =
        OpenApi::init(&catalog, &GatewayConfig::default(), &specifiers).unwrap()
    else {
        panic!("expected plugins to load");
    };

    let documents = openapi.documents();
    let paths = documents[0].document["paths"].as_object().unwrap();
    assert!(paths.contains_key("/jobs/query"));
    assert!(!paths.keys().any(|k| k.contains("{data_parser}")));
}

#[test]
fn test_specifiers_skipped_without_flag() {
    let plugin = Arc::new(DocumentPlugin::new(
        "openapi/jobs",
        parse_document(TEMPLATED_YAML).unwrap(),
        SpecFlags::empty(),
    ));
    let catalog = PluginCatalog::new().with(plugin);
    let specifiers: Vec<Arc<dyn SchemaSpecifier>> = vec![Arc::new(Broken)];

    let InitOutcome::Ready(openapi) =
        OpenApi::init(&catalog, &GatewayConfig::default(), &specifiers).unwrap()
    else {
        panic!("expected plugins to load");
    };
    assert_eq!(openapi.documents()[0].document["paths"].as_object().unwrap().len(), 2);
}

#[test]
fn test_failed_specifier_is_fatal() {
    let plugin = Arc::new(DocumentPlugin::new(
        "openapi/jobs",
        parse_document(TEMPLATED_YAML).unwrap(),
        SpecFlags::APPLY_EXTERNAL_SCHEMA,
    ));
    let catalog = PluginCatalog::new().with(plugin.clone());
    let specifiers: Vec<Arc<dyn SchemaSpecifier>> = vec![Arc::new(Broken)];

    let err = OpenApi::init(&catalog, &GatewayConfig::default(), &specifiers).unwrap_err();
    assert!(matches!(err, SpecError::Specifier { .. }), "{err}");
    assert!(!plugin.is_initialized());
}
