mod common;

use common::{document, jobs_and_nodes, JOBS_YAML, NODES_YAML};
use oasmux::merge::{merge, prune_template_paths, MergeOptions};
use oasmux::spec::{parse_document, SpecError, SpecFlags};
use serde_json::json;

fn options() -> MergeOptions {
    MergeOptions {
        version_label: "Slurm-24.05".to_string(),
    }
}

#[test]
fn test_merged_document_layout() {
    let merged = merge(&jobs_and_nodes(), &options()).unwrap();

    assert_eq!(merged["openapi"], "3.0.3");
    assert_eq!(merged["info"]["title"], "Slurm REST API");
    assert_eq!(
        merged["info"]["version"],
        "Slurm-24.05&openapi/jobs&openapi/nodes"
    );
    assert_eq!(merged["servers"], json!([{"url": "/"}]));
    assert_eq!(merged["security"], json!([{"token": []}]));

    let tags: Vec<&str> = merged["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(tags, ["slurm", "nodes"]);
    assert_eq!(merged["tags"][0]["description"], "job control");

    let paths: Vec<&String> = merged["paths"].as_object().unwrap().keys().collect();
    assert_eq!(
        paths,
        [
            "/slurm/v0.0.40/jobs",
            "/slurm/v0.0.40/job/{job_id}",
            "/slurm/v0.0.40/job/submit",
            "/slurm/v0.0.40/job/{job_id}/steps/{step_id}",
            "/slurm/v0.0.40/nodes",
            "/slurm/v0.0.40/node/{node_name}",
            "/slurm/v0.0.40/node/{weight}/drain",
        ]
    );

    let schemas = merged["components"]["schemas"].as_object().unwrap();
    assert!(schemas.contains_key("job"));
    assert!(schemas.contains_key("node"));
    assert_eq!(
        merged["components"]["securitySchemes"]["token"]["name"],
        "X-SLURM-USER-TOKEN"
    );
}

#[test]
fn test_merge_is_deterministic_and_read_only() {
    let docs = jobs_and_nodes();
    let before = docs[0].document.clone();
    let first = merge(&docs, &options()).unwrap();
    let second = merge(&docs, &options()).unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
    assert_eq!(docs[0].document, before);
}

#[test]
fn test_operation_id_flags_per_document() {
    let docs = vec![
        document("openapi/jobs", JOBS_YAML, SpecFlags::MANGLE_OPID),
        document("openapi/nodes", NODES_YAML, SpecFlags::SET_OPID),
    ];
    let merged = merge(&docs, &options()).unwrap();
    let paths = &merged["paths"];

    assert_eq!(
        paths["/slurm/v0.0.40/jobs"]["get"]["operationId"],
        "slurm_v0_0_40_slurm_get_jobs"
    );
    // nothing to mangle
    assert!(paths["/slurm/v0.0.40/job/submit"]["post"]
        .get("operationId")
        .is_none());

    assert_eq!(paths["/slurm/v0.0.40/nodes"]["get"]["operationId"], "get_nodes");
    assert_eq!(
        paths["/slurm/v0.0.40/node/{node_name}"]["post"]["operationId"],
        "post_slurm_v0_0_40_node__node_name_"
    );
}

#[test]
fn test_mangled_ids_stay_distinct_across_documents() {
    let a = document(
        "openapi/a",
        "servers: [{url: /a}]\npaths:\n  /x:\n    get: {operationId: getX}\n",
        SpecFlags::MANGLE_OPID,
    );
    let b = document(
        "openapi/b",
        "servers: [{url: /b}]\npaths:\n  /x:\n    get: {operationId: getX}\n",
        SpecFlags::MANGLE_OPID,
    );
    let merged = merge(&[a, b], &options()).unwrap();
    assert_eq!(merged["paths"]["/a/x"]["get"]["operationId"], "a_getX");
    assert_eq!(merged["paths"]["/b/x"]["get"]["operationId"], "b_getX");
}

#[test]
fn test_duplicate_tag_keeps_first_description() {
    let a = document(
        "openapi/a",
        "tags: [{name: t, description: first}]\npaths: {}\n",
        SpecFlags::empty(),
    );
    let b = document(
        "openapi/b",
        "tags: [{name: t, description: second}]\npaths: {}\n",
        SpecFlags::empty(),
    );
    let merged = merge(&[a, b], &options()).unwrap();
    assert_eq!(merged["tags"], json!([{"name": "t", "description": "first"}]));
}

#[test]
fn test_later_document_overwrites_path() {
    let a = document(
        "openapi/a",
        "servers: [{url: /api}]\npaths:\n  /ping:\n    get: {summary: from a}\n",
        SpecFlags::empty(),
    );
    let b = document(
        "openapi/b",
        "servers: [{url: /api/}]\npaths:\n  ping:\n    get: {summary: from b}\n",
        SpecFlags::empty(),
    );
    let merged = merge(&[a, b], &options()).unwrap();
    assert_eq!(merged["paths"].as_object().unwrap().len(), 1);
    assert_eq!(merged["paths"]["/api/ping"]["get"]["summary"], "from b");
}

#[test]
fn test_malformed_documents_are_rejected() {
    let no_url = document(
        "openapi/a",
        "servers: [{description: nowhere}]\npaths:\n  /x:\n    get: {}\n",
        SpecFlags::empty(),
    );
    assert!(matches!(
        merge(&[no_url], &options()),
        Err(SpecError::MissingServerUrl { .. })
    ));

    let bad_schema = document(
        "openapi/a",
        "components:\n  schemas:\n    job: 5\n",
        SpecFlags::empty(),
    );
    assert!(matches!(
        merge(&[bad_schema], &options()),
        Err(SpecError::UnexpectedType { .. })
    ));

    let bad_tag = document("openapi/a", "tags:\n  - slurm\n", SpecFlags::empty());
    assert!(matches!(
        merge(&[bad_tag], &options()),
        Err(SpecError::InvalidTag { .. })
    ));

    let bad_id = document(
        "openapi/a",
        "servers: [{url: /a}]\npaths:\n  /x:\n    get:\n      operationId: [1]\n",
        SpecFlags::MANGLE_OPID,
    );
    assert!(matches!(
        merge(&[bad_id], &options()),
        Err(SpecError::InvalidOperationId { .. })
    ));
}

#[test]
fn test_prune_template_paths() {
    let mut doc = parse_document(
        r#"
paths:
  /jobs/:
    get: {}
  /jobs/{data_parser}/query:
    get: {}
"#,
    )
    .unwrap();
    assert_eq!(prune_template_paths(&mut doc), 1);
    assert!(doc["paths"].get("/jobs/").is_some());
    assert_eq!(prune_template_paths(&mut doc), 0);
}
