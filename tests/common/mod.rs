#![allow(dead_code)]

use oasmux::spec::{parse_document, SpecDocument, SpecFlags};
use std::io::Write;

pub const JOBS_YAML: &str = r##"
openapi: 3.0.3
info:
  title: Slurm REST API
  version: "0.0.40"
security:
  - token: []
tags:
  - name: slurm
    description: job control
servers:
  - url: /slurm/v0.0.40
paths:
  /jobs/:
    get:
      operationId: slurm.get_jobs
      tags: [slurm]
  /job/{job_id}:
    parameters:
      - $ref: "#/components/parameters/job_id"
    get:
      operationId: slurm.get_job
    delete:
      operationId: slurm.delete_job
  /job/submit:
    post:
      summary: submit a job
  /job/{job_id}/steps/{step_id}:
    get:
      parameters:
        - name: job_id
          in: path
          schema:
            type: integer
        - name: step_id
          in: path
          schema:
            type: string
components:
  parameters:
    job_id:
      name: job_id
      in: path
      schema:
        type: integer
  schemas:
    job:
      type: object
  securitySchemes:
    token:
      type: apiKey
      in: header
      name: X-SLURM-USER-TOKEN
"##;

pub const NODES_YAML: &str = r#"
openapi: 3.0.3
info:
  title: Slurm nodes
tags:
  - name: slurm
  - name: nodes
servers:
  - url: /slurm/v0.0.40
paths:
  /nodes/:
    get:
      operationId: get_nodes
  /node/{node_name}:
    get: {}
    post: {}
  /node/{weight}/drain:
    get:
      parameters:
        - name: weight
          in: path
          schema:
            type: number
components:
  schemas:
    node:
      type: object
"#;

pub fn document(plugin_type: &str, yaml: &str, flags: SpecFlags) -> SpecDocument {
    SpecDocument::new(plugin_type, parse_document(yaml).unwrap(), flags)
}

pub fn jobs_and_nodes() -> Vec<SpecDocument> {
    vec![
        document("openapi/jobs", JOBS_YAML, SpecFlags::empty()),
        document("openapi/nodes", NODES_YAML, SpecFlags::empty()),
    ]
}

/// Write `content` to a temporary file with the given extension.
pub fn temp_spec(content: &str, ext: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new()
        .prefix("oasmux_test_")
        .suffix(&format!(".{ext}"))
        .tempfile()
        .unwrap();
    f.write_all(content.as_bytes()).unwrap();
    f
}
