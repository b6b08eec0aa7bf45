//! Application documents shared by the integration tests.

/// One module, two topics, three steps without explicit ids.
pub const THREE_STEPS: &str = r#"
instance:
  streaming-cluster:
    type: memory
  compute-cluster:
    type: memory
modules:
  - id: default
    topics:
      - name: input-topic
        creation-mode: create-if-not-exists
      - name: output-topic
        creation-mode: create-if-not-exists
    pipeline:
      - type: compute
        input: input-topic
        configuration:
          fields: []
      - type: drop
        configuration:
          when: "false"
      - type: compute
        output: output-topic
        configuration:
          fields: []
"#;

/// A keyspace that is dropped on teardown and a table that is not.
pub const KEYSPACE_AND_TABLE: &str = r#"
instance:
  streaming-cluster:
    type: memory
  compute-cluster:
    type: memory
modules:
  - id: default
    topics:
      - name: input-topic
        creation-mode: create-if-not-exists
    assets:
      - name: keyspace
        asset-type: memory-keyspace
        creation-mode: create-if-not-exists
        deletion-mode: delete
        config:
          keyspace: vsearch
      - name: table
        asset-type: memory-table
        creation-mode: create-if-not-exists
        config:
          keyspace: vsearch
          table-name: documents
    pipeline:
      - id: step1
        type: compute
        input: input-topic
"#;

/// Builds an application with one recorded asset per `(name, extra yaml)`.
pub fn recorded_assets(assets: &[(&str, &str)]) -> String {
    let mut yaml = String::from(
        r#"
instance:
  streaming-cluster:
    type: memory
  compute-cluster:
    type: memory
modules:
  - id: default
    assets:
"#,
    );
    for (name, extra) in assets {
        yaml.push_str(&format!(
            "      - name: {name}\n        asset-type: recorded\n{extra}"
        ));
    }
    yaml
}
