//! End-to-end scenario: a lookup step enriches records read from
//! `input-topic` with a row from the datastore, and a compute step writes
//! them to `output-topic`.

#![allow(clippy::unwrap_used)]

mod common;

use common::TestRuntime;
use meridian_runtime::memory::{MemoryDatastore, Row};
use meridian_runtime::PodAgentConfiguration;
use serde_json::{json, Value};

const TENANT: &str = "tenant-1";

const APPLICATION: &str = r#"
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
          rows:
            - {id: 1, name: "A", description: "A description"}
            - {id: 2, name: "B", description: "B description"}
    pipeline:
      - id: lookup
        name: Look up the document
        type: query
        input: input-topic
        configuration:
          keyspace: vsearch
          table: documents
          key-field: documentId
          column: id
          fields: [name, description]
      - id: increment
        name: Bump the document id
        type: compute
        output: output-topic
        configuration:
          increment: [documentId]
"#;

/// Applies one pod's agent to a record. Only the two agent types used by the
/// scenario are understood.
fn apply(datastore: &MemoryDatastore, pod: &PodAgentConfiguration, mut record: Value) -> Value {
    let config = &pod.agent.configuration;
    match pod.agent.agent_type.as_str() {
        "query" => {
            let key = config["key-field"].as_str().unwrap();
            let mut filter = Row::new();
            filter.insert(config["column"].as_str().unwrap().to_owned(), record[key].clone());

            let rows = datastore
                .query(
                    config["keyspace"].as_str().unwrap(),
                    config["table"].as_str().unwrap(),
                    &filter,
                )
                .unwrap();
            let row = rows.first().unwrap();
            for field in config["fields"].as_array().unwrap() {
                let field = field.as_str().unwrap();
                record[field] = row[field].clone();
            }
            record
        }
        "compute" => {
            for field in config["increment"].as_array().unwrap() {
                let field = field.as_str().unwrap();
                record[field] = json!(record[field].as_i64().unwrap() + 1);
            }
            record
        }
        other => panic!("agent type {other} is not simulated"),
    }
}

/// Runs the deployed pods in-process. Consecutive steps without a topic
/// between them are chained directly.
fn run_pipeline(runtime: &TestRuntime, pods: &[PodAgentConfiguration]) {
    let broker = &runtime.backends.broker;
    let input = &pods.first().unwrap().input.as_ref().unwrap().topic;
    let output = &pods.last().unwrap().output.as_ref().unwrap().topic;

    for record in broker.records(TENANT, input).unwrap() {
        let result = pods
            .iter()
            .fold(record, |record, pod| apply(&runtime.backends.datastore, pod, record));
        broker.publish(TENANT, output, result).unwrap();
    }
}

#[tokio::test]
async fn lookup_and_write_then_cleanup() {
    let runtime = TestRuntime::new();
    let plan = runtime.plan("app", APPLICATION);

    let pods = runtime.deployer.deploy(TENANT, &plan, None).await.unwrap();
    assert_eq!(pods.len(), 2);
    assert_eq!(pods[0].agent_id(), "app-lookup");
    assert_eq!(pods[1].agent_id(), "app-increment");

    let broker = &runtime.backends.broker;
    broker
        .publish(TENANT, "input-topic", json!({"documentId": 1}))
        .unwrap();
    run_pipeline(&runtime, &pods);

    let output = broker.records(TENANT, "output-topic").unwrap();
    assert_eq!(
        output,
        vec![json!({"documentId": 2, "name": "A", "description": "A description"})]
    );

    runtime.deployer.cleanup(TENANT, &plan).await.unwrap();

    let err = runtime
        .backends
        .datastore
        .query("vsearch", "documents", &Row::new())
        .unwrap_err();
    assert!(err.to_string().contains("not found"));
    assert_eq!(
        runtime.datastore_calls.entries(),
        vec!["create keyspace", "create table", "delete keyspace"]
    );
    assert!(runtime.pods(TENANT).is_empty());
}
