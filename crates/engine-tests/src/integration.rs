#[cfg(test)]
mod tests {
    use crate::utils::{column, memory_connector, plugin, projects, scan, settings};
    use connectors::{
        plugin::{Plugin, http_connector},
        testing::MemoryTransport,
    };
    use engine_core::catalog::ScanRequest;
    use model::core::{qualifier::Quals, value::Value};
    use serde_json::json;
    use std::{
        collections::HashMap,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    };
    use tracing_test::traced_test;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path, query_param, query_param_is_missing},
    };

    const BASIC_AUTH: &str = "Basic OnRlc3QtcGF0";

    async fn http_plugin(server: &MockServer) -> Plugin {
        Plugin::with_connector(
            settings(&format!("{}/contoso", server.uri())),
            Arc::new(HashMap::<String, String>::new()),
            http_connector(),
        )
    }

    fn envelope(rows: serde_json::Value) -> serde_json::Value {
        let count = rows.as_array().map_or(0, Vec::len);
        json!({ "count": count, "value": rows })
    }

    #[traced_test]
    #[tokio::test]
    async fn builds_over_http_follow_the_continuation_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/contoso/_apis/projects"))
            .and(header("authorization", BASIC_AUTH))
            .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([{"id": "P1"}]))))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/contoso/P1/_apis/build/builds"))
            .and(query_param_is_missing("continuationToken"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-ms-continuationtoken", "page-2")
                    .set_body_json(envelope(json!([{"id": 11, "buildNumber": "20240101.1"}]))),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/contoso/P1/_apis/build/builds"))
            .and(query_param("continuationToken", "page-2"))
            .and(query_param("statusFilter", "completed"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(envelope(json!([{"id": 12, "buildNumber": "20240101.2"}]))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let plugin = http_plugin(&server).await;
        let request = ScanRequest::new(Quals::new().with("status", "Completed"))
            .with_columns(["id", "build_number"]);
        let (rows, outcome) = scan(&plugin, "azuredevops_build", request).await;

        assert_eq!(outcome.unwrap(), 2);
        assert_eq!(column(&rows, "build_number"), vec![
            Value::from("20240101.1"),
            Value::from("20240101.2"),
        ]);
        assert_eq!(rows[0].columns().collect::<Vec<_>>(), vec!["id", "build_number"]);
        assert!(logs_contain("connection established"));
    }

    #[tokio::test]
    async fn point_lookup_404_is_zero_rows() {
        let server = MockServer::start().await;
        Mock::given(path("/contoso/_apis/git/repositories/gone"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let plugin = http_plugin(&server).await;
        let request = ScanRequest::new(Quals::new().with("id", "gone"));
        let (rows, outcome) = scan(&plugin, "azuredevops_git_repository", request).await;

        assert_eq!(outcome.unwrap(), 0);
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn rejected_token_surfaces_as_a_remote_error() {
        let server = MockServer::start().await;
        Mock::given(path("/contoso/_apis/projects"))
            .respond_with(ResponseTemplate::new(401).set_body_string("TF400813"))
            .mount(&server)
            .await;

        let plugin = http_plugin(&server).await;
        let err = plugin.test_connection().await.unwrap_err();

        let message = err.to_string();
        assert!(message.starts_with("Remote call 'azuredevops_project.list_projects' failed"));
        assert!(message.contains("401"));
    }

    #[tokio::test]
    async fn concurrent_first_use_connects_once() {
        let connects = Arc::new(AtomicUsize::new(0));
        let plugin = Arc::new(Plugin::with_connector(
            settings("https://dev.azure.com/contoso"),
            Arc::new(HashMap::<String, String>::new()),
            memory_connector(Arc::new(MemoryTransport::new()), connects.clone()),
        ));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let plugin = plugin.clone();
                tokio::spawn(async move { plugin.client().await.map(|c| c.organization_name().to_string()) })
            })
            .collect();
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), "contoso");
        }

        assert_eq!(connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn organization_column_follows_a_config_change() {
        let (plugin, _) = plugin(
            MemoryTransport::new().page("_apis/projects", None, projects(&["P1"]), None),
        );

        let request = ScanRequest::default().with_columns(["organization", "id"]);
        let (rows, _) = scan(&plugin, "azuredevops_project", request.clone()).await;
        assert_eq!(rows[0].get_value("organization"), Value::from("contoso"));

        plugin
            .update_config(settings("https://fabrikam.visualstudio.com"))
            .await;
        let (rows, _) = scan(&plugin, "azuredevops_project", request).await;
        assert_eq!(rows[0].get_value("organization"), Value::from("fabrikam"));
    }

    #[tokio::test]
    async fn dropping_the_stream_receiver_ends_the_scan() {
        let (plugin, transport) = plugin(
            MemoryTransport::new()
                .page("_apis/projects", None, projects(&["A", "B", "C"]), Some("t2"))
                .page("_apis/projects", Some("t2"), projects(&["D"]), None),
        );

        let (mut rx, handle) = plugin
            .stream("azuredevops_project", ScanRequest::default(), 1)
            .unwrap();
        let first = rx.recv().await.unwrap();
        drop(rx);

        let emitted = handle.await.unwrap().unwrap();
        assert_eq!(first.get_value("id"), Value::from("A"));
        assert!(emitted <= 2);
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn hydrated_columns_cost_one_call_per_row_only_when_selected() {
        let (plugin, transport) = plugin(
            MemoryTransport::new()
                .page("_apis/projects", None, projects(&["P1", "P2"]), None)
                .entity(
                    "_apis/projects/P1",
                    json!({"id": "P1", "capabilities": {"versioncontrol": {"sourceControlType": "Git"}}}),
                )
                .entity("_apis/projects/P2", json!({"id": "P2"})),
        );

        let plain = ScanRequest::default().with_columns(["id", "name"]);
        scan(&plugin, "azuredevops_project", plain).await.1.unwrap();
        assert_eq!(transport.request_count(), 1);

        let hydrated = ScanRequest::default().with_columns(["id", "capabilities"]);
        let (rows, outcome) = scan(&plugin, "azuredevops_project", hydrated).await;
        outcome.unwrap();

        assert_eq!(transport.request_count(), 4);
        assert_eq!(
            rows[0].get_value("capabilities"),
            Value::from(json!({"versioncontrol": {"sourceControlType": "Git"}}))
        );
        assert_eq!(rows[1].get_value("capabilities"), Value::Null);
    }
}
