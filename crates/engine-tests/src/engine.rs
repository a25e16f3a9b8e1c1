#[cfg(test)]
mod tests {
    use crate::utils::{builds, column, plugin, projects, scan};
    use connectors::{plugin::catalog, testing::MemoryTransport};
    use engine_core::{catalog::ScanRequest, error::EngineError};
    use model::core::{qualifier::Quals, value::Value};
    use tokio_util::sync::CancellationToken;
    use tracing_test::traced_test;

    #[tokio::test]
    async fn partial_keys_never_reach_the_service() {
        let (plugin, transport) = plugin(MemoryTransport::new());

        for schema in catalog().schemas() {
            let Some(keys) = schema.get_keys else {
                continue;
            };
            for (skipped, _) in keys.iter().enumerate() {
                let present = |blank: bool| -> Quals {
                    keys.iter()
                        .enumerate()
                        .filter(|(i, _)| blank || *i != skipped)
                        .map(|(i, key)| (*key, if i == skipped { "" } else { "7" }))
                        .collect()
                };

                for quals in [present(false), present(true)] {
                    let row = plugin
                        .get(schema.name, &ScanRequest::new(quals))
                        .await
                        .unwrap();
                    assert!(row.is_none(), "{} returned a row", schema.name);
                }
            }
        }

        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn empty_repository_id_scans_nothing() {
        let (plugin, transport) = plugin(MemoryTransport::new());

        let request = ScanRequest::new(Quals::new().with("id", ""));
        let (rows, outcome) = scan(&plugin, "azuredevops_git_repository", request).await;

        assert_eq!(outcome.unwrap(), 0);
        assert!(rows.is_empty());
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn listing_concatenates_pages_until_the_cursor_ends() {
        let (plugin, transport) = plugin(
            MemoryTransport::new()
                .page("_apis/projects", None, projects(&["A", "B"]), Some("t2"))
                .page("_apis/projects", Some("t2"), projects(&["C"]), Some("t3"))
                .page("_apis/projects", Some("t3"), projects(&["D", "E"]), None),
        );

        let (rows, outcome) = scan(&plugin, "azuredevops_project", ScanRequest::default()).await;

        assert_eq!(outcome.unwrap(), 5);
        assert_eq!(
            column(&rows, "id"),
            ["A", "B", "C", "D", "E"].map(Value::from).to_vec()
        );
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn listing_is_repeatable() {
        let (plugin, _) = plugin(
            MemoryTransport::new()
                .page("_apis/projects", None, projects(&["P1", "P2"]), None)
                .page("P1/_apis/build/builds", None, builds("P1", 1..=3), None)
                .page("P2/_apis/build/builds", None, builds("P2", 4..=4), None),
        );

        let first = scan(&plugin, "azuredevops_build", ScanRequest::default()).await.0;
        let second = scan(&plugin, "azuredevops_build", ScanRequest::default()).await.0;

        assert_eq!(first.len(), 4);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn matching_parent_is_listed() {
        let (plugin, transport) = plugin(
            MemoryTransport::new()
                .page("_apis/projects", None, projects(&["P1", "P2"]), None)
                .page("P1/_apis/build/builds", None, builds("P1", 1..=3), None),
        );

        let request = ScanRequest::new(Quals::new().with("project_id", "P1"));
        let (rows, outcome) = scan(&plugin, "azuredevops_build", request).await;

        assert_eq!(outcome.unwrap(), 3);
        assert!(column(&rows, "project_id").iter().all(|v| *v == Value::from("P1")));
        assert_eq!(transport.requests_to("P1/_apis/build/builds").len(), 1);
        assert!(transport.requests_to("P2/_apis/build/builds").is_empty());
    }

    #[tokio::test]
    async fn mismatched_parent_is_skipped_without_a_call() {
        let (plugin, transport) = plugin(
            MemoryTransport::new().page("_apis/projects", None, projects(&["P2"]), None),
        );

        let request = ScanRequest::new(Quals::new().with("project_id", "P1"));
        let (rows, outcome) = scan(&plugin, "azuredevops_build", request).await;

        assert_eq!(outcome.unwrap(), 0);
        assert!(rows.is_empty());
        assert_eq!(transport.request_count(), 1);
        assert_eq!(transport.requests()[0].path_string(), "_apis/projects");
    }

    // The budget is shared across parents.
    #[tokio::test]
    async fn budget_stops_mid_page_and_mid_chain() {
        let (plugin, transport) = plugin(
            MemoryTransport::new()
                .page("_apis/projects", None, projects(&["P1", "P2"]), None)
                .page("P1/_apis/build/builds", None, builds("P1", 1..=2), Some("b2"))
                .page("P1/_apis/build/builds", Some("b2"), builds("P1", 3..=4), Some("b3"))
                .page("P1/_apis/build/builds", Some("b3"), builds("P1", 5..=6), None)
                .page("P2/_apis/build/builds", None, builds("P2", 7..=8), None),
        );

        let request = ScanRequest::default().with_limit(Some(3));
        let (rows, outcome) = scan(&plugin, "azuredevops_build", request).await;

        assert_eq!(outcome.unwrap(), 3);
        assert_eq!(column(&rows, "id"), vec![Value::from(1i64), 2i64.into(), 3i64.into()]);
        assert_eq!(transport.requests_to("P1/_apis/build/builds").len(), 2);
        assert!(transport.requests_to("P2/_apis/build/builds").is_empty());

        let second_page = &transport.requests_to("P1/_apis/build/builds")[1];
        assert_eq!(second_page.query_value("$top"), Some("1"));
    }

    #[tokio::test]
    async fn cancelled_scan_issues_no_calls() {
        let (plugin, transport) = plugin(
            MemoryTransport::new().page("_apis/projects", None, projects(&["P1"]), None),
        );
        let cancel = CancellationToken::new();
        cancel.cancel();

        let request = ScanRequest::default().with_cancel(cancel);
        let (rows, outcome) = scan(&plugin, "azuredevops_project", request).await;

        assert_eq!(outcome.unwrap(), 0);
        assert!(rows.is_empty());
        assert_eq!(transport.request_count(), 0);
    }

    #[traced_test]
    #[tokio::test]
    async fn failing_page_keeps_earlier_rows() {
        let (plugin, _) = plugin(
            MemoryTransport::new()
                .page("_apis/projects", None, projects(&["A", "B"]), Some("t2"))
                .fail("_apis/projects", Some("t2"), 503),
        );

        let (rows, outcome) = scan(&plugin, "azuredevops_project", ScanRequest::default()).await;

        assert_eq!(rows.len(), 2);
        match outcome.unwrap_err() {
            EngineError::RemoteApi { operation, .. } => {
                assert_eq!(operation, "azuredevops_project.list_projects");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(logs_contain("api_error"));
    }

    #[traced_test]
    #[tokio::test]
    async fn rejected_filter_is_dropped_and_listing_proceeds() {
        let (plugin, transport) = plugin(
            MemoryTransport::new()
                .page("_apis/projects", None, projects(&["P1"]), None)
                .page("P1/_apis/serviceendpoint/endpoints", None, vec![], None),
        );

        let request = ScanRequest::new(Quals::new().with("id", "not-a-uuid").with("owner", "library"));
        let (_, outcome) = scan(&plugin, "azuredevops_serviceendpoint", request).await;

        outcome.unwrap();
        let sent = &transport.requests_to("P1/_apis/serviceendpoint/endpoints")[0];
        assert_eq!(sent.query_value("endpointIds"), None);
        assert_eq!(sent.query_value("owner"), Some("library"));
        assert!(logs_contain("qualifier value rejected"));
    }

    #[tokio::test]
    async fn account_listing_requires_a_qualifier() {
        let (plugin, transport) = plugin(MemoryTransport::new());

        let (_, outcome) = scan(&plugin, "azuredevops_account", ScanRequest::default()).await;

        assert!(matches!(
            outcome,
            Err(EngineError::MissingKeyColumns { ref columns, .. }) if columns.len() == 2
        ));
        assert_eq!(transport.request_count(), 0);
    }
}
