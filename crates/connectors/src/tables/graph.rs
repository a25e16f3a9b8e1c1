//! Shared plumbing of the identity graph tables (users and groups).

use crate::{
    client::{Collection, DevOpsClient, Single},
    resources::graph::{GraphSubject, GraphSubjectRow, MembershipState},
    transport::{ApiHost, ApiRequest},
};
use engine_core::{Operation, error::EngineError, lookup::lookup};
use serde::de::DeserializeOwned;
use serde_json::Value as Json;

const GRAPH_API_VERSION: &str = "7.1-preview.1";

pub(crate) const HYDRATE_MEMBERSHIP_STATE: &str = "membership_state";
pub(crate) const HYDRATE_MEMBERSHIPS: &str = "memberships";

/// All subjects of one kind (`users` or `groups`), paged by continuation token.
pub(crate) fn list_subjects<T>(kind: &str) -> Collection<T> {
    Collection::new(ApiRequest::new(
        ApiHost::Graph,
        ["_apis", "graph", kind],
        GRAPH_API_VERSION,
    ))
}

pub(crate) async fn get_subject<T>(
    client: &DevOpsClient,
    operation: &Operation,
    kind: &str,
    descriptor: &str,
) -> Result<Option<T>, EngineError>
where
    T: DeserializeOwned + Send + 'static,
{
    let request = ApiRequest::new(
        ApiHost::Graph,
        ["_apis", "graph", kind, descriptor],
        GRAPH_API_VERSION,
    );
    lookup(client, operation, &Single::new(request)).await
}

/// Fetches the membership data the requested columns need.
pub(crate) async fn hydrate_subject<T: GraphSubject>(
    client: &DevOpsClient,
    table: &'static str,
    mut row: GraphSubjectRow<T>,
    steps: &[&'static str],
) -> Result<GraphSubjectRow<T>, EngineError> {
    let Some(descriptor) = row.subject.descriptor().map(str::to_string) else {
        return Ok(row);
    };

    if steps.contains(&HYDRATE_MEMBERSHIP_STATE) {
        let request = ApiRequest::new(
            ApiHost::Graph,
            ["_apis", "graph", "membershipstates", descriptor.as_str()],
            GRAPH_API_VERSION,
        );
        let operation = Operation::new(table, "get_membership_state");
        let state: Option<MembershipState> =
            lookup(client, &operation, &Single::new(request)).await?;
        row.membership_active = state.and_then(|s| s.active);
    }

    if steps.contains(&HYDRATE_MEMBERSHIPS) {
        let request = ApiRequest::new(
            ApiHost::Graph,
            ["_apis", "graph", "memberships", descriptor.as_str()],
            GRAPH_API_VERSION,
        );
        let operation = Operation::new(table, "list_memberships");
        let body: Option<Json> = lookup(client, &operation, &Single::new(request)).await?;
        row.memberships = body.map(|mut body| match body.get_mut("value") {
            Some(value) => value.take(),
            None => body,
        });
    }

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{resources::graph::GraphUser, testing::MemoryTransport};
    use serde_json::json;

    fn user(descriptor: Option<&str>) -> GraphSubjectRow<GraphUser> {
        GraphSubjectRow::from(GraphUser {
            descriptor: descriptor.map(str::to_string),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn only_requested_steps_are_fetched() {
        let (client, transport) = MemoryTransport::new()
            .entity("_apis/graph/membershipstates/aad.abc", json!({"active": true}))
            .into_client("contoso");

        let row = hydrate_subject(
            &client,
            "azuredevops_user",
            user(Some("aad.abc")),
            &[HYDRATE_MEMBERSHIP_STATE],
        )
        .await
        .unwrap();

        assert_eq!(row.membership_active, Some(true));
        assert!(row.memberships.is_none());
        assert_eq!(transport.request_count(), 1);
        assert_eq!(transport.requests()[0].host, ApiHost::Graph);
    }

    #[tokio::test]
    async fn memberships_unwrap_the_envelope() {
        let (client, _) = MemoryTransport::new()
            .entity(
                "_apis/graph/memberships/aad.abc",
                json!({"count": 1, "value": [{"containerDescriptor": "vssgp.x"}]}),
            )
            .into_client("contoso");

        let row = hydrate_subject(
            &client,
            "azuredevops_user",
            user(Some("aad.abc")),
            &[HYDRATE_MEMBERSHIPS],
        )
        .await
        .unwrap();
        assert_eq!(row.memberships, Some(json!([{"containerDescriptor": "vssgp.x"}])));
    }

    #[tokio::test]
    async fn subject_without_descriptor_is_left_alone() {
        let (client, transport) = MemoryTransport::new().into_client("contoso");

        let row = hydrate_subject(
            &client,
            "azuredevops_user",
            user(None),
            &[HYDRATE_MEMBERSHIP_STATE, HYDRATE_MEMBERSHIPS],
        )
        .await
        .unwrap();
        assert!(row.membership_active.is_none());
        assert_eq!(transport.request_count(), 0);
    }
}
