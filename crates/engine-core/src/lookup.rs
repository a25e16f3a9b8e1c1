use crate::{Operation, error::EngineError};
use async_trait::async_trait;
use model::core::qualifier::Quals;
use tracing::{debug, error};

/// A single-entity fetch. `Ok(None)` means the entity does not exist.
#[async_trait]
pub trait GetRequest: Send + Sync {
    type Client: Sync;
    type Item: Send;
    type Error: std::error::Error + Send + Sync + 'static;

    async fn fetch(&self, client: &Self::Client) -> Result<Option<Self::Item>, Self::Error>;
}

/// Values of every key column, in the given order, or `None` when any of
/// them is absent or empty.
pub fn require_keys<const N: usize>(quals: &Quals, keys: [&str; N]) -> Option<[String; N]> {
    let mut values: [String; N] = std::array::from_fn(|_| String::new());
    for (slot, key) in values.iter_mut().zip(keys) {
        *slot = quals.get_str(key)?;
    }
    Some(values)
}

/// Runs a point fetch, logging and wrapping failures with the operation id.
pub async fn lookup<R: GetRequest>(
    client: &R::Client,
    operation: &Operation,
    request: &R,
) -> Result<Option<R::Item>, EngineError> {
    let item = request.fetch(client).await.map_err(|err| {
        error!(
            table = operation.table,
            operation = %operation,
            error = %err,
            "api_error"
        );
        EngineError::remote(operation, err)
    })?;

    if item.is_none() {
        debug!(operation = %operation, "entity not found");
    }
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::core::value::Value;

    #[test]
    fn all_keys_must_be_present_and_non_empty() {
        let quals = Quals::new().with("id", "42").with("project_id", "p");
        assert_eq!(
            require_keys(&quals, ["id", "project_id"]),
            Some(["42".to_string(), "p".to_string()])
        );

        let partial = Quals::new().with("id", "42");
        assert_eq!(require_keys(&partial, ["id", "project_id"]), None);

        let empty = Quals::new().with("id", "").with("project_id", "p");
        assert_eq!(require_keys(&empty, ["id", "project_id"]), None);

        let null = Quals::new().with("id", Value::Null);
        assert_eq!(require_keys(&null, ["id"]), None);
    }
}
