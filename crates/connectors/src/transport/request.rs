/// Service hosts an organization's APIs are spread across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiHost {
    /// Core, build, pipelines, git, dashboards and service endpoints.
    Organization,
    /// Release management (`vsrm`).
    Release,
    /// Identity graph (`vssps`).
    Graph,
    /// Cross-organization account listing.
    Accounts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub host: ApiHost,
    /// Path segments below the host base; each is percent-encoded on send.
    pub path: Vec<String>,
    pub api_version: &'static str,
    pub query: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new<I, S>(host: ApiHost, path: I, api_version: &'static str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ApiRequest {
            host,
            path: path.into_iter().map(Into::into).collect(),
            api_version,
            query: Vec::new(),
        }
    }

    pub fn param(mut self, name: &str, value: impl ToString) -> Self {
        self.set_param(name, value.to_string());
        self
    }

    pub fn params<I>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in params {
            self.set_param(&name, value);
        }
        self
    }

    /// Sets a query parameter, replacing an earlier value of the same name.
    pub fn set_param(&mut self, name: &str, value: String) {
        match self.query.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.query.push((name.to_string(), value)),
        }
    }

    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// `/`-joined path, used for logging and in-memory routing.
    pub fn path_string(&self) -> String {
        self.path.join("/")
    }
}

/// A decoded response body plus the continuation token the service sent with it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub body: serde_json::Value,
    pub continuation: Option<String>,
}

impl ApiResponse {
    pub fn new(body: serde_json::Value) -> Self {
        ApiResponse {
            body,
            continuation: None,
        }
    }

    pub fn with_continuation(mut self, token: impl Into<String>) -> Self {
        self.continuation = Some(token.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_params_replace_earlier_ones() {
        let request = ApiRequest::new(ApiHost::Organization, ["_apis", "projects"], "7.1")
            .param("$top", 100)
            .params(vec![("stateFilter".to_string(), "wellFormed".to_string())])
            .param("$top", 5);

        assert_eq!(request.query_value("$top"), Some("5"));
        assert_eq!(request.query.len(), 2);
        assert_eq!(request.path_string(), "_apis/projects");
    }
}
