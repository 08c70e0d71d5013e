//! Service descriptors with optional API request definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::NewInjectable;

/// HTTP verb of an API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpVerb {
    pub const ALL: [HttpVerb; 4] = [HttpVerb::Get, HttpVerb::Post, HttpVerb::Put, HttpVerb::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Retry behaviour emitted into the generated request call.
///
/// This is metadata for the generated code only; the generator itself never
/// retries anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RetryPolicy {
    #[default]
    None,
    Once,
    Exponential,
}

impl RetryPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetryPolicy::None => "None",
            RetryPolicy::Once => "Once",
            RetryPolicy::Exponential => "Exponential",
        }
    }
}

impl fmt::Display for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One API call exposed by a generated service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRequestSpec {
    pub verb: HttpVerb,
    /// Backend the request targets; resolved through `[api.services]`
    pub target_service: String,
    /// Remote method name
    pub method: String,
    #[serde(default)]
    pub retry_policy: RetryPolicy,
    /// Name of the generated service method
    pub function_name: String,
    pub request_interface_name: String,
    pub response_interface_name: String,
    /// Sample request payload, used to derive the request interface
    pub request_schema_json: String,
    /// Sample response payload, used to derive the response interface
    pub response_schema_json: String,
}

/// A service about to be generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewService {
    #[serde(flatten)]
    pub injectable: NewInjectable,
    #[serde(default)]
    pub api_requests: Vec<ApiRequestSpec>,
    /// File name (without extension) of the generated API module
    pub api_filename: Option<String>,
}

impl NewService {
    pub fn new(injectable: NewInjectable) -> Self {
        Self {
            injectable,
            api_requests: Vec::new(),
            api_filename: None,
        }
    }

    /// API file name, defaulting to `<Name>Api`.
    pub fn api_filename(&self) -> String {
        self.api_filename
            .clone()
            .unwrap_or_else(|| format!("{}Api", self.injectable.injectable.name))
    }

    /// Requests using the given verb, in declaration order.
    pub fn requests_with(&self, verb: HttpVerb) -> impl Iterator<Item = &ApiRequestSpec> {
        self.api_requests.iter().filter(move |r| r.verb == verb)
    }
}
