//! Route descriptors.
//!
//! A [`ProxyRoute`] says everything that differs between two proxy routes:
//! where the call goes upstream, which query parameters travel with it, what
//! the request body must look like and the wording of its error messages.

use axum::http::Method;
use serde_json::{Map, Value};
use url::{form_urlencoded, Url};

/// Static description of one gateway → backend route.
#[derive(Debug)]
pub struct ProxyRoute {
    /// Identifier for logs and metrics (e.g. `mail.labels`).
    pub name: &'static str,
    pub method: Method,
    /// Backend path; path parameters are appended as extra segments.
    pub upstream_path: &'static str,
    pub query: QueryPolicy,
    pub body: BodyRule,
    pub messages: RouteMessages,
}

/// Which query parameters of the incoming request reach the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPolicy {
    Drop,
    Verbatim,
    /// Only the named keys, repeated keys preserved, empty values dropped.
    Allow(&'static [&'static str]),
}

impl QueryPolicy {
    pub fn apply(&self, url: &mut Url, raw: Option<&str>) {
        let Some(raw) = raw.filter(|q| !q.is_empty()) else {
            return;
        };

        match self {
            QueryPolicy::Drop => {}
            QueryPolicy::Verbatim => url.set_query(Some(raw)),
            QueryPolicy::Allow(keys) => {
                let pairs: Vec<(String, String)> = form_urlencoded::parse(raw.as_bytes())
                    .filter(|(key, value)| keys.contains(&key.as_ref()) && !value.is_empty())
                    .map(|(key, value)| (key.into_owned(), value.into_owned()))
                    .collect();
                if !pairs.is_empty() {
                    url.query_pairs_mut().extend_pairs(pairs);
                }
            }
        }
    }
}

/// What the route does with the incoming request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRule {
    /// Nothing is sent upstream; any incoming body is ignored.
    None,
    /// A JSON body whose `required` fields must be present and truthy.
    Json {
        required: &'static [&'static str],
        forward: BodyForward,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyForward {
    Whole,
    /// Rebuild the body from the required fields alone.
    RequiredOnly,
}

/// Why a request body was refused before any upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyRejection {
    InvalidJson,
    MissingFields(&'static [&'static str]),
}

impl BodyRejection {
    pub fn message(&self) -> String {
        match self {
            BodyRejection::InvalidJson => "Invalid JSON body".to_string(),
            BodyRejection::MissingFields([field]) => format!("{} is required", field),
            BodyRejection::MissingFields(fields) => {
                format!("Missing required fields: {}", fields.join(", "))
            }
        }
    }
}

impl BodyRule {
    /// Validate the raw request body and produce what is sent upstream.
    pub fn prepare(&self, raw: Option<&[u8]>) -> Result<Option<Value>, BodyRejection> {
        let BodyRule::Json { required, forward } = *self else {
            return Ok(None);
        };

        let value: Value = serde_json::from_slice(raw.unwrap_or_default())
            .map_err(|_| BodyRejection::InvalidJson)?;

        if required.is_empty() {
            return Ok(Some(value));
        }

        let object = value.as_object();
        let complete = required
            .iter()
            .all(|field| object.and_then(|o| o.get(*field)).is_some_and(is_present));
        if !complete {
            return Err(BodyRejection::MissingFields(required));
        }

        match forward {
            BodyForward::Whole => Ok(Some(value)),
            BodyForward::RequiredOnly => {
                let mut picked = Map::new();
                if let Some(object) = object {
                    for field in required {
                        if let Some(v) = object.get(*field) {
                            picked.insert((*field).to_string(), v.clone());
                        }
                    }
                }
                Ok(Some(Value::Object(picked)))
            }
        }
    }
}

/// Null, `false`, `0` and `""` do not satisfy a required field.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64() != Some(0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Route-specific wording for translated backend errors.
#[derive(Debug, Clone, Copy)]
pub struct RouteMessages {
    /// Sent with 403.
    pub forbidden: &'static str,
    /// Sent with 400 when the backend gives no `detail`.
    pub bad_request: &'static str,
    /// Completes "Backend error <context>: <status> - <excerpt>".
    pub context: &'static str,
}
