//! Input / output schema a seller attaches to its payment requirements.
//!
//! Facilitators with discovery support (bazaar-style listings) read this to
//! describe how an endpoint is called and what it returns.

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::types::{AnyJson, Record};

fn field_map(
    iter: impl IntoIterator<Item = (&'static str, FieldDefinition)>,
) -> Record<FieldDefinition> {
    iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

/// Describes one field of a request or response document.
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub field_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub description: Option<String>,

    #[serde(rename = "default", skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub default_value: Option<AnyJson>,

    /// Format hint for string fields, e.g. `date-time`.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub format: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(with = |iter: impl IntoIterator<Item = (&'static str, FieldDefinition)>| field_map(iter))]
    pub properties: Option<Record<FieldDefinition>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    #[serde(rename = "GET")]
    Get,
    #[serde(rename = "POST")]
    Post,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputBodyType {
    Json,
    FormData,
    Text,
}

/// How an HTTP resource is invoked.
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpInput {
    #[builder(default)]
    pub discoverable: bool,

    pub method: Method,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_type: Option<InputBodyType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(with = |iter: impl IntoIterator<Item = (&'static str, FieldDefinition)>| field_map(iter))]
    pub query_params: Option<Record<FieldDefinition>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(with = |iter: impl IntoIterator<Item = (&'static str, FieldDefinition)>| field_map(iter))]
    pub body_fields: Option<Record<FieldDefinition>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Input {
    #[serde(rename = "http")]
    Http(HttpInput),
}

impl Input {
    pub fn as_http(&self) -> Option<&HttpInput> {
        match self {
            Input::Http(http) => Some(http),
        }
    }
}

/// The `outputSchema` member of a payment requirement.
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSchema {
    pub input: Input,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(with = |iter: impl IntoIterator<Item = (&'static str, FieldDefinition)>| field_map(iter))]
    pub output: Option<Record<FieldDefinition>>,
}

impl OutputSchema {
    /// A schema that only marks the endpoint as a discoverable `POST`.
    pub fn http_post_discoverable() -> Self {
        Self::builder()
            .input(Input::Http(
                HttpInput::builder()
                    .method(Method::Post)
                    .discoverable(true)
                    .build(),
            ))
            .build()
    }
}
