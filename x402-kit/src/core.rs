//! Seller-side description of what is being sold.

use bon::Builder;
use url::Url;
use x402_core::types::OutputSchema;

/// A paid resource.
#[derive(Builder, Debug, Clone, PartialEq)]
pub struct Resource {
    /// Public URL of the resource.
    pub url: Url,
    #[builder(into)]
    pub description: String,
    /// MIME type of the resource response.
    #[builder(into)]
    pub mime_type: String,
    /// Schema advertised to discovery-capable facilitators.
    pub output_schema: Option<OutputSchema>,
}
