use reqwest::{header, RequestBuilder};

/// Identifying user agent sent with every upstream request.
pub const USER_AGENT: &str = "weather-app/1.0";

/// Add the fixed outbound header pair expected by the upstream API.
pub fn add_standard_headers(builder: RequestBuilder) -> RequestBuilder {
    builder
        .header(header::USER_AGENT, USER_AGENT)
        .header(header::ACCEPT, "application/json")
}
