//! Model endpoint implementations

mod http_client;
mod ndjson;
mod ollama;

pub use http_client::{ByteStream, HttpClient, HttpClientTrait};
pub use ndjson::{lines, LineDecoder, LineStream};
pub use ollama::{OllamaEndpoint, DEFAULT_OLLAMA_BASE_URL};

#[cfg(test)]
pub use http_client::mock::{MockFailure, MockHttpClient};
