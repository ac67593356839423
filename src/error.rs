//! Error types for API calls and form input.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
	#[error("request to {path} failed: {source}")]
	Transport {
		path: String,
		#[source]
		source: gloo_net::Error,
	},
	#[error("malformed response from {path}: {source}")]
	Decode {
		path: String,
		#[source]
		source: gloo_net::Error,
	},
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum FormError {
	#[error("{field} must be an integer node id, got {value:?}")]
	InvalidId { field: &'static str, value: String },
	#[error("{field} must be a number, got {value:?}")]
	InvalidNumber { field: &'static str, value: String },
}
