pub mod endpoints;
pub mod http_api;

pub use endpoints::Endpoints;
pub use http_api::{
    GENERIC_UPLOAD_ERROR, HttpDatasetApi, ServerError, first_field_error, parse_server_error,
};
