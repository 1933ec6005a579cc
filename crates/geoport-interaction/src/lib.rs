//! Remote collaborators of the GeoPort core.

pub mod override_service_client;

pub use override_service_client::HttpOverrideServiceClient;
