//! Device identity resolution.
//!
//! Resolves a stable device identifier and a bearer credential from a
//! caller context. Only the format of the credential is checked here;
//! verifying it is left to the remote service.

mod context;

pub use context::{
    AUTHORIZATION_HEADER, BEARER_PREFIX, DEVICE_ID_HEADER, DeviceIdentity, RequestContext,
};
