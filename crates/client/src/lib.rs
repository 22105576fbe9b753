//! Client for the remote admission service.
//!
//! Every wizard operation is a call to the remote service:
//! [`AdmissionService`] is the seam the web layer depends on and
//! [`AdmissionApi`] its HTTP implementation.

pub mod api;
pub mod error;
pub mod identity;
pub mod resource;
pub mod service;

pub use api::AdmissionApi;
pub use error::ServiceError;
pub use identity::Identity;
pub use resource::Resource;
pub use service::AdmissionService;
