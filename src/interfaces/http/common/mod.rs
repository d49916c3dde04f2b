//! Shared HTTP building blocks

pub mod api_response;
pub mod validated_form;

pub use api_response::ApiResponse;
pub use validated_form::ValidatedForm;
