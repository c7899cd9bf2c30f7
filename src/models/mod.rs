pub mod form;
pub mod submission;

pub use form::{Form, FormElement};
pub use submission::Submission;
