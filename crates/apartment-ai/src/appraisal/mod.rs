//! Apartment appraisal: form handling, the end-to-end pipeline, and its HTTP surface.

pub mod domain;
pub mod form;
pub mod page;
pub mod router;
pub mod service;
pub mod session;

#[cfg(test)]
mod tests;

pub use domain::{format_cost_of_capital, ApartmentListing, AppraisalReport};
pub use form::{ApartmentQuery, FormChoices, FormErrors, FORM_FIELDS};
pub use page::{escape_html, render_page, FormState, STATIC_PREFIX};
pub use router::{appraisal_router, AppraisalState};
pub use service::{AppraisalError, AppraisalService};
pub use session::{
    InMemorySessionStore, SessionError, SessionId, SessionStore, SessionValues, SESSION_COOKIE,
};
