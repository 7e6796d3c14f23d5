//! HTTP delivery adapter for sliced-path layer previews.
//!
//! Exposes a single `POST /visualize` endpoint that accepts an STL
//! upload plus form-encoded rendering options and responds with the
//! rendered preview as a base64 data URI alongside layer metadata.
//!
//! The planning engine is injected as an [`Arc<dyn
//! PlannerBinding>`](preview_render::PlannerBinding), so the router
//! can be driven by the native engine in production and by
//! [`preview_render::fixture::FixtureBinding`] in tests.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod routes;

pub use routes::build_router;
