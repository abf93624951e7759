//! Client side of the contact form: validates the form with the same rules
//! as the server and drives the submission.

pub mod api;
pub mod controller;
