//! Request handlers, one module per resource.

pub mod admissions;
pub mod announcements;
pub mod feedback;
pub mod photos;
pub mod session;
pub mod staff;
pub mod support;
