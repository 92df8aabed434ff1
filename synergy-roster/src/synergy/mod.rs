//! Client for the Synergy portal.
//!
//! The portal has no API. After a ViewState login every request carries the
//! session's focus key, reports are generated as asynchronous jobs, and the
//! artifacts are served as static files once a job finishes.

pub mod error;
pub mod job;
mod report;
pub mod schema;
pub mod scrape;
pub mod session;
pub mod template;

pub use error::{AuthError, SynergyError};
pub use job::{JobEndpoint, ReportJob};
pub use schema::{FocusKey, JobGuid, ReportFormat};
pub use session::{Endpoints, Session};
pub use template::Template;
