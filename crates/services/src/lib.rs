//! `parallax-services`: typed data access, one module per business area.
//!
//! Every function here:
//! - takes the tenant id explicitly when the read is tenant-scoped,
//! - reads only named views and mutates only through named procedures,
//! - returns a [`ServiceResponse`] and never propagates a backend error.
//!
//! No business validation happens here; the backend owns it.

pub mod anamnesis;
pub mod appointments;
pub mod audit;
pub mod auth;
pub mod branches;
pub mod companies;
pub mod dashboard;
pub mod export;
pub mod finance;
mod normalize;
pub mod period;
pub mod reports;
pub mod response;
pub mod settings;
pub mod user_context;
pub mod users;

pub use export::{ExportError, ReportKind, export_filename, save_csv, to_csv};
pub use period::{ReportPeriod, day_bounds};
pub use response::{NOT_CONFIGURED_MESSAGE, ServiceResponse, error_message};
pub use user_context::UserContextData;
