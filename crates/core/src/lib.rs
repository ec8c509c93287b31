//! `parallax-core`: identifiers shared by every Parallax crate.
//!
//! This crate has no IO and no knowledge of the backend; it only names things.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{
    BranchId, ClientId, CompanyId, InviteId, OrderId, ProfessionalId, RecordId, UserId,
};
