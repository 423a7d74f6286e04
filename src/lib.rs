//! iiko.services order client
//!
//! Authenticates with an API login, resolves the organization and terminal
//! group, reads the menu and places orders against the iiko.services API.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod client;
pub mod config;
pub mod credentials;
pub mod driver;
pub mod errors;
pub mod models;
pub mod report;
pub mod workflow;

pub use client::IikoClient;
pub use errors::{ServiceError, ServiceResult, UpstreamFailure, UpstreamFailureKind};
pub use models::{
    AccessToken, Catalog, Credential, OrderItems, OrderReceipt, OrderRequest, OrganizationId,
    ProductId, TerminalGroupId,
};
pub use workflow::{OrderingWorkflow, Session};
