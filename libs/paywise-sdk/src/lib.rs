#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Typed client for the PayWise expense-splitting API.
//!
//! Every call goes through [`paywise_auth::AuthenticatedClient`], so an
//! expired access token is refreshed transparently. Also home to the pieces
//! of the expense form that work offline: the keyword category guesser, the
//! [`ExpenseDraft`] form state and rupee formatting.

pub mod auth_api;
pub mod category;
pub mod client;
pub mod draft;
pub mod error;
pub mod expenses_api;
pub mod models;
pub mod money;

pub use auth_api::AuthApi;
pub use category::{
    DEFAULT_CATEGORY_ICON, KnownCategory, UnknownCategory, category_icon, guess_category,
};
pub use client::PayWiseClient;
pub use draft::{DETECTION_MIN_CHARS, ExpenseDraft};
pub use error::ApiError;
pub use expenses_api::ExpensesApi;
pub use models::{
    Category, CategoryBreakdown, CategoryDetection, DetectionSource, Expense, ExpenseFilter,
    ExpensePayload, ExpenseSummary, Group, NamedRef, Payer, RegisterRequest,
};
pub use money::format_inr;
