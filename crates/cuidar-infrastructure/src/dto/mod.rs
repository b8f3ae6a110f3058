//! Data Transfer Objects (DTOs) for persistence.
//!
//! These DTOs represent the versioned schema for persisted data.
//! They are private to the infrastructure layer and handle the evolution
//! of the storage format over time.
//!
//! ## Schema Versioning (Semantic Versioning)
//!
//! - **MAJOR (X.0.0)**: Breaking changes (field removal, type changes)
//! - **MINOR (1.X.0)**: Backward-compatible additions (new optional fields)
//!
//! ### AccountBook Version History
//! - **1.0.0**: Initial schema (also assumed for unversioned bare arrays)
//! - **1.1.0**: Added `darkMode` and `socialName` per account

mod account_book;

pub use account_book::{
    ACCOUNT_BOOK_ENTITY, AccountBookDTO, AccountBookV1_0_0, AccountBookV1_1_0, AccountV1_0_0,
    AccountV1_1_0, LEGACY_ACCOUNT_BOOK_VERSION, create_account_book_migrator,
    normalize_legacy_account_list,
};
