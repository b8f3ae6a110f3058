//! Locally remembered accounts.

pub mod model;

pub use model::{Account, AccountBook, LAST_LOGIN_FORMAT, NewAccount, Role, login_timestamp};
