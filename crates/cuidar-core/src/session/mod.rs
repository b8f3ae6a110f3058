pub mod model;

pub use model::{RetryAction, Screen, UiError};
