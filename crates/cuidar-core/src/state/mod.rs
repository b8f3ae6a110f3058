pub mod repository;

pub use repository::SessionStateRepository;
