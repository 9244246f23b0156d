pub mod engine;
pub mod error;
pub mod supervisor;
pub mod writer;

pub use engine::Session;
pub use error::SessionError;
pub use supervisor::Supervisor;
