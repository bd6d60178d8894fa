//! Capability handlers
//!
//! One handler per intent family. Handlers own the reply wording and talk to
//! the collaborator traits; the router only marshals arguments into them.

pub mod admin;
pub mod boards;
pub mod files;
pub mod general;
pub mod learning;

pub use admin::AdminHandler;
pub use boards::BoardsHandler;
pub use files::FilesHandler;
pub use general::GeneralHandler;
pub use learning::LearningHandler;
