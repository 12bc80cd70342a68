pub mod entry;
pub mod prize;
pub mod race;
pub mod session;
pub mod source_activity;

pub use entry::*;
pub use prize::*;
pub use race::*;
pub use session::*;
pub use source_activity::*;
