//! Task domain
//!
//! A [`Task`](entities::Task) is one unit of externally triggered work; a
//! [`Session`](session::Session) records one attempt at executing it.
//!
//! ```text
//! pending ──► running ──► completed
//!    ▲           │
//!    └── retry ──┤
//!                └──────► failed   (attempt == max_attempts)
//! ```

pub mod entities;
pub mod session;

pub use entities::{Priority, Task, TaskId, TaskRequest, TaskStatus};
pub use session::{Session, SessionStatus, TranscriptEntry, TranscriptRole};
