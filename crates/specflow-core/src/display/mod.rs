//! Markdown formatting for CLI and MCP output.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! collections and operation results are formatted through newtype wrappers
//! so the same data renders differently per context.
//!
//! - [`collections`]: `SpecSummaries`, `Tasks`, `BlockedTasks`
//! - [`results`]: `CreateResult`, `UpdateResult`, `DeleteResult`, `PhaseResult`
//! - [`status`]: `OperationStatus`
//! - [`datetime`]: `LocalDateTime`
//!
//! ```rust
//! use specflow_core::display::OperationStatus;
//!
//! let status = OperationStatus::success("Index rebuilt".to_string());
//! assert_eq!(status.to_string(), "Success: Index rebuilt\n");
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;
pub mod status;

pub use collections::{BlockedTasks, SpecSummaries, Tasks};
pub use datetime::LocalDateTime;
pub use results::{CreateResult, DeleteResult, PhaseResult, UpdateResult};
pub use status::OperationStatus;
