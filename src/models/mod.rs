//! Domain model module declarations.

pub mod task;

pub use task::{NewTask, Priority, Task, TaskFilter, TaskPatch};
