//! Application services for task records.

mod lifecycle;

pub use lifecycle::{
    CreateTaskRequest, TaskService, TaskServiceError, TaskServiceResult, UpdateTaskRequest,
};
