mod countdown;
mod handle;
mod workflow;

// Public API of the exam subsystem.
pub use crate::error::ExamServiceError;
pub use countdown::CountdownHandle;
pub use handle::{ExamHandle, ExamTiming};
pub use workflow::{ExamLoopService, ExamSelection};
