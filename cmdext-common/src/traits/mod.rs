pub mod repository_traits;
pub mod runtime_traits;

pub use repository_traits::{CustomCommandRepository, ScheduledTaskRepository};
pub use runtime_traits::{BotRuntime, ChatSink};
