pub mod dispatcher;
pub mod event_source;
pub mod matcher;
pub mod modifier_state;
pub mod registry;
pub mod session;

pub use dispatcher::Callbacks;
pub use event_source::{create_event_source, CaptureTarget, EventSource};
pub use matcher::{Matcher, MatcherOptions, RepeatPolicy};
pub use registry::{KeybindIds, Registry};
pub use session::{KeybindSession, SessionStatus};
