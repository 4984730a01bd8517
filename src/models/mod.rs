pub mod event;
pub mod page;

pub use event::{CreateEventRequest, Event, EventChanges, NewEvent, UpdateEventRequest};
pub use page::{EventPage, PageMeta};
