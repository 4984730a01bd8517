use serde::Serialize;

use crate::models::event::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// One page of the event listing, shaped as `{data, meta}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventPage {
    pub data: Vec<Event>,
    pub meta: PageMeta,
}
