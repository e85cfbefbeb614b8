//! Court id -> adapter lookup.

use crate::Adapter;
use crate::minn::Minnesota;
use crate::pa::Pennsylvania;

const COURTS: &[&str] = &["minn", "minnctapp", "minnctapp_u", "pasuperct"];

/// Every registered court id, in listing order.
pub fn court_ids() -> &'static [&'static str] {
    COURTS
}

/// Build the adapter for `court_id`, or `None` if no such court is registered.
pub fn lookup(court_id: &str) -> Option<Box<dyn Adapter>> {
    let adapter: Box<dyn Adapter> = match court_id {
        "minn" => Box::new(Minnesota::supreme()),
        "minnctapp" => Box::new(Minnesota::court_of_appeals()),
        "minnctapp_u" => Box::new(Minnesota::court_of_appeals_unpublished()),
        "pasuperct" => Box::new(Pennsylvania::superior()),
        _ => return None,
    };
    Some(adapter)
}
