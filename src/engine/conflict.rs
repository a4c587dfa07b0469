use crate::model::{EquipmentState, Ms, Span};

pub(crate) fn now_ms() -> Ms {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as Ms
}

/// Decide whether `[span.start, span.end)` is free on this item.
///
/// Busy if the live occupancy still covers the window start, or if any
/// existing reservation overlaps under the strict half-open test.
/// Touching endpoints never conflict. Used for immediate starts
/// (`span.start == now`) and future reservations alike.
pub(crate) fn slot_is_free(state: &EquipmentState, span: &Span) -> bool {
    if let Some(occupancy) = &state.occupancy
        && occupancy.until > span.start
    {
        return false;
    }
    state.overlapping(span).next().is_none()
}
