//! Start lists: the ordered heats of a single event.

use crate::heat::Heat;

/// The heats of one event, in heat order.
pub type StartList = Vec<Heat>;

/// A start list is valid when it is non-empty, every heat has the same event
/// number and a heat number, and heat numbers strictly increase.
pub fn is_valid(startlist: &[Heat]) -> bool {
    let Some(first) = startlist.first() else {
        return false;
    };
    let Some(event) = first.event() else {
        return false;
    };
    let mut previous = 0;
    for heat in startlist {
        if heat.event() != Some(event) {
            return false;
        }
        match heat.heat() {
            Some(number) if number > previous => previous = number,
            _ => return false,
        }
    }
    true
}
