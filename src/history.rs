// Time arithmetic behind order creation and the `show` history view.

use crate::model::{GroupOrder, Item};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Recency window used by `show` unless overridden.
pub const DEFAULT_WINDOW_DAYS: u32 = 2;

/// Absolute deadline `minutes` from `now`.
pub fn deadline_in(now: DateTime<Utc>, minutes: u32) -> DateTime<Utc> {
    now + Duration::minutes(i64::from(minutes))
}

/// True when `deadline` lies less than `window` in the past. Future deadlines
/// are always recent.
pub fn is_recent(deadline: DateTime<Utc>, now: DateTime<Utc>, window: Duration) -> bool {
    now - deadline < window
}

pub fn recent_orders(
    orders: Vec<GroupOrder>,
    now: DateTime<Utc>,
    window: Duration,
) -> Vec<GroupOrder> {
    orders
        .into_iter()
        .filter(|o| is_recent(o.deadline, now, window))
        .collect()
}

/// Keeps the items whose order is recent. Items that only carry an order id
/// get their order filled in from `groups`; items whose order cannot be
/// found are dropped since their deadline is unknown.
pub fn recent_items(
    items: Vec<Item>,
    groups: &[GroupOrder],
    now: DateTime<Utc>,
    window: Duration,
) -> Vec<Item> {
    let by_id: HashMap<_, _> = groups.iter().map(|g| (g.id, g)).collect();
    items
        .into_iter()
        .filter_map(|mut item| {
            if item.order.is_none() {
                let group = item.order_id.and_then(|id| by_id.get(&id))?;
                item.order = Some((*group).clone());
            }
            let deadline = item.order.as_ref()?.deadline;
            is_recent(deadline, now, window).then_some(item)
        })
        .collect()
}
