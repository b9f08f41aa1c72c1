// Platform administration: moderation queues, audit trail, analytics.

pub mod analytics;
pub mod audit;
pub mod handlers;
