//! Certificate delivery deadline
//!
//! A certificate is due by the end of the notice's calendar day plus the
//! configured window. Scheduling the reminder is left to the caller.

use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::config::RulesConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CertificateDeadline {
    pub due_at: NaiveDateTime,
    pub remind_at: NaiveDateTime,
}

impl CertificateDeadline {
    pub fn for_notice(notice_at: NaiveDateTime, rules: &RulesConfig) -> Self {
        let day_start = notice_at.date().and_time(NaiveTime::MIN);
        let due_at = day_start
            .checked_add_signed(rules.delivery_window())
            .unwrap_or(NaiveDateTime::MAX);
        Self {
            due_at,
            remind_at: due_at
                .checked_sub_signed(rules.reminder_lead())
                .unwrap_or(day_start),
        }
    }

    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        now >= self.due_at
    }

    /// Time left as `"<h>h <m>m"`, or `"vencido"` once due
    pub fn remaining(&self, now: NaiveDateTime) -> String {
        let left = self.due_at - now;
        if left <= Duration::zero() {
            return "vencido".to_string();
        }
        format!("{}h {}m", left.num_hours(), left.num_minutes() % 60)
    }
}
