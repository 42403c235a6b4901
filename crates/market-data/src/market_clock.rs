//! US equity market session clock.
//!
//! Answers "is the market open right now" and "when does that change".
//! US Eastern wall time comes from the IANA `America/New_York` zone, so
//! DST transitions track tzdata rather than a hand-written rule. The
//! regular session is Mon-Fri 09:30-16:00 Eastern; half days and
//! exchange holidays are not modelled, so on those days the clock
//! reports the regular session.

use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Offset, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use log::warn;

use crate::cache::TtlCache;
use crate::clock::Clock;
use crate::constants::MARKET_STATUS_TTL;
use crate::models::MarketStatus;

/// The exchange timezone for the US session.
const EASTERN: Tz = chrono_tz::America::New_York;

const STATUS_CACHE_KEY: &str = "status:us";

/// Session bounds in Eastern wall-clock minutes since midnight.
const OPEN_MINUTE: u32 = 9 * 60 + 30;
const CLOSE_MINUTE: u32 = 16 * 60;

pub struct MarketClock {
    clock: Arc<dyn Clock>,
    status_cache: TtlCache<MarketStatus>,
}

impl MarketClock {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            status_cache: TtlCache::new(clock.clone()),
            clock,
        }
    }

    /// Current market status, cached for a few minutes. Never fails: if
    /// the session arithmetic cannot produce a result, a conservative
    /// fixed-offset approximation is reported instead.
    pub fn status(&self) -> MarketStatus {
        if let Some(cached) = self.status_cache.get(STATUS_CACHE_KEY) {
            return cached;
        }

        let now = self.clock.now();
        let status = compute_status(now).unwrap_or_else(|| {
            warn!("session arithmetic failed at {}, using fixed-offset fallback", now);
            fallback_status(now)
        });

        self.status_cache
            .insert(STATUS_CACHE_KEY, status.clone(), MARKET_STATUS_TTL);
        status
    }

    pub fn is_open(&self) -> bool {
        self.status().is_open
    }

    /// The trading day strictly before `date`, skipping weekends.
    pub fn previous_trading_day(&self, date: NaiveDate) -> NaiveDate {
        let mut day = date - chrono::Duration::days(1);
        while is_weekend(day.weekday()) {
            day -= chrono::Duration::days(1);
        }
        day
    }

    /// The most recent trading day on or before `date`.
    pub fn last_trading_day(&self, date: NaiveDate) -> NaiveDate {
        let mut day = date;
        while is_weekend(day.weekday()) {
            day -= chrono::Duration::days(1);
        }
        day
    }
}

fn is_weekend(weekday: Weekday) -> bool {
    matches!(weekday, Weekday::Sat | Weekday::Sun)
}

/// "EDT" or "EST" for the offset in force at the given Eastern instant.
fn zone_label(wall: &DateTime<Tz>) -> &'static str {
    if wall.offset().fix().local_minus_utc() == -4 * 3600 {
        "EDT"
    } else {
        "EST"
    }
}

fn compute_status(now: DateTime<Utc>) -> Option<MarketStatus> {
    let wall = now.with_timezone(&EASTERN);
    let minute_of_day = wall.hour() * 60 + wall.minute();
    let weekday = wall.weekday();

    let is_open =
        !is_weekend(weekday) && minute_of_day >= OPEN_MINUTE && minute_of_day < CLOSE_MINUTE;

    let timezone = zone_label(&wall);

    if is_open {
        let next_close = eastern_to_utc(wall.date_naive(), CLOSE_MINUTE)?;
        return Some(MarketStatus {
            is_open: true,
            next_open: None,
            next_close: Some(next_close),
            timezone: timezone.to_string(),
            last_updated: now,
        });
    }

    // Closed: find the next weekday session open. Same wall-clock day
    // counts when the open is still ahead of us.
    let mut open_day = wall.date_naive();
    if is_weekend(weekday) || minute_of_day >= OPEN_MINUTE {
        open_day = open_day.succ_opt()?;
    }
    while is_weekend(open_day.weekday()) {
        open_day = open_day.succ_opt()?;
    }

    Some(MarketStatus {
        is_open: false,
        next_open: Some(eastern_to_utc(open_day, OPEN_MINUTE)?),
        next_close: None,
        timezone: timezone.to_string(),
        last_updated: now,
    })
}

/// Convert an Eastern wall-clock minute on `date` to UTC. Session times
/// never land inside a DST gap, but an ambiguous instant resolves to
/// the earlier offset.
fn eastern_to_utc(date: NaiveDate, minute_of_day: u32) -> Option<DateTime<Utc>> {
    let wall = date.and_hms_opt(minute_of_day / 60, minute_of_day % 60, 0)?;
    EASTERN
        .from_local_datetime(&wall)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Fixed UTC-5 approximation used only when the calendar arithmetic
/// fails. Reports open/closed but no transition instants.
fn fallback_status(now: DateTime<Utc>) -> MarketStatus {
    let wall = now - chrono::Duration::hours(5);
    let minute_of_day = wall.hour() * 60 + wall.minute();
    let is_open = !is_weekend(wall.weekday())
        && minute_of_day >= OPEN_MINUTE
        && minute_of_day < CLOSE_MINUTE;

    MarketStatus {
        is_open,
        next_open: None,
        next_close: None,
        timezone: "EST".to_string(),
        last_updated: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::clock::FixedClock;

    fn clock_at(dt: DateTime<Utc>) -> (MarketClock, Arc<FixedClock>) {
        let fixed = Arc::new(FixedClock::new(dt));
        (MarketClock::new(fixed.clone()), fixed)
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn eastern_offset_hours(dt: DateTime<Utc>) -> i32 {
        dt.with_timezone(&EASTERN).offset().fix().local_minus_utc() / 3600
    }

    #[test]
    fn test_open_midday_weekday() {
        // Friday 2024-03-01 is before the DST switch: EST, open 14:30 UTC.
        let (market, _) = clock_at(utc(2024, 3, 1, 15, 0));
        let status = market.status();
        assert!(status.is_open);
        assert_eq!(status.timezone, "EST");
        assert_eq!(status.next_close, Some(utc(2024, 3, 1, 21, 0)));
    }

    #[test]
    fn test_closed_before_open() {
        let (market, _) = clock_at(utc(2024, 3, 1, 14, 0));
        let status = market.status();
        assert!(!status.is_open);
        assert_eq!(status.next_open, Some(utc(2024, 3, 1, 14, 30)));
    }

    #[test]
    fn test_closed_after_close_rolls_to_next_day() {
        // Thursday evening: next open is Friday morning.
        let (market, _) = clock_at(utc(2024, 2, 29, 22, 0));
        let status = market.status();
        assert!(!status.is_open);
        assert_eq!(status.next_open, Some(utc(2024, 3, 1, 14, 30)));
    }

    #[test]
    fn test_friday_evening_skips_to_monday() {
        let (market, _) = clock_at(utc(2024, 3, 1, 22, 0));
        let status = market.status();
        assert!(!status.is_open);
        assert_eq!(status.next_open, Some(utc(2024, 3, 4, 14, 30)));
    }

    #[test]
    fn test_weekend_closed() {
        let (market, _) = clock_at(utc(2024, 3, 2, 16, 0));
        assert!(!market.is_open());
    }

    #[test]
    fn test_dst_boundary_offsets() {
        // Second Sunday of March 2024 is the 10th.
        assert_eq!(eastern_offset_hours(utc(2024, 3, 10, 6, 0)), -5);
        assert_eq!(eastern_offset_hours(utc(2024, 3, 10, 8, 0)), -4);
        // First Sunday of November 2024 is the 3rd.
        assert_eq!(eastern_offset_hours(utc(2024, 11, 3, 5, 0)), -4);
        assert_eq!(eastern_offset_hours(utc(2024, 11, 3, 7, 0)), -5);
    }

    #[test]
    fn test_historical_dst_rule_followed() {
        // Before 2007 US DST began the first Sunday of April, not the
        // second of March; the zone database knows, a fixed rule would
        // not. Monday 2005-03-21 15:00 UTC is 10:00 EST.
        let (market, _) = clock_at(utc(2005, 3, 21, 15, 0));
        let status = market.status();
        assert!(status.is_open);
        assert_eq!(status.timezone, "EST");
        assert_eq!(status.next_close, Some(utc(2005, 3, 21, 21, 0)));

        // Two weeks later (2005-04-04) DST is in force.
        assert_eq!(eastern_offset_hours(utc(2005, 4, 4, 15, 0)), -4);
    }

    #[test]
    fn test_summer_session_is_edt() {
        // Monday 2024-06-03, 13:30 UTC = 09:30 EDT.
        let (market, _) = clock_at(utc(2024, 6, 3, 13, 30));
        let status = market.status();
        assert!(status.is_open);
        assert_eq!(status.timezone, "EDT");
        assert_eq!(status.next_close, Some(utc(2024, 6, 3, 20, 0)));
    }

    #[test]
    fn test_session_edges() {
        // 09:29 ET closed, 09:30 open, 15:59 open, 16:00 closed.
        assert!(!clock_at(utc(2024, 3, 1, 14, 29)).0.is_open());
        assert!(clock_at(utc(2024, 3, 1, 14, 30)).0.is_open());
        assert!(clock_at(utc(2024, 3, 1, 20, 59)).0.is_open());
        assert!(!clock_at(utc(2024, 3, 1, 21, 0)).0.is_open());
    }

    #[test]
    fn test_status_cached_across_transition() {
        // Cached status survives until the TTL lapses even though the
        // underlying instant has crossed the close.
        let (market, fixed) = clock_at(utc(2024, 3, 1, 20, 58));
        assert!(market.status().is_open);

        fixed.advance(chrono::Duration::minutes(3));
        assert!(market.status().is_open);

        fixed.advance(chrono::Duration::minutes(5));
        assert!(!market.status().is_open);
    }

    #[test]
    fn test_previous_trading_day_skips_weekend() {
        let (market, _) = clock_at(utc(2024, 3, 1, 0, 0));
        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert_eq!(
            market.previous_trading_day(monday),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_last_trading_day_on_saturday() {
        let (market, _) = clock_at(utc(2024, 3, 1, 0, 0));
        let saturday = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        assert_eq!(
            market.last_trading_day(saturday),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        let friday = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(market.last_trading_day(friday), friday);
    }

    #[test]
    fn test_fallback_status_shape() {
        let status = fallback_status(utc(2024, 3, 1, 15, 0));
        assert!(status.is_open);
        assert!(status.next_open.is_none());
        assert!(status.next_close.is_none());
    }
}
