//! Display helpers shared by the renderer and the notifier.

use chrono::{DateTime, Local};

use crate::config::CardConfig;
use crate::event::CalendarEvent;

const MAPS_URL: &str = "https://www.google.com/maps";

/// Returns the time line shown for an event.
///
/// All-day events show `fullDayEventText`. The first fragment of a split
/// event shows only its start and the last fragment only its end.
pub fn event_time_text(event: &CalendarEvent, config: &CardConfig, time_format: &str) -> String {
    if event.is_all_day() {
        return config.full_day_event_text.clone();
    }

    let start = event.start().format(time_format);
    let end = event.end().format(time_format);
    if event.is_first_day() {
        format!("{}: {start}", config.start_text)
    } else if event.is_last_day() {
        format!("{}: {end}", config.end_text)
    } else {
        format!("{start} - {end}")
    }
}

/// Returns how far a running event has progressed, in percent.
///
/// `None` for all-day events and events not running at `now`.
pub fn progress_percent(event: &CalendarEvent, now: &DateTime<Local>) -> Option<f64> {
    if event.is_all_day() || *now < event.start() || *now >= event.end() {
        return None;
    }
    let total = (event.end() - event.start()).num_milliseconds();
    let elapsed = (*now - event.start()).num_milliseconds();
    Some(elapsed as f64 / total as f64 * 100.0)
}

/// Returns the directions link for an event's location.
pub fn map_url(event: &CalendarEvent) -> Option<String> {
    let address = event.location_address();
    if address.is_empty() {
        return None;
    }
    let address = address
        .split('+')
        .map(|part| urlencoding::encode(part).into_owned())
        .collect::<Vec<_>>()
        .join("+");
    Some(format!(
        "{MAPS_URL}?daddr={}+{address}",
        urlencoding::encode(event.location())
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EventRules;
    use crate::raw_event::{RawEvent, RawEventTime};
    use chrono::TimeZone;

    fn event(start: &str, end: &str) -> CalendarEvent {
        let raw = RawEvent::new().with_id("e").with_summary("Sprint").with_times(
            RawEventTime::parse(start).unwrap(),
            RawEventTime::parse(end).unwrap(),
        );
        CalendarEvent::new(raw, &EventRules::default()).unwrap()
    }

    fn local(d: u32, h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, d, h, m, 0).unwrap()
    }

    mod time_text {
        use super::*;

        #[test]
        fn all_day() {
            let config = CardConfig::default();
            let event = event("2024-03-05", "2024-03-06");
            assert_eq!(event_time_text(&event, &config, "%H:%M"), "All day");
        }

        #[test]
        fn timed_range() {
            let config = CardConfig::default();
            let event = event("2024-03-05T09:00:00", "2024-03-05T10:15:00");
            assert_eq!(event_time_text(&event, &config, "%H:%M"), "09:00 - 10:15");
        }

        #[test]
        fn fragments_show_one_side() {
            let config = CardConfig {
                start_text: "From".to_string(),
                end_text: "Until".to_string(),
                ..CardConfig::default()
            };
            let event = event("2024-03-05T18:00:00", "2024-03-08T09:30:00");
            assert_eq!(event.span_days(), 3);
            let first = event.fragment(0, 3);
            let middle = event.fragment(1, 3);
            let last = event.fragment(2, 3);

            assert_eq!(event_time_text(&first, &config, "%H:%M"), "From: 18:00");
            assert_eq!(event_time_text(&middle, &config, "%H:%M"), "All day");
            assert_eq!(event_time_text(&last, &config, "%H:%M"), "Until: 09:30");
        }
    }

    mod progress {
        use super::*;

        #[test]
        fn running_event() {
            let event = event("2024-03-05T09:00:00", "2024-03-05T10:00:00");
            assert_eq!(progress_percent(&event, &local(5, 9, 15)), Some(25.0));
            assert_eq!(progress_percent(&event, &local(5, 9, 0)), Some(0.0));
        }

        #[test]
        fn not_running() {
            let event = event("2024-03-05T09:00:00", "2024-03-05T10:00:00");
            assert_eq!(progress_percent(&event, &local(5, 8, 59)), None);
            assert_eq!(progress_percent(&event, &local(5, 10, 0)), None);
        }

        #[test]
        fn all_day_has_no_progress() {
            let event = event("2024-03-05", "2024-03-06");
            assert_eq!(progress_percent(&event, &local(5, 12, 0)), None);
        }
    }

    #[test]
    fn map_link() {
        let event = event("2024-03-05T09:00:00", "2024-03-05T10:00:00");
        assert_eq!(map_url(&event), None);

        let raw = event.raw().clone().with_location("Town Hall, 1 Main St");
        let event = CalendarEvent::new(raw, &EventRules::default()).unwrap();
        assert_eq!(
            map_url(&event).as_deref(),
            Some("https://www.google.com/maps?daddr=Town%20Hall+1+Main+St")
        );
    }
}
