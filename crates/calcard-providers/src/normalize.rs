//! Raw events to the sorted agenda event list.
//!
//! The stages run in a fixed order:
//! 1. dedup by backend key (`id`, else `uid`), first occurrence wins
//! 2. origin tagging from the configured entities
//! 3. title ignore expression
//! 4. declined events (with `hideDeclined`)
//! 5. location ignore expression
//! 6. multi-day splitting (with `showMultiDay`)
//! 7. events that ended before today, or before now with `hidePastEvents`
//! 8. stable sort by start

use std::collections::HashSet;

use calcard_core::time::start_of_today;
use calcard_core::{
    CalendarEvent, CardConfig, EventRules, FetchWindow, RawEvent, split_multi_day,
};
use chrono::{DateTime, Local};
use tracing::{debug, warn};

/// Runs every normalization stage over a merged batch of raw events.
pub fn normalize_events(
    raw_events: Vec<RawEvent>,
    config: &CardConfig,
    rules: &EventRules,
    now: &DateTime<Local>,
) -> Vec<CalendarEvent> {
    let window_end = FetchWindow::for_days(now, config.number_of_days).end;
    let today = start_of_today(now);
    let total = raw_events.len();

    let mut events: Vec<CalendarEvent> = dedup(raw_events)
        .into_iter()
        .filter_map(|raw| adapt(raw, config, rules))
        .filter(|event| keep(event, config, rules))
        .flat_map(|event| {
            if config.show_multi_day && event.is_multi_day() {
                split_multi_day(&event, &window_end)
            } else {
                vec![event]
            }
        })
        .filter(|event| event.end() > today)
        .filter(|event| !config.hide_past_events || event.end() > *now)
        .collect();

    events.sort_by_key(CalendarEvent::start);

    debug!(raw = total, kept = events.len(), "Normalized events");
    events
}

/// Keeps the first payload for each backend key. Keyless payloads are all kept.
fn dedup(raw_events: Vec<RawEvent>) -> Vec<RawEvent> {
    let mut seen = HashSet::new();
    raw_events
        .into_iter()
        .filter(|raw| match raw.key() {
            Some(key) => seen.insert(key.to_string()),
            None => true,
        })
        .collect()
}

fn adapt(raw: RawEvent, config: &CardConfig, rules: &EventRules) -> Option<CalendarEvent> {
    let origin = raw
        .entity
        .as_deref()
        .and_then(|entity| config.entity(entity))
        .cloned();

    match CalendarEvent::new(raw, rules) {
        Ok(event) => Some(event.with_origin(origin)),
        Err(e) => {
            warn!(error = %e, "Dropping malformed event");
            None
        }
    }
}

fn keep(event: &CalendarEvent, config: &CardConfig, rules: &EventRules) -> bool {
    if rules.ignores_title(event.raw().base_title()) {
        debug!(title = %event.title(), "Ignoring event by title");
        return false;
    }
    if config.hide_declined && event.is_declined() {
        return false;
    }
    if rules.ignores_location(event.location()) {
        debug!(title = %event.title(), location = %event.location(), "Ignoring event by location");
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use calcard_core::{CalendarEntity, RawAttendee, RawEventTime, ResponseStatus};
    use chrono::TimeZone;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 4, 12, 0, 0).unwrap()
    }

    fn raw(id: &str, start: &str, end: &str) -> RawEvent {
        RawEvent::new()
            .with_id(id)
            .with_summary(id)
            .with_times(
                RawEventTime::parse(start).unwrap(),
                RawEventTime::parse(end).unwrap(),
            )
            .with_entity("calendar.home")
    }

    fn config() -> CardConfig {
        CardConfig::with_entities([CalendarEntity::new("calendar.home").with_name("Home")])
    }

    fn run(raw_events: Vec<RawEvent>, config: &CardConfig) -> Vec<CalendarEvent> {
        let rules = EventRules::from_config(config).unwrap();
        normalize_events(raw_events, config, &rules, &now())
    }

    fn titles(events: &[CalendarEvent]) -> Vec<&str> {
        events.iter().map(CalendarEvent::title).collect()
    }

    mod dedup {
        use super::*;

        #[test]
        fn id_and_uid_share_a_key_space() {
            let google = raw("shared", "2024-03-05T09:00:00", "2024-03-05T10:00:00");
            let mut caldav = raw("ignored", "2024-03-05T11:00:00", "2024-03-05T12:00:00");
            caldav.id = None;
            caldav.uid = Some("shared".to_string());

            let events = run(vec![google, caldav], &config());
            assert_eq!(titles(&events), vec!["shared"]);
        }

        #[test]
        fn keyless_payloads_are_kept() {
            let mut a = raw("a", "2024-03-05T09:00:00", "2024-03-05T10:00:00");
            let mut b = raw("b", "2024-03-05T10:00:00", "2024-03-05T11:00:00");
            a.id = None;
            b.id = None;
            assert_eq!(run(vec![a, b], &config()).len(), 2);
        }

        #[test]
        fn idempotent() {
            let batch = vec![
                raw("a", "2024-03-05T09:00:00", "2024-03-05T10:00:00"),
                raw("a", "2024-03-05T09:00:00", "2024-03-05T10:00:00"),
                raw("b", "2024-03-06T09:00:00", "2024-03-06T10:00:00"),
            ];
            let once = dedup(batch);
            let twice = dedup(once.clone());
            assert_eq!(once, twice);
            assert_eq!(once.len(), 2);
        }

        #[test]
        fn idempotent_with_keyless_payloads() {
            let mut keyless = raw("note", "2024-03-05T09:00:00", "2024-03-05T10:00:00");
            keyless.id = None;
            let batch = vec![
                keyless.clone(),
                raw("a", "2024-03-05T11:00:00", "2024-03-05T12:00:00"),
                keyless,
                raw("a", "2024-03-05T11:00:00", "2024-03-05T12:00:00"),
            ];
            let once = dedup(batch);
            assert_eq!(once.len(), 3);
            assert_eq!(dedup(once.clone()), once);
        }
    }

    mod filters {
        use super::*;

        #[test]
        fn origin_is_tagged() {
            let events = run(
                vec![raw("a", "2024-03-05T09:00:00", "2024-03-05T10:00:00")],
                &config(),
            );
            assert_eq!(events[0].origin().map(|o| o.display_name()), Some("Home"));
        }

        #[test]
        fn unknown_entity_has_no_origin() {
            let event = raw("a", "2024-03-05T09:00:00", "2024-03-05T10:00:00").with_entity("calendar.other");
            let events = run(vec![event], &config());
            assert!(events[0].origin().is_none());
        }

        #[test]
        fn ignore_title_is_case_insensitive() {
            let config = CardConfig {
                ignore_events_expression: Some("birthday".to_string()),
                ..config()
            };
            let events = run(
                vec![
                    raw("BIRTHDAY Bob", "2024-03-05T09:00:00", "2024-03-05T10:00:00"),
                    raw("Standup", "2024-03-05T10:00:00", "2024-03-05T10:15:00"),
                ],
                &config,
            );
            assert_eq!(titles(&events), vec!["Standup"]);
        }

        #[test]
        fn declined_hidden_only_when_asked() {
            let declined = raw("Offsite", "2024-03-05T09:00:00", "2024-03-05T17:00:00")
                .with_attendee(RawAttendee::myself(ResponseStatus::Declined));

            assert_eq!(run(vec![declined.clone()], &config()).len(), 1);

            let config = CardConfig {
                hide_declined: true,
                ..config()
            };
            assert!(run(vec![declined], &config).is_empty());
        }

        #[test]
        fn ignore_location() {
            let config = CardConfig {
                ignore_events_by_location_expression: Some("^gym$".to_string()),
                ..config()
            };
            let events = run(
                vec![
                    raw("Workout", "2024-03-05T07:00:00", "2024-03-05T08:00:00")
                        .with_location("Gym, 5 Park Road"),
                    raw("Lunch", "2024-03-05T12:00:00", "2024-03-05T13:00:00")
                        .with_location("Gymnasium Cafe"),
                ],
                &config,
            );
            assert_eq!(titles(&events), vec!["Lunch"]);
        }

        #[test]
        fn missing_start_is_dropped() {
            let mut broken = raw("broken", "2024-03-05T09:00:00", "2024-03-05T10:00:00");
            broken.start = None;
            let ok = raw("ok", "2024-03-05T09:00:00", "2024-03-05T10:00:00");
            assert_eq!(titles(&run(vec![broken, ok], &config())), vec!["ok"]);
        }
    }

    mod window {
        use super::*;

        #[test]
        fn events_ended_before_today_are_dropped() {
            let events = run(
                vec![
                    raw("yesterday", "2024-03-03T09:00:00", "2024-03-03T10:00:00"),
                    raw("this morning", "2024-03-04T08:00:00", "2024-03-04T09:00:00"),
                ],
                &config(),
            );
            assert_eq!(titles(&events), vec!["this morning"]);
        }

        #[test]
        fn hide_past_events_uses_now() {
            let config = CardConfig {
                hide_past_events: true,
                ..config()
            };
            let events = run(
                vec![
                    raw("this morning", "2024-03-04T08:00:00", "2024-03-04T09:00:00"),
                    raw("running", "2024-03-04T11:00:00", "2024-03-04T13:00:00"),
                ],
                &config,
            );
            assert_eq!(titles(&events), vec!["running"]);
        }

        #[test]
        fn sort_is_stable() {
            let events = run(
                vec![
                    raw("late", "2024-03-05T15:00:00", "2024-03-05T16:00:00"),
                    raw("first", "2024-03-05T09:00:00", "2024-03-05T10:00:00"),
                    raw("second", "2024-03-05T09:00:00", "2024-03-05T11:00:00"),
                ],
                &config(),
            );
            assert_eq!(titles(&events), vec!["first", "second", "late"]);
        }
    }

    mod multi_day {
        use super::*;

        fn trip() -> RawEvent {
            raw("Trip", "2024-03-05T18:00:00", "2024-03-07T10:00:00")
        }

        #[test]
        fn kept_whole_by_default() {
            let events = run(vec![trip()], &config());
            assert_eq!(titles(&events), vec!["Trip"]);
        }

        #[test]
        fn split_when_enabled() {
            let config = CardConfig {
                show_multi_day: true,
                ..config()
            };
            let events = run(
                vec![trip(), raw("Dinner", "2024-03-06T19:00:00", "2024-03-06T21:00:00")],
                &config,
            );
            assert_eq!(titles(&events), vec!["Trip (1/2)", "Trip (2/2)", "Dinner"]);
            assert!(events.iter().all(|e| e.origin().is_some()));
            assert!(events[..2].iter().all(CalendarEvent::is_multi_day));
            assert_eq!(events[1].end(), Local.with_ymd_and_hms(2024, 3, 7, 10, 0, 0).unwrap());
        }

        #[test]
        fn same_date_all_day_is_not_split() {
            let config = CardConfig {
                show_multi_day: true,
                ..config()
            };
            let rules = EventRules::from_config(&config).unwrap();
            let now = Local.with_ymd_and_hms(2024, 2, 29, 12, 0, 0).unwrap();
            let events = normalize_events(
                vec![raw("Holiday", "2024-03-01", "2024-03-01")],
                &config,
                &rules,
                &now,
            );

            assert_eq!(titles(&events), vec!["Holiday"]);
            assert!(events[0].is_all_day());
            assert!(!events[0].is_multi_day());
            assert!(events[0].fragment_info().is_none());
        }

        #[test]
        fn fragments_before_today_are_trimmed() {
            let config = CardConfig {
                show_multi_day: true,
                ..config()
            };
            let events = run(
                vec![raw("Holiday", "2024-03-02", "2024-03-06")],
                &config,
            );
            assert_eq!(titles(&events), vec!["Holiday (3/4)", "Holiday (4/4)"]);
        }

        #[test]
        fn fragments_past_window_end_are_trimmed() {
            let config = CardConfig {
                show_multi_day: true,
                number_of_days: 2,
                ..config()
            };
            let events = run(vec![raw("Leave", "2024-03-04", "2024-03-10")], &config);
            assert_eq!(titles(&events), vec!["Leave (1/6)", "Leave (2/6)"]);
        }
    }
}
