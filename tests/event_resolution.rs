// tests/event_resolution.rs

mod common;
use crate::common::builders::{utc, EventTableBuilder};
use crate::common::init_tracing;

use std::error::Error;
use std::io::Write;

use chrono::TimeDelta;
use eclipse_sequencer::errors::{EventTableError, ResolutionError, SequencerError};
use eclipse_sequencer::events::{find_bounds, parse_timing_file, parse_timing_str, Limb};
use tempfile::NamedTempFile;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn magpre_midpoint_interpolates_linearly() -> TestResult {
    let t0 = utc("2024/04/08 17:00:00.0");
    let t1 = utc("2024/04/08 17:10:00.0");
    let table = EventTableBuilder::new().pre(0.0, t0).pre(1.0, t1).build();

    assert_eq!(table.resolve("MAGPRE 50")?, t0 + TimeDelta::minutes(5));
    Ok(())
}

#[test]
fn exact_knot_returns_the_knot_time() -> TestResult {
    let t0 = utc("2024/04/08 17:00:00.0");
    let t1 = utc("2024/04/08 17:10:00.0");
    let table = EventTableBuilder::new().pre(0.0, t0).pre(1.0, t1).build();

    assert_eq!(table.resolve("MAGPRE 0")?, t0);
    assert_eq!(table.resolve("MAGPRE 100")?, t1);
    Ok(())
}

#[test]
fn named_instants_resolve_directly() -> TestResult {
    let table = EventTableBuilder::contacts().build();
    assert_eq!(table.resolve("MAX")?, utc("2024/04/08 18:02:00.0"));
    assert_eq!(table.resolve("C3")?, utc("2024/04/08 18:04:00.0"));
    Ok(())
}

#[test]
fn magpost_uses_the_reversed_post_limb() -> TestResult {
    let table = EventTableBuilder::contacts()
        .post(0.8, utc("2024/04/08 18:10:00.0"))
        .post(0.4, utc("2024/04/08 18:30:00.0"))
        .build();

    let post = table.magnitudes(Limb::Post);
    assert_eq!(post[0].magnitude, 0.4);
    assert_eq!(post[1].magnitude, 0.8);

    // Halfway between 0.4 and 0.8 on the way down.
    assert_eq!(table.resolve("MAGPOST 60")?, utc("2024/04/08 18:20:00.0"));
    Ok(())
}

#[test]
fn outside_the_curve_falls_back_to_contacts() -> TestResult {
    init_tracing();
    let table = EventTableBuilder::contacts()
        .pre(0.5, utc("2024/04/08 17:30:00.0"))
        .pre(0.6, utc("2024/04/08 17:36:00.0"))
        .max_magnitude(1.0)
        .build();

    // C1 17:00 + (C2 - C1) * 0.25
    assert_eq!(table.resolve("MAGPRE 25")?, utc("2024/04/08 17:15:00.0"));
    // C4 19:00 - (C4 - C3) * 0.5, C3 18:04
    assert_eq!(table.resolve("MAGPOST 50")?, utc("2024/04/08 18:32:00.0"));
    Ok(())
}

#[test]
fn fallback_without_contacts_is_an_error() {
    let table = EventTableBuilder::contacts().without_instant("C2").build();

    match table.resolve("MAGPRE 20") {
        Err(ResolutionError::MissingContact { event, missing }) => {
            assert_eq!(event, "MAGPRE 20");
            assert_eq!(missing, "C2");
        }
        other => panic!("expected MissingContact, got {other:?}"),
    }
}

#[test]
fn unknown_and_malformed_names_are_errors() {
    let table = EventTableBuilder::contacts().build();

    assert!(matches!(
        table.resolve("SUNSET"),
        Err(ResolutionError::UnknownEvent(_))
    ));
    assert!(matches!(
        table.resolve("MAGPRE lots"),
        Err(ResolutionError::InvalidMagnitude(_))
    ));
}

#[test]
fn non_monotonic_curve_is_rejected() {
    let result = EventTableBuilder::new()
        .pre(0.1, utc("2024/04/08 17:00:00.0"))
        .pre(0.3, utc("2024/04/08 17:05:00.0"))
        .pre(0.2, utc("2024/04/08 17:10:00.0"))
        .try_build();

    match result {
        Err(EventTableError::NonMonotonic {
            limb,
            index,
            previous,
            current,
        }) => {
            assert_eq!(limb, "pre");
            assert_eq!(index, 2);
            assert_eq!(previous, 0.3);
            assert_eq!(current, 0.2);
        }
        other => panic!("expected NonMonotonic, got {other:?}"),
    }
}

#[test]
fn bounds_span_flat_runs() {
    let table = EventTableBuilder::new()
        .pre(0.1, utc("2024/04/08 17:00:00.0"))
        .pre(0.2, utc("2024/04/08 17:01:00.0"))
        .pre(0.2, utc("2024/04/08 17:02:00.0"))
        .pre(0.3, utc("2024/04/08 17:03:00.0"))
        .build();
    let curve = table.magnitudes(Limb::Pre);

    assert_eq!(find_bounds(curve, 0.15), Some((0, 1)));
    assert_eq!(find_bounds(curve, 0.2), Some((2, 1)));
    assert_eq!(find_bounds(curve, 0.05), None);
    assert_eq!(find_bounds(curve, 0.35), None);
}

const TIMING_TEXT: &str = "\
Total Solar Eclipse of 2024 Apr 08
1st Contact  2024/04/08  17:02:11.6   alt 55
2nd Contact  2024/04/08  18:18:29.3
Max Eclipse  2024/04/08  18:20:18.0
C3           2024/04/08  18:22:07.1
4th Contact  2024/04/08  19:35:45.0
Magnitude at maximum : 1.0136

17:10:00.0   54.1   180.2   0.0500
17:40:00.0   57.3   190.5   0.4000
18:20:00.0   58.0   200.1   1.0000
18:40:00.0   57.9   205.0   0.7000
19:10:00.0   55.2   212.3   0.3000
";

#[test]
fn timing_text_builds_contacts_and_limbs() -> TestResult {
    init_tracing();
    let table = parse_timing_str(TIMING_TEXT)?;

    assert_eq!(table.instant("C1"), Some(utc("2024/04/08 17:02:11.6")));
    assert_eq!(table.instant("C2"), Some(utc("2024/04/08 18:18:29.3")));
    assert_eq!(table.instant("C3"), Some(utc("2024/04/08 18:22:07.1")));
    assert_eq!(table.instant("C4"), Some(utc("2024/04/08 19:35:45.0")));
    assert_eq!(table.instant("MAX"), Some(utc("2024/04/08 18:20:18.0")));
    assert_eq!(table.max_magnitude(), 1.0136);

    let pre = table.magnitudes(Limb::Pre);
    let post = table.magnitudes(Limb::Post);
    assert_eq!(pre.len(), 3);
    assert_eq!(post.len(), 2);
    assert_eq!(post[0].magnitude, 0.3);
    assert_eq!(post[1].magnitude, 0.7);

    assert_eq!(table.resolve("MAGPOST 50")?, utc("2024/04/08 18:55:00.0"));
    Ok(())
}

#[test]
fn timing_file_on_disk_parses_and_missing_peak_defaults() -> TestResult {
    init_tracing();
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        "1st Contact  2024/04/08  17:02:11.6\n17:10:00.0   54.1   180.2   0.0500\n"
    )?;

    let table = parse_timing_file(file.path())?;
    assert_eq!(table.max_magnitude(), 1.0);
    assert_eq!(table.magnitudes(Limb::Pre).len(), 1);
    Ok(())
}

#[test]
fn magnitude_before_any_contact_is_rejected() {
    let result = parse_timing_str("17:10:00.0   54.1   180.2   0.0500\n");

    match result {
        Err(SequencerError::EventTable(EventTableError::InvalidLine { line, .. })) => {
            assert_eq!(line, 1)
        }
        other => panic!("expected InvalidLine, got {other:?}"),
    }
}

#[test]
fn magnitude_fallback_beyond_the_calendar_is_an_error() {
    let table = EventTableBuilder::contacts().build();

    match table.resolve("MAGPRE 1e300") {
        Err(ResolutionError::OutOfRange(event)) => assert_eq!(event, "MAGPRE 1e300"),
        other => panic!("expected OutOfRange, got {other:?}"),
    }
    match table.resolve("MAGPOST 1e300") {
        Err(ResolutionError::OutOfRange(event)) => assert_eq!(event, "MAGPOST 1e300"),
        other => panic!("expected OutOfRange, got {other:?}"),
    }
}
