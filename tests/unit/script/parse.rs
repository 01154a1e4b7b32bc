use super::*;

fn defaults() -> (Size, Fps) {
    (Size::new(320, 480), Fps::new(12).unwrap())
}

fn parse(text: &str) -> BootAnimResult<Script> {
    let (size, fps) = defaults();
    parse_script(text, size, fps)
}

#[test]
fn parses_header_and_segments_in_order() {
    let s = parse("320 480 12\np 1 0 part0\np 0 10 part1\n").unwrap();
    assert!(s.has_header);
    assert_eq!(s.size, Size::new(320, 480));
    assert_eq!(s.fps.get(), 12);
    assert_eq!(s.segments.len(), 2);
    assert_eq!(s.segments[0].repeat, Repeat::Times(1));
    assert_eq!(s.segments[1].repeat, Repeat::Infinite);
    assert_eq!(
        s.segments.iter().map(|p| p.pause_frames).collect::<Vec<_>>(),
        [0, 10]
    );
    assert_eq!(s.segments[1].path_prefix, "part1");
}

#[test]
fn missing_header_falls_back_to_defaults() {
    let s = parse("p 2 3 intro").unwrap();
    assert!(!s.has_header);
    assert_eq!(s.size, Size::new(320, 480));
    assert_eq!(s.fps.get(), 12);
    assert_eq!(s.segments[0].repeat, Repeat::Times(2));
}

#[test]
fn malformed_lines_are_skipped() {
    let text = "480 800 30\r\n\
                garbage\r\n\
                p x 0 part0\r\n\
                p 1\r\n\
                p -1 0 neg\r\n\
                p 1 0 ok\r\n\
                \r\n\
                640 480 60\r\n";
    let s = parse(text).unwrap();
    assert_eq!(s.size, Size::new(480, 800));
    assert_eq!(s.fps.get(), 30);
    assert_eq!(s.segments.len(), 1);
    assert_eq!(s.segments[0].path_prefix, "ok");
}

#[test]
fn header_after_segment_is_ignored() {
    let s = parse("p 1 0 part0\n640 480 60\n").unwrap();
    assert!(!s.has_header);
    assert_eq!(s.fps.get(), 12);
}

#[test]
fn zero_fps_header_is_malformed() {
    assert!(matches!(parse("320 480 0\n"), Err(BootAnimError::Script(_))));
    assert!(matches!(parse("0 480 12\n"), Err(BootAnimError::Script(_))));
    assert!(matches!(parse("-5 480 12\n"), Err(BootAnimError::Script(_))));
}

#[test]
fn over_long_path_is_skipped() {
    let long = "x".repeat(MAX_PATH_LEN + 1);
    let s = parse(&format!("p 1 0 {long}\np 1 0 short\n")).unwrap();
    assert_eq!(s.segments.len(), 1);
    assert_eq!(s.segments[0].path_prefix, "short");
}

#[test]
fn classify_accepts_tight_and_trailing_forms() {
    assert_eq!(
        classify_line("p1 0 part0 trailing"),
        ScriptLine::Segment {
            count: 1,
            pause: 0,
            path: "part0"
        }
    );
    assert_eq!(
        classify_line("320 480 12 extra"),
        ScriptLine::Header {
            width: 320,
            height: 480,
            fps: 12
        }
    );
    assert_eq!(classify_line(" p 1 0 part0"), ScriptLine::Other);
    assert_eq!(classify_line("part 1 0 x"), ScriptLine::Other);
}

#[test]
fn repeat_budget_semantics() {
    assert_eq!(Repeat::from_count(0), Repeat::Infinite);
    assert!(Repeat::Infinite.allows_pass(u32::MAX));
    assert!(!Repeat::Infinite.is_last_pass(1000));

    let twice = Repeat::from_count(2);
    assert!(twice.allows_pass(1));
    assert!(!twice.allows_pass(2));
    assert!(!twice.is_last_pass(1));
    assert!(twice.is_last_pass(2));
    assert_eq!(twice.count(), 2);
}
