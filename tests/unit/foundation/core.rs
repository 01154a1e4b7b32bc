use std::time::Duration;

use super::*;

#[test]
fn fps_rejects_zero() {
    assert!(Fps::new(0).is_err());
    assert_eq!(Fps::new(12).unwrap().get(), 12);
}

#[test]
fn frame_interval_truncates_to_micros() {
    assert_eq!(
        Fps::new(12).unwrap().frame_interval(),
        Duration::from_micros(83_333)
    );
    assert_eq!(
        Fps::new(60).unwrap().frame_interval(),
        Duration::from_micros(16_666)
    );
    assert_eq!(Fps::new(1).unwrap().frame_interval(), Duration::from_secs(1));
}

#[test]
fn display_target_names_are_stable() {
    assert_eq!(DisplayTarget::Primary.to_string(), "primary");
    assert_eq!(DisplayTarget::External.to_string(), "external");
    assert_eq!(DisplayTarget::ALL[0], DisplayTarget::Primary);
}
