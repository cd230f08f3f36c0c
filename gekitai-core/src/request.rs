//! Capability requests and their argument parsing.
//!
//! Content passes every argument as a string (or a small integer kind code).
//! The parsers here are the only place where those wire values are coerced; a
//! failure rejects the single request and never reaches a subsystem.

use crate::abi::{SPEECH_LOOP_REPEAT, snack_kind, toast_kind};
use crate::error::{CapabilityError, CapabilityResult};
use crate::locale::Locale;

/// A validated request from sandboxed content, owned by exactly one subsystem.
#[derive(Clone, Debug, PartialEq)]
pub enum CapabilityRequest {
    Speak { text: String, volume: f32 },
    CancelSpeech,
    Vibrate(VibrationLength),
    StopVibration,
    SetBrightness(BrightnessLevel),
    SetVolumeMax,
    SetAlarmFlag(bool),
    SetLocale(Locale),
    ClearPersistedState,
    ShowToast { text: String, kind: ToastKind },
    ShowSnackbar { text: String, kind: SnackKind },
}

impl CapabilityRequest {
    /// Short name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            CapabilityRequest::Speak { .. } => "speak",
            CapabilityRequest::CancelSpeech => "cancel_speech",
            CapabilityRequest::Vibrate(_) => "vibrate",
            CapabilityRequest::StopVibration => "stop_vibration",
            CapabilityRequest::SetBrightness(_) => "set_brightness",
            CapabilityRequest::SetVolumeMax => "set_volume_max",
            CapabilityRequest::SetAlarmFlag(_) => "set_alarm_flag",
            CapabilityRequest::SetLocale(_) => "set_locale",
            CapabilityRequest::ClearPersistedState => "clear_persisted_state",
            CapabilityRequest::ShowToast { .. } => "show_toast",
            CapabilityRequest::ShowSnackbar { .. } => "show_snackbar",
        }
    }
}

/// Requested vibration length.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum VibrationLength {
    /// Wire value `-1`: reuse the previous length.
    Repeat,
    Millis(u64),
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum BrightnessLevel {
    #[default]
    Normal,
    Brighter,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ToastKind {
    Short,
    Long,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SnackKind {
    Short,
    Long,
    /// Indefinite snackbar with an OK action.
    ActionOk,
}

pub fn parse_vibration_length(raw: &str) -> CapabilityResult<VibrationLength> {
    if raw == "-1" {
        return Ok(VibrationLength::Repeat);
    }
    // `u64::from_str` accepts a leading '+', the wire format does not.
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CapabilityError::invalid("lengthMs", raw));
    }
    raw.parse::<u64>()
        .map(VibrationLength::Millis)
        .map_err(|_| CapabilityError::invalid("lengthMs", raw))
}

pub fn parse_volume(raw: &str) -> CapabilityResult<f32> {
    let volume: f32 = raw
        .trim()
        .parse()
        .map_err(|_| CapabilityError::invalid("volume", raw))?;
    if !volume.is_finite() || !(0.0..=1.0).contains(&volume) {
        return Err(CapabilityError::invalid("volume", raw));
    }
    Ok(volume)
}

pub fn parse_brightness(raw: &str) -> BrightnessLevel {
    if raw == "brighter" {
        BrightnessLevel::Brighter
    } else {
        BrightnessLevel::Normal
    }
}

pub fn parse_alarm_flag(raw: &str) -> bool {
    raw == "yes"
}

pub fn parse_toast_kind(raw: u32) -> CapabilityResult<ToastKind> {
    match raw {
        toast_kind::SHORT => Ok(ToastKind::Short),
        toast_kind::LONG => Ok(ToastKind::Long),
        other => Err(CapabilityError::invalid("toast kind", other.to_string())),
    }
}

pub fn parse_snack_kind(raw: u32) -> CapabilityResult<SnackKind> {
    match raw {
        snack_kind::SHORT => Ok(SnackKind::Short),
        snack_kind::LONG => Ok(SnackKind::Long),
        snack_kind::ACTION_OK => Ok(SnackKind::ActionOk),
        other => Err(CapabilityError::invalid("snackbar kind", other.to_string())),
    }
}

/// Expand a loop request into a single bounded utterance.
pub fn expand_speech_loop(text: &str) -> String {
    text.repeat(SPEECH_LOOP_REPEAT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("-1", VibrationLength::Repeat)]
    #[case("0", VibrationLength::Millis(0))]
    #[case("250", VibrationLength::Millis(250))]
    #[case("0010", VibrationLength::Millis(10))]
    fn vibration_length_accepts(#[case] raw: &str, #[case] expected: VibrationLength) {
        assert_eq!(parse_vibration_length(raw), Ok(expected));
    }

    #[rstest]
    #[case("")]
    #[case("-2")]
    #[case("+5")]
    #[case(" 5")]
    #[case("1.5")]
    #[case("abc")]
    #[case("99999999999999999999999")]
    fn vibration_length_rejects(#[case] raw: &str) {
        assert!(matches!(
            parse_vibration_length(raw),
            Err(CapabilityError::InvalidArgument { what: "lengthMs", .. })
        ));
    }

    #[rstest]
    #[case("0.5", 0.5)]
    #[case("1.0", 1.0)]
    #[case("0", 0.0)]
    #[case(" 1 ", 1.0)]
    fn volume_accepts(#[case] raw: &str, #[case] expected: f32) {
        assert_eq!(parse_volume(raw), Ok(expected));
    }

    #[rstest]
    #[case("loud")]
    #[case("")]
    #[case("NaN")]
    #[case("inf")]
    #[case("1.5")]
    #[case("-0.1")]
    fn volume_rejects(#[case] raw: &str) {
        assert!(parse_volume(raw).is_err());
    }

    #[test]
    fn brightness_has_exactly_two_levels() {
        assert_eq!(parse_brightness("brighter"), BrightnessLevel::Brighter);
        assert_eq!(parse_brightness("normal"), BrightnessLevel::Normal);
        assert_eq!(parse_brightness("Brighter"), BrightnessLevel::Normal);
        assert_eq!(parse_brightness(""), BrightnessLevel::Normal);
    }

    #[test]
    fn alarm_flag_is_only_set_by_yes() {
        assert!(parse_alarm_flag("yes"));
        assert!(!parse_alarm_flag("no"));
        assert!(!parse_alarm_flag("YES"));
    }

    #[test]
    fn unknown_notification_kinds_are_contract_violations() {
        assert_eq!(parse_toast_kind(1), Ok(ToastKind::Long));
        assert!(parse_toast_kind(2).is_err());
        assert_eq!(parse_snack_kind(2), Ok(SnackKind::ActionOk));
        assert!(parse_snack_kind(3).is_err());
    }

    #[test]
    fn speech_loop_repeats_exactly_thirty_two_times() {
        let expanded = expand_speech_loop("ring");
        assert_eq!(expanded.len(), 4 * 32);
        assert_eq!(expanded.matches("ring").count(), 32);
    }
}
