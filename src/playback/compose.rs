// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Code compositor: render an audible segment set into one program.
//!
//! Composition is a pure function of the ordered (code, id) pairs, so
//! identical active sets always render byte-identical strings. The
//! clock relies on that to skip redundant re-execution.

use super::resolver::ActiveSegment;

/// The canonical "nothing to play" program
pub const SILENCE: &str = "silence";

/// Whether a fragment contributes no sound
fn is_silent(code: &str) -> bool {
    let trimmed = code.trim();
    trimmed.is_empty() || trimmed == SILENCE
}

/// Wrap a fragment so its audio is identifiable downstream
///
/// `.tag(...)` is a no-op on the signal; it only labels the pattern
/// with its segment id.
pub fn wrap_fragment(code: &str, segment_id: &str) -> String {
    format!("({}).tag(\"{}\")", code.trim(), segment_id)
}

/// Compose an audible set into a single executable program
///
/// - No usable fragments: the silence token
/// - One: its wrapped fragment alone
/// - Many: a `stack(...)` of wrapped fragments, one per line, in
///   active-list order
pub fn compose(active: &[ActiveSegment<'_>]) -> String {
    let wrapped: Vec<String> = active
        .iter()
        .filter(|a| !is_silent(&a.segment.code))
        .map(|a| wrap_fragment(&a.segment.code, &a.segment.id))
        .collect();

    match wrapped.len() {
        0 => SILENCE.to_string(),
        1 => wrapped.into_iter().next().unwrap_or_default(),
        _ => format!("stack(\n  {}\n)", wrapped.join(",\n  ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::resolver::active_segments;
    use crate::timeline::{NewSegment, Song, TimelineSession};

    fn active_for<'a>(s: &'a TimelineSession, t: f64) -> Vec<ActiveSegment<'a>> {
        active_segments(s.tracks(), t)
    }

    #[test]
    fn test_empty_set_is_silence() {
        assert_eq!(compose(&[]), SILENCE);
    }

    #[test]
    fn test_silent_fragments_are_silence() {
        let mut s = TimelineSession::new(Song::new("Test"));
        let a = s.add_track(None);
        s.add_segment(&a, NewSegment::new("")).unwrap();
        s.add_segment(&a, NewSegment::new("  silence  ")).unwrap();

        let active = active_for(&s, 1.0);
        assert_eq!(active.len(), 2);
        assert_eq!(compose(&active), SILENCE);
    }

    #[test]
    fn test_single_fragment_wrapped_without_stack() {
        let mut s = TimelineSession::new(Song::new("Test"));
        let a = s.add_track(None);
        let id = s.add_segment(&a, NewSegment::new(" s(\"bd\") ")).unwrap();

        let active = active_for(&s, 1.0);
        let program = compose(&active);
        assert_eq!(program, format!("(s(\"bd\")).tag(\"{}\")", id));
        assert!(!program.contains("stack"));
    }

    #[test]
    fn test_multiple_fragments_stacked_in_order() {
        let mut s = TimelineSession::new(Song::new("Test"));
        let a = s.add_track(None);
        let b = s.add_track(None);
        let bd = s.add_segment(&a, NewSegment::new("s(\"bd\")")).unwrap();
        let hh = s.add_segment(&b, NewSegment::new("s(\"hh\")")).unwrap();

        let program = compose(&active_for(&s, 1.0));
        let expected = format!(
            "stack(\n  (s(\"bd\")).tag(\"{}\"),\n  (s(\"hh\")).tag(\"{}\")\n)",
            bd, hh
        );
        assert_eq!(program, expected);
    }

    #[test]
    fn test_silent_fragment_dropped_from_stack() {
        let mut s = TimelineSession::new(Song::new("Test"));
        let a = s.add_track(None);
        let kept = s.add_segment(&a, NewSegment::new("s(\"bd\")")).unwrap();
        s.add_segment(&a, NewSegment::new("silence")).unwrap();

        // Only one usable fragment remains, so no stack
        let program = compose(&active_for(&s, 1.0));
        assert_eq!(program, format!("(s(\"bd\")).tag(\"{}\")", kept));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let mut s = TimelineSession::new(Song::new("Test"));
        let a = s.add_track(None);
        let b = s.add_track(None);
        s.add_segment(&a, NewSegment::new("s(\"bd\")")).unwrap();
        s.add_segment(&b, NewSegment::new("note(\"c e g\")")).unwrap();

        let first = compose(&active_for(&s, 1.0));
        let second = compose(&active_for(&s, 3.0));
        assert_eq!(first, second);
    }
}
