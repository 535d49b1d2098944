// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Segment resolver: which segments are audible at a given instant.

use crate::timeline::{Segment, Track};

/// An audible segment with its owning track's identity
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSegment<'a> {
    /// The audible segment
    pub segment: &'a Segment,
    /// Id of the owning track
    pub track_id: &'a str,
    /// Color of the owning track
    pub track_color: &'a str,
}

/// Resolve the audible segment set at `time`
///
/// Mute is checked first, then solo: if any track is soloed, every
/// non-solo track is suppressed regardless of its own mute flag. A
/// segment is audible on the half-open interval
/// `[start_time, start_time + duration)`. Track order and stored
/// segment order are preserved; overlapping segments on one track all
/// appear.
pub fn active_segments(tracks: &[Track], time: f64) -> Vec<ActiveSegment<'_>> {
    let any_solo = tracks.iter().any(|t| t.solo);

    let mut active = Vec::new();
    for track in tracks {
        if track.muted {
            continue;
        }
        if any_solo && !track.solo {
            continue;
        }
        for segment in &track.segments {
            if segment.contains(time) {
                active.push(ActiveSegment {
                    segment,
                    track_id: &track.id,
                    track_color: &track.color,
                });
            }
        }
    }
    active
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{NewSegment, Song, TimelineSession, TrackUpdate};

    fn session_with_tracks() -> (TimelineSession, String, String) {
        let mut s = TimelineSession::new(Song::new("Test"));
        let a = s.add_track(Some("A"));
        let b = s.add_track(Some("B"));
        s.add_segment(&a, NewSegment::new("s(\"bd\")").at(0.0).lasting(8.0))
            .unwrap();
        s.add_segment(&b, NewSegment::new("s(\"hh\")").at(0.0).lasting(8.0))
            .unwrap();
        (s, a, b)
    }

    #[test]
    fn test_all_tracks_audible_by_default() {
        let (s, _, _) = session_with_tracks();
        let active = active_segments(s.tracks(), 1.0);
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].segment.code, "s(\"bd\")");
        assert_eq!(active[1].segment.code, "s(\"hh\")");
    }

    #[test]
    fn test_muted_track_never_sounds() {
        let (mut s, a, _) = session_with_tracks();
        s.update_track(&a, TrackUpdate::new().muted(true)).unwrap();

        for t in [0.0, 1.0, 4.0, 7.9] {
            let active = active_segments(s.tracks(), t);
            assert!(active.iter().all(|x| x.segment.code != "s(\"bd\")"));
        }
    }

    #[test]
    fn test_solo_suppresses_non_solo_tracks() {
        let (mut s, _, b) = session_with_tracks();
        s.update_track(&b, TrackUpdate::new().solo(true)).unwrap();

        let active = active_segments(s.tracks(), 1.0);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].segment.code, "s(\"hh\")");
        assert_eq!(active[0].track_id, b);
    }

    #[test]
    fn test_mute_wins_over_own_solo() {
        let (mut s, a, _) = session_with_tracks();
        s.update_track(&a, TrackUpdate::new().muted(true).solo(true))
            .unwrap();

        // Track A is soloed but muted: it stays silent, and its solo
        // flag still suppresses track B.
        let active = active_segments(s.tracks(), 1.0);
        assert!(active.is_empty());
    }

    #[test]
    fn test_every_track_muted_is_silent() {
        let (mut s, a, b) = session_with_tracks();
        s.update_track(&a, TrackUpdate::new().muted(true)).unwrap();
        s.update_track(&b, TrackUpdate::new().muted(true).solo(true))
            .unwrap();
        assert!(active_segments(s.tracks(), 1.0).is_empty());
    }

    #[test]
    fn test_half_open_interval() {
        let mut s = TimelineSession::new(Song::new("Test"));
        let a = s.add_track(None);
        s.add_segment(&a, NewSegment::new("x").at(2.0).lasting(3.0))
            .unwrap();

        assert!(active_segments(s.tracks(), 1.999).is_empty());
        assert_eq!(active_segments(s.tracks(), 2.0).len(), 1);
        assert_eq!(active_segments(s.tracks(), 4.999).len(), 1);
        assert!(active_segments(s.tracks(), 5.0).is_empty());
    }

    #[test]
    fn test_overlapping_segments_all_returned_in_order() {
        let mut s = TimelineSession::new(Song::new("Test"));
        let a = s.add_track(None);
        s.add_segment(&a, NewSegment::new("first").at(0.0).lasting(8.0))
            .unwrap();
        s.add_segment(&a, NewSegment::new("second").at(4.0).lasting(8.0))
            .unwrap();

        let active = active_segments(s.tracks(), 5.0);
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].segment.code, "first");
        assert_eq!(active[1].segment.code, "second");
    }

    #[test]
    fn test_carries_track_color() {
        let (s, a, _) = session_with_tracks();
        let active = active_segments(s.tracks(), 1.0);
        assert_eq!(active[0].track_color, s.track(&a).unwrap().color);
    }
}
