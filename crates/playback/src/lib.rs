//! Streaming playback core — SPSC sample ring, refill engine, track selection
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(clippy::unwrap_used)]

pub mod engine;
pub mod ring_buffer;
pub mod state;

// Tests come first — the implementation modules make them pass
#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    /// Track-selection state machine tests
    mod state_tests {
        use crate::state::{PlayerState, PlayerStatus};
        use platform::{TrackName, TrackNames};

        fn tracks(names: &[&str]) -> TrackNames {
            let mut list = TrackNames::new();
            for name in names {
                let mut track = TrackName::new();
                track.push_str(name).expect("name fits");
                list.push(track).expect("list fits");
            }
            list
        }

        #[test]
        fn test_starts_at_first_track_stopped() {
            let state = PlayerState::from_tracks(tracks(&["a.pcm", "b.pcm"]));
            assert_eq!(state.current_track(), Some("a.pcm"));
            assert_eq!(state.status(), PlayerStatus::Stopped);
        }

        #[test]
        fn test_empty_list_has_no_current_track() {
            let state = PlayerState::from_tracks(TrackNames::new());
            assert!(state.is_empty());
            assert_eq!(state.current_track(), None);
        }

        #[test]
        fn test_next_wraps_from_last_to_first() {
            let mut state = PlayerState::from_tracks(tracks(&["a.pcm", "b.pcm", "c.pcm"]));
            assert_eq!(state.next(), Some("b.pcm"));
            assert_eq!(state.next(), Some("c.pcm"));
            assert_eq!(state.next(), Some("a.pcm"));
        }

        #[test]
        fn test_prev_wraps_from_first_to_last() {
            let mut state = PlayerState::from_tracks(tracks(&["a.pcm", "b.pcm", "c.pcm"]));
            assert_eq!(state.prev(), Some("c.pcm"));
        }

        #[test]
        fn test_three_track_prev_cycle_returns_home() {
            let mut state = PlayerState::from_tracks(tracks(&["a.pcm", "b.pcm", "c.pcm"]));
            assert_eq!(state.prev(), Some("c.pcm"));
            assert_eq!(state.prev(), Some("b.pcm"));
            assert_eq!(state.prev(), Some("a.pcm"));
        }

        #[test]
        fn test_single_track_wraps_to_itself() {
            let mut state = PlayerState::from_tracks(tracks(&["only.pcm"]));
            assert_eq!(state.next(), Some("only.pcm"));
            assert_eq!(state.prev(), Some("only.pcm"));
        }

        #[test]
        fn test_next_and_prev_are_noops_on_empty_list() {
            let mut state = PlayerState::from_tracks(TrackNames::new());
            assert_eq!(state.next(), None);
            assert_eq!(state.prev(), None);
        }

        #[test]
        fn test_status_round_trips() {
            let mut state = PlayerState::from_tracks(tracks(&["a.pcm"]));
            state.set_status(PlayerStatus::Playing);
            assert_eq!(state.status(), PlayerStatus::Playing);
            state.set_status(PlayerStatus::Paused);
            assert_eq!(state.status(), PlayerStatus::Paused);
        }

        #[test]
        fn test_selection_survives_status_changes() {
            let mut state = PlayerState::from_tracks(tracks(&["a.pcm", "b.pcm"]));
            state.next();
            state.set_status(PlayerStatus::Playing);
            state.set_status(PlayerStatus::Stopped);
            assert_eq!(state.current_track(), Some("b.pcm"));
        }
    }

    /// Sample ring buffer tests
    mod ring_buffer_tests {
        use crate::ring_buffer::SampleRing;

        #[test]
        fn test_push_then_pop_is_fifo() {
            let ring: SampleRing<16> = SampleRing::new();
            let (mut producer, mut consumer) = ring.try_split().expect("first split");
            let data = [1u8, 2, 3, 4, 5];
            assert_eq!(producer.push_slice(&data), 5);
            for expected in data {
                assert_eq!(consumer.pop(), Some(expected));
            }
            assert_eq!(consumer.pop(), None);
        }

        #[test]
        fn test_usable_capacity_is_one_less_than_slots() {
            let ring: SampleRing<8> = SampleRing::new();
            let (mut producer, _consumer) = ring.try_split().expect("first split");
            assert_eq!(producer.push_slice(&[0u8; 16]), 7);
            assert_eq!(producer.free(), 0);
            assert_eq!(ring.len(), 7);
        }

        #[test]
        fn test_push_into_full_ring_writes_nothing() {
            let ring: SampleRing<8> = SampleRing::new();
            let (mut producer, _consumer) = ring.try_split().expect("first split");
            producer.push_slice(&[1u8; 7]);
            assert_eq!(producer.push_slice(&[2u8]), 0);
            assert_eq!(ring.len(), 7);
        }

        #[test]
        fn test_pop_from_empty_ring_is_none() {
            let ring: SampleRing<8> = SampleRing::new();
            let (_producer, mut consumer) = ring.try_split().expect("first split");
            assert_eq!(consumer.pop(), None);
        }

        #[test]
        fn test_wrap_around_preserves_order() {
            let ring: SampleRing<8> = SampleRing::new();
            let (mut producer, mut consumer) = ring.try_split().expect("first split");
            producer.push_slice(&[1u8; 6]);
            for _ in 0..6 {
                consumer.pop();
            }
            // Cursors now sit near the end; this push wraps.
            let data = [10u8, 11, 12, 13, 14];
            assert_eq!(producer.push_slice(&data), 5);
            for expected in data {
                assert_eq!(consumer.pop(), Some(expected));
            }
        }

        #[test]
        fn test_split_succeeds_only_once() {
            let ring: SampleRing<8> = SampleRing::new();
            let first = ring.try_split();
            assert!(first.is_some());
            assert!(ring.try_split().is_none());
        }

        #[test]
        fn test_len_and_free_account_for_traffic() {
            let ring: SampleRing<16> = SampleRing::new();
            let (mut producer, mut consumer) = ring.try_split().expect("first split");
            producer.push_slice(&[0u8; 10]);
            assert_eq!(ring.len(), 10);
            assert_eq!(producer.free(), 5);
            consumer.pop();
            consumer.pop();
            assert_eq!(ring.len(), 8);
            assert_eq!(producer.free(), 7);
        }

        #[test]
        fn test_reset_empties_the_ring() {
            let ring: SampleRing<16> = SampleRing::new();
            let (mut producer, mut consumer) = ring.try_split().expect("first split");
            producer.push_slice(&[9u8; 5]);
            ring.reset();
            assert!(ring.is_empty());
            assert_eq!(consumer.pop(), None);
        }
    }
}
