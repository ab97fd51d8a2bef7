//! Race state machine.
//!
//! [`Race`] is the reducer at the center of the client: it owns all race
//! state and mutates it exclusively through synchronous event application.
//! Local keystrokes and remote lane updates arrive one at a time from the
//! runtime's merge loop; there is never a second writer, so no locking is
//! involved anywhere in the race path.
//!
//! Remote updates are applied last-write-wins with no monotonicity check: a
//! reordered delivery can make a lane's bar regress transiently. Updates
//! carry absolute progress, so the next delivery corrects the display.

use std::time::{Duration, Instant};

use typelane_core::{LANE_COUNT, Lane};

use crate::{AppAction, KeyInput};

/// Whether the race is networked and where.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceMode {
    /// Local practice race; no lanes, no reports.
    Solo,
    /// Multiplayer race in a lobby.
    Lobby {
        /// Lobby identifier, threaded into progress reports.
        lobby_id: u64,
        /// This player's assigned lane.
        lane: Lane,
    },
}

/// State of one race.
///
/// Invariants, held after every event:
/// - `typed.len() <= sentence length` (in characters)
/// - every lane progress value is `<= sentence length`
/// - `completed` flips false→true at the event where the transcript first
///   reaches full length, and never reverts
#[derive(Debug, Clone)]
pub struct Race {
    mode: RaceMode,
    /// Target sentence as typed-in display string.
    sentence: String,
    /// Target sentence characters, for O(1) position comparison.
    target: Vec<char>,
    /// Per-lane progress (absolute transcript positions), board order.
    lanes: [u16; LANE_COUNT],
    /// Characters typed so far, correct or not.
    typed: Vec<char>,
    /// Total printable keystrokes accepted.
    strokes: u32,
    /// Keystrokes that matched the target at their position.
    correct_strokes: u32,
    completed: bool,
    /// Stamped on the first key of the race, printable or not.
    started_at: Option<Instant>,
}

impl Race {
    /// Start a solo race over `sentence`.
    #[must_use]
    pub fn solo(sentence: String) -> Self {
        Self::new(RaceMode::Solo, sentence)
    }

    /// Start a multiplayer race in `lobby_id` on `lane`.
    #[must_use]
    pub fn lobby(lobby_id: u64, lane: Lane, sentence: String) -> Self {
        Self::new(RaceMode::Lobby { lobby_id, lane }, sentence)
    }

    fn new(mode: RaceMode, sentence: String) -> Self {
        let target: Vec<char> = sentence.chars().collect();
        Self {
            mode,
            completed: target.is_empty(),
            target,
            sentence,
            lanes: [0; LANE_COUNT],
            typed: Vec::new(),
            strokes: 0,
            correct_strokes: 0,
            started_at: None,
        }
    }

    /// Apply a typing key and return the side effects to execute.
    ///
    /// Quit and back keys are interpreted one level up; this reducer only
    /// ever sees printable characters and backspace.
    pub fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }

        match key {
            KeyInput::Char(c) => self.handle_char(c),
            KeyInput::Backspace => self.handle_backspace(),
            _ => vec![],
        }
    }

    fn handle_char(&mut self, c: char) -> Vec<AppAction> {
        // Review mode: after completion only backspace edits are accepted
        // and no further reports are emitted.
        if self.completed || self.typed.len() >= self.target.len() {
            return vec![];
        }

        self.typed.push(c);
        self.strokes += 1;

        let mut actions = vec![AppAction::Render];

        let position = self.typed.len() - 1;
        if self.target[position] == c {
            self.correct_strokes += 1;

            if let RaceMode::Lobby { lobby_id, lane } = self.mode {
                // Absolute progress is the transcript position the matching
                // character just filled, bounded by the sentence length.
                let progress = self.typed.len() as u16;
                self.lanes[lane.index()] = progress;
                actions.push(AppAction::Report { lobby_id, lane, progress });
            }
        }

        if self.typed.len() == self.target.len() {
            self.completed = true;
        }

        actions
    }

    fn handle_backspace(&mut self) -> Vec<AppAction> {
        // Backspace never un-reports progress: reports are append-only and
        // carry absolute values, so the service is simply not told.
        if self.typed.pop().is_some() { vec![AppAction::Render] } else { vec![] }
    }

    /// Apply a remote lane update (last-write-wins).
    ///
    /// Malformed lanes are dropped with a warning and never touch state.
    /// Progress is clamped to the sentence length so the board invariant
    /// holds regardless of what the wire claims. Own-lane echoes apply like
    /// any other update; they are idempotent against the local value.
    pub fn apply_lane_progress(&mut self, lane: u8, progress: u16) -> Vec<AppAction> {
        let Some(lane) = Lane::from_wire(lane) else {
            tracing::warn!(lane, "dropping lane update with out-of-range lane");
            return vec![];
        };

        self.lanes[lane.index()] = progress.min(self.target.len() as u16);
        vec![AppAction::Render]
    }

    /// Race mode.
    #[must_use]
    pub fn mode(&self) -> RaceMode {
        self.mode
    }

    /// Target sentence.
    #[must_use]
    pub fn sentence(&self) -> &str {
        &self.sentence
    }

    /// Target sentence characters.
    #[must_use]
    pub fn target(&self) -> &[char] {
        &self.target
    }

    /// Characters typed so far.
    #[must_use]
    pub fn typed(&self) -> &[char] {
        &self.typed
    }

    /// Per-lane progress board.
    #[must_use]
    pub fn lanes(&self) -> &[u16; LANE_COUNT] {
        &self.lanes
    }

    /// Total printable keystrokes accepted.
    #[must_use]
    pub fn strokes(&self) -> u32 {
        self.strokes
    }

    /// Keystrokes that matched the target.
    #[must_use]
    pub fn correct_strokes(&self) -> u32 {
        self.correct_strokes
    }

    /// Whether the transcript has reached full length.
    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Typing accuracy in percent. `None` before the first stroke.
    #[must_use]
    pub fn accuracy(&self) -> Option<f64> {
        (self.strokes > 0)
            .then(|| f64::from(self.correct_strokes) / f64::from(self.strokes) * 100.0)
    }

    /// Time since the first keystroke. `None` before the race started.
    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|start| start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn lobby_race(sentence: &str) -> Race {
        let lane = Lane::from_wire(1).unwrap();
        Race::lobby(7, lane, sentence.to_string())
    }

    fn type_str(race: &mut Race, text: &str) -> Vec<Vec<AppAction>> {
        text.chars().map(|c| race.handle_key(KeyInput::Char(c))).collect()
    }

    #[test]
    fn matching_strokes_report_absolute_progress() {
        let mut race = lobby_race("cat dog");
        let batches = type_str(&mut race, "cat");

        let reports: Vec<u16> = batches
            .iter()
            .flatten()
            .filter_map(|a| match a {
                AppAction::Report { progress, .. } => Some(*progress),
                _ => None,
            })
            .collect();

        assert_eq!(reports, vec![1, 2, 3]);
        assert_eq!(race.correct_strokes(), 3);
        assert_eq!(race.strokes(), 3);
    }

    #[test]
    fn remote_update_does_not_touch_transcript() {
        let mut race = lobby_race("cat dog");
        let _ = type_str(&mut race, "cat");

        let actions = race.apply_lane_progress(2, 5);

        assert_eq!(actions, vec![AppAction::Render]);
        assert_eq!(race.lanes()[1], 5);
        assert_eq!(race.typed(), ['c', 'a', 't']);
        assert!(!race.completed());
    }

    #[test]
    fn mismatch_counts_stroke_but_not_correct_and_reports_nothing() {
        let mut race = lobby_race("cat dog");
        let batches = type_str(&mut race, "cx");

        assert_eq!(race.typed(), ['c', 'x']);
        assert_eq!(race.correct_strokes(), 1);
        assert_eq!(race.strokes(), 2);
        assert!(
            !batches[1].iter().any(|a| matches!(a, AppAction::Report { .. })),
            "mismatched stroke must not report"
        );
    }

    #[test]
    fn space_is_an_ordinary_character() {
        let mut race = lobby_race("a b");
        let _ = type_str(&mut race, "a ");

        assert_eq!(race.typed(), ['a', ' ']);
        assert_eq!(race.correct_strokes(), 2);
    }

    #[test]
    fn last_write_wins_including_regression() {
        let mut race = lobby_race("cat dog");
        let _ = race.apply_lane_progress(3, 6);
        let _ = race.apply_lane_progress(3, 2);

        assert_eq!(race.lanes()[2], 2);
    }

    #[test]
    fn duplicate_remote_update_is_idempotent() {
        let mut race = lobby_race("cat dog");
        let _ = race.apply_lane_progress(2, 4);
        let before = race.clone().lanes().to_owned();
        let _ = race.apply_lane_progress(2, 4);

        assert_eq!(race.lanes(), &before);
    }

    #[test]
    fn out_of_range_lane_is_dropped() {
        let mut race = lobby_race("cat dog");
        assert!(race.apply_lane_progress(0, 3).is_empty());
        assert!(race.apply_lane_progress(5, 3).is_empty());
        assert_eq!(race.lanes(), &[0, 0, 0, 0]);
    }

    #[test]
    fn remote_progress_is_clamped_to_sentence_length() {
        let mut race = lobby_race("cat");
        let _ = race.apply_lane_progress(4, 999);
        assert_eq!(race.lanes()[3], 3);
    }

    #[test]
    fn completion_is_one_shot() {
        let mut race = lobby_race("cat");
        let _ = type_str(&mut race, "cat");
        assert!(race.completed());

        // Printable keys are ignored in review mode: no growth, no report.
        let actions = race.handle_key(KeyInput::Char('x'));
        assert!(actions.is_empty());
        assert_eq!(race.typed().len(), 3);

        // Backspace still edits, but completed never reverts.
        let _ = race.handle_key(KeyInput::Backspace);
        assert_eq!(race.typed().len(), 2);
        assert!(race.completed());

        // Re-typing is still refused while completed.
        let actions = race.handle_key(KeyInput::Char('t'));
        assert!(actions.is_empty());
        assert_eq!(race.typed().len(), 2);
    }

    #[test]
    fn completing_stroke_still_reports() {
        let mut race = lobby_race("ab");
        let batches = type_str(&mut race, "ab");

        assert!(race.completed());
        assert!(
            batches[1].iter().any(|a| matches!(a, AppAction::Report { progress: 2, .. })),
            "the stroke that completes the race reports its progress"
        );
    }

    #[test]
    fn backspace_and_retype_reports_transcript_position() {
        let mut race = lobby_race("cat");

        // Churn on the first position: each retype fills position 1 again.
        for _ in 0..4 {
            let _ = race.handle_key(KeyInput::Char('c'));
            let _ = race.handle_key(KeyInput::Backspace);
        }
        let actions = race.handle_key(KeyInput::Char('c'));

        let report = actions.iter().find_map(|a| match a {
            AppAction::Report { progress, .. } => Some(*progress),
            _ => None,
        });
        assert_eq!(report, Some(1));
        assert_eq!(race.lanes()[0], 1);
        assert_eq!(race.correct_strokes(), 5);
    }

    #[test]
    fn backspace_on_empty_transcript_is_a_no_op() {
        let mut race = lobby_race("cat");
        assert!(race.handle_key(KeyInput::Backspace).is_empty());
        assert!(race.typed().is_empty());
    }

    #[test]
    fn solo_race_never_reports() {
        let mut race = Race::solo("cat".to_string());
        let batches = type_str(&mut race, "cat");

        assert!(race.completed());
        assert!(!batches.iter().flatten().any(|a| matches!(a, AppAction::Report { .. })));
    }

    #[test]
    fn first_keystroke_stamps_start_time() {
        let mut race = lobby_race("cat");
        assert!(race.elapsed().is_none());

        let _ = race.handle_key(KeyInput::Char('c'));
        assert!(race.elapsed().is_some());
    }

    #[test]
    fn any_first_key_starts_the_clock() {
        let mut race = lobby_race("cat");
        let _ = race.handle_key(KeyInput::Backspace);
        assert!(race.elapsed().is_some());
    }

    proptest! {
        /// Transcript length, board values, and emitted report values all
        /// stay within [0, N] under any key sequence.
        #[test]
        fn transcript_bounds_hold(keys in proptest::collection::vec(
            prop_oneof![
                any::<char>().prop_map(KeyInput::Char),
                Just(KeyInput::Backspace),
            ],
            0..200,
        )) {
            let mut race = lobby_race("the quick brown fox");
            let n = race.target().len();

            for key in keys {
                let actions = race.handle_key(key);
                prop_assert!(race.typed().len() <= n);
                prop_assert_eq!(race.completed(), race.typed().len() == n || race.completed());
                for lane in race.lanes() {
                    prop_assert!(usize::from(*lane) <= n);
                }
                for action in actions {
                    if let AppAction::Report { progress, .. } = action {
                        prop_assert!(usize::from(progress) <= n);
                    }
                }
            }
        }

        /// After the last update touching a lane, the board holds exactly
        /// that (clamped) value, regardless of earlier updates.
        #[test]
        fn last_write_wins_property(updates in proptest::collection::vec(
            (1u8..=4, any::<u16>()),
            1..50,
        )) {
            let mut race = lobby_race("the quick brown fox");
            let n = race.target().len() as u16;

            for (lane, progress) in &updates {
                let _ = race.apply_lane_progress(*lane, *progress);
            }

            for lane in 1u8..=4 {
                if let Some((_, last)) = updates.iter().rev().find(|(l, _)| *l == lane) {
                    let index = Lane::from_wire(lane).unwrap().index();
                    prop_assert_eq!(race.lanes()[index], (*last).min(n));
                }
            }
        }
    }
}
