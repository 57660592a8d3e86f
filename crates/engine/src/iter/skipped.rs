//! Bookkeeping for discontiguous contraction matching.

use colla_data::CursorState;

/// Code points passed over while looking for a discontiguous contraction.
///
/// `old` holds code points skipped by an enclosing match that are replayed
/// before reading more input; `new` collects the code points skipped by the
/// current match attempt. `pos` may run past the end of `old`: the excess
/// counts code points read from the text after the replay was exhausted.
#[derive(Debug, Default)]
pub(super) struct SkippedState {
	old: Vec<u32>,
	new: Vec<u32>,
	pos: usize,
	skip_length_at_match: usize,
	state: CursorState,
}

impl SkippedState {
	pub(super) fn clear(&mut self) {
		self.old.clear();
		self.pos = 0;
	}

	pub(super) fn is_empty(&self) -> bool {
		self.old.is_empty()
	}

	pub(super) fn has_next(&self) -> bool {
		self.pos < self.old.len()
	}

	pub(super) fn next(&mut self) -> Option<u32> {
		let c = self.old.get(self.pos).copied()?;
		self.pos += 1;
		Some(c)
	}

	/// Counts a code point read from the text past the replayed ones.
	pub(super) fn inc_beyond(&mut self) {
		self.pos += 1;
	}

	/// Moves back `n` code points and returns how many of them lie beyond
	/// the replayed ones and must be backed out of the text.
	pub(super) fn backward_num_code_points(&mut self, n: usize) -> usize {
		let length = self.old.len();
		if self.pos > length {
			let beyond = self.pos - length;
			if beyond >= n {
				self.pos -= n;
				n
			} else {
				self.pos = length.saturating_sub(n - beyond);
				beyond
			}
		} else {
			self.pos = self.pos.saturating_sub(n);
			0
		}
	}

	pub(super) fn set_first_skipped(&mut self, c: u32) {
		self.skip_length_at_match = 0;
		self.new.clear();
		self.new.push(c);
	}

	pub(super) fn skip(&mut self, c: u32) {
		self.new.push(c);
	}

	pub(super) fn record_match(&mut self) {
		self.skip_length_at_match = self.new.len();
	}

	/// Replaces the consumed replay prefix with the code points skipped up to
	/// the last match.
	pub(super) fn replace_match(&mut self) {
		let consumed = self.pos.min(self.old.len());
		let kept = &self.new[..self.skip_length_at_match.min(self.new.len())];
		self.old.splice(0..consumed, kept.iter().copied());
		self.pos = 0;
	}

	pub(super) fn save_trie_state(&mut self, state: CursorState) {
		self.state = state;
	}

	pub(super) fn trie_state(&self) -> CursorState {
		self.state
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn backing_up_beyond_the_replay_reports_text_steps() {
		let mut skipped = SkippedState::default();
		skipped.set_first_skipped(0x327);
		skipped.record_match();
		skipped.replace_match();
		assert_eq!(skipped.next(), Some(0x327));
		skipped.inc_beyond();
		skipped.inc_beyond();
		assert_eq!(skipped.backward_num_code_points(1), 1);
		assert_eq!(skipped.backward_num_code_points(2), 1);
		assert!(skipped.has_next());
		assert_eq!(skipped.next(), Some(0x327));
	}

	#[test]
	fn replace_match_drops_unmatched_tail() {
		let mut skipped = SkippedState::default();
		skipped.set_first_skipped(0x327);
		skipped.record_match();
		skipped.skip(0x323);
		skipped.replace_match();
		assert_eq!(skipped.next(), Some(0x327));
		assert_eq!(skipped.next(), None);
	}
}
