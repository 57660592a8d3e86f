//! UTF-16 code unit helpers that keep unpaired surrogates intact.

#[inline]
pub const fn is_lead(unit: u32) -> bool {
	(unit & 0xffff_fc00) == 0xd800
}

#[inline]
pub const fn is_trail(unit: u32) -> bool {
	(unit & 0xffff_fc00) == 0xdc00
}

#[inline]
pub const fn is_surrogate(c: u32) -> bool {
	(c & 0xffff_f800) == 0xd800
}

#[inline]
pub const fn supplementary(lead: u32, trail: u32) -> u32 {
	(lead << 10) + trail - ((0xd800 << 10) + 0xdc00 - 0x10000)
}

/// Number of code units `c` occupies.
#[inline]
pub const fn len(c: u32) -> usize {
	if c > 0xffff { 2 } else { 1 }
}

/// Appends `c` to `out`, writing surrogate code points as single units.
pub fn push(out: &mut Vec<u16>, c: u32) {
	if c <= 0xffff {
		out.push(c as u16);
	} else {
		out.push((0xd7c0 + (c >> 10)) as u16);
		out.push((0xdc00 | (c & 0x3ff)) as u16);
	}
}

/// Decodes the code point starting at `index`, returning it with its length.
///
/// An unpaired surrogate is returned as itself.
pub fn decode_at(text: &[u16], index: usize) -> (u32, usize) {
	let unit = text[index] as u32;
	if is_lead(unit)
		&& let Some(&next) = text.get(index + 1)
		&& is_trail(next as u32)
	{
		return (supplementary(unit, next as u32), 2);
	}
	(unit, 1)
}

/// Decodes the code point ending just before `index`, returning it with its length.
pub fn decode_before(text: &[u16], index: usize) -> (u32, usize) {
	let unit = text[index - 1] as u32;
	if is_trail(unit) && index >= 2 {
		let prev = text[index - 2] as u32;
		if is_lead(prev) {
			return (supplementary(prev, unit), 2);
		}
	}
	(unit, 1)
}

/// Iterates the code points of `text`.
pub fn code_points(text: &[u16]) -> CodePoints<'_> {
	CodePoints { text, index: 0 }
}

#[derive(Debug, Clone)]
pub struct CodePoints<'a> {
	text: &'a [u16],
	index: usize,
}

impl Iterator for CodePoints<'_> {
	type Item = u32;

	fn next(&mut self) -> Option<u32> {
		if self.index >= self.text.len() {
			return None;
		}
		let (c, len) = decode_at(self.text, self.index);
		self.index += len;
		Some(c)
	}
}
