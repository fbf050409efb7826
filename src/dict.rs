//! The adaptive dictionary and its index width schedule.
//!
//! Both directions agree on the index assigned to every entry and on the width of the fields
//! holding these indices. The encoder only needs to find entries by content, the decoder only
//! needs to expand entries by index, so each side gets its own representation of the same
//! append-only dictionary.
use crate::{Code, FIRST_CODE};

use log::trace;
use rustc_hash::FxHashMap;

/// The bit width of index fields and the countdown to its next increase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    /// The current width of code fields.
    index_bits: u8,
    /// Ticks left before `index_bits` grows.
    enlarge_in: u64,
}

/// Content addressed view of the dictionary, for encoding.
///
/// Every entry other than a singleton is an existing entry extended by one unit, so entries are
/// stored as edges of a trie keyed by the parent's code and the extending unit. Singletons hang
/// off the root.
#[derive(Debug)]
pub(crate) struct Tree {
    children: FxHashMap<(Code, u16), Code>,
    next_code: Code,
}

#[derive(Clone, Copy, Debug)]
struct Link {
    prefix: Code,
    unit: u16,
}

/// Index addressed view of the dictionary, for decoding.
///
/// Like [`Tree`], each entry is a link to its prefix plus its last unit. Expanding an entry walks
/// the links backwards, which is why the depth of every entry is kept alongside.
#[derive(Debug)]
pub(crate) struct Table {
    inner: Vec<Link>,
    depths: Vec<u32>,
    schedule: Schedule,
}

impl Schedule {
    const INITIAL_BITS: u8 = 2;

    /// The schedule an encoder starts with.
    pub fn for_encoder() -> Self {
        Schedule {
            index_bits: Self::INITIAL_BITS,
            enlarge_in: 1 << (Self::INITIAL_BITS - 1),
        }
    }

    /// The schedule a decoder starts with, before its three bootstrap entries.
    ///
    /// The bootstrap consumes three ticks, which leaves the decoder one tick ahead of the encoder.
    /// The first literal of the stream brings both to the same state.
    pub fn for_decoder() -> Self {
        Schedule {
            index_bits: Self::INITIAL_BITS,
            enlarge_in: 1 << Self::INITIAL_BITS,
        }
    }

    pub fn index_bits(&self) -> u8 {
        self.index_bits
    }

    pub fn enlarge_in(&self) -> u64 {
        self.enlarge_in
    }

    /// Count down one insertion, widening index fields by one bit when the countdown expires.
    pub fn tick(&mut self) {
        self.enlarge_in -= 1;
        if self.enlarge_in == 0 {
            self.enlarge_in = 1 << self.index_bits;
            self.index_bits += 1;
            trace!("index fields widened to {} bits", self.index_bits);
        }
    }
}

impl Tree {
    /// The parent of all singleton entries.
    pub(crate) const ROOT: Code = Code::MAX;

    pub(crate) fn new() -> Self {
        Tree {
            children: FxHashMap::default(),
            next_code: FIRST_CODE,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.children.clear();
        self.next_code = FIRST_CODE;
    }

    pub(crate) fn at_key(&self, code: Code, unit: u16) -> Option<Code> {
        self.children.get(&(code, unit)).copied()
    }

    /// Find the entry extending `code` by `unit`.
    ///
    /// Returns `Ok` when it was already in the tree, otherwise creates the entry and returns its
    /// new code as `Err`.
    pub(crate) fn iterate(&mut self, code: Code, unit: u16) -> Result<Code, Code> {
        if let Some(next) = self.at_key(code, unit) {
            Ok(next)
        } else {
            Err(self.append(code, unit))
        }
    }

    fn append(&mut self, code: Code, unit: u16) -> Code {
        let next = self.next_code;
        self.children.insert((code, unit), next);
        self.next_code += 1;
        next
    }

    /// The number of codes handed out, including the three control codes.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.next_code as usize
    }
}

impl Table {
    pub(crate) fn new() -> Self {
        let mut table = Table {
            inner: Vec::new(),
            depths: Vec::new(),
            schedule: Schedule::for_decoder(),
        };
        table.reset();
        table
    }

    /// Empty the table and insert the placeholders for the control codes.
    pub(crate) fn reset(&mut self) {
        self.inner.clear();
        self.depths.clear();
        self.schedule = Schedule::for_decoder();
        for unit in 0..FIRST_CODE as u16 {
            self.push_base(unit);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.len()
    }

    #[cfg(test)]
    pub(crate) fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub(crate) fn index_bits(&self) -> u8 {
        self.schedule.index_bits()
    }

    /// Append a singleton entry.
    pub(crate) fn push_base(&mut self, unit: u16) {
        self.inner.push(Link::base(unit));
        self.depths.push(1);
        self.schedule.tick();
    }

    /// Append the entry `prev` extended by `unit`.
    pub(crate) fn derive(&mut self, prev: Code, unit: u16) {
        let depth = self.depths[prev as usize] + 1;
        self.inner.push(Link { prefix: prev, unit });
        self.depths.push(depth);
        self.schedule.tick();
    }

    /// Append the units of entry `code` to `out`, returning its first unit.
    ///
    /// The code must be smaller than `len()`.
    pub(crate) fn reconstruct(&self, code: Code, out: &mut Vec<u16>) -> u16 {
        let depth = self.depths[code as usize] as usize;
        let start = out.len();
        out.resize(start + depth, 0);

        let mut code = code;
        for slot in out[start..].iter_mut().rev() {
            let link = self.inner[code as usize];
            *slot = link.unit;
            code = link.prefix;
        }

        out[start]
    }
}

impl Link {
    fn base(unit: u16) -> Self {
        Link { prefix: 0, unit }
    }
}

#[cfg(test)]
mod tests {
    use super::{Schedule, Table, Tree};

    #[test]
    fn width_grows_when_countdown_expires() {
        let mut schedule = Schedule::for_decoder();
        let mut widths = vec![schedule.index_bits()];
        for _ in 0..100 {
            let before = schedule;
            schedule.tick();
            if schedule.index_bits() != before.index_bits() {
                assert_eq!(before.enlarge_in(), 1);
                assert_eq!(schedule.index_bits(), before.index_bits() + 1);
                assert_eq!(schedule.enlarge_in(), 1 << before.index_bits());
            } else {
                assert_eq!(schedule.enlarge_in(), before.enlarge_in() - 1);
            }
            widths.push(schedule.index_bits());
        }
        assert!(widths.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn asymmetric_bootstrap() {
        let encoder = Schedule::for_encoder();
        assert_eq!((encoder.index_bits(), encoder.enlarge_in()), (2, 2));

        let table = Table::new();
        assert_eq!(table.len(), 3);
        assert_eq!(table.schedule().index_bits(), 2);
        assert_eq!(table.schedule().enlarge_in(), 1);
    }

    #[test]
    fn both_sides_agree_after_first_literal() {
        // The encoder ticks twice for its first literal, the decoder starts a tick ahead and
        // ticks once when inserting it.
        let mut encoder = Schedule::for_encoder();
        encoder.tick();
        encoder.tick();

        let mut table = Table::new();
        table.push_base(u16::from(b'a'));

        assert_eq!(&encoder, table.schedule());
    }

    #[test]
    fn tree_assigns_codes_in_order() {
        let mut tree = Tree::new();
        assert_eq!(tree.iterate(Tree::ROOT, 7), Err(3));
        assert_eq!(tree.iterate(Tree::ROOT, 7), Ok(3));
        assert_eq!(tree.iterate(3, 7), Err(4));
        assert_eq!(tree.iterate(Tree::ROOT, 9), Err(5));
        assert_eq!(tree.at_key(3, 7), Some(4));
        assert_eq!(tree.at_key(4, 7), None);
        assert_eq!(tree.len(), 6);

        tree.reset();
        assert_eq!(tree.at_key(Tree::ROOT, 7), None);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn table_expands_chains() {
        let mut table = Table::new();
        table.push_base(0x3042);
        table.derive(3, 0x41);
        table.derive(4, 0x3042);

        let mut out = vec![1];
        assert_eq!(table.reconstruct(5, &mut out), 0x3042);
        assert_eq!(out, [1, 0x3042, 0x41, 0x3042]);
        assert_eq!(table.reconstruct(1, &mut out), 1);
        assert_eq!(out.len(), 5);
    }
}
