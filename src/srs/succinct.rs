//! Succinct (LOUDS) trie over a sorted set of byte strings.
//!
//! Nodes are numbered breadth-first. For node `i` the label bitmap holds one
//! `0` per child followed by a single `1`; `labels` holds the child labels in
//! the same order, and bit `i` of `leaves` marks a key ending at node `i`.

use std::io::{Read, Write};

use super::format::{read_len, read_u8, take_bytes, write_uvarint, MAX_PREALLOC};
use super::matcher::{PREFIX_LABEL, ROOT_LABEL};
use crate::{Error, Result};

const SET_VERSION: u8 = 0;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuccinctSet {
    leaves: Vec<u64>,
    label_bitmap: Vec<u64>,
    labels: Vec<u8>,
}

fn set_bit(bitmap: &mut Vec<u64>, i: usize) {
    let word = i >> 6;
    if word >= bitmap.len() {
        bitmap.resize(word + 1, 0);
    }
    bitmap[word] |= 1u64 << (i & 63);
}

/// Reserve the word holding bit `i` without setting it.
fn touch_bit(bitmap: &mut Vec<u64>, i: usize) {
    let word = i >> 6;
    if word >= bitmap.len() {
        bitmap.resize(word + 1, 0);
    }
}

fn get_bit(bitmap: &[u64], i: usize) -> bool {
    bitmap
        .get(i >> 6)
        .is_some_and(|word| word & (1u64 << (i & 63)) != 0)
}

impl SuccinctSet {
    /// Build from keys that are sorted and free of duplicates.
    pub fn new<K: AsRef<[u8]>>(keys: &[K]) -> Self {
        let mut set = Self::default();
        let mut label_index = 0usize;
        // (start, end, column) ranges of keys sharing a prefix
        let mut queue: Vec<(usize, usize, usize)> = vec![(0, keys.len(), 0)];
        let mut i = 0;

        while i < queue.len() {
            let (mut start, end, col) = queue[i];
            if start < end && keys[start].as_ref().len() == col {
                start += 1;
                set_bit(&mut set.leaves, i);
            }

            let mut j = start;
            while j < end {
                let from = j;
                let label = keys[from].as_ref()[col];
                while j < end && keys[j].as_ref()[col] == label {
                    j += 1;
                }
                queue.push((from, j, col + 1));
                set.labels.push(label);
                touch_bit(&mut set.label_bitmap, label_index);
                label_index += 1;
            }
            set_bit(&mut set.label_bitmap, label_index);
            label_index += 1;
            i += 1;
        }

        set
    }

    /// Number of stored labels (trie edges).
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    /// Number of zero bits in `label_bitmap[..n]`, which is the id of the
    /// child reached through the label at bit `n - 1`.
    fn count_zeros(&self, n: usize) -> usize {
        let full = (n >> 6).min(self.label_bitmap.len());
        let mut ones: usize = self.label_bitmap[..full]
            .iter()
            .map(|word| word.count_ones() as usize)
            .sum();
        let rem = n & 63;
        if rem > 0 {
            if let Some(word) = self.label_bitmap.get(n >> 6) {
                ones += (word & ((1u64 << rem) - 1)).count_ones() as usize;
            }
        }
        n - ones
    }

    /// Position of the `i`-th (0-based) one bit in the label bitmap.
    fn select_one(&self, mut i: usize) -> Option<usize> {
        for (w, word) in self.label_bitmap.iter().enumerate() {
            let ones = word.count_ones() as usize;
            if i < ones {
                let mut bits = *word;
                for _ in 0..i {
                    bits &= bits - 1;
                }
                return Some((w << 6) + bits.trailing_zeros() as usize);
            }
            i -= ones;
        }
        None
    }

    fn label_at(&self, bm_index: usize, node_id: usize) -> Option<u8> {
        bm_index
            .checked_sub(node_id)
            .and_then(|i| self.labels.get(i))
            .copied()
    }

    /// Lookup with domain semantics: a `PREFIX_LABEL` edge matches any
    /// remainder, a `ROOT_LABEL` edge matches at a label boundary.
    pub fn has(&self, key: &[u8]) -> bool {
        let mut node_id = 0usize;
        let mut bm_index = 0usize;

        for &current in key {
            loop {
                if get_bit(&self.label_bitmap, bm_index) {
                    return false;
                }
                let Some(next_label) = self.label_at(bm_index, node_id) else {
                    return false;
                };
                if next_label == PREFIX_LABEL {
                    return true;
                }
                if next_label == ROOT_LABEL {
                    let next_node = self.count_zeros(bm_index + 1);
                    if current == b'.' && get_bit(&self.leaves, next_node) {
                        return true;
                    }
                }
                if next_label == current {
                    break;
                }
                bm_index += 1;
            }
            node_id = self.count_zeros(bm_index + 1);
            let Some(end_of_previous) = node_id.checked_sub(1).and_then(|n| self.select_one(n))
            else {
                return false;
            };
            bm_index = end_of_previous + 1;
        }

        if get_bit(&self.leaves, node_id) {
            return true;
        }
        loop {
            if get_bit(&self.label_bitmap, bm_index) {
                return false;
            }
            match self.label_at(bm_index, node_id) {
                Some(PREFIX_LABEL) | Some(ROOT_LABEL) => return true,
                Some(_) => bm_index += 1,
                None => return false,
            }
        }
    }

    /// Serialize: version byte, leaves, label bitmap, labels.
    pub fn write<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&[SET_VERSION])?;
        write_words(writer, &self.leaves)?;
        write_words(writer, &self.label_bitmap)?;
        write_uvarint(writer, self.labels.len() as u64)?;
        writer.write_all(&self.labels)?;
        Ok(())
    }

    pub fn read(reader: &mut &[u8]) -> Result<Self> {
        let version = read_u8(reader)?;
        if version != SET_VERSION {
            return Err(Error::InvalidRuleSet(format!(
                "unsupported domain set version: {}",
                version
            )));
        }
        let leaves = read_words(reader)?;
        let label_bitmap = read_words(reader)?;
        let len = read_len(reader)?;
        let labels = take_bytes(reader, len)
            .ok_or_else(|| Error::InvalidRuleSet("truncated domain labels".to_string()))?
            .to_vec();
        Ok(Self {
            leaves,
            label_bitmap,
            labels,
        })
    }
}

fn write_words<W: Write + ?Sized>(writer: &mut W, words: &[u64]) -> Result<()> {
    write_uvarint(writer, words.len() as u64)?;
    for word in words {
        writer.write_all(&word.to_be_bytes())?;
    }
    Ok(())
}

fn read_words(reader: &mut &[u8]) -> Result<Vec<u64>> {
    let count = read_len(reader)?;
    let mut words = Vec::with_capacity(count.min(MAX_PREALLOC));
    for _ in 0..count {
        let mut buf = [0u8; 8];
        reader.read_exact(&mut buf)?;
        words.push(u64::from_be_bytes(buf));
    }
    Ok(words)
}
