//! Binary rule-set format (`.srs`) as consumed by sing-box.
//!
//! # File Structure
//!
//! ```text
//! +------------------+
//! |  MAGIC "SRS"     |  3 bytes
//! +------------------+
//! |  VERSION         |  1 byte
//! +------------------+
//! |  ZLIB STREAM     |  uvarint rule count, then each rule:
//! |                  |    rule type (0 = default)
//! |                  |    items: [item type, item data]...
//! |                  |    0xFF, invert flag
//! +------------------+
//! ```
//!
//! Domains and suffixes share one item (a succinct trie over reversed
//! domains); keywords and regexes are plain string lists.

mod format;
mod matcher;
mod reader;
mod succinct;
mod writer;


pub use format::*;
pub use matcher::DomainMatcher;
pub use reader::{CompiledRule, CompiledRuleSet, SrsReader};
pub use succinct::SuccinctSet;
pub use writer::SrsWriter;
