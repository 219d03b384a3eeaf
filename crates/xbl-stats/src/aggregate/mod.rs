pub mod derive;
pub mod head_to_head;
pub mod raw;

pub use derive::{derive, derive_all, DerivedStats, EntityKind};
pub use head_to_head::{
    accumulate_head_to_head, canonical_pair, HeadToHead, HeadToHeadTable, PairRecord,
};
pub use raw::{accumulate, accumulate_tracked, league_context, split_innings, Accumulation, RawStats};
