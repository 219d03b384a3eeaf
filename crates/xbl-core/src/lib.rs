// Shared building blocks: the propagating-null number, configuration, and
// raw sheet loading.

pub mod config;
pub mod safe_num;
pub mod sheets;

pub use safe_num::SafeNum;
