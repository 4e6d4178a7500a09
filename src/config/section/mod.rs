//! Configuration section definitions.
//!
//! Each module corresponds to a section in `iconsplit.toml`:
//!
//! | Module      | TOML Section    | Purpose                              |
//! |-------------|-----------------|--------------------------------------|
//! | `limits`    | `[limits]`      | File, fragment and per-file caps     |
//! | `discovery` | `[discovery]`   | Strategy chain thresholds            |
//! | `grid`      | `[grid]`        | Positional clustering tuning         |
//! | `synthesis` | `[synthesis]`   | viewBox padding, visibility repair   |
//! | `store`     | `[store]`       | Record store location                |

mod discovery;
mod grid;
mod limits;
mod store;
mod synthesis;

pub use discovery::DiscoveryConfig;
pub use grid::GridConfig;
pub use limits::LimitsConfig;
pub use store::StoreConfig;
pub use synthesis::SynthesisConfig;
