/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Dataset (tags decoded once by `tags`)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  topic / years / country → View (same pipeline for baseline)
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate │  per-year counts, gender counts (via `gender`) → Summary
///   └───────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ dashboard │  topic Summary + baseline Summary (or absent)
///   └───────────┘
/// ```

pub mod aggregate;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod gender;
pub mod loader;
pub mod model;
pub mod tags;
