/// Data layer: core types, loading, and the columnar table.
///
/// Architecture:
/// ```text
///  .parquet / .csv (five cleaned tables)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse files → DatasetBundle (memoized in DatasetStore)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ DatasetBundle │  five Frames, read-only for the process lifetime
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  frame    │  filter_eq / group_sum / xy → chart traces
///   └──────────┘
/// ```
pub mod frame;
pub mod loader;
pub mod model;
