/// Data layer: core types, catalog, loading, and reshaping.
///
/// Architecture:
/// ```text
///   catalog id / picked file
///        │
///        ▼
///   ┌──────────┐
///   │  fetch    │  worker thread per request, latest token wins
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  .xlsx / .ods / .csv / .json / .parquet → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  headers + rows, name → index map
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  reshape  │  X / Y / group selection → Vec<Series>
///   └──────────┘
/// ```

pub mod catalog;
pub mod fetch;
pub mod loader;
pub mod model;
pub mod reshape;
