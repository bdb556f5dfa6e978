// Keyword refinement: vendor lookups, thresholds, and the top-pages fallback.
// All Site Explorer calls go through seo_client.

pub mod filter;
pub mod refiner;
