//! Pure report computation: unit normalization, access scoping, filter
//! descriptors, grouping, summaries and period breakdowns. Nothing in this
//! module touches the database; the `services` layer fetches rows and feeds
//! them through here.

pub mod aggregate;
pub mod breakdown;
pub mod filter;
pub mod scope;
pub mod summary;
pub mod units;
