// Library root: composite player ratings from per-player statistic tables.
//
// `dataset` loads the table, `rating` runs the scoring pipeline, `report`
// renders the result. `config` carries every tunable into the pipeline.

pub mod config;
pub mod dataset;
pub mod rating;
pub mod report;
