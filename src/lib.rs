pub mod config;
pub mod ingest;
pub mod models;
pub mod readiness;
pub mod recovery;
pub mod report;
pub mod squad;
pub mod stats;
pub mod synth;
pub mod trends;
