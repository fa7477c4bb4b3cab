pub mod coerce;
pub mod importer;
pub mod normalizer;
