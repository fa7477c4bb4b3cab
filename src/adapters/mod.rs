pub mod ai;
pub mod extraction;
pub mod fetcher;
pub mod shared;
