pub mod page_fetcher;
pub mod text_extractor;
