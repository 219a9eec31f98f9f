pub mod caching;
pub mod mfapi_provider;
pub mod util;

pub use caching::HistoryFetcher;
pub use mfapi_provider::MfapiProvider;
