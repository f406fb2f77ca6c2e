pub mod lookup_use_case;
pub mod ports;
pub mod reconcile_use_case;
pub mod scrape_use_case;
