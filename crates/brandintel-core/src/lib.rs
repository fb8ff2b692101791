pub mod app_config;
pub mod config;
pub mod error;
pub mod filter;
pub mod records;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, FieldError, FieldErrors, ValidationError};
pub use filter::{
    Filter, FilterField, FilterOp, FilterSchema, FilterValue, ListQuery, Page, ValueKind,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
pub use records::{
    Brand, Content, ContentMedia, Metric, NewBrand, NewContent, NewContentMedia, NewMetric,
    NewRecord, NewSignal, NewSignalContent, NewWebsiteSnapshot, Platform, RecordKind, Signal,
    SignalContent, WebsiteSnapshot,
};
