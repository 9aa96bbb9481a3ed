pub mod archive_api;
pub mod backend;
pub mod host_metrics;
pub mod hr_data;
pub mod query_api;

pub use archive_api::HttpArchiveAdapter;
pub use backend::Backend;
pub use host_metrics::{HostSnapshot, PlaceholderHostMetrics};
pub use hr_data::HttpHrDataAdapter;
pub use query_api::HttpQueryAdapter;
