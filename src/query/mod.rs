pub mod criteria;
pub mod executor;
pub mod hosts;
pub mod parser;

pub use criteria::{DEFAULT_FILTERS, FilterCriteria, RangeFilter};
pub use executor::{FilterEngine, filter_properties};
pub use hosts::{HostAggregate, SuperHostMap, compute_host_aggregates, compute_super_host_map};
pub use parser::{FilterQuery, parse_filter_query, parse_filters};
