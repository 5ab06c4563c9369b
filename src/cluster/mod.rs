/// Cluster domain layer: identifiers, selection, derived fields, row building.
pub mod errors;
pub mod report;
pub mod selection;
pub mod status;

pub use errors::ClusterError;
pub use report::{Report, ReportOptions, build_report};
pub use selection::{Version, expand_selection, is_valid_cluster_name, resolve_selection};
