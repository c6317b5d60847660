pub mod reports;
pub mod results;
pub mod util;

pub use results::{FlowResult, RequestTiming, RunReport, SuiteResult};
pub use util::{artifacts_dir, capture_artifacts, split_csv};
