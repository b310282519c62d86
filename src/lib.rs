pub mod cli;
pub mod config;
pub mod errors;
pub mod includes;
pub mod locator;
pub mod logging;
pub mod platform;
pub mod snippet;
pub mod viewer;

pub use config::DevtoolsConfig;
pub use errors::{DevtoolsError, Result};
pub use includes::{fix_includes, HeaderIndex, RewriteReport};
pub use locator::TestMarker;
pub use snippet::Snippet;
pub use viewer::{LaunchPlan, ViewRequest, ViewTarget};
