pub mod chart;
pub mod map;
pub mod poller;
pub mod sink;
pub mod state;
pub mod table;

pub use poller::Poller;
pub use sink::{HtmlPageSink, RenderSink};
pub use state::{DashboardState, render_snapshot};
