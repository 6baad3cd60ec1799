pub mod store;
pub mod view;

pub use store::DashboardStateStore;
pub use view::{
    impact_bars, trend_denominator, trend_heights_pct, DashboardView, ImpactBar, ImpactDirection,
    RefreshLeg, RefreshReport, TREND_NORMALIZATION_FLOOR,
};
