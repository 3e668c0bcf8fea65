use async_trait::async_trait;

use crate::domain::{
    models::{AdminDashboard, Dashboard, MacroRollupDetail},
    Actor, TrackingError,
};

#[async_trait]
pub trait DashboardService: Send + Sync + 'static {
    /// The member dashboard, or the admin dashboard when the actor is an admin.
    async fn dashboard(&self, actor: &Actor, year: i32) -> Result<Dashboard, TrackingError>;

    async fn admin_dashboard(&self, year: i32) -> Result<AdminDashboard, TrackingError>;

    /// Roll-ups of every macro of the year, riskiest first.
    async fn macro_rollups(&self, year: i32) -> Result<Vec<MacroRollupDetail>, TrackingError>;
}
