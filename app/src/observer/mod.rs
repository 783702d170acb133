use crate::error::ServiceError;
use crate::models::ReadingStore;
use std::fmt::Debug;
use std::sync::Arc;
use tracing::error;

mod analysis;
mod reading;


pub const DEFAULT_LIST_LIMIT: i64 = 100;
pub const MAX_LIST_LIMIT: i64 = 1000;
pub const DEFAULT_SOURCE_LIMIT: i64 = 50;
pub const MAX_SOURCE_LIMIT: i64 = 500;
pub const DEFAULT_STATS_HOURS: i64 = 24;
pub const MAX_STATS_HOURS: i64 = 720;
pub const DEFAULT_FORECAST_HOURS: i64 = 6;
pub const MAX_FORECAST_HOURS: i64 = 48;

/// Entry point of every weather operation.
///
/// Holds no state besides the store handle, so concurrent requests only
/// contend inside the store.
pub struct WeatherObserver {
    store: Arc<dyn ReadingStore>,
}

impl Debug for WeatherObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherObserver").finish()
    }
}

impl WeatherObserver {
    pub fn new(store: Arc<dyn ReadingStore>) -> Arc<Self> {
        Arc::new(WeatherObserver { store })
    }

    pub async fn check_db(&self) -> String {
        match self.store.count().await {
            Ok(_) => "healthy".to_owned(),
            Err(e) => {
                error!("Database check failed: {}", e);
                format!("unavailable: {}", e)
            }
        }
    }
}

fn check_range(name: &str, value: i64, min: i64, max: i64) -> Result<i64, ServiceError> {
    if value < min || value > max {
        return Err(ServiceError::Validation(format!(
            "{} must be between {} and {}, got {}",
            name, min, max, value
        )));
    }
    Ok(value)
}
