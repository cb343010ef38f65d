use crate::models::error::CaptureError;

/// Simple key-value settings store supplied by the host app.
pub trait SettingsStore: Send + Sync {
    fn get_int(&self, key: &str) -> Option<i64>;

    fn set_int(&self, key: &str, value: i64) -> Result<(), CaptureError>;

    fn get_bool(&self, key: &str) -> Option<bool>;

    fn set_bool(&self, key: &str, value: bool) -> Result<(), CaptureError>;
}
