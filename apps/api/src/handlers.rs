pub mod api_keys;
pub mod audit_logs;
pub mod cloud_accounts;
pub mod health;
pub mod profile;
