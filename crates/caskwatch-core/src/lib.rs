pub mod app_config;
pub mod config;
pub mod error;
pub mod inventory;
pub mod normalize;
pub mod snapshot;
pub mod subscriptions;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, SnapshotError};
pub use inventory::{InventoryItem, Jurisdiction, Location, LISTED, NC, VA, WAKE, WAKE_PREFIX};
pub use normalize::normalize_product_name;
pub use snapshot::{
    load_snapshot, load_snapshots, merge_snapshot, save_snapshot, RefreshScope,
    SnapshotUpdate,
};
pub use subscriptions::{
    enabled_subscribers, load_subscriptions, Preferences, Subscriber, SubscriptionConfig,
    TransportConfig,
};
