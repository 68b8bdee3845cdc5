pub mod detector;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod notifier;
pub mod render;

pub use detector::{detect, ChangeSet, QuantityChange};
pub use dispatch::{dispatch_alerts, match_subscribers, DispatchOutcome};
pub use error::NotifyError;
pub use filter::{filter_for_subscriber, matches};
pub use notifier::{
    BatchReport, DryRunNotifier, FailedSend, MailgunNotifier, MailgunSettings, Notifier,
};
