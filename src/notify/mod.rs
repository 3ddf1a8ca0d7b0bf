mod action;
mod channel;
mod dispatch;
mod job;

pub use action::{scan_due, FollowUpAction};
pub use channel::{DeliveryChannel, MailChannel, Reminder, WebhookChannel};
pub use dispatch::{compose, ChannelOutcome, Dispatcher, DispatchResult, Overall};
pub use job::{run_once, JobSummary};
