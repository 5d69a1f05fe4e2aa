pub mod event;
pub mod message;
pub mod notification;
pub mod skip_rule;
pub mod topic;
