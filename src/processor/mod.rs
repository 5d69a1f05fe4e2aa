pub mod event_filter;
pub mod filename_template;
pub mod message_processor;
pub mod notification_composer;
pub mod topic_decoder;
