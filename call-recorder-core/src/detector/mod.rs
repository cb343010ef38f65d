pub mod call_detector;
pub mod poller;
