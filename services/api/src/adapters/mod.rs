pub mod db;
pub mod notify;
pub mod realtime;

pub use db::DbAdapter;
pub use notify::ResponseNotifier;
pub use realtime::{ClientRecordStore, RealtimeStore, RecordEvent};
