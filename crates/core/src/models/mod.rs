pub mod common;
pub mod employment;
pub mod practice;
pub mod provider;
pub mod referral;
pub mod session;
pub mod specialty;
pub mod user;

pub use common::{NewRecord, Record, RecordPatch};
