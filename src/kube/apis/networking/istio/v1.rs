mod destination_rule;
mod service_entry;

pub use self::destination_rule::*;
pub use self::service_entry::*;
