pub mod interest_record;

pub use interest_record::InterestRecord;
