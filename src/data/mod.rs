mod loader;
mod normalize;

pub use loader::{load_bank, parse_bank, LoadError, DEFAULT_BANK_PATH};
pub use normalize::{
    extract_payload, normalize, normalize_record, BankError, Payload, PayloadSource,
    QuestionBank, RecordError,
};
