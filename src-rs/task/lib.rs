pub mod types;

pub use types::{
    classify_status, first_display, first_field, StatusClass, TaskSnapshot, TaskState, UploadFile,
    GENERIC_FAILURE, ID_KEYS, PROGRESS_KEYS, STATUS_KEYS,
};
