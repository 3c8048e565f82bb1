mod object_id;

pub use object_id::{ObjectId, ObjectIdError};
pub use rust_decimal::Decimal;
pub use time::OffsetDateTime;
pub use uuid::Uuid;
