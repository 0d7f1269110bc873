pub mod drivers;
pub mod rides;
pub mod users;

use serde::Serialize;

/// Success envelope shared by every endpoint: `{"data": ...}`.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}
