//! User domain - the durable identity directory.
//!
//! The auth core only reads and creates identities; everything else that
//! touches user rows (profile editing, KYC review) lives outside this
//! service and consumes the identity established here.

pub mod directory;
pub mod models;

pub use directory::{PgUserDirectory, UserDirectory};
pub use models::{KycUpsert, NewUser, User, UserProfile};
