//! Domain models.
//!
//! Stored records are flat string hashes; these helpers convert them to
//! typed values without failing on older or hand-edited data.

pub mod account;
pub mod claims;
pub mod post;

use chrono::{DateTime, Utc};
use rand::{Rng, rng};

pub use account::Account;
pub use claims::SessionClaims;
pub use post::Post;

/// Characters used for generated ids.
const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz1234567890ABCDIJKLMNOPQRSTUVWXYZ";

/// Length of generated account and post ids.
pub const ID_LENGTH: usize = 16;

/// Generate a random account or post id.
pub fn generate_id() -> String {
    let mut rng = rng();
    (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Integers may have been written as floats by older deployments.
fn parse_int(raw: &str) -> Option<i64> {
    raw.parse::<i64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().map(|f| f as i64))
}

fn parse_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
