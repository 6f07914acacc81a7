//! Key-naming scheme.
//!
//! These patterns are the persisted layout. Existing data is only readable
//! as long as they stay exactly as written here.
//!
//! | Key                          | Shape      | Holds                                 |
//! |------------------------------|------------|---------------------------------------|
//! | `{loginId}:HASH`             | scalar     | password hash for a login id          |
//! | `{hash}`                     | scalar     | account id owning that hash           |
//! | `{accountId}`                | hash-map   | account profile fields                |
//! | `{postId}`                   | hash-map   | post fields                           |
//! | `USERS`                      | sorted set | all account ids                       |
//! | `POSTSINORDER`               | sorted set | root post ids by insertion time       |
//! | `POSTSBYSCORE`               | sorted set | post ids by engagement count          |
//! | `{accountId}:POSTSINORDER`   | sorted set | an account's own post ids             |
//! | `{accountId}:LIKESINORDER`   | sorted set | post ids an account has liked         |
//! | `{accountId}:FRIENDSINORDER` | sorted set | account ids of friends                |
//! | `{postId}:REPLIESINORDER`    | sorted set | reply post ids                        |

/// All account ids.
pub const USERS: &str = "USERS";

/// All root post ids, in insertion order.
pub const POSTS_IN_ORDER: &str = "POSTSINORDER";

/// Ranked post ids, scored by engagement.
pub const POSTS_BY_SCORE: &str = "POSTSBYSCORE";

pub fn password_hash(login_id: &str) -> String {
    format!("{login_id}:HASH")
}

/// The hash itself is the key of its owner index.
pub fn hash_owner(hash: &str) -> String {
    hash.to_string()
}

pub fn account(account_id: &str) -> String {
    account_id.to_string()
}

pub fn post(post_id: &str) -> String {
    post_id.to_string()
}

pub fn account_posts(account_id: &str) -> String {
    format!("{account_id}:POSTSINORDER")
}

pub fn account_likes(account_id: &str) -> String {
    format!("{account_id}:LIKESINORDER")
}

pub fn account_friends(account_id: &str) -> String {
    format!("{account_id}:FRIENDSINORDER")
}

pub fn post_replies(post_id: &str) -> String {
    format!("{post_id}:REPLIESINORDER")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_patterns_match_persisted_layout() {
        assert_eq!(password_hash("alice@example.com"), "alice@example.com:HASH");
        assert_eq!(hash_owner("$2b$14$abc"), "$2b$14$abc");
        assert_eq!(account("u1"), "u1");
        assert_eq!(post("p1"), "p1");
        assert_eq!(account_posts("u1"), "u1:POSTSINORDER");
        assert_eq!(account_likes("u1"), "u1:LIKESINORDER");
        assert_eq!(account_friends("u1"), "u1:FRIENDSINORDER");
        assert_eq!(post_replies("p1"), "p1:REPLIESINORDER");
        assert_eq!(USERS, "USERS");
        assert_eq!(POSTS_IN_ORDER, "POSTSINORDER");
        assert_eq!(POSTS_BY_SCORE, "POSTSBYSCORE");
    }
}
