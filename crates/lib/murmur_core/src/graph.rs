//! Social graph store.
//!
//! Posts, replies, likes and friendships are stored as hash-maps and sorted
//! sets under the key scheme in [`crate::store::keys`]. Content records are
//! always written before any ordering set references them, so a reader that
//! finds an id in a set can load its record.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Account, Post};
use crate::store::{Counter, KvStore, ScoreBound, StoreError, Toggle, keys};

/// Replies deeper than this below a root are not loaded.
pub const MAX_THREAD_DEPTH: usize = 32;

/// Liked posts shown on a profile (newest first).
pub const PROFILE_LIKES_LIMIT: usize = 11;

/// Social graph errors.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Sorted-set score recording insertion order.
fn insertion_score() -> f64 {
    Utc::now().timestamp_millis() as f64
}

/// Posts, replies, likes and friendships.
#[derive(Clone)]
pub struct SocialGraph {
    kv: Arc<dyn KvStore>,
}

impl SocialGraph {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    /// Add an account id to the global user set.
    pub async fn register_account(&self, account_id: &str) -> Result<()> {
        self.kv.zadd(keys::USERS, account_id, 0.0).await?;
        Ok(())
    }

    /// Persist a new post and link it into its ordering sets.
    ///
    /// Root posts join the global chronological and ranked sets. Replies are
    /// linked under their parent, which must already exist.
    pub async fn create_post(&self, post: &Post) -> Result<()> {
        if post.id.is_empty() {
            return Err(GraphError::InvalidInput("post id is empty".into()));
        }
        if post.author.is_empty() {
            return Err(GraphError::InvalidInput("post author is empty".into()));
        }

        // Posts are immutable once written; an existing id is never reused,
        // which also keeps a new parent link from closing a loop.
        if !self.get_post(&post.id).await?.is_missing() {
            return Err(GraphError::InvalidInput(format!("post {} exists", post.id)));
        }

        let parent = if post.is_reply() {
            if post.parent == post.id {
                return Err(GraphError::InvalidInput("post cannot reply to itself".into()));
            }
            let parent = self.get_post(&post.parent).await?;
            if parent.is_missing() {
                return Err(GraphError::NotFound(format!("parent post {}", post.parent)));
            }
            Some(parent)
        } else {
            None
        };

        self.kv.hset(&keys::post(&post.id), &post.to_fields()).await?;

        let order = insertion_score();
        self.kv
            .zadd(&keys::account_posts(&post.author), &post.id, order)
            .await?;

        match parent {
            None => {
                self.kv.zadd(keys::POSTS_IN_ORDER, &post.id, order).await?;
                self.kv.zadd(keys::POSTS_BY_SCORE, &post.id, 0.0).await?;
            }
            Some(parent) => {
                self.kv
                    .zadd(&keys::post_replies(&parent.id), &post.id, order)
                    .await?;
                // `score` belongs to the like toggle and is left alone here.
                self.kv
                    .hset(&keys::post(&parent.id), &parent.content_fields())
                    .await?;
            }
        }

        debug!(post_id = %post.id, parent = %post.parent, author = %post.author, "post created");
        Ok(())
    }

    /// Load one post. A missing post is the zero value (empty id).
    pub async fn get_post(&self, id: &str) -> Result<Post> {
        if id.is_empty() {
            return Ok(Post::default());
        }
        let fields = self.kv.hgetall(&keys::post(id)).await?;
        Ok(Post::from_fields(&fields))
    }

    /// Load each post in `ids` with its reply tree attached.
    ///
    /// Each tree is walked breadth first with its own visited set and stops
    /// at [`MAX_THREAD_DEPTH`], so corrupt parent links cannot loop. Missing
    /// posts are skipped.
    pub async fn get_thread(&self, ids: &[String]) -> Result<Vec<Post>> {
        let mut roots = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(root) = self.load_tree(id).await? {
                roots.push(root);
            }
        }
        Ok(roots)
    }

    async fn load_tree(&self, root_id: &str) -> Result<Option<Post>> {
        let root = self.get_post(root_id).await?;
        if root.is_missing() {
            debug!(post_id = %root_id, "skipping missing post");
            return Ok(None);
        }

        // Breadth-first order guarantees children come after their parent.
        let mut order: Vec<String> = vec![root.id.clone()];
        let mut nodes: HashMap<String, (Post, Vec<String>)> = HashMap::new();
        let mut visited: HashSet<String> = HashSet::from([root.id.clone()]);
        let mut queue: VecDeque<(Post, usize)> = VecDeque::from([(root, 0)]);

        while let Some((post, depth)) = queue.pop_front() {
            let mut children = Vec::new();
            if depth < MAX_THREAD_DEPTH {
                let reply_ids = self.kv.zrange(&keys::post_replies(&post.id), 0, -1).await?;
                for reply_id in reply_ids {
                    if !visited.insert(reply_id.clone()) {
                        warn!(post_id = %post.id, reply_id = %reply_id, "reply already in thread, skipping");
                        continue;
                    }
                    let reply = self.get_post(&reply_id).await?;
                    if reply.is_missing() {
                        continue;
                    }
                    order.push(reply.id.clone());
                    children.push(reply.id.clone());
                    queue.push_back((reply, depth + 1));
                }
            } else {
                debug!(post_id = %post.id, "thread depth cap reached");
            }
            nodes.insert(post.id.clone(), (post, children));
        }

        // Assemble leaves first so every child is complete before it moves.
        let mut built: HashMap<String, Post> = HashMap::new();
        for id in order.iter().rev() {
            if let Some((mut post, children)) = nodes.remove(id) {
                post.comments = children
                    .iter()
                    .filter_map(|child| built.remove(child))
                    .collect();
                built.insert(id.clone(), post);
            }
        }
        Ok(built.remove(root_id))
    }

    /// Like or un-like `post_id` for `account_id`.
    ///
    /// The membership change, the ranking score and the post's stored score
    /// move together in one atomic store operation.
    pub async fn toggle_like(&self, account_id: &str, post_id: &str) -> Result<Toggle> {
        if self.get_post(post_id).await?.is_missing() {
            return Err(GraphError::NotFound(format!("post {post_id}")));
        }
        let counters = [
            Counter::Ranking {
                key: keys::POSTS_BY_SCORE.to_string(),
                member: post_id.to_string(),
            },
            Counter::HashField {
                key: keys::post(post_id),
                field: "score".to_string(),
            },
        ];
        let toggle = self
            .kv
            .toggle_member(
                &keys::account_likes(account_id),
                post_id,
                insertion_score(),
                &counters,
            )
            .await?;
        debug!(account_id, post_id, ?toggle, "like toggled");
        Ok(toggle)
    }

    /// Befriend or un-friend `target_id`.
    pub async fn toggle_friend(&self, account_id: &str, target_id: &str) -> Result<Toggle> {
        if account_id == target_id {
            return Err(GraphError::InvalidInput("cannot befriend yourself".into()));
        }
        if !self.kv.exists(&keys::account(target_id)).await? {
            return Err(GraphError::NotFound(format!("account {target_id}")));
        }
        let toggle = self
            .kv
            .toggle_member(
                &keys::account_friends(account_id),
                target_id,
                insertion_score(),
                &[],
            )
            .await?;
        debug!(account_id, target_id, ?toggle, "friend toggled");
        Ok(toggle)
    }

    /// Ranked post ids, highest engagement first.
    pub async fn ranked_post_ids(&self, min: ScoreBound, max: ScoreBound) -> Result<Vec<String>> {
        Ok(self
            .kv
            .zrevrange_by_score(keys::POSTS_BY_SCORE, min, max)
            .await?)
    }

    /// Most recent root post ids, newest first.
    pub async fn recent_post_ids(&self, limit: usize) -> Result<Vec<String>> {
        self.newest(keys::POSTS_IN_ORDER, limit).await
    }

    /// An account's own posts, newest first.
    pub async fn account_post_ids(&self, account_id: &str) -> Result<Vec<String>> {
        Ok(self.kv.zrevrange(&keys::account_posts(account_id), 0, -1).await?)
    }

    /// Posts an account liked, newest first.
    pub async fn liked_post_ids(&self, account_id: &str, limit: usize) -> Result<Vec<String>> {
        self.newest(&keys::account_likes(account_id), limit).await
    }

    pub async fn friend_ids(&self, account_id: &str) -> Result<Vec<String>> {
        Ok(self.kv.zrange(&keys::account_friends(account_id), 0, -1).await?)
    }

    /// Fill an account's engagement lists from their sorted sets.
    pub async fn load_engagement(&self, account: &mut Account) -> Result<()> {
        account.posts = self.account_post_ids(&account.id).await?;
        account.likes = self.kv.zrevrange(&keys::account_likes(&account.id), 0, -1).await?;
        account.friends = self.friend_ids(&account.id).await?;
        Ok(())
    }

    async fn newest(&self, key: &str, limit: usize) -> Result<Vec<String>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let stop = isize::try_from(limit - 1).unwrap_or(isize::MAX);
        Ok(self.kv.zrevrange(key, 0, stop).await?)
    }
}
