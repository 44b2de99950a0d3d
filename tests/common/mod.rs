//! Shared fixtures: in-memory store, recording transport, seed helpers.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use signup_coordinator::clock::SystemClock;
use signup_coordinator::db::models::PlayerId;
use signup_coordinator::db::schema;
use signup_coordinator::protocol::Controls;
use signup_coordinator::signup::engine::EngineCtx;
use signup_coordinator::transport::{MessageId, Transport};

/// One-connection in-memory pool: SQLite `:memory:` databases are
/// per-connection, so the pool must not open a second one.
pub async fn mem_pool() -> SqlitePool {
    dotenvy::dotenv().ok();
    let _ = env_logger::builder().is_test(true).try_init();

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    schema::init(&pool).await.expect("schema init");
    pool
}

pub async fn seed_game(db: &SqlitePool, game_id: i64) {
    sqlx::query("INSERT INTO games (game_id, game_type, starting_time) VALUES (?, ?, ?)")
        .bind(game_id)
        .bind("historical")
        .bind("2024-03-01 18:00:00")
        .execute(db)
        .await
        .expect("seed game");
}

pub async fn seed_country(
    db: &SqlitePool,
    country_id: i64,
    name: &str,
    emoji: &str,
    major: bool,
    faction_id: i64,
) {
    sqlx::query("INSERT INTO countries (country_id, name, emoji, is_major) VALUES (?, ?, ?, ?)")
        .bind(country_id)
        .bind(name)
        .bind(emoji)
        .bind(major as i64)
        .execute(db)
        .await
        .expect("seed country");
    sqlx::query(
        "INSERT INTO countries_factions_historical (country_id, faction_id) VALUES (?, ?)",
    )
    .bind(country_id)
    .bind(faction_id)
    .execute(db)
    .await
    .expect("seed faction mapping");
}

pub async fn seed_player(db: &SqlitePool, player_id: i64, tag: &str) {
    sqlx::query("INSERT INTO players (player_id, discord_tag) VALUES (?, ?)")
        .bind(player_id)
        .bind(tag)
        .execute(db)
        .await
        .expect("seed player");
}

/// Insert an active record directly, bypassing the workflow. Returns the
/// record id.
pub async fn seed_record(
    db: &SqlitePool,
    game_id: i64,
    player_id: i64,
    country_id: i64,
    controller: i64,
    option: i64,
) -> i64 {
    let faction_id: i64 = sqlx::query_scalar(
        "SELECT faction_id FROM countries_factions_historical WHERE country_id = ?",
    )
    .bind(country_id)
    .fetch_one(db)
    .await
    .expect("country faction");

    sqlx::query(
        "INSERT INTO game_records
             (game_id, player_id, country_id, faction_id, controller, option, signup_time)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(game_id)
    .bind(player_id)
    .bind(country_id)
    .bind(faction_id)
    .bind(controller)
    .bind(option)
    .bind("2024-03-01 12:00:00.000000")
    .execute(db)
    .await
    .expect("seed record")
    .last_insert_rowid()
}

/// One delivered message, as the platform would have seen it.
#[derive(Debug, Clone)]
pub struct Delivered {
    pub message_id: MessageId,
    pub player: PlayerId,
    pub text: String,
    pub controls: Option<Controls>,
}

/// Transport double that records everything and never blocks.
#[derive(Default)]
pub struct MockTransport {
    next_id: AtomicI64,
    pub sent: Mutex<Vec<Delivered>>,
    pub replies: Mutex<Vec<(PlayerId, String)>>,
    pub latched: Mutex<Vec<(MessageId, String)>>,
    unreachable: Mutex<HashSet<PlayerId>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn close_dms(&self, player: PlayerId) {
        self.unreachable.lock().unwrap().insert(player);
    }

    pub fn dms_to(&self, player: PlayerId) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.player == player && d.controls.is_none())
            .map(|d| d.text.clone())
            .collect()
    }

    pub fn prompts_to(&self, player: PlayerId) -> Vec<Delivered> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.player == player && d.controls.is_some())
            .cloned()
            .collect()
    }

    pub fn replies_to(&self, player: PlayerId) -> Vec<String> {
        self.replies
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| *p == player)
            .map(|(_, text)| text.clone())
            .collect()
    }

    /// Request id of the latest confirm/deny prompt delivered to `player`.
    pub fn approval_request_to(&self, player: PlayerId) -> Option<u64> {
        self.prompts_to(player).iter().rev().find_map(|d| {
            match &d.controls {
                Some(Controls::ConfirmDeny { request_id }) => Some(*request_id),
                _ => None,
            }
        })
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn dm_reachable(&self, player: PlayerId) -> bool {
        !self.unreachable.lock().unwrap().contains(&player)
    }

    async fn send_dm(&self, player: PlayerId, text: &str) -> Result<MessageId> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.sent.lock().unwrap().push(Delivered {
            message_id: id,
            player,
            text: text.to_string(),
            controls: None,
        });
        Ok(id)
    }

    async fn send_prompt(
        &self,
        player: PlayerId,
        text: &str,
        controls: Controls,
    ) -> Result<MessageId> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.sent.lock().unwrap().push(Delivered {
            message_id: id,
            player,
            text: text.to_string(),
            controls: Some(controls),
        });
        Ok(id)
    }

    async fn reply(&self, player: PlayerId, text: &str) -> Result<()> {
        self.replies
            .lock()
            .unwrap()
            .push((player, text.to_string()));
        Ok(())
    }

    async fn latch(&self, message: MessageId, placeholder: &str) -> Result<()> {
        self.latched
            .lock()
            .unwrap()
            .push((message, placeholder.to_string()));
        Ok(())
    }
}

pub fn ctx(db: &SqlitePool, transport: &Arc<MockTransport>) -> EngineCtx {
    EngineCtx {
        db: db.clone(),
        transport: transport.clone() as Arc<dyn Transport>,
        clock: Arc::new(SystemClock),
    }
}

/// Poll `cond` until it holds or two seconds pass.
pub async fn wait_until<F: Fn() -> bool>(cond: F, what: &str) {
    for _ in 0..200 {
        if cond() {
            return;
        }
        tokio::time::sleep(StdDuration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}
