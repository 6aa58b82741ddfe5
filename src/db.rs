// ==========================================
// 配方可生产性检查 - SQLite 连接初始化
// ==========================================
// 目标:
// - 所有 Connection::open 统一 PRAGMA（外键 + busy_timeout）
// - 建表幂等,首次打开即可使用
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::path::PathBuf;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "FORMULA_FEASIBILITY_DB_PATH";

/// 默认数据库文件名
pub const DEFAULT_DB_FILE: &str = "formula_feasibility.db";

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER PRIMARY KEY,
    applied_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS config_kv (
    scope_id    TEXT NOT NULL DEFAULT 'global',
    key         TEXT NOT NULL,
    value       TEXT NOT NULL,
    updated_at  TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (scope_id, key)
);

CREATE TABLE IF NOT EXISTS analysis_run (
    run_id               TEXT PRIMARY KEY,
    started_at           TEXT NOT NULL,
    finished_at          TEXT NOT NULL,
    targets_file         TEXT NOT NULL,
    stock_file           TEXT NOT NULL,
    history_file         TEXT NOT NULL,
    total_targets        INTEGER NOT NULL,
    fully_available      INTEGER NOT NULL,
    partially_available  INTEGER NOT NULL,
    unavailable          INTEGER NOT NULL,
    dq_errors            INTEGER NOT NULL DEFAULT 0,
    dq_warnings          INTEGER NOT NULL DEFAULT 0,
    resolver_stats_json  TEXT NOT NULL,
    config_snapshot_json TEXT
);

CREATE TABLE IF NOT EXISTS analysis_result (
    run_id               TEXT NOT NULL REFERENCES analysis_run(run_id) ON DELETE CASCADE,
    seq_no               INTEGER NOT NULL,
    product_code         TEXT NOT NULL,
    description          TEXT,
    yearly_qty           REAL,
    three_month_qty      REAL,
    outcome_json         TEXT NOT NULL,
    formula_used         TEXT NOT NULL,
    ingredient_count     INTEGER NOT NULL,
    available_count      INTEGER NOT NULL,
    availability_ratio   REAL NOT NULL,
    missing_count        INTEGER NOT NULL,
    missing_details_json TEXT NOT NULL,
    missing_list         TEXT NOT NULL,
    PRIMARY KEY (run_id, seq_no)
);

CREATE INDEX IF NOT EXISTS idx_analysis_run_started ON analysis_run(started_at);
"#;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：foreign_keys 与 busy_timeout 都需要每个连接单独设置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建表（幂等）并登记 schema_version
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (?1, datetime('now'))",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 打开连接 + 建表
pub fn open_and_init(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = open_sqlite_connection(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 解析默认数据库路径
///
/// 优先级: 环境变量 → 用户数据目录 → 当前目录
pub fn default_db_path() -> PathBuf {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path.trim());
        }
    }

    match dirs::data_dir() {
        Some(dir) => dir.join("formula-feasibility").join(DEFAULT_DB_FILE),
        None => PathBuf::from(".").join(DEFAULT_DB_FILE),
    }
}
