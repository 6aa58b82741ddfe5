// ==========================================
// 配方可生产性检查 - 分析运行数据仓储
// ==========================================
// 职责: analysis_run / analysis_result 两表的写入与查询
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::{init_schema, open_sqlite_connection};
use crate::domain::report::{AnalysisSummary, FeasibilityRow, MissingDetail};
use crate::domain::resolution::ResolverStats;
use crate::domain::run::AnalysisRun;
use crate::domain::types::RecipeOutcome;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const RUN_COLUMNS: &str = "run_id, started_at, finished_at, targets_file, stock_file, history_file,
     total_targets, fully_available, partially_available, unavailable,
     dq_errors, dq_warnings, resolver_stats_json, config_snapshot_json";

// ==========================================
// AnalysisRunRepository - 分析运行仓储
// ==========================================
pub struct AnalysisRunRepository {
    conn: Arc<Mutex<Connection>>,
}

fn json_column<T: serde::de::DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn count_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<usize> {
    let v: i64 = row.get(idx)?;
    Ok(v.max(0) as usize)
}

fn map_run(row: &Row<'_>) -> rusqlite::Result<AnalysisRun> {
    Ok(AnalysisRun {
        run_id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        targets_file: row.get(3)?,
        stock_file: row.get(4)?,
        history_file: row.get(5)?,
        summary: AnalysisSummary {
            total_targets: count_column(row, 6)?,
            fully_available: count_column(row, 7)?,
            partially_available: count_column(row, 8)?,
            unavailable: count_column(row, 9)?,
        },
        dq_errors: count_column(row, 10)?,
        dq_warnings: count_column(row, 11)?,
        resolver_stats: json_column::<ResolverStats>(row, 12)?,
        config_snapshot_json: row.get(13)?,
    })
}

fn map_result(row: &Row<'_>) -> rusqlite::Result<FeasibilityRow> {
    Ok(FeasibilityRow {
        product_code: row.get(0)?,
        description: row.get(1)?,
        yearly_qty: row.get(2)?,
        three_month_qty: row.get(3)?,
        outcome: json_column::<RecipeOutcome>(row, 4)?,
        formula_used: row.get(5)?,
        ingredient_count: count_column(row, 6)?,
        available_count: count_column(row, 7)?,
        availability_ratio: row.get(8)?,
        missing_count: count_column(row, 9)?,
        missing_details: json_column::<Vec<MissingDetail>>(row, 10)?,
        missing_list: row.get(11)?,
    })
}

impl AnalysisRunRepository {
    /// 打开数据库文件并确保表结构存在
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例（调用方负责建表）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 写入一次分析运行及其全部结果行
    ///
    /// # 返回
    /// - Ok(usize): 写入的结果行数
    ///
    /// # 说明
    /// - 运行记录与结果行在同一事务中写入
    /// - 结果行 seq_no 即目标清单顺序
    pub fn save_run(&self, run: &AnalysisRun, rows: &[FeasibilityRow]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            &format!(
                "INSERT INTO analysis_run ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                RUN_COLUMNS
            ),
            params![
                run.run_id,
                run.started_at,
                run.finished_at,
                run.targets_file,
                run.stock_file,
                run.history_file,
                run.summary.total_targets as i64,
                run.summary.fully_available as i64,
                run.summary.partially_available as i64,
                run.summary.unavailable as i64,
                run.dq_errors as i64,
                run.dq_warnings as i64,
                serde_json::to_string(&run.resolver_stats)?,
                run.config_snapshot_json,
            ],
        )?;

        let mut count = 0;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO analysis_result (
                    run_id, seq_no, product_code, description, yearly_qty, three_month_qty,
                    outcome_json, formula_used, ingredient_count, available_count,
                    availability_ratio, missing_count, missing_details_json, missing_list
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                "#,
            )?;

            for (seq_no, row) in rows.iter().enumerate() {
                stmt.execute(params![
                    run.run_id,
                    seq_no as i64,
                    row.product_code,
                    row.description,
                    row.yearly_qty,
                    row.three_month_qty,
                    serde_json::to_string(&row.outcome)?,
                    row.formula_used,
                    row.ingredient_count as i64,
                    row.available_count as i64,
                    row.availability_ratio,
                    row.missing_count as i64,
                    serde_json::to_string(&row.missing_details)?,
                    row.missing_list,
                ])?;
                count += 1;
            }
        }

        tx.commit()?;
        Ok(count)
    }

    /// 按 run_id 查询运行记录
    pub fn find_run(&self, run_id: &str) -> RepositoryResult<Option<AnalysisRun>> {
        let conn = self.get_conn()?;
        let run = conn
            .query_row(
                &format!("SELECT {} FROM analysis_run WHERE run_id = ?1", RUN_COLUMNS),
                params![run_id],
                map_run,
            )
            .optional()?;
        Ok(run)
    }

    /// 最近的运行记录（按开始时间倒序）
    pub fn list_recent_runs(&self, limit: usize) -> RepositoryResult<Vec<AnalysisRun>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM analysis_run ORDER BY started_at DESC LIMIT ?1",
            RUN_COLUMNS
        ))?;
        let runs = stmt
            .query_map(params![limit as i64], map_run)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(runs)
    }

    /// 读取某次运行的全部结果行（保持原目标顺序）
    pub fn list_results(&self, run_id: &str) -> RepositoryResult<Vec<FeasibilityRow>> {
        if self.find_run(run_id)?.is_none() {
            return Err(RepositoryError::NotFound {
                entity: "AnalysisRun".to_string(),
                id: run_id.to_string(),
            });
        }

        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT product_code, description, yearly_qty, three_month_qty,
                   outcome_json, formula_used, ingredient_count, available_count,
                   availability_ratio, missing_count, missing_details_json, missing_list
            FROM analysis_result
            WHERE run_id = ?1
            ORDER BY seq_no
            "#,
        )?;
        let rows = stmt
            .query_map(params![run_id], map_result)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// 删除一次运行（结果行级联删除）
    pub fn delete_run(&self, run_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM analysis_run WHERE run_id = ?1", params![run_id])?;
        Ok(affected > 0)
    }
}
