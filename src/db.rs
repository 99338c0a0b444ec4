use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, Error as SqlError, ErrorCode, params};

use crate::models::{NewReceipt, Receipt};

pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open receipt database: path={path}"))?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS receipts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL,
                recipient TEXT NOT NULL,
                token TEXT NOT NULL,
                amount TEXT NOT NULL,
                platform_fee TEXT NOT NULL,
                net_amount TEXT NOT NULL,
                source_chain_id INTEGER NOT NULL,
                target_chain_id INTEGER NOT NULL,
                tx_hash TEXT NOT NULL UNIQUE,
                message TEXT,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            ",
        )?;
        Ok(())
    }

    pub fn receipt_exists(&self, tx_hash: &str) -> Result<bool> {
        let exists = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM receipts WHERE tx_hash = ?1)",
            params![tx_hash],
            |row| row.get::<_, i64>(0),
        )?;
        Ok(exists == 1)
    }

    pub fn insert_receipt(&self, receipt: &NewReceipt) -> Result<()> {
        self.conn
            .execute(
                "
                INSERT INTO receipts(
                    project_id, recipient, token, amount, platform_fee, net_amount,
                    source_chain_id, target_chain_id, tx_hash, message
                )
                VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                ",
                params![
                    receipt.project_id,
                    receipt.recipient,
                    receipt.token,
                    receipt.amount,
                    receipt.platform_fee,
                    receipt.net_amount,
                    receipt.source_chain_id as i64,
                    receipt.target_chain_id as i64,
                    receipt.tx_hash.to_string(),
                    receipt.message,
                ],
            )
            .map_err(map_unique_err)?;
        Ok(())
    }

    pub fn history_by_project(&self, project_id: i64) -> Result<Vec<Receipt>> {
        let mut stmt = self.conn.prepare(
            "
            SELECT
                id, project_id, recipient, amount, net_amount,
                source_chain_id, target_chain_id, tx_hash, message, created_at
            FROM receipts
            WHERE project_id = ?1
            ORDER BY id DESC
            ",
        )?;

        let rows = stmt.query_map(params![project_id], |row| {
            Ok(Receipt {
                id: row.get(0)?,
                project_id: row.get(1)?,
                recipient: row.get(2)?,
                amount: row.get(3)?,
                net_amount: row.get(4)?,
                source_chain_id: row.get::<_, i64>(5)? as u64,
                target_chain_id: row.get::<_, i64>(6)? as u64,
                tx_hash: row.get(7)?,
                message: row.get(8)?,
                created_at: row.get(9)?,
            })
        })?;

        let mut receipts = Vec::new();
        for row in rows {
            receipts.push(row?);
        }
        Ok(receipts)
    }
}

fn map_unique_err(err: SqlError) -> anyhow::Error {
    match err {
        SqlError::SqliteFailure(code, _) if code.code == ErrorCode::ConstraintViolation => {
            anyhow!("duplicate receipt: this transaction hash is already recorded")
        }
        other => anyhow!(other),
    }
}
