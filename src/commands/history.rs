use anyhow::{Result, anyhow};

use crate::catalog;
use crate::config::AppConfig;
use crate::db::Db;
use crate::models::Receipt;

pub fn run(db: &Db, config: &AppConfig, project_id: i64) -> Result<()> {
    for line in lines(db, config, project_id)? {
        println!("{line}");
    }
    Ok(())
}

fn lines(db: &Db, config: &AppConfig, project_id: i64) -> Result<Vec<String>> {
    let project =
        catalog::find(project_id).ok_or_else(|| anyhow!("project not found: id={project_id}"))?;
    let rows = db.history_by_project(project.id)?;

    if rows.is_empty() {
        return Ok(vec![format!("no tips yet: project={}", project.title)]);
    }
    Ok(rows.iter().map(|row| format_row(config, row)).collect())
}

fn format_row(config: &AppConfig, row: &Receipt) -> String {
    format!(
        "id={} project={} amount={} net={} to={} {} -> {} tx={} message={} at={}",
        row.id,
        row.project_id,
        row.amount,
        row.net_amount,
        row.recipient,
        config.chain_name(row.source_chain_id),
        config.chain_name(row.target_chain_id),
        row.tx_hash,
        row.message.as_deref().unwrap_or("-"),
        row.created_at
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::B256;
    use tempfile::NamedTempFile;

    use crate::config::{BSC_TESTNET, SEPOLIA};
    use crate::models::NewReceipt;

    fn receipt(tx: u8, message: Option<&str>) -> NewReceipt {
        NewReceipt {
            project_id: 1,
            recipient: "0x1111111111111111111111111111111111111111".to_string(),
            token: "USDC".to_string(),
            amount: "10".to_string(),
            platform_fee: "0.10".to_string(),
            net_amount: "9.90".to_string(),
            source_chain_id: SEPOLIA,
            target_chain_id: BSC_TESTNET,
            tx_hash: B256::repeat_byte(tx),
            message: message.map(ToString::to_string),
        }
    }

    #[test]
    fn empty_history_says_so() {
        let file = NamedTempFile::new().expect("tmp file");
        let db = Db::open(file.path().to_str().expect("path string")).expect("db open");
        let out = lines(&db, &AppConfig::load(), 1).expect("history");
        assert_eq!(out, vec!["no tips yet: project=ZetaScan Pro".to_string()]);
    }

    #[test]
    fn rows_show_route_and_message() {
        let file = NamedTempFile::new().expect("tmp file");
        let db = Db::open(file.path().to_str().expect("path string")).expect("db open");
        db.insert_receipt(&receipt(0x01, Some("cheers"))).expect("insert");
        db.insert_receipt(&receipt(0x02, None)).expect("insert");

        let out = lines(&db, &AppConfig::load(), 1).expect("history");
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|line| line.contains("Sepolia -> BSC Testnet")));
        assert!(out.iter().any(|line| line.contains("message=cheers")));
        assert!(out.iter().any(|line| line.contains("message=-")));
    }

    #[test]
    fn unknown_project_is_an_error() {
        let file = NamedTempFile::new().expect("tmp file");
        let db = Db::open(file.path().to_str().expect("path string")).expect("db open");
        assert!(lines(&db, &AppConfig::load(), 9999).is_err());
    }
}
