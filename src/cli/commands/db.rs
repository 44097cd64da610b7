use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::log::ttlog_quiet;
use crate::db::migrate::run_pending_migrations;
use crate::db::pool::DbPool;
use crate::db::stats;
use crate::errors::AppResult;
use crate::ui::messages::{header, success, warning};

/// `db` maintenance: steps run in a fixed order, whatever the flag order.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Db {
        migrate,
        check,
        vacuum,
        info,
    } = cmd
    else {
        return Ok(());
    };

    let mut pool = DbPool::new(&cfg.database)?;

    if *migrate || *info {
        run_pending_migrations(&pool.conn)?;
        if *migrate {
            success("Schema is up to date.");
        }
    }

    if *info {
        stats::print_db_info(&mut pool, &cfg.database)?;
    }

    if *check {
        check_integrity(&pool)?;
    }

    if *vacuum {
        header("VACUUM");
        pool.conn.execute_batch("VACUUM;")?;
        success("Database compacted.");
        ttlog_quiet(&pool.conn, "vacuum", &cfg.database, "VACUUM completed");
    }

    Ok(())
}

/// SQLite integrity plus foreign keys between meetings, users and attendance.
fn check_integrity(pool: &DbPool) -> AppResult<()> {
    header("Integrity check");

    let integrity: String = pool
        .conn
        .query_row("PRAGMA integrity_check;", [], |row| row.get(0))?;
    if integrity == "ok" {
        success("Integrity check passed.");
    } else {
        warning(format!("Integrity check failed: {}", integrity));
    }

    let mut stmt = pool.conn.prepare("PRAGMA foreign_key_check;")?;
    let mut broken = 0usize;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let table: String = row.get(0)?;
        let rowid: Option<i64> = row.get(1)?;
        warning(format!(
            "Dangling reference in {} (row {})",
            table,
            rowid.map(|r| r.to_string()).unwrap_or_else(|| "?".into())
        ));
        broken += 1;
    }

    if broken == 0 {
        success("No dangling attendance or enrolment references.");
    }
    Ok(())
}
