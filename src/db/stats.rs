use crate::db::pool::DbPool;
use crate::db::queries::count_rows;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> rusqlite::Result<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) ROW COUNTS
    //
    for table in ["users", "enrolments", "meetings", "attendance"] {
        let count = count_rows(&pool.conn, table)?;
        println!(
            "{}• {}:{} {}{}{}",
            CYAN, table, RESET, GREEN, count, RESET
        );
    }

    let expired: i64 = pool.conn.query_row(
        "SELECT COUNT(*) FROM meetings WHERE exists_on_remote = 'expired'",
        [],
        |row| row.get(0),
    )?;
    println!("{}• expired meetings:{} {}", CYAN, RESET, expired);

    //
    // 3) LAST SYNC
    //
    let last_sync: Option<String> = pool
        .conn
        .query_row(
            "SELECT date FROM log WHERE operation = 'sync' ORDER BY id DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    println!(
        "{}• Last sync:{} {}",
        CYAN,
        RESET,
        last_sync.unwrap_or_else(|| format!("{GREY}--{RESET}"))
    );

    println!();
    Ok(())
}
