use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::log::ttlog_quiet;
use crate::db::queries::{enrol, upsert_user};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success};

/// Add or update a course user and enrol them.
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Enrol {
        course,
        email,
        first,
        last,
    } = cmd
    {
        if !email.contains('@') {
            return Err(AppError::InvalidValue(format!("'{}' is not an email", email)));
        }

        let pool = super::open_pool(cfg)?;
        let user_id = upsert_user(&pool.conn, email, first, last)?;

        if enrol(&pool.conn, user_id, *course)? {
            success(format!("User {} ({}) enrolled in course {}", user_id, email, course));
            ttlog_quiet(
                &pool.conn,
                "enrol",
                &user_id.to_string(),
                &format!("{} enrolled in course {}", email, course),
            );
        } else {
            info(format!("User {} ({}) already enrolled in course {}", user_id, email, course));
        }
    }
    Ok(())
}
