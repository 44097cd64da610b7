use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::report::ReportLogic;
use crate::errors::AppResult;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Report {
        meeting,
        format,
        file,
        force,
    } = cmd
    {
        let mut pool = super::open_pool(cfg)?;
        ReportLogic::run(&mut pool, *meeting, *format, file.as_deref(), *force)?;
    }
    Ok(())
}
