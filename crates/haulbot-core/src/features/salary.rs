//! Salary views for staff: what they are owed and what they earned.

use crate::{
    command::SalaryCommand,
    domain::MessageId,
    engine::{CallbackCtx, Deps},
    navigation::Menu,
    Result,
};

use super::render_into;

pub async fn handle(
    deps: &Deps,
    ctx: &CallbackCtx,
    cmd: SalaryCommand,
) -> Result<Option<MessageId>> {
    let menu = match cmd {
        SalaryCommand::Menu => Menu::MySalary,
        SalaryCommand::Owed { page } => Menu::SalaryOwed { page },
        SalaryCommand::EarnedStats { page } => Menu::SalaryEarned { page },
    };
    let id = render_into(deps, ctx, &menu).await?;
    Ok(Some(id))
}
