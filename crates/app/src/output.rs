//! Output formatting for the CLI

use anyhow::{Result, bail};
use serde::Serialize;

use parallax_app::TenantContext;
use parallax_app::pages::{NO_COMPANY_MESSAGE, PageView};
use parallax_app::selectors::CompanyOption;
use parallax_app::shell::{Header, Sidebar};
use parallax_auth::ACCESS_RESTRICTED_MESSAGE;

pub fn success(msg: &str) {
    println!("{msg}");
}

pub fn info(msg: &str) {
    println!("{msg}");
}

pub fn error(msg: &str) {
    eprintln!("error: {msg}");
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct Whoami<'a> {
    header: Header,
    context: &'a TenantContext,
}

pub fn whoami(ctx: &TenantContext, json: bool) -> Result<()> {
    let header = Header::from_context(ctx);
    if json {
        return print_json(&Whoami { header, context: ctx });
    }
    println!("User:    {}", header.user_name);
    println!("Company: {}", header.company_name.as_deref().unwrap_or("-"));
    println!("Role:    {}", header.role.as_deref().unwrap_or("-"));
    match ctx.branch_id {
        Some(branch) => println!("Branch:  {branch}"),
        None => println!("Branch:  all"),
    }
    Ok(())
}

pub fn nav(sidebar: &Sidebar, ctx: &TenantContext, json: bool) -> Result<()> {
    let groups = sidebar.groups(ctx);
    if json {
        return print_json(&groups);
    }
    for group in groups {
        let marker = if sidebar.expanded() == Some(group.title) { "-" } else { "+" };
        println!("{marker} {} {}", group.icon, group.title);
        for item in group.items {
            println!("    {} {:<16} {}", item.icon, item.label, item.path);
        }
    }
    Ok(())
}

pub fn companies(options: &[CompanyOption], json: bool) -> Result<()> {
    if json {
        return print_json(options);
    }
    for option in options {
        let marker = if option.active { "*" } else { " " };
        println!("{marker} {}  {}", option.id, option.name);
    }
    Ok(())
}

pub fn page<T: Serialize>(view: &PageView<T>, json: bool) -> Result<()> {
    if json {
        return print_json(view);
    }
    match view {
        PageView::Ready(data) => print_json(data),
        PageView::NoCompany => {
            info(NO_COMPANY_MESSAGE);
            Ok(())
        }
        PageView::Restricted => bail!(ACCESS_RESTRICTED_MESSAGE),
        PageView::Failed(message) => bail!("{message}"),
    }
}
