//! Handlers for the `cookies` subcommands.
//!
//! These own all preference persistence: the remembered search term and
//! the key and key mode last used for each cookie.

use std::path::PathBuf;

use anyhow::Result;
use tracing::debug;
use zeroize::Zeroizing;

use super::Context;
use super::input::resolve_key;
use crate::cli::{CookieInspectArgs, CookieRef, CookiesArgs, CookiesCommand, ListArgs, ShowArgs};
use crate::config::expand_path;
use crate::core::key::KeyMode;
use crate::display::cookie_list::{render_cookie_json, render_cookie_list, render_cookie_list_json};
use crate::display::report::{render_report, render_report_json};
use crate::error::CookieLensError;
use crate::store::cookie::{CookieId, CookieStore, filter_cookies};
use crate::store::jar::NetscapeJar;
use crate::store::state::{FileStateStore, MemoryStateStore, StateKey, StateStore, forget_cookie};

/// Execute a `cookies` subcommand. Returns `false` when nothing useful
/// could be shown.
pub fn execute(args: &CookiesArgs, ctx: &Context) -> Result<bool> {
    let mut jar = NetscapeJar::new(jar_path(args, ctx)?);
    let mut state = open_state(ctx)?;

    match &args.command {
        CookiesCommand::List(list) => run_list(list, &jar, state.as_mut(), ctx),
        CookiesCommand::Delete(cookie) => run_delete(cookie, &mut jar, state.as_mut()),
        CookiesCommand::Inspect(inspect) => run_inspect(inspect, &jar, state.as_mut(), ctx),
        CookiesCommand::Show(show) => run_show(show, &jar),
    }
}

fn jar_path(args: &CookiesArgs, ctx: &Context) -> Result<PathBuf, CookieLensError> {
    match (&args.jar, &ctx.config.storage.jar) {
        (Some(path), _) => Ok(expand_path(path)),
        (None, Some(path)) => Ok(path.clone()),
        (None, None) => Err(CookieLensError::NoJarConfigured),
    }
}

fn open_state(ctx: &Context) -> Result<Box<dyn StateStore>, CookieLensError> {
    match ctx.config.state_path() {
        Some(path) => {
            debug!(path = %path.display(), "opening state file");
            Ok(Box::new(FileStateStore::open(path)?))
        }
        None => Ok(Box::new(MemoryStateStore::new())),
    }
}

fn run_list(
    args: &ListArgs,
    jar: &NetscapeJar,
    state: &mut dyn StateStore,
    ctx: &Context,
) -> Result<bool> {
    let term = if args.clear_search {
        state.remove(&StateKey::SearchTerm)?;
        String::new()
    } else if let Some(term) = &args.search {
        if term.is_empty() {
            state.remove(&StateKey::SearchTerm)?;
        } else {
            state.set(StateKey::SearchTerm, term.clone())?;
        }
        term.clone()
    } else {
        let saved = state.get(&StateKey::SearchTerm).unwrap_or_default();
        if !saved.is_empty() && !args.json {
            eprintln!("Filtering by saved search '{saved}' (use --clear-search to reset)");
        }
        saved
    };

    let all = jar.list_all()?;
    let mut shown = filter_cookies(&all, &term);
    if args.tokens_only {
        shown.retain(|c| c.looks_like_token());
    }

    if args.json {
        println!("{}", render_cookie_list_json(&shown));
    } else {
        println!("{}", render_cookie_list(&shown, ctx.use_color));
    }
    Ok(true)
}

fn run_delete(args: &CookieRef, jar: &mut NetscapeJar, state: &mut dyn StateStore) -> Result<bool> {
    let id = CookieId::new(args.domain.clone(), args.name.clone());
    let cookie = jar.find(&id)?;
    jar.remove(&id)?;
    forget_cookie(state, &id)?;
    println!("Deleted cookie '{}' ({})", cookie.name, cookie.url());
    Ok(true)
}

fn run_show(args: &ShowArgs, jar: &NetscapeJar) -> Result<bool> {
    let id = CookieId::new(args.cookie.domain.clone(), args.cookie.name.clone());
    let cookie = jar.find(&id)?;
    if args.json {
        println!("{}", render_cookie_json(&cookie));
    } else {
        println!("{}", cookie.value);
    }
    Ok(true)
}

fn run_inspect(
    args: &CookieInspectArgs,
    jar: &NetscapeJar,
    state: &mut dyn StateStore,
    ctx: &Context,
) -> Result<bool> {
    let id = CookieId::new(args.cookie.domain.clone(), args.cookie.name.clone());
    let cookie = jar.find(&id)?;

    if !cookie.looks_like_token() {
        println!("Cookie '{}' does not look like a token; nothing to inspect.", cookie.name);
        return Ok(false);
    }

    let key = match resolve_key(&args.key)? {
        Some(key) => {
            if key.trim().is_empty() {
                state.remove(&StateKey::CookieKey(id.clone()))?;
            } else {
                state.set(StateKey::CookieKey(id.clone()), key.as_str().to_string())?;
            }
            key
        }
        None => Zeroizing::new(state.get(&StateKey::CookieKey(id.clone())).unwrap_or_default()),
    };

    let mode = match args.key.mode() {
        Some(mode) => {
            state.set(StateKey::CookieKeyMode(id.clone()), mode.as_str().to_string())?;
            mode
        }
        None => saved_mode(state, &id).unwrap_or(ctx.config.keys.default_mode),
    };

    let result = ctx.inspector(&args.key).inspect(&cookie.value, &key, mode);

    if args.json {
        println!("{}", render_report_json(&result));
    } else {
        println!("{}", render_report(&result, mode, ctx.use_color));
    }
    Ok(!result.is_error)
}

fn saved_mode(state: &dyn StateStore, id: &CookieId) -> Option<KeyMode> {
    state
        .get(&StateKey::CookieKeyMode(id.clone()))
        .and_then(|name| KeyMode::from_name(&name))
}
