//! Handler for the `decode` subcommand.
//!
//! Decodes and pretty-prints a signed token's header and payload without
//! verifying its signature. Supports reading the token from a CLI
//! argument, environment variable, or stdin.

use anyhow::Result;
use colored::Colorize;
use serde_json::{Value, json};

use super::Context;
use super::input::resolve_token;
use crate::cli::DecodeArgs;
use crate::core::decoder::decode_token;
use crate::display::json_printer::print_json;

/// Execute the `decode` subcommand with the given arguments.
pub fn execute(args: &DecodeArgs, ctx: &Context) -> Result<()> {
    let token = resolve_token(&args.token)?;
    let decoded = decode_token(&token)?;
    let header = Value::Object(decoded.header.as_map().clone());

    if args.json {
        let output = json!({
            "header": header,
            "payload": decoded.payload,
            "signature": decoded.signature,
        });
        print_json(&output, false);
        return Ok(());
    }

    print_section("Header", ctx.use_color);
    print_json(&header, ctx.use_color);
    println!();
    print_section("Payload", ctx.use_color);
    print_json(&decoded.payload, ctx.use_color);
    println!();
    print_section("Signature (not verified)", ctx.use_color);
    println!("{}", decoded.signature);
    Ok(())
}

fn print_section(title: &str, use_color: bool) {
    let line = format!("--- {title} ---");
    if use_color {
        println!("{}", line.bold());
    } else {
        println!("{line}");
    }
}
