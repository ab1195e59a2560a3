//! Type hierarchy demo
//!
//! Builds a three-level chain with `extend` (statics, overrides, explicit
//! constructors, super-calls), registers the types, and constructs instances.
//!
//! Usage:
//!   cargo run --example model_hierarchy

use anyhow::Result;
use keystone_base::{Member, Members, TypeRegistry};
use serde_json::json;

fn main() -> Result<()> {
    env_logger::init();

    let mut registry = TypeRegistry::with_builtins()?;

    // Level 1: a model with a table name and an id constructor
    let model = registry
        .get("ModelBase")
        .expect("builtins registered")
        .extend_with_statics(
            "Model",
            Members::new().value("table", json!("models")),
            Members::new()
                .method("describe", |inst, _args| {
                    Ok(json!(format!(
                        "{}#{}",
                        inst.descriptor().name(),
                        inst.get("id").cloned().unwrap_or(json!("?"))
                    )))
                })
                .constructor(|inst, args| {
                    inst.set("id", args.first().cloned().unwrap_or(json!(null)));
                    Ok(())
                }),
        )?;
    registry.register(model.clone())?;

    // Level 2: overrides describe() but reuses it through call_super
    let user = model.extend_with_statics(
        "User",
        Members::new().value("table", json!("users")),
        Members::new().method("describe", |inst, args| {
            let base = inst.call_super("describe", args)?;
            Ok(json!(format!("user {}", base.as_str().unwrap_or(""))))
        }),
    )?;
    registry.register(user.clone())?;

    let mut alice = user.construct(&[json!(7)])?;
    println!("constructed: {:?}", alice);
    println!("describe(): {}", alice.call("describe", &[])?);

    for name in registry.names() {
        let descriptor = registry.get(&name).expect("listed name resolves");
        let table = match descriptor.resolve_static("table") {
            Some(Member::Value(v)) => v.to_string(),
            _ => "-".to_string(),
        };
        println!(
            "type {:<10} parent {:<10} table {}",
            name,
            descriptor.parent().map(|p| p.name()).unwrap_or("-"),
            table
        );
    }

    Ok(())
}
