//! Persistent State demo
//!
//! Fills a form, reloads the page and shows what came back.
//!
//! Usage: `pstate-demo [CONFIG.json] [--reset]`
//!
//! The durable scope is stored in `$PSTATE_STORAGE`, falling back to the
//! configured `durable_path` and then to a file in the temp directory.
//! Run it twice to see values restored from the previous process.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use persistent_state::demo::{self, DemoForm};
use persistent_state::dom::interact::{choose_option, pick_radio, set_hidden_value, toggle_checkbox, type_text};
use persistent_state::{Config, Page, StorageScope, VERSION};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let reset = args.iter().any(|a| a == "--reset");
    let config = load_config(args.iter().find(|a| !a.starts_with("--")))?;
    tracing::info!(
        "persistent-state {} (durable file: {})",
        VERSION,
        config.durable_path.as_deref().map_or("-".into(), |p| p.display().to_string())
    );

    // First visit: whatever an earlier run left behind is restored here
    let mut page = Page::open(config)?;
    if reset {
        println!("Cleared {} stored entries", page.reset_all());
    }
    let form = demo::mount_demo_form(&mut page, "demo")?;
    page.document_ready()?;
    report("Loaded", &page, &form);

    fill_form(&mut page, &form);
    println!("\nStored entries:");
    for scope in [StorageScope::Durable, StorageScope::Session] {
        for (key, value) in page.store().borrow().entries(scope) {
            println!("  [{}] {} = {}", scope, key, value);
        }
    }

    // Reload: same store, fresh document
    let mut page = page.reload()?;
    let form = demo::mount_demo_form(&mut page, "demo")?;
    page.document_ready()?;
    report("\nAfter reload", &page, &form);

    Ok(())
}

fn load_config(path: Option<&String>) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path).with_context(|| format!("reading {}", path))?;
            Config::from_json(&json).with_context(|| format!("parsing {}", path))?
        }
        None => Config::default(),
    };

    if let Ok(path) = std::env::var("PSTATE_STORAGE") {
        config.durable_path = Some(PathBuf::from(path));
    } else if config.durable_path.is_none() {
        config.durable_path = Some(std::env::temp_dir().join("pstate-demo.json"));
    }
    Ok(config)
}

/// Play the user: edit every control once
fn fill_form(page: &mut Page, form: &DemoForm) {
    let tree = page.tree_mut();
    if tree.value(form.name).is_empty() {
        type_text(tree, form.name, "Ada");
    }
    toggle_checkbox(tree, form.newsletter);
    pick_radio(tree, form.plans[1]);
    choose_option(tree, form.food, "Taco");
    type_text(tree, form.notes, ".");
    let token = format!("token-{}", tree.value(form.notes).len());
    set_hidden_value(tree, form.token, &token);
    demo::type_into_custom_input(tree, form.custom_input, "!");
    demo::click_counter(tree, form.counter);
}

fn report(title: &str, page: &Page, form: &DemoForm) {
    let tree = page.tree();
    let plan = form
        .plans
        .iter()
        .find(|&&radio| tree.checked(radio))
        .map_or("(none)".to_string(), |&radio| tree.value(radio));

    println!("{}:", title);
    println!("  name       = {:?}", tree.value(form.name));
    println!("  newsletter = {}", tree.checked(form.newsletter));
    println!("  plan       = {}", plan);
    println!("  food       = {}", tree.value(form.food));
    println!("  notes      = {:?}", tree.value(form.notes));
    println!("  token      = {:?}", tree.value(form.token));
    println!("  custom     = {:?}", demo::custom_input_text(tree, form.custom_input));
    println!("  counter    = {}", demo::counter_state(tree, form.counter).click_count);
    if let Some(container) = page.container(form.container) {
        println!("  ({} controls bound in [{}])", container.bound().len(), container.namespace(tree).instance_id);
    }
}
