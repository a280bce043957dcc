use std::path::Path;

use anyhow::Result;

use crate::session::load_profiles;

pub fn list(profiles_path: Option<&Path>) -> Result<()> {
    let Some(profiles) = load_profiles(profiles_path)? else {
        println!("No app profiles found.");
        println!(
            "Create {} to register apps.",
            connector_config::default_profiles_path().display()
        );
        return Ok(());
    };
    if profiles.is_empty() {
        println!("Profiles file has no apps.");
        return Ok(());
    }

    println!("{:<20} {:<28} {:<12}  SCOPES", "NAME", "ID", "PROVIDER");
    for app in &profiles.apps {
        println!(
            "{:<20} {:<28} {:<12}  {}",
            app.name,
            app.id,
            app.provider,
            app.scope_string()
        );
    }
    Ok(())
}
