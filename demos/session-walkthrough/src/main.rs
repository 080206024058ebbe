//! Walks one admin and one staff member through the IMS routes.
//!
//! ```text
//! cargo run -p session-walkthrough -- [config.toml] [data-dir]
//! ```
//!
//! The session is kept in `data-dir` (default: a `beata-walkthrough`
//! directory under the system temp dir), so a second run resumes it.

use std::path::PathBuf;

use beata::prelude::*;

const TOUR: &[&str] = &["/", "/homeims", "/viewdetails/12", "/dashboard", "/users", "/nowhere"];

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,beata_access=debug".into()),
        )
        .init();
}

fn describe(decision: &Decision) -> String {
    match decision {
        Decision::Proceed => "proceed".to_string(),
        Decision::RedirectTo(redirect) if redirect.query.is_empty() => {
            format!("redirect to {}", redirect.path)
        }
        Decision::RedirectTo(redirect) => {
            let query: Vec<String> = redirect
                .query
                .iter()
                .map(|(key, value)| format!("{key}={value}"))
                .collect();
            format!("redirect to {}?{}", redirect.path, query.join("&"))
        }
    }
}

/// Visits every route in [`TOUR`] from `/`, returning each decision.
fn tour<P: LivenessProbe>(client: &SessionClient<P>) -> Vec<(&'static str, Decision)> {
    let from = Route::new("/");
    TOUR.iter()
        .map(|path| (*path, client.navigate(&Route::new(*path), &from)))
        .collect()
}

fn print_tour<P: LivenessProbe>(label: &str, client: &SessionClient<P>) {
    println!("-- {label}");
    for (path, decision) in tour(client) {
        println!("   {path:<14} {}", describe(&decision));
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => BeataConfig::from_file(path)?,
        None => BeataConfig::default(),
    };
    let data_dir = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("beata-walkthrough"));

    let storage = FileStorage::open(&data_dir)?;
    let mut client = SessionClient::builder(config)
        .on_session_end(|| tracing::warn!("session ended; the app would show /login now"))
        .build_http(storage)?;

    match client.resume()? {
        Some(session) => println!("resumed {} ({}) from {}", session.username, session.role, data_dir.display()),
        None => println!("no stored session in {}", data_dir.display()),
    }

    print_tour("anonymous", &client);

    let admin = client.login(UserRecord::new(1, "ana", Role::Admin).with_token("demo-admin-token"))?;
    println!("logged in {} until {}", admin.username, admin.expires_at);
    if let Some(header) = client.authorization_header() {
        println!("Authorization: {header}");
    }
    print_tour("admin", &client);

    client.logout()?;
    client.login(UserRecord::new(2, "lena", Role::Staff))?;
    print_tour("staff", &client);

    client.interactions().dispatch(InteractionKind::Click);
    println!("monitor running: {}", client.is_monitoring());

    let redirect = client.logout()?;
    println!("logged out, go to {}", redirect.path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decisions<P: LivenessProbe>(client: &SessionClient<P>) -> Vec<String> {
        tour(client).iter().map(|(_, decision)| describe(decision)).collect()
    }

    #[test]
    fn test_anonymous_tour() {
        let client = SessionClient::builder(BeataConfig::default())
            .build_http(MemoryStorage::new())
            .unwrap();
        assert_eq!(
            decisions(&client),
            vec![
                "proceed",
                "redirect to /login?redirect=/homeims",
                "redirect to /login?redirect=/viewdetails/12",
                "redirect to /login?redirect=/dashboard",
                "redirect to /login?redirect=/users",
                "redirect to /login?redirect=/nowhere",
            ]
        );
    }

    #[tokio::test]
    async fn test_staff_tour() {
        let mut client = SessionClient::builder(BeataConfig::default())
            .build_http(MemoryStorage::new())
            .unwrap();
        client.login(UserRecord::new(2, "lena", Role::Staff)).unwrap();
        assert_eq!(
            decisions(&client),
            vec![
                "proceed",
                "proceed",
                "proceed",
                "redirect to /homeims",
                "redirect to /homeims",
                "proceed",
            ]
        );
    }
}
