//! Example: login bootstrap and session persistence
//!
//! Demonstrates: seeding an authenticated session from a parsed auth
//! response, saving it after each scenario, and restoring it before the
//! next one so navigation never logs the suite out.
//!
//! Run with: `cargo run --example login_session`

use escenario::prelude::*;

fn main() -> EscenarioResult<()> {
    println!("=== Login Session Example ===\n");

    // 1. Credentials with a negative variant
    println!("1. Declaring credentials...");
    let credentials = Credentials::new("qa@example.com", "correct-horse")
        .with_invalid("qa@example.com", "wrong-password");
    println!(
        "   {} ({} invalid variant)",
        credentials.identifier,
        credentials.invalid_variants().len()
    );

    // 2. Parse an auth response the way the login hook would
    println!("\n2. Parsing an auth response...");
    let body = serde_json::json!({
        "token": "abc123",
        "username": "qa@example.com",
        "userId": 42,
        "expires": "2026-09-01"
    });
    let session = parse_auth_response(
        &body,
        &["username".to_string(), "userId".to_string(), "expires".to_string()],
    )?;
    println!("   token: {}", session.token);
    println!("   profile fields: {}", session.profile.len());

    // 3. Run two scenarios sharing the session through the store
    println!("\n3. Running two scenarios with session save/restore hooks...");
    let ctx = ScenarioContext::new(
        Box::new(MockDriver::new()),
        SuiteConfig::new("https://staging.example.com").credentials(credentials),
    );

    let mut runner = ScenarioRunner::new(ctx)
        .on_before_all(move |ctx| {
            // Stage two of the real bootstrap would have run by now; seed
            // the browser with what it returned.
            session.seed(ctx.driver())?;
            ctx.save_session()
        })
        .on_before_each(ScenarioContext::restore_session)
        .on_after_each(ScenarioContext::save_session);

    let first = Scenario::builder("lands on home when logged in")
        .arrange("open home", |ctx| ctx.goto("/home/"))
        .assert("token survives navigation", |ctx| {
            let storage = ctx.driver_ref().storage_snapshot()?;
            Assertion::is_true(storage.contains_key("token"), "token should be in storage")
        })
        .build()?;

    let second = Scenario::builder("session still present in next scenario")
        .arrange("open dashboard", |ctx| ctx.goto("/rewards/dashboard/"))
        .assert("token restored from snapshot", |ctx| {
            let storage = ctx.driver_ref().storage_snapshot()?;
            Assertion::equals(
                &storage.get("token").cloned(),
                &Some("abc123".to_string()),
            )
        })
        .build()?;

    let suite = runner.run_all("session persistence", vec![first, second]);
    println!("{}", Reporter::new().verbose().render(&suite));
    assert!(suite.all_passed());

    Ok(())
}
