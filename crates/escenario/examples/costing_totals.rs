//! Example: sum-vs-total assertion with a network intercept
//!
//! Demonstrates: scraping a rendered cost column, waiting on an intercept
//! alias, and checking the displayed total against the aggregated rows.
//!
//! Run with: `cargo run --example costing_totals`

use escenario::prelude::*;

fn main() -> EscenarioResult<()> {
    println!("=== Costing Totals Example ===\n");

    // 1. Selector registry, validated up front
    println!("1. Building the selector registry...");
    let selectors = SelectorRegistry::builder("costing")
        .css("tab_2019", "#simple-tab-2019")
        .css("overhead_amounts", "td[aria-label=\"amount\"]")
        .css(
            "total_overhead_cost",
            "div[aria-label=\"total-overheads-cost\"] h3:nth-of-type(1)",
        )
        .build()?;
    println!("   {} selectors validated", selectors.len());

    // 2. A mock page: three overhead rows and their rendered total
    println!("\n2. Installing mock page state...");
    let driver = MockDriver::new()
        .with_element(
            "#simple-tab-2019",
            ElementHandle::new("tab", "button").with_attribute("aria-selected", "false"),
        )
        .with_texts("td[aria-label=\"amount\"]", &["1,200", "800", "50.5"])
        .with_element(
            "div[aria-label=\"total-overheads-cost\"] h3:nth-of-type(1)",
            ElementHandle::new("total", "h3").with_text("Rs 2,050.5"),
        );

    let ctx = ScenarioContext::new(
        Box::new(driver),
        SuiteConfig::new("https://staging.example.com"),
    );
    let mut runner = ScenarioRunner::new(ctx);

    // 3. The scenario: intercept first, then act, then aggregate
    println!("\n3. Running the scenario...");
    let tab_selectors = selectors.clone();
    let scenario = Scenario::builder("total overhead cost equals sum of rows")
        .arrange("register costing intercept", |ctx| {
            ctx.intercepts.register(
                HttpMethod::Get,
                UrlPattern::Glob("**/costing/months/?year=2019&*".to_string()),
                "costing_2019",
            );
            Ok(())
        })
        .arrange("open costing page", |ctx| ctx.goto("/costing/"))
        .act("click the 2019 tab", move |ctx| {
            ctx.page(&tab_selectors).click("tab_2019")?;
            // Stand-in for the engine's event feed reporting the reload.
            ctx.intercepts.observe(InterceptedExchange::new(
                HttpMethod::Get,
                "https://staging.example.com/api/v1/costing/months/?year=2019&limit=12",
                200,
            ));
            Ok(())
        })
        .act("wait for costing data", |ctx| {
            let exchange = ctx.wait_for("costing_2019")?;
            Assertion::status_is(exchange.status, 200)
        })
        .assert("rendered total equals sum of rows", move |ctx| {
            let page = ctx.page(&selectors);
            let rows = page.texts("overhead_amounts")?;
            let format = NumberFormat::currency("Rs ");
            let total = format.parse(&page.text("total_overhead_cost")?)?;
            let summed = sum(rows.iter().map(String::as_str), &format)?;
            println!("   rows sum to {summed}, rendered total is {total}");
            compare_approx(total, summed, 0.01)
        })
        .build()?;

    let suite = runner.run_all("costing", vec![scenario]);

    // 4. Report
    println!("\n4. Report:\n{}", Reporter::new().verbose().render(&suite));
    assert!(suite.all_passed());

    Ok(())
}
